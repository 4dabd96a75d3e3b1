pub mod stat_warmer;
