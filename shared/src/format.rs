//! Display formatting for stat values in tooltips and summary panels.
//! Absent values render as an em dash across the board.

pub const ABSENT: &str = "—";

/// Fractional share as a percentage with one decimal: `0.423` is `42.3%`.
pub fn format_percent(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("{:.1}%", v * 100.0),
        None => ABSENT.to_owned(),
    }
}

/// Signed margin in points: `+7.5 pt`, `-3.0 pt`, `0.0 pt`.
pub fn format_margin(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => {
            let sign = if v > 0.0 { "+" } else { "" };
            format!("{sign}{v:.1} pt")
        }
        None => ABSENT.to_owned(),
    }
}

/// Party-prefixed lean: `D+7.5` for positive margins, `R+4` for negative,
/// `0` for an exactly even seat.
pub fn format_lean(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) if v > 0.0 => format!("D+{}", v.abs()),
        Some(v) if v < 0.0 => format!("R+{}", v.abs()),
        Some(v) => v.abs().to_string(),
        None => ABSENT.to_owned(),
    }
}

/// Population count with thousands separators.
pub fn format_population(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => group_thousands(v),
        None => ABSENT.to_owned(),
    }
}

/// Plain numeric display for ranks, `3` rather than `3.0`.
pub fn format_rank(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => v.to_string(),
        None => ABSENT.to_owned(),
    }
}

fn group_thousands(value: f64) -> String {
    let raw = value.to_string();
    let (sign, rest) = raw
        .strip_prefix('-')
        .map_or(("", raw.as_str()), |stripped| ("-", stripped));
    let (int_part, frac_part) = match rest.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (rest, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 1);
    grouped.push_str(sign);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}
