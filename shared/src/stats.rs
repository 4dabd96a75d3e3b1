use serde::{Deserialize, Serialize};

use crate::key::normalize_key_part;

/// One row of the district-level stat table, keyed by
/// `(state, map_type, district)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistrictStat {
    pub state: String,
    pub map_type: String,
    pub district: String,
    pub dem_margin: Option<f64>,
    pub dem_prob: Option<f64>,
    pub compactness_rank: Option<f64>,
    pub minority_percentage: Option<f64>,
    pub total_population: Option<f64>,
    pub notes: Option<String>,
}

/// One row of the state-level summary table, keyed by `(state, map_type)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateStat {
    pub state: String,
    pub map_type: String,
    pub expected_dem_seats: Option<f64>,
    pub expected_gop_seats: Option<f64>,
    pub efficiency_gap: Option<f64>,
    pub seat_vote_gap: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawDistrictRow {
    #[serde(default)]
    state: String,
    #[serde(default)]
    map_type: String,
    #[serde(default)]
    district: String,
    #[serde(default)]
    dem_margin: String,
    #[serde(default)]
    dem_prob: String,
    #[serde(default)]
    compactness_rank: String,
    #[serde(default)]
    minority_percentage: String,
    #[serde(default)]
    total_population: String,
    #[serde(default)]
    notes: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawStateRow {
    #[serde(default)]
    state: String,
    #[serde(default)]
    map_type: String,
    #[serde(default)]
    expected_dem_seats: String,
    #[serde(default)]
    expected_gop_seats: String,
    #[serde(default)]
    efficiency_gap: String,
    #[serde(default)]
    seat_vote_gap: String,
    #[serde(default)]
    notes: String,
}

impl From<RawDistrictRow> for DistrictStat {
    fn from(raw: RawDistrictRow) -> Self {
        Self {
            state: raw.state,
            map_type: raw.map_type,
            district: raw.district,
            dem_margin: parse_number(&raw.dem_margin),
            dem_prob: parse_number(&raw.dem_prob),
            compactness_rank: parse_number(&raw.compactness_rank),
            minority_percentage: parse_number(&raw.minority_percentage),
            total_population: parse_number(&raw.total_population),
            notes: optional_text(raw.notes),
        }
    }
}

impl From<RawStateRow> for StateStat {
    fn from(raw: RawStateRow) -> Self {
        Self {
            state: raw.state,
            map_type: raw.map_type,
            expected_dem_seats: parse_number(&raw.expected_dem_seats),
            expected_gop_seats: parse_number(&raw.expected_gop_seats),
            efficiency_gap: parse_number(&raw.efficiency_gap),
            seat_vote_gap: parse_number(&raw.seat_vote_gap),
            notes: optional_text(raw.notes),
        }
    }
}

/// Defensive numeric parse: an empty or non-numeric cell is absent, never
/// zero and never an error, so "no data" stays distinguishable from 0.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn optional_text(raw: String) -> Option<String> {
    if raw.trim().is_empty() { None } else { Some(raw) }
}

/// Parse the district-level CSV table. Rows with an empty `state` are
/// dropped; a structurally malformed document fails the whole table.
pub fn parse_district_table(raw: &[u8]) -> Result<Vec<DistrictStat>, csv::Error> {
    parse_table::<RawDistrictRow, DistrictStat>(raw)
}

/// Parse the state-level CSV table, with the same row cleanup rules as the
/// district table.
pub fn parse_state_table(raw: &[u8]) -> Result<Vec<StateStat>, csv::Error> {
    parse_table::<RawStateRow, StateStat>(raw)
}

fn parse_table<R, T>(raw: &[u8]) -> Result<Vec<T>, csv::Error>
where
    R: for<'de> Deserialize<'de> + HasState,
    T: From<R>,
{
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(raw);

    let mut rows = Vec::new();
    for record in reader.deserialize::<R>() {
        let raw_row = record?;
        if raw_row.state().trim().is_empty() {
            continue;
        }
        rows.push(T::from(raw_row));
    }
    Ok(rows)
}

trait HasState {
    fn state(&self) -> &str;
}

impl HasState for RawDistrictRow {
    fn state(&self) -> &str {
        &self.state
    }
}

impl HasState for RawStateRow {
    fn state(&self) -> &str {
        &self.state
    }
}

/// Look up the state-level summary row for a `(state, map_type)` pair, with
/// the same trimmed, case-insensitive matching as the composite key.
pub fn find_state_summary<'a>(
    rows: &'a [StateStat],
    state: &str,
    map_type: &str,
) -> Option<&'a StateStat> {
    let state = normalize_key_part(state);
    let map_type = normalize_key_part(map_type);
    rows.iter().find(|row| {
        normalize_key_part(&row.state) == state && normalize_key_part(&row.map_type) == map_type
    })
}
