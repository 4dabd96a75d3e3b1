use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::geometry::{BoundaryFeature, BoundaryProperties, Geometry};
use crate::key::CompositeKey;
use crate::stats::DistrictStat;

pub type DistrictLookup = HashMap<CompositeKey, DistrictStat>;

/// Properties of a joined feature: the boundary fields plus the matched stat
/// row's fields. Stat fields stay `None` when no row matched; absence is
/// distinguishable from a zero value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinedProperties {
    pub state: String,
    pub map_type: String,
    pub district: Option<String>,
    pub name: Option<String>,
    pub dem_margin: Option<f64>,
    pub dem_prob: Option<f64>,
    pub compactness_rank: Option<f64>,
    pub minority_percentage: Option<f64>,
    pub total_population: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinedFeature {
    pub geometry: Geometry,
    pub properties: JoinedProperties,
}

/// Match counts from one join pass. Diagnostics only; the join itself never
/// drops features and an unmatched row is not an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JoinReport {
    pub matched: usize,
    pub unmatched_features: usize,
    pub unused_rows: usize,
}

impl JoinReport {
    pub fn is_clean(&self) -> bool {
        self.unmatched_features == 0 && self.unused_rows == 0
    }
}

/// Index district rows by their normalized composite key. Duplicate keys keep
/// the last row, matching plain object assignment in the data pipeline.
pub fn build_district_lookup(rows: &[DistrictStat]) -> DistrictLookup {
    rows.iter()
        .map(|row| {
            (
                CompositeKey::new(&row.state, &row.map_type, Some(&row.district)),
                row.clone(),
            )
        })
        .collect()
}

/// Left-join boundary features against the district lookup. Boundary side is
/// authoritative: every feature comes back, in input order, whether or not a
/// stat row matched. O(F + S) via the precomputed lookup.
pub fn join_features(
    boundaries: &[BoundaryFeature],
    lookup: &DistrictLookup,
) -> (Vec<JoinedFeature>, JoinReport) {
    let mut report = JoinReport::default();
    let mut matched_keys: HashSet<CompositeKey> = HashSet::new();

    let joined = boundaries
        .iter()
        .map(|feature| {
            let key = CompositeKey::new(
                &feature.properties.state,
                &feature.properties.map_type,
                feature.properties.district.as_deref(),
            );
            let row = lookup.get(&key);
            match row {
                Some(_) => {
                    report.matched += 1;
                    matched_keys.insert(key);
                }
                None => report.unmatched_features += 1,
            }
            JoinedFeature {
                geometry: feature.geometry.clone(),
                properties: merge_properties(&feature.properties, row),
            }
        })
        .collect();

    report.unused_rows = lookup.len() - matched_keys.len();
    (joined, report)
}

fn merge_properties(base: &BoundaryProperties, row: Option<&DistrictStat>) -> JoinedProperties {
    JoinedProperties {
        state: base.state.clone(),
        map_type: base.map_type.clone(),
        // Boundary-side identifier wins; the row's value only fills a gap.
        district: base
            .district
            .clone()
            .or_else(|| row.map(|r| r.district.clone())),
        name: base.name.clone(),
        dem_margin: row.and_then(|r| r.dem_margin),
        dem_prob: row.and_then(|r| r.dem_prob),
        compactness_rank: row.and_then(|r| r.compactness_rank),
        minority_percentage: row.and_then(|r| r.minority_percentage),
        total_population: row.and_then(|r| r.total_population),
        notes: row.and_then(|r| r.notes.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::{build_district_lookup, join_features};
    use crate::geometry::{BoundaryFeature, BoundaryProperties, Geometry};
    use crate::stats::DistrictStat;

    fn feature(state: &str, district: Option<&str>) -> BoundaryFeature {
        BoundaryFeature {
            geometry: Geometry::Unsupported("test".to_owned()),
            properties: BoundaryProperties {
                state: state.to_owned(),
                map_type: "current".to_owned(),
                district: district.map(str::to_owned),
                name: None,
            },
        }
    }

    fn row(state: &str, district: &str, dem_margin: Option<f64>) -> DistrictStat {
        DistrictStat {
            state: state.to_owned(),
            map_type: "current".to_owned(),
            district: district.to_owned(),
            dem_margin,
            dem_prob: Some(0.5),
            compactness_rank: None,
            minority_percentage: None,
            total_population: Some(700_000.0),
            notes: Some("note".to_owned()),
        }
    }

    #[test]
    fn join_preserves_feature_count_and_order() {
        let boundaries = vec![
            feature("TX", Some("2")),
            feature("TX", Some("1")),
            feature("TX", Some("99")),
        ];
        let lookup = build_district_lookup(&[row("TX", "1", Some(4.0)), row("TX", "2", Some(-8.0))]);

        let (joined, report) = join_features(&boundaries, &lookup);

        assert_eq!(joined.len(), 3);
        assert_eq!(joined[0].properties.district.as_deref(), Some("2"));
        assert_eq!(joined[1].properties.district.as_deref(), Some("1"));
        assert_eq!(joined[2].properties.district.as_deref(), Some("99"));
        assert_eq!(report.matched, 2);
        assert_eq!(report.unmatched_features, 1);
        assert_eq!(report.unused_rows, 0);
    }

    #[test]
    fn matched_features_carry_stat_fields_exactly() {
        let boundaries = vec![feature("TX", Some("1"))];
        let lookup = build_district_lookup(&[row("TX", "1", Some(-12.5))]);

        let (joined, _) = join_features(&boundaries, &lookup);
        let props = &joined[0].properties;

        assert_eq!(props.dem_margin, Some(-12.5));
        assert_eq!(props.dem_prob, Some(0.5));
        assert_eq!(props.total_population, Some(700_000.0));
        assert_eq!(props.notes.as_deref(), Some("note"));
    }

    #[test]
    fn unmatched_features_have_absent_stat_fields_not_zero() {
        let boundaries = vec![feature("TX", Some("1"))];
        let (joined, report) = join_features(&boundaries, &build_district_lookup(&[]));

        let props = &joined[0].properties;
        assert_eq!(props.dem_margin, None);
        assert_eq!(props.dem_prob, None);
        assert_eq!(props.total_population, None);
        assert_eq!(report.unmatched_features, 1);
    }

    #[test]
    fn key_normalization_aligns_both_sides_of_the_join() {
        let boundaries = vec![feature(" tx ", Some(" 1 "))];
        let lookup = build_district_lookup(&[row("TX", "1", Some(3.0))]);

        let (joined, report) = join_features(&boundaries, &lookup);

        assert_eq!(report.matched, 1);
        assert_eq!(joined[0].properties.dem_margin, Some(3.0));
    }

    #[test]
    fn boundary_district_wins_over_stat_row_value() {
        // Key parts normalize identically but the raw strings differ; the
        // merged district must keep the boundary's raw form.
        let boundaries = vec![feature("TX", Some(" 1 "))];
        let lookup = build_district_lookup(&[row("TX", "1", Some(3.0))]);

        let (joined, _) = join_features(&boundaries, &lookup);
        assert_eq!(joined[0].properties.district.as_deref(), Some(" 1 "));
    }

    #[test]
    fn stat_row_district_fills_a_boundary_gap() {
        // A feature without a district can only match a row whose district
        // cell is empty; the row's value then fills the merged field.
        let boundaries = vec![feature("TX", None)];
        let lookup = build_district_lookup(&[row("TX", "", Some(3.0))]);

        let (joined, report) = join_features(&boundaries, &lookup);
        assert_eq!(report.matched, 1);
        assert_eq!(joined[0].properties.district.as_deref(), Some(""));
    }

    #[test]
    fn unused_rows_are_counted_for_diagnostics() {
        let boundaries = vec![feature("TX", Some("1"))];
        let lookup = build_district_lookup(&[
            row("TX", "1", Some(1.0)),
            row("TX", "2", Some(2.0)),
            row("CA", "1", Some(3.0)),
        ]);

        let (_, report) = join_features(&boundaries, &lookup);
        assert_eq!(report.matched, 1);
        assert_eq!(report.unused_rows, 2);
        assert!(!report.is_clean());
    }

    #[test]
    fn empty_boundary_collection_yields_empty_join() {
        let lookup = build_district_lookup(&[row("TX", "1", Some(1.0))]);
        let (joined, report) = join_features(&[], &lookup);

        assert!(joined.is_empty());
        assert_eq!(report.matched, 0);
        assert_eq!(report.unused_rows, 1);
    }

    #[test]
    fn duplicate_row_keys_keep_the_last_row() {
        let lookup = build_district_lookup(&[row("TX", "1", Some(1.0)), row("TX", "1", Some(9.0))]);
        let (joined, _) = join_features(&[feature("TX", Some("1"))], &lookup);

        assert_eq!(joined[0].properties.dem_margin, Some(9.0));
    }
}
