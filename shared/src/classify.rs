use serde::{Deserialize, Serialize};

/// Fill bucket for the choropleth scale, derived from the two-party margin
/// (positive favors the Democratic side).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarginClass {
    StrongOpposition,
    LeanOpposition,
    Competitive,
    LeanFavor,
    StrongFavor,
}

impl MarginClass {
    /// Legend display order, strongest favor first.
    pub const LEGEND: [MarginClass; 5] = [
        MarginClass::StrongFavor,
        MarginClass::LeanFavor,
        MarginClass::Competitive,
        MarginClass::LeanOpposition,
        MarginClass::StrongOpposition,
    ];

    pub const fn fill_color(&self) -> &'static str {
        match self {
            MarginClass::StrongOpposition => "#c94c4c",
            MarginClass::LeanOpposition => "#e38181",
            MarginClass::Competitive => "#9e9eb0",
            MarginClass::LeanFavor => "#81a5e3",
            MarginClass::StrongFavor => "#4c74c9",
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            MarginClass::StrongOpposition => "Safe GOP",
            MarginClass::LeanOpposition => "Lean GOP",
            MarginClass::Competitive => "Competitive",
            MarginClass::LeanFavor => "Lean Dem",
            MarginClass::StrongFavor => "Safe Dem",
        }
    }
}

/// Classify a margin against the fixed threshold ladder. First match wins
/// and boundary values land in the lower bucket; an absent or NaN margin
/// renders as competitive neutral.
pub fn classify_margin(margin: Option<f64>) -> MarginClass {
    let Some(margin) = margin.filter(|m| !m.is_nan()) else {
        return MarginClass::Competitive;
    };

    if margin <= -15.0 {
        MarginClass::StrongOpposition
    } else if margin <= -5.0 {
        MarginClass::LeanOpposition
    } else if margin <= 5.0 {
        MarginClass::Competitive
    } else if margin <= 15.0 {
        MarginClass::LeanFavor
    } else {
        MarginClass::StrongFavor
    }
}

#[cfg(test)]
mod tests {
    use super::{MarginClass, classify_margin};

    #[test]
    fn classification_vector_matches_threshold_ladder() {
        let cases = [
            (Some(-20.0), MarginClass::StrongOpposition),
            (Some(-15.0), MarginClass::StrongOpposition),
            (Some(-10.0), MarginClass::LeanOpposition),
            (Some(-5.0), MarginClass::LeanOpposition),
            (Some(0.0), MarginClass::Competitive),
            (Some(5.0), MarginClass::Competitive),
            (Some(10.0), MarginClass::LeanFavor),
            (Some(15.0), MarginClass::LeanFavor),
            (Some(20.0), MarginClass::StrongFavor),
            (None, MarginClass::Competitive),
        ];

        for (margin, expected) in cases {
            assert_eq!(classify_margin(margin), expected, "margin {margin:?}");
        }
    }

    #[test]
    fn boundary_values_belong_to_the_lower_bucket() {
        assert_eq!(classify_margin(Some(-15.0)), MarginClass::StrongOpposition);
        assert_eq!(classify_margin(Some(-14.999)), MarginClass::LeanOpposition);
        assert_eq!(classify_margin(Some(5.0)), MarginClass::Competitive);
        assert_eq!(classify_margin(Some(5.001)), MarginClass::LeanFavor);
    }

    #[test]
    fn nan_counts_as_absent_but_infinities_take_the_outer_buckets() {
        assert_eq!(classify_margin(Some(f64::NAN)), MarginClass::Competitive);
        assert_eq!(classify_margin(Some(f64::INFINITY)), MarginClass::StrongFavor);
        assert_eq!(classify_margin(Some(f64::NEG_INFINITY)), MarginClass::StrongOpposition);
    }

    #[test]
    fn every_bucket_has_a_distinct_color_and_label() {
        let mut colors: Vec<&str> = MarginClass::LEGEND.iter().map(|c| c.fill_color()).collect();
        colors.sort_unstable();
        colors.dedup();
        assert_eq!(colors.len(), 5);

        assert_eq!(MarginClass::StrongFavor.label(), "Safe Dem");
        assert_eq!(MarginClass::StrongOpposition.label(), "Safe GOP");
    }

    #[test]
    fn serde_form_is_kebab_case() {
        let json = serde_json::to_string(&MarginClass::StrongOpposition).expect("serialize");
        assert_eq!(json, "\"strong-opposition\"");
        let back: MarginClass = serde_json::from_str("\"lean-favor\"").expect("deserialize");
        assert_eq!(back, MarginClass::LeanFavor);
    }
}
