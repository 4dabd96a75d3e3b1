use std::fmt;

use serde::{Deserialize, Serialize};

/// Normalized join key aligning boundary features with district stat rows.
///
/// Both sides of the join must normalize identically (trim, lowercase,
/// string-coerced district identifier) or matches silently fail.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompositeKey {
    pub state: String,
    pub map_type: String,
    pub district: String,
}

impl CompositeKey {
    /// A missing district keys as the empty string, so a boundary without a
    /// district identifier can still match a row whose district cell is empty.
    pub fn new(state: &str, map_type: &str, district: Option<&str>) -> Self {
        Self {
            state: normalize_key_part(state),
            map_type: normalize_key_part(map_type),
            district: normalize_key_part(district.unwrap_or_default()),
        }
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.state, self.map_type, self.district)
    }
}

/// Trim and lowercase one key component.
pub fn normalize_key_part(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// String-coerce a district identifier from raw JSON. Boundary files carry
/// districts as strings or bare numbers; integral numbers collapse to their
/// integer form so `5` and `"5"` key identically.
pub fn coerce_district_id(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                n.as_f64().map(|f| {
                    if f.is_finite() && f.fract() == 0.0 {
                        format!("{}", f as i64)
                    } else {
                        f.to_string()
                    }
                })
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{CompositeKey, coerce_district_id, normalize_key_part};

    #[test]
    fn numeric_string_and_padded_districts_key_identically() {
        let from_number = CompositeKey::new(
            "TX",
            "current",
            coerce_district_id(&serde_json::json!(5)).as_deref(),
        );
        let from_string = CompositeKey::new("TX", "current", Some("5"));
        let from_padded = CompositeKey::new("TX", "current", Some(" 5 "));

        assert_eq!(from_number, from_string);
        assert_eq!(from_string, from_padded);
    }

    #[test]
    fn key_is_case_and_whitespace_insensitive() {
        let a = CompositeKey::new(" TX ", "Current", Some("12A"));
        let b = CompositeKey::new("tx", " current ", Some(" 12a"));
        assert_eq!(a, b);
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_key_part("  North Carolina ");
        let twice = normalize_key_part(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn missing_district_keys_as_empty() {
        let key = CompositeKey::new("TX", "current", None);
        assert_eq!(key.district, "");
        assert_eq!(key, CompositeKey::new("TX", "current", Some("")));
    }

    #[test]
    fn coerce_district_id_handles_json_value_kinds() {
        assert_eq!(
            coerce_district_id(&serde_json::json!("12A")),
            Some("12A".to_string())
        );
        assert_eq!(coerce_district_id(&serde_json::json!(7)), Some("7".to_string()));
        assert_eq!(
            coerce_district_id(&serde_json::json!(7.0)),
            Some("7".to_string())
        );
        assert_eq!(coerce_district_id(&serde_json::Value::Null), None);
        assert_eq!(coerce_district_id(&serde_json::json!(true)), None);
    }

    #[test]
    fn display_uses_pipe_separated_form() {
        let key = CompositeKey::new("TX", "Compact", Some("3"));
        assert_eq!(key.to_string(), "tx|compact|3");
    }
}
