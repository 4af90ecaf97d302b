use serde_json::Value;

// Per-field caps (in characters)
pub const PUBLIC_IP_LIMIT: usize = 200;
pub const PUBLIC_IPV4_LIMIT: usize = 200;
pub const PUBLIC_IPV6_LIMIT: usize = 300;
/// Country, region and city
pub const PLACE_LIMIT: usize = 120;
pub const POSTAL_LIMIT: usize = 40;
/// ISP and org
pub const NETWORK_OWNER_LIMIT: usize = 200;
pub const ASN_LIMIT: usize = 80;
/// Device name and platform
pub const DEVICE_LIMIT: usize = 120;
pub const LANGUAGE_LIMIT: usize = 40;
pub const TIMEZONE_LIMIT: usize = 80;
/// Screen and viewport
pub const DIMENSION_LIMIT: usize = 40;
pub const USER_AGENT_LIMIT: usize = 600;
/// Referrer and page URL
pub const PAGE_LIMIT: usize = 800;

/// Coerce any JSON value into a trimmed string of at most `max_len` characters.
///
/// Null becomes the empty string, strings are taken as-is and every other
/// value is rendered as its JSON text before trimming.
pub fn clean_text(value: &Value, max_len: usize) -> String {
    let raw = match value {
        Value::Null => return String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    let truncated: String = raw.trim().chars().take(max_len).collect();
    // truncation can leave a trailing space behind
    truncated.trim_end().to_string()
}

/// Parse a JSON value as a float. Anything that is not a finite number maps to `None`.
pub fn fnum(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<f64>().ok()
        }
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };

    parsed.filter(|f| f.is_finite())
}

/// Parse a JSON value as an integer.
///
/// Fractional JSON numbers are truncated toward zero; fractional strings are
/// rejected.
pub fn inum(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<i64>().ok()
        }
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn clean_text_handles_null_and_non_strings() {
        assert_eq!(clean_text(&Value::Null, 10), "");
        assert_eq!(clean_text(&json!(42), 10), "42");
        assert_eq!(clean_text(&json!(true), 10), "true");
        assert_eq!(clean_text(&json!("  Paris \n"), 10), "Paris");
    }

    #[test]
    fn clean_text_counts_characters_not_bytes() {
        assert_eq!(clean_text(&json!("ééééé"), 3), "ééé");
        assert_eq!(clean_text(&json!("東京都渋谷区"), 2), "東京");
    }

    #[test]
    fn clean_text_trims_after_truncation() {
        assert_eq!(clean_text(&json!("abc   def"), 5), "abc");
    }

    #[test]
    fn fnum_rejects_blank_and_garbage() {
        assert_eq!(fnum(&Value::Null), None);
        assert_eq!(fnum(&json!("")), None);
        assert_eq!(fnum(&json!("   ")), None);
        assert_eq!(fnum(&json!("north")), None);
        assert_eq!(fnum(&json!([1.0])), None);
        assert_eq!(fnum(&json!("NaN")), None);
    }

    #[test]
    fn fnum_parses_numbers_and_numeric_strings() {
        assert_eq!(fnum(&json!("12.5")), Some(12.5));
        assert_eq!(fnum(&json!(" -3 ")), Some(-3.0));
        assert_eq!(fnum(&json!(48.8566)), Some(48.8566));
        assert_eq!(fnum(&json!(true)), Some(1.0));
    }

    #[test]
    fn inum_rejects_blank_and_garbage() {
        assert_eq!(inum(&Value::Null), None);
        assert_eq!(inum(&json!("")), None);
        assert_eq!(inum(&json!("yes")), None);
        assert_eq!(inum(&json!("7.5")), None);
        assert_eq!(inum(&json!({"v": 1})), None);
    }

    #[test]
    fn inum_parses_integers() {
        assert_eq!(inum(&json!("7")), Some(7));
        assert_eq!(inum(&json!(" -2 ")), Some(-2));
        assert_eq!(inum(&json!(0)), Some(0));
        assert_eq!(inum(&json!(7.9)), Some(7));
        assert_eq!(inum(&json!(false)), Some(0));
        assert_eq!(inum(&json!(true)), Some(1));
    }

    proptest! {
        #[test]
        fn clean_text_respects_cap(s in ".{0,300}", cap in 0usize..120) {
            let out = clean_text(&Value::String(s), cap);
            prop_assert!(out.chars().count() <= cap);
            prop_assert_eq!(out.trim(), out.as_str());
        }
    }
}
