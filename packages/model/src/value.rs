use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fmt;

/// A scalar stored in a detail record.
///
/// Numbers go through [`serde_json::Number`], which cannot hold NaN or
/// infinities, so a parsed value is always either a real number or `Null`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn integer(value: i64) -> Self {
        FieldValue::Number(Number::from(value))
    }

    /// Non-finite input maps to `Null`.
    pub fn float(value: f64) -> Self {
        Number::from_f64(value)
            .map(FieldValue::Number)
            .unwrap_or(FieldValue::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Null and empty strings both count as "no value" for payloads.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Number(n) => n.as_i64(),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::integer(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_rejects_nan() {
        assert_eq!(FieldValue::float(f64::NAN), FieldValue::Null);
        assert_eq!(FieldValue::float(f64::INFINITY), FieldValue::Null);
        assert!(matches!(FieldValue::float(2.5), FieldValue::Number(_)));
    }

    #[test]
    fn test_untagged_json_shape() {
        let values: Vec<FieldValue> =
            serde_json::from_str(r#"[null, true, 3, "x"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                FieldValue::Null,
                FieldValue::Bool(true),
                FieldValue::integer(3),
                FieldValue::text("x"),
            ]
        );
    }

    #[test]
    fn test_blank() {
        assert!(FieldValue::Null.is_blank());
        assert!(FieldValue::text("").is_blank());
        assert!(!FieldValue::text(" ").is_blank());
        assert!(!FieldValue::integer(0).is_blank());
    }
}
