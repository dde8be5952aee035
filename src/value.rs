/// Cell values for case records.
///
/// Rows are schema-free maps, so a column can hold a mix of value types until
/// the cleaning pipeline runs. `ColumnValue` is the tagged union that keeps
/// type-aware sorting and imputation possible without dynamic typing.

use crate::dates::format_date;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a column's non-missing cells look like, as used by sorting and
/// imputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Every non-missing cell is an integer or a float.
    Numeric,
    /// Every non-missing cell is a date (or the invalid-date marker).
    Date,
    /// Anything else, including mixed columns.
    Text,
    /// The column has no non-missing cells.
    Empty,
}

/// Column value enum to support multiple types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnValue {
    String(String),
    Int64(i64),
    Float64(f64),
    Date(NaiveDate),
    /// Marker left behind when date coercion could not parse a cell.
    InvalidDate,
    Null,
}

impl ColumnValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ColumnValue::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnValue::Int64(_) | ColumnValue::Float64(_))
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ColumnValue::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view of the value. Integers widen to f64; strings are not parsed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ColumnValue::Int64(v) => Some(*v as f64),
            ColumnValue::Float64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            ColumnValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            ColumnValue::Date(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric value for comparisons, also accepting numeric-looking strings.
    pub(crate) fn numeric_key(&self) -> Option<f64> {
        match self {
            ColumnValue::String(s) => s.trim().parse::<f64>().ok(),
            other => other.as_f64(),
        }
    }

    /// Whether the value sorts and searches like a missing cell.
    pub(crate) fn is_blank(&self) -> bool {
        matches!(self, ColumnValue::Null | ColumnValue::InvalidDate)
    }

    /// Key used to compare whole rows for duplicate detection.
    ///
    /// Keeps the variant tag so `Int64(10)` and `String("10")` stay distinct.
    pub(crate) fn identity_key(&self) -> String {
        match self {
            ColumnValue::String(s) => format!("s:{}", s),
            ColumnValue::Int64(n) => format!("i:{}", n),
            ColumnValue::Float64(f) => format!("f:{:?}", f),
            ColumnValue::Date(d) => format!("d:{}", d),
            ColumnValue::InvalidDate => "x:".to_string(),
            ColumnValue::Null => "n:".to_string(),
        }
    }
}

impl fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnValue::String(s) => write!(f, "{}", s),
            ColumnValue::Int64(n) => write!(f, "{}", n),
            // Keep a decimal point on whole floats so exports read back as floats.
            ColumnValue::Float64(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{:.1}", v),
            ColumnValue::Float64(v) => write!(f, "{}", v),
            ColumnValue::Date(d) => write!(f, "{}", format_date(d)),
            ColumnValue::InvalidDate | ColumnValue::Null => Ok(()),
        }
    }
}

impl From<&str> for ColumnValue {
    fn from(s: &str) -> Self {
        ColumnValue::String(s.to_string())
    }
}

impl From<String> for ColumnValue {
    fn from(s: String) -> Self {
        ColumnValue::String(s)
    }
}

impl From<i64> for ColumnValue {
    fn from(n: i64) -> Self {
        ColumnValue::Int64(n)
    }
}

impl From<f64> for ColumnValue {
    fn from(v: f64) -> Self {
        ColumnValue::Float64(v)
    }
}

impl From<NaiveDate> for ColumnValue {
    fn from(d: NaiveDate) -> Self {
        ColumnValue::Date(d)
    }
}

impl<T: Into<ColumnValue>> From<Option<T>> for ColumnValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(ColumnValue::Null)
    }
}

/// Classify a sequence of cells into a `ValueKind`.
pub(crate) fn classify<'a, I>(values: I) -> ValueKind
where
    I: IntoIterator<Item = &'a ColumnValue>,
{
    let mut kind = ValueKind::Empty;
    for value in values {
        let this = match value {
            ColumnValue::Null => continue,
            ColumnValue::String(_) => return ValueKind::Text,
            v if v.is_numeric() => ValueKind::Numeric,
            _ => ValueKind::Date,
        };
        kind = match kind {
            ValueKind::Empty => this,
            k if k == this => k,
            _ => return ValueKind::Text,
        };
    }
    kind
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(ColumnValue::from("Hanoi").to_string(), "Hanoi");
        assert_eq!(ColumnValue::Int64(42).to_string(), "42");
        assert_eq!(ColumnValue::Float64(2.5).to_string(), "2.5");
        assert_eq!(ColumnValue::Float64(3.0).to_string(), "3.0");
        let date = NaiveDate::from_ymd_opt(2020, 4, 1).unwrap();
        assert_eq!(ColumnValue::Date(date).to_string(), "2020-04-01");
        assert_eq!(ColumnValue::Null.to_string(), "");
        assert_eq!(ColumnValue::InvalidDate.to_string(), "");
    }

    #[test]
    fn test_accessors() {
        assert_eq!(ColumnValue::Int64(3).as_f64(), Some(3.0));
        assert_eq!(ColumnValue::Float64(1.5).as_i64(), None);
        assert_eq!(ColumnValue::from("x").as_string(), Some("x"));
        assert!(ColumnValue::Null.is_null());
        assert!(!ColumnValue::InvalidDate.is_null());
        assert!(ColumnValue::InvalidDate.is_blank());
        assert!(ColumnValue::Float64(0.5).is_numeric());
        assert!(!ColumnValue::from("5").is_numeric());
        assert_eq!(ColumnValue::from(None::<i64>), ColumnValue::Null);
        assert_eq!(ColumnValue::from(Some(7i64)), ColumnValue::Int64(7));
    }

    #[test]
    fn test_numeric_key_parses_strings() {
        assert_eq!(ColumnValue::from(" 12 ").numeric_key(), Some(12.0));
        assert_eq!(ColumnValue::from("1e3").numeric_key(), Some(1000.0));
        assert_eq!(ColumnValue::from("abc").numeric_key(), None);
        assert_eq!(ColumnValue::Null.numeric_key(), None);
    }

    #[test]
    fn test_identity_key_keeps_type() {
        assert_ne!(
            ColumnValue::Int64(10).identity_key(),
            ColumnValue::from("10").identity_key()
        );
        assert_eq!(
            ColumnValue::Float64(0.1).identity_key(),
            ColumnValue::Float64(0.1).identity_key()
        );
    }

    #[test]
    fn test_classify() {
        let d = ColumnValue::Date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(classify(&[ColumnValue::Null, ColumnValue::Null]), ValueKind::Empty);
        assert_eq!(classify(&[ColumnValue::Int64(1), ColumnValue::Float64(2.0)]), ValueKind::Numeric);
        assert_eq!(classify(&[d.clone(), ColumnValue::Null, ColumnValue::InvalidDate]), ValueKind::Date);
        assert_eq!(classify(&[ColumnValue::Int64(1), d]), ValueKind::Text);
        assert_eq!(classify(&[ColumnValue::Int64(1), ColumnValue::from("a")]), ValueKind::Text);
    }
}
