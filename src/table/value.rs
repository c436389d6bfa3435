use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type tag for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    Str,
    Int,
    Date,
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataKind::Str => write!(f, "str"),
            DataKind::Int => write!(f, "int"),
            DataKind::Date => write!(f, "date"),
        }
    }
}

/// A single cell value.
///
/// Variant order matters: `Null` is first so the derived `Ord` sorts nulls
/// before any concrete value (ascending, nulls first).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Value {
    Null,
    Int(i64),
    Date(NaiveDate),
    Str(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The kind a cell of this value belongs under; `None` for nulls, which
    /// fit any column.
    pub fn kind(&self) -> Option<DataKind> {
        match self {
            Value::Null => None,
            Value::Int(_) => Some(DataKind::Int),
            Value::Date(_) => Some(DataKind::Date),
            Value::Str(_) => Some(DataKind::Str),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Int(v) => write!(f, "{}", v),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_sorts_before_any_value() {
        let d = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        assert!(Value::Null < Value::Int(i64::MIN));
        assert!(Value::Null < Value::Date(d));
        assert!(Value::Null < Value::Str(String::new()));
    }

    #[test]
    fn dates_order_chronologically() {
        let a = Value::Date(NaiveDate::from_ymd_opt(2019, 12, 31).unwrap());
        let b = Value::Date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert!(a < b);
    }

    #[test]
    fn display_renders_iso_dates_and_null() {
        let d = Value::Date(NaiveDate::from_ymd_opt(2020, 6, 5).unwrap());
        assert_eq!(d.to_string(), "2020-06-05");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Int(5000).to_string(), "5000");
    }
}
