//! `TryGetable`: typed extraction out of a [`Value`].
//!
//! Drivers do not agree on how they hand back some column types (SQLite returns
//! booleans as integers, MySQL returns DECIMAL as text), so extraction accepts the
//! lossless cross-representations and reports everything else as a mismatch.

use super::Value;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

/// Error type for value extraction failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueExtractionError {
    /// The value is null
    NullValue,
    /// The value type doesn't match the expected type
    TypeMismatch { expected: String, actual: String },
    /// Value conversion failed (overflow, invalid format)
    ConversionError(String),
}

impl std::fmt::Display for ValueExtractionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueExtractionError::NullValue => write!(f, "Value is null"),
            ValueExtractionError::TypeMismatch { expected, actual } => {
                write!(f, "Type mismatch: expected {}, got {}", expected, actual)
            }
            ValueExtractionError::ConversionError(msg) => {
                write!(f, "Conversion error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ValueExtractionError {}

/// Safe extraction of a Rust type from a [`Value`].
pub trait TryGetable: Sized {
    fn try_get(value: &Value) -> Result<Self, ValueExtractionError>;
}

impl<T: TryGetable> TryGetable for Option<T> {
    fn try_get(value: &Value) -> Result<Self, ValueExtractionError> {
        match value {
            Value::Null => Ok(None),
            other => T::try_get(other).map(Some),
        }
    }
}

fn mismatch(expected: &str, value: &Value) -> ValueExtractionError {
    match value {
        Value::Null => ValueExtractionError::NullValue,
        other => ValueExtractionError::TypeMismatch {
            expected: expected.to_string(),
            actual: other.type_name().to_string(),
        },
    }
}

fn parse_text<T: FromStr>(expected: &str, text: &str) -> Result<T, ValueExtractionError>
where
    T::Err: std::fmt::Display,
{
    text.trim().parse::<T>().map_err(|e| {
        ValueExtractionError::ConversionError(format!("cannot read `{text}` as {expected}: {e}"))
    })
}

impl TryGetable for i64 {
    fn try_get(value: &Value) -> Result<Self, ValueExtractionError> {
        match value {
            Value::Int(i) => Ok(*i),
            Value::Bool(b) => Ok(i64::from(*b)),
            Value::Text(s) => parse_text("i64", s),
            other => Err(mismatch("Int", other)),
        }
    }
}

macro_rules! impl_try_getable_narrow_int {
    ($($t:ty),*) => {
        $(
            impl TryGetable for $t {
                fn try_get(value: &Value) -> Result<Self, ValueExtractionError> {
                    let wide = i64::try_get(value)?;
                    <$t>::try_from(wide).map_err(|_| {
                        ValueExtractionError::ConversionError(format!(
                            "{} out of range for {}",
                            wide,
                            stringify!($t)
                        ))
                    })
                }
            }
        )*
    };
}

impl_try_getable_narrow_int!(i32, i16, u32, u64);

impl TryGetable for f64 {
    fn try_get(value: &Value) -> Result<Self, ValueExtractionError> {
        match value {
            Value::Float(f) => Ok(*f),
            Value::Int(i) => Ok(*i as f64),
            Value::Text(s) => parse_text("f64", s),
            other => Err(mismatch("Float", other)),
        }
    }
}

impl TryGetable for bool {
    fn try_get(value: &Value) -> Result<Self, ValueExtractionError> {
        match value {
            Value::Bool(b) => Ok(*b),
            Value::Int(0) => Ok(false),
            Value::Int(1) => Ok(true),
            other => Err(mismatch("Bool", other)),
        }
    }
}

impl TryGetable for String {
    fn try_get(value: &Value) -> Result<Self, ValueExtractionError> {
        match value {
            Value::Text(s) => Ok(s.clone()),
            other => Err(mismatch("Text", other)),
        }
    }
}

impl TryGetable for Vec<u8> {
    fn try_get(value: &Value) -> Result<Self, ValueExtractionError> {
        match value {
            Value::Bytes(b) => Ok(b.clone()),
            other => Err(mismatch("Bytes", other)),
        }
    }
}

impl TryGetable for Decimal {
    fn try_get(value: &Value) -> Result<Self, ValueExtractionError> {
        match value {
            Value::Decimal(d) => Ok(*d),
            Value::Int(i) => Ok(Decimal::from(*i)),
            Value::Text(s) => parse_text("Decimal", s),
            other => Err(mismatch("Decimal", other)),
        }
    }
}

impl TryGetable for Uuid {
    fn try_get(value: &Value) -> Result<Self, ValueExtractionError> {
        match value {
            Value::Uuid(u) => Ok(*u),
            Value::Text(s) => parse_text("Uuid", s),
            other => Err(mismatch("Uuid", other)),
        }
    }
}

impl TryGetable for serde_json::Value {
    fn try_get(value: &Value) -> Result<Self, ValueExtractionError> {
        match value {
            Value::Json(j) => Ok(j.clone()),
            Value::Text(s) => serde_json::from_str(s)
                .map_err(|e| ValueExtractionError::ConversionError(e.to_string())),
            other => Err(mismatch("Json", other)),
        }
    }
}

impl TryGetable for NaiveDate {
    fn try_get(value: &Value) -> Result<Self, ValueExtractionError> {
        match value {
            Value::Date(d) => Ok(*d),
            Value::DateTime(dt) => Ok(dt.date()),
            Value::Text(s) => parse_text("NaiveDate", s),
            other => Err(mismatch("Date", other)),
        }
    }
}

impl TryGetable for NaiveTime {
    fn try_get(value: &Value) -> Result<Self, ValueExtractionError> {
        match value {
            Value::Time(t) => Ok(*t),
            Value::Text(s) => parse_text("NaiveTime", s),
            other => Err(mismatch("Time", other)),
        }
    }
}

impl TryGetable for NaiveDateTime {
    fn try_get(value: &Value) -> Result<Self, ValueExtractionError> {
        match value {
            Value::DateTime(dt) => Ok(*dt),
            Value::Text(s) => NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M:%S%.f")
                .map_err(|e| ValueExtractionError::ConversionError(e.to_string())),
            other => Err(mismatch("DateTime", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_get_i64() {
        assert_eq!(i64::try_get(&Value::Int(42)), Ok(42));
        assert_eq!(i64::try_get(&Value::from("42")), Ok(42));
        assert_eq!(i64::try_get(&Value::Null), Err(ValueExtractionError::NullValue));
    }

    #[test]
    fn test_try_get_narrow_overflow() {
        let result = i16::try_get(&Value::Int(70_000));
        assert!(matches!(result, Err(ValueExtractionError::ConversionError(_))));
    }

    #[test]
    fn test_try_get_option() {
        assert_eq!(Option::<String>::try_get(&Value::Null), Ok(None));
        assert_eq!(
            Option::<String>::try_get(&Value::from("a")),
            Ok(Some("a".to_string()))
        );
    }

    #[test]
    fn test_bool_from_sqlite_integer() {
        assert_eq!(bool::try_get(&Value::Int(1)), Ok(true));
        assert_eq!(bool::try_get(&Value::Int(0)), Ok(false));
        assert!(bool::try_get(&Value::Int(2)).is_err());
    }

    #[test]
    fn test_type_mismatch_reports_variant() {
        let err = String::try_get(&Value::Int(1)).unwrap_err();
        assert_eq!(
            err,
            ValueExtractionError::TypeMismatch {
                expected: "Text".to_string(),
                actual: "Int".to_string()
            }
        );
    }
}
