use chrono::NaiveDate;
use heapless::String as HeaplessString;
use inventory_core_api::{ChangeError, ChangeResult, FieldValue};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Name and display label of an editable field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
}

impl FieldSpec {
    pub const fn new(name: &'static str, label: &'static str) -> Self {
        Self { name, label }
    }
}

fn mismatch(field: &str, expected: &str, value: &FieldValue) -> ChangeError {
    ChangeError::ValidationError(format!(
        "Field '{field}' expects {expected}, got {value:?}"
    ))
}

/// Converts a wire value into optional text. Blank text clears the field.
pub fn to_text(field: &str, value: &FieldValue) -> ChangeResult<Option<String>> {
    match value {
        FieldValue::Null => Ok(None),
        FieldValue::Text(s) if s.trim().is_empty() => Ok(None),
        FieldValue::Text(s) => Ok(Some(s.trim().to_string())),
        FieldValue::Float(f) if !f.is_finite() => Ok(None),
        FieldValue::Bool(_) => Err(mismatch(field, "text", value)),
        other => Ok(Some(other.to_string())),
    }
}

pub fn to_heapless<const N: usize>(
    field: &str,
    value: &FieldValue,
) -> ChangeResult<Option<HeaplessString<N>>> {
    to_text(field, value)?
        .map(|s| {
            HeaplessString::from_str(&s).map_err(|_| {
                ChangeError::ValidationError(format!(
                    "Value for field '{field}' is too long (max {N} chars)"
                ))
            })
        })
        .transpose()
}

pub fn to_decimal(field: &str, value: &FieldValue) -> ChangeResult<Option<Decimal>> {
    match value {
        FieldValue::Null => Ok(None),
        FieldValue::Integer(i) => Ok(Some(Decimal::from(*i))),
        FieldValue::Float(f) if !f.is_finite() => Ok(None),
        FieldValue::Float(f) => Decimal::from_str(&f.to_string())
            .map(Some)
            .map_err(|_| mismatch(field, "a number", value)),
        FieldValue::Decimal(d) => Ok(Some(*d)),
        FieldValue::Text(s) if s.trim().is_empty() => Ok(None),
        FieldValue::Text(s) => Decimal::from_str(s.trim())
            .map(Some)
            .map_err(|_| mismatch(field, "a number", value)),
        _ => Err(mismatch(field, "a number", value)),
    }
}

pub fn to_i64(field: &str, value: &FieldValue) -> ChangeResult<Option<i64>> {
    match value {
        FieldValue::Null => Ok(None),
        FieldValue::Integer(i) => Ok(Some(*i)),
        FieldValue::Float(f) if !f.is_finite() => Ok(None),
        FieldValue::Float(f) if f.fract() == 0.0 => Ok(Some(*f as i64)),
        FieldValue::Text(s) if s.trim().is_empty() => Ok(None),
        FieldValue::Text(s) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| mismatch(field, "an integer", value)),
        _ => Err(mismatch(field, "an integer", value)),
    }
}

pub fn to_date(field: &str, value: &FieldValue) -> ChangeResult<Option<NaiveDate>> {
    match value {
        FieldValue::Null => Ok(None),
        FieldValue::Date(d) => Ok(Some(*d)),
        FieldValue::Text(s) if s.trim().is_empty() => Ok(None),
        FieldValue::Text(s) => {
            // Timestamps coming back from the backend carry a time part
            let day = s.trim().get(..10).unwrap_or(s.trim());
            NaiveDate::parse_from_str(day, "%Y-%m-%d")
                .map(Some)
                .map_err(|_| mismatch(field, "a date (YYYY-MM-DD)", value))
        }
        _ => Err(mismatch(field, "a date (YYYY-MM-DD)", value)),
    }
}

pub fn to_bool(field: &str, value: &FieldValue) -> ChangeResult<Option<bool>> {
    match value {
        FieldValue::Null => Ok(None),
        FieldValue::Bool(b) => Ok(Some(*b)),
        FieldValue::Text(s) => match s.trim().to_lowercase().as_str() {
            "" => Ok(None),
            "true" | "si" | "sí" | "yes" => Ok(Some(true)),
            "false" | "no" => Ok(Some(false)),
            _ => Err(mismatch(field, "yes/no", value)),
        },
        _ => Err(mismatch(field, "yes/no", value)),
    }
}

/// Reads an optional related id from a wire value.
pub fn to_record_id(
    field: &str,
    value: &FieldValue,
) -> ChangeResult<Option<inventory_core_api::RecordId>> {
    Ok(to_text(field, value)?.map(inventory_core_api::RecordId::from))
}
