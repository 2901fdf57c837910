use inventory_core_api::FieldValue;

/// Canonical string form used to decide whether an edit changes anything.
///
/// - `Null`, NaN and infinite floats become the empty string
/// - text is trimmed and lower-cased
/// - integers, floats and decimals share one numeric form, so `50000`,
///   `50000.0` and `50000.00` are equal
/// - dates use ISO-8601
pub fn normalize_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Null => String::new(),
        FieldValue::Bool(b) => b.to_string(),
        FieldValue::Integer(i) => i.to_string(),
        FieldValue::Float(f) if !f.is_finite() => String::new(),
        FieldValue::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => (*f as i64).to_string(),
        FieldValue::Float(f) => f.to_string(),
        FieldValue::Text(s) => s.trim().to_lowercase(),
        FieldValue::Decimal(d) => d.normalize().to_string(),
        FieldValue::Date(d) => d.format("%Y-%m-%d").to_string(),
    }
}

pub fn is_empty_value(value: &FieldValue) -> bool {
    normalize_value(value).is_empty()
}

/// True when replacing `old` with `new` would not change the stored value
pub fn values_equal(old: &FieldValue, new: &FieldValue) -> bool {
    normalize_value(old) == normalize_value(new)
}
