use inventory_core_api::{ChangeError, ChangeResult, FieldMap, FieldValue};

use super::audit::{IndicatorLink, TrackedTable};
use super::field::FieldSpec;
use super::identifiable::Identifiable;

/// Trait for records whose field edits are tracked in the change log.
///
/// Field access goes through a typed accessor per record kind instead of
/// indexing into an untyped map: `get_field` and `set_field` match on the
/// field name and convert to and from the concrete field type.
pub trait Auditable: Identifiable + Clone + Send + Sync + 'static {
    /// Table the change log files this record's entries under
    const TABLE: TrackedTable;

    /// Path segment of the REST resource, as in `/api/<resource>/<id>`
    const RESOURCE: &'static str;

    /// Whether editing `model` pulls in the technical specification fields
    const ACCEPTS_SPECS: bool = false;

    /// Editable fields with their human-readable labels
    const FIELDS: &'static [FieldSpec];

    /// Returns the current value of a field, or `None` if the record kind has
    /// no such field
    fn get_field(&self, name: &str) -> Option<FieldValue>;

    /// Writes a field from a wire value
    fn set_field(&mut self, name: &str, value: &FieldValue) -> ChangeResult<()>;

    /// Foreign rows whose change history is shown alongside this record's own
    fn indicator_links(&self) -> Vec<IndicatorLink> {
        Vec::new()
    }

    fn field_value(&self, name: &str) -> ChangeResult<FieldValue> {
        self.get_field(name)
            .ok_or_else(|| ChangeError::UnknownField(format!("{}.{name}", Self::TABLE)))
    }

    fn field_label(name: &str) -> Option<&'static str> {
        Self::FIELDS
            .iter()
            .find(|spec| spec.name == name)
            .map(|spec| spec.label)
    }

    /// Applies a partial update field by field; stops at the first field that
    /// cannot be converted
    fn apply_updates(&mut self, updates: &FieldMap) -> ChangeResult<()> {
        for (name, value) in updates {
            self.set_field(name, value)?;
        }
        Ok(())
    }
}
