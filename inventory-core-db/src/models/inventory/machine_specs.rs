use inventory_core_api::FieldValue;
use serde::{Deserialize, Serialize};

use crate::models::field::FieldSpec;

/// Technical specification of a machine model, looked up when the `model`
/// field of a record changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineSpecsModel {
    pub model: String,
    #[serde(default)]
    pub cabin: Option<String>,
    #[serde(default)]
    pub wet_line: Option<String>,
    #[serde(default)]
    pub dozer_blade: Option<String>,
    #[serde(default)]
    pub track_type: Option<String>,
    #[serde(default)]
    pub track_width: Option<String>,
}

impl MachineSpecsModel {
    /// Record fields filled from a specification
    pub const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("cabin", "Cabina"),
        FieldSpec::new("wet_line", "Línea húmeda"),
        FieldSpec::new("dozer_blade", "Hoja topadora"),
        FieldSpec::new("track_type", "Tipo de zapata"),
        FieldSpec::new("track_width", "Ancho de zapata"),
    ];

    /// Pairs each specification field with the value this model prescribes
    pub fn field_values(&self) -> Vec<(FieldSpec, FieldValue)> {
        Self::FIELDS
            .iter()
            .map(|spec| {
                let value = match spec.name {
                    "cabin" => self.cabin.clone(),
                    "wet_line" => self.wet_line.clone(),
                    "dozer_blade" => self.dozer_blade.clone(),
                    "track_type" => self.track_type.clone(),
                    _ => self.track_width.clone(),
                };
                (*spec, FieldValue::from(value))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_values_follow_declaration_order() {
        let specs = MachineSpecsModel {
            model: "320D".to_string(),
            cabin: Some("Cerrada".to_string()),
            wet_line: Some("SI".to_string()),
            dozer_blade: None,
            track_type: Some("Acero".to_string()),
            track_width: Some("600mm".to_string()),
        };

        let values = specs.field_values();
        assert_eq!(values.len(), 5);
        assert_eq!(values[0], (FieldSpec::new("cabin", "Cabina"), FieldValue::text("Cerrada")));
        assert_eq!(values[2].1, FieldValue::Null);
        assert_eq!(values[4].1, FieldValue::text("600mm"));
    }
}
