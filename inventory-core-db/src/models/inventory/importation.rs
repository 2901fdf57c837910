use chrono::NaiveDate;
use heapless::String as HeaplessString;
use inventory_core_api::{ChangeError, ChangeResult, FieldValue, RecordId};
use serde::{Deserialize, Serialize};

use crate::models::audit::TrackedTable;
use crate::models::auditable::Auditable;
use crate::models::field::{to_date, to_heapless, to_text, FieldSpec};
use crate::models::identifiable::Identifiable;

/// # Documentation
/// Import logistics of a purchased machine: shipment, arrival and
/// nationalization milestones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportationModel {
    pub id: RecordId,

    #[serde(default)]
    pub mq: Option<HeaplessString<32>>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub serial: Option<String>,

    /// Bill of lading number
    #[serde(default)]
    pub bl_number: Option<String>,
    #[serde(default)]
    pub vessel: Option<String>,
    #[serde(default)]
    pub port_of_loading: Option<String>,
    #[serde(default)]
    pub port_of_destination: Option<String>,

    #[serde(default)]
    pub shipment_departure_date: Option<NaiveDate>,
    #[serde(default)]
    pub shipment_arrival_date: Option<NaiveDate>,
    #[serde(default)]
    pub nationalization_date: Option<NaiveDate>,

    /// Where the machine is stored after nationalization
    #[serde(default)]
    pub current_location: Option<String>,
}

impl ImportationModel {
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            mq: None,
            model: None,
            serial: None,
            bl_number: None,
            vessel: None,
            port_of_loading: None,
            port_of_destination: None,
            shipment_departure_date: None,
            shipment_arrival_date: None,
            nationalization_date: None,
            current_location: None,
        }
    }
}

impl Identifiable for ImportationModel {
    fn get_id(&self) -> RecordId {
        self.id.clone()
    }
}

impl Auditable for ImportationModel {
    const TABLE: TrackedTable = TrackedTable::Importations;
    const RESOURCE: &'static str = "importations";

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("mq", "MQ"),
        FieldSpec::new("model", "Modelo"),
        FieldSpec::new("serial", "Serie"),
        FieldSpec::new("bl_number", "BL"),
        FieldSpec::new("vessel", "Buque"),
        FieldSpec::new("port_of_loading", "Puerto de embarque"),
        FieldSpec::new("port_of_destination", "Puerto de destino"),
        FieldSpec::new("shipment_departure_date", "Fecha de embarque"),
        FieldSpec::new("shipment_arrival_date", "Fecha de llegada"),
        FieldSpec::new("nationalization_date", "Fecha de nacionalización"),
        FieldSpec::new("current_location", "Ubicación"),
    ];

    fn get_field(&self, name: &str) -> Option<FieldValue> {
        let value: FieldValue = match name {
            "mq" => self.mq.as_ref().map(|s| s.as_str()).into(),
            "model" => self.model.clone().into(),
            "serial" => self.serial.clone().into(),
            "bl_number" => self.bl_number.clone().into(),
            "vessel" => self.vessel.clone().into(),
            "port_of_loading" => self.port_of_loading.clone().into(),
            "port_of_destination" => self.port_of_destination.clone().into(),
            "shipment_departure_date" => self.shipment_departure_date.into(),
            "shipment_arrival_date" => self.shipment_arrival_date.into(),
            "nationalization_date" => self.nationalization_date.into(),
            "current_location" => self.current_location.clone().into(),
            _ => return None,
        };
        Some(value)
    }

    fn set_field(&mut self, name: &str, value: &FieldValue) -> ChangeResult<()> {
        match name {
            "mq" => self.mq = to_heapless(name, value)?,
            "model" => self.model = to_text(name, value)?,
            "serial" => self.serial = to_text(name, value)?,
            "bl_number" => self.bl_number = to_text(name, value)?,
            "vessel" => self.vessel = to_text(name, value)?,
            "port_of_loading" => self.port_of_loading = to_text(name, value)?,
            "port_of_destination" => self.port_of_destination = to_text(name, value)?,
            "shipment_departure_date" => self.shipment_departure_date = to_date(name, value)?,
            "shipment_arrival_date" => self.shipment_arrival_date = to_date(name, value)?,
            "nationalization_date" => self.nationalization_date = to_date(name, value)?,
            "current_location" => self.current_location = to_text(name, value)?,
            _ => return Err(ChangeError::UnknownField(format!("{}.{name}", Self::TABLE))),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_declared_field_has_an_accessor() {
        let importation = ImportationModel::new("I1");
        for spec in ImportationModel::FIELDS {
            assert!(importation.get_field(spec.name).is_some(), "missing getter for {}", spec.name);
        }
    }

    #[test]
    fn test_dates_are_exposed_as_typed_values() {
        let mut importation = ImportationModel::new("I1");
        importation
            .set_field("shipment_arrival_date", &FieldValue::text("2024-07-15"))
            .unwrap();
        assert_eq!(
            importation.field_value("shipment_arrival_date").unwrap(),
            FieldValue::Date(NaiveDate::from_ymd_opt(2024, 7, 15).unwrap())
        );
        assert!(!ImportationModel::ACCEPTS_SPECS);
        assert!(importation.indicator_links().is_empty());
    }
}
