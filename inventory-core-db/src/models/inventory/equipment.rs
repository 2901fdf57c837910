use chrono::NaiveDate;
use heapless::String as HeaplessString;
use inventory_core_api::{ChangeError, ChangeResult, FieldValue, RecordId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::audit::{IndicatorLink, TrackedTable};
use crate::models::auditable::Auditable;
use crate::models::field::{to_date, to_decimal, to_heapless, to_i64, to_record_id, to_text, FieldSpec};
use crate::models::identifiable::Identifiable;

/// # Documentation
/// A machine in the dealer's stock, as listed on the equipment page.
/// Equipment rows are fed by a purchase (auction or import) or by a new
/// purchase, and their change history includes the history of those rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentModel {
    pub id: RecordId,

    /// Internal machine code (MQ), the key the sales team works with
    #[serde(default)]
    pub mq: Option<HeaplessString<32>>,

    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default)]
    pub year: Option<i64>,
    #[serde(default)]
    pub hours: Option<i64>,

    /// Commercial state: Disponible, Reservada, Vendida
    #[serde(default)]
    pub state: Option<String>,

    /// Estimated sale price
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub pvp_est: Option<Decimal>,

    #[serde(default)]
    pub reservation_date: Option<NaiveDate>,

    // Technical specification
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

    #[serde(default)]
    pub purchase_id: Option<RecordId>,
    #[serde(default)]
    pub new_purchase_id: Option<RecordId>,
}

impl EquipmentModel {
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            mq: None,
            model: None,
            serial: None,
            year: None,
            hours: None,
            state: None,
            pvp_est: None,
            reservation_date: None,
            cabin: None,
            wet_line: None,
            dozer_blade: None,
            track_type: None,
            track_width: None,
            purchase_id: None,
            new_purchase_id: None,
        }
    }
}

impl Identifiable for EquipmentModel {
    fn get_id(&self) -> RecordId {
        self.id.clone()
    }
}

impl Auditable for EquipmentModel {
    const TABLE: TrackedTable = TrackedTable::Equipments;
    const RESOURCE: &'static str = "equipments";
    const ACCEPTS_SPECS: bool = true;

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("mq", "MQ"),
        FieldSpec::new("model", "Modelo"),
        FieldSpec::new("serial", "Serie"),
        FieldSpec::new("year", "Año"),
        FieldSpec::new("hours", "Horas"),
        FieldSpec::new("state", "Estado"),
        FieldSpec::new("pvp_est", "PVP Est."),
        FieldSpec::new("reservation_date", "Fecha de reserva"),
        FieldSpec::new("cabin", "Cabina"),
        FieldSpec::new("wet_line", "Línea húmeda"),
        FieldSpec::new("dozer_blade", "Hoja topadora"),
        FieldSpec::new("track_type", "Tipo de zapata"),
        FieldSpec::new("track_width", "Ancho de zapata"),
    ];

    fn get_field(&self, name: &str) -> Option<FieldValue> {
        let value: FieldValue = match name {
            "mq" => self.mq.as_ref().map(|s| s.as_str()).into(),
            "model" => self.model.clone().into(),
            "serial" => self.serial.clone().into(),
            "year" => self.year.into(),
            "hours" => self.hours.into(),
            "state" => self.state.clone().into(),
            "pvp_est" => self.pvp_est.into(),
            "reservation_date" => self.reservation_date.into(),
            "cabin" => self.cabin.clone().into(),
            "wet_line" => self.wet_line.clone().into(),
            "dozer_blade" => self.dozer_blade.clone().into(),
            "track_type" => self.track_type.clone().into(),
            "track_width" => self.track_width.clone().into(),
            _ => return None,
        };
        Some(value)
    }

    fn set_field(&mut self, name: &str, value: &FieldValue) -> ChangeResult<()> {
        match name {
            "mq" => self.mq = to_heapless(name, value)?,
            "model" => self.model = to_text(name, value)?,
            "serial" => self.serial = to_text(name, value)?,
            "year" => self.year = to_i64(name, value)?,
            "hours" => self.hours = to_i64(name, value)?,
            "state" => self.state = to_text(name, value)?,
            "pvp_est" => self.pvp_est = to_decimal(name, value)?,
            "reservation_date" => self.reservation_date = to_date(name, value)?,
            "cabin" => self.cabin = to_text(name, value)?,
            "wet_line" => self.wet_line = to_text(name, value)?,
            "dozer_blade" => self.dozer_blade = to_text(name, value)?,
            "track_type" => self.track_type = to_text(name, value)?,
            "track_width" => self.track_width = to_text(name, value)?,
            "purchase_id" => self.purchase_id = to_record_id(name, value)?,
            "new_purchase_id" => self.new_purchase_id = to_record_id(name, value)?,
            _ => return Err(ChangeError::UnknownField(format!("{}.{name}", Self::TABLE))),
        }
        Ok(())
    }

    fn indicator_links(&self) -> Vec<IndicatorLink> {
        let mut links = Vec::new();
        if let Some(id) = &self.purchase_id {
            links.push(IndicatorLink::Purchase(id.clone()));
        }
        if let Some(id) = &self.new_purchase_id {
            links.push(IndicatorLink::NewPurchase(id.clone()));
        }
        links
    }
}
