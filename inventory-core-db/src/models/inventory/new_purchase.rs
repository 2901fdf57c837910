use chrono::NaiveDate;
use heapless::String as HeaplessString;
use inventory_core_api::{ChangeError, ChangeResult, FieldValue, RecordId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::audit::TrackedTable;
use crate::models::auditable::Auditable;
use crate::models::field::{to_date, to_decimal, to_heapless, to_text, FieldSpec};
use crate::models::identifiable::Identifiable;

/// # Documentation
/// A machine ordered new from a manufacturer or distributor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPurchaseModel {
    pub id: RecordId,

    #[serde(default)]
    pub mq: Option<HeaplessString<32>>,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default)]
    pub purchase_order: Option<String>,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub invoice_date: Option<NaiveDate>,

    /// Purchase value in `currency`
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub value: Option<Decimal>,
    #[serde(default)]
    pub currency: Option<String>,

    /// Estimated arrival
    #[serde(default)]
    pub eta: Option<NaiveDate>,

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
}

impl NewPurchaseModel {
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            mq: None,
            supplier: None,
            model: None,
            serial: None,
            purchase_order: None,
            invoice_number: None,
            invoice_date: None,
            value: None,
            currency: None,
            eta: None,
            cabin: None,
            wet_line: None,
            dozer_blade: None,
            track_type: None,
            track_width: None,
        }
    }
}

impl Identifiable for NewPurchaseModel {
    fn get_id(&self) -> RecordId {
        self.id.clone()
    }
}

impl Auditable for NewPurchaseModel {
    const TABLE: TrackedTable = TrackedTable::NewPurchases;
    const RESOURCE: &'static str = "new-purchases";
    const ACCEPTS_SPECS: bool = true;

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("mq", "MQ"),
        FieldSpec::new("supplier", "Proveedor"),
        FieldSpec::new("model", "Modelo"),
        FieldSpec::new("serial", "Serie"),
        FieldSpec::new("purchase_order", "Orden de compra"),
        FieldSpec::new("invoice_number", "Factura"),
        FieldSpec::new("invoice_date", "Fecha de factura"),
        FieldSpec::new("value", "Valor"),
        FieldSpec::new("currency", "Moneda"),
        FieldSpec::new("eta", "ETA"),
        FieldSpec::new("cabin", "Cabina"),
        FieldSpec::new("wet_line", "Línea húmeda"),
        FieldSpec::new("dozer_blade", "Hoja topadora"),
        FieldSpec::new("track_type", "Tipo de zapata"),
        FieldSpec::new("track_width", "Ancho de zapata"),
    ];

    fn get_field(&self, name: &str) -> Option<FieldValue> {
        let value: FieldValue = match name {
            "mq" => self.mq.as_ref().map(|s| s.as_str()).into(),
            "supplier" => self.supplier.clone().into(),
            "model" => self.model.clone().into(),
            "serial" => self.serial.clone().into(),
            "purchase_order" => self.purchase_order.clone().into(),
            "invoice_number" => self.invoice_number.clone().into(),
            "invoice_date" => self.invoice_date.into(),
            "value" => self.value.into(),
            "currency" => self.currency.clone().into(),
            "eta" => self.eta.into(),
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
            "supplier" => self.supplier = to_text(name, value)?,
            "model" => self.model = to_text(name, value)?,
            "serial" => self.serial = to_text(name, value)?,
            "purchase_order" => self.purchase_order = to_text(name, value)?,
            "invoice_number" => self.invoice_number = to_text(name, value)?,
            "invoice_date" => self.invoice_date = to_date(name, value)?,
            "value" => self.value = to_decimal(name, value)?,
            "currency" => self.currency = to_text(name, value)?,
            "eta" => self.eta = to_date(name, value)?,
            "cabin" => self.cabin = to_text(name, value)?,
            "wet_line" => self.wet_line = to_text(name, value)?,
            "dozer_blade" => self.dozer_blade = to_text(name, value)?,
            "track_type" => self.track_type = to_text(name, value)?,
            "track_width" => self.track_width = to_text(name, value)?,
            _ => return Err(ChangeError::UnknownField(format!("{}.{name}", Self::TABLE))),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::inventory::MachineSpecsModel;

    #[test]
    fn test_every_declared_field_has_an_accessor() {
        let purchase = NewPurchaseModel::new("N1");
        for spec in NewPurchaseModel::FIELDS {
            assert!(purchase.get_field(spec.name).is_some(), "missing getter for {}", spec.name);
        }
    }

    #[test]
    fn test_carries_every_specification_field() {
        let purchase = NewPurchaseModel::new("N1");
        for spec in MachineSpecsModel::FIELDS {
            assert!(purchase.get_field(spec.name).is_some(), "missing spec field {}", spec.name);
        }
    }
}
