use inventory_core_api::RecordId;

use super::TrackedTable;

/// A foreign row whose change history is surfaced on another record.
///
/// Equipment rows show the history of the purchase they came from (which
/// covers the purchase itself and its service records) and of the new
/// purchase they were received under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorLink {
    Purchase(RecordId),
    NewPurchase(RecordId),
}

impl IndicatorLink {
    pub fn foreign_id(&self) -> &RecordId {
        match self {
            IndicatorLink::Purchase(id) | IndicatorLink::NewPurchase(id) => id,
        }
    }

    pub fn table(&self) -> TrackedTable {
        match self {
            IndicatorLink::Purchase(_) => TrackedTable::Purchases,
            IndicatorLink::NewPurchase(_) => TrackedTable::NewPurchases,
        }
    }
}
