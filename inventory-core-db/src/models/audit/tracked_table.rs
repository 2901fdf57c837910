use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tables whose rows carry a change history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackedTable {
    Equipments,
    Purchases,
    ServiceRecords,
    NewPurchases,
    Importations,
}

impl TrackedTable {
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }
}

impl From<TrackedTable> for &str {
    fn from(val: TrackedTable) -> Self {
        match val {
            TrackedTable::Equipments => "equipments",
            TrackedTable::Purchases => "purchases",
            TrackedTable::ServiceRecords => "service_records",
            TrackedTable::NewPurchases => "new_purchases",
            TrackedTable::Importations => "importations",
        }
    }
}

impl fmt::Display for TrackedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrackedTable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "equipments" => Ok(TrackedTable::Equipments),
            "purchases" => Ok(TrackedTable::Purchases),
            "service_records" => Ok(TrackedTable::ServiceRecords),
            "new_purchases" => Ok(TrackedTable::NewPurchases),
            "importations" => Ok(TrackedTable::Importations),
            _ => Err(format!("Unknown tracked table: {s}")),
        }
    }
}
