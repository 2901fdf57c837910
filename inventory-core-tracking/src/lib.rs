pub mod batch;
pub mod config;
pub mod gate;
pub mod indicator_cache;
pub mod local_records;
pub mod navigation_guard;
pub mod notifier;
pub mod requester;
pub mod tracker;

pub use batch::{BatchAccumulator, BatchEntry, BatchSummary};
pub use config::{BatchConfig, ConfigError, GuardConfig, IndicatorConfig, TrackingConfig};
pub use gate::{ChangeConfirmationGate, GateStatus};
pub use indicator_cache::{ChangeIndicatorCache, FieldIndicators};
pub use local_records::LocalRecords;
pub use navigation_guard::{
    ListenerKind, NavigationDecision, NavigationGuard, NavigationPrompt, SaveCallback,
    UnloadDecision,
};
pub use notifier::{NoticeLevel, Notifier, TracingNotifier};
pub use requester::{FieldChangeRequester, FieldUpdateOutcome};
pub use tracker::{ChangeTracker, TrackingRepositories};

#[cfg(test)]
pub mod test_helper;
