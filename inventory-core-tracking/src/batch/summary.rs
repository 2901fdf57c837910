use serde::Serialize;

/// Running totals shown in the floating batch panel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub record_count: usize,
    pub change_count: usize,
    /// Fill of the progress bar, saturating at 100
    pub progress_percent: usize,
}

impl BatchSummary {
    pub fn new(record_count: usize, change_count: usize, progress_full_at: usize) -> Self {
        let progress_percent = (change_count * 100 / progress_full_at.max(1)).min(100);
        Self {
            record_count,
            change_count,
            progress_percent,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.change_count == 0
    }
}
