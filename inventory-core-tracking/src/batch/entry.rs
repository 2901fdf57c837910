use inventory_core_api::{FieldMap, PendingChange, RecordId};

/// One `queue` call: the updates it wrote and the diffs it recorded.
///
/// `ticket` is a global, strictly increasing revision stamp. `originals`
/// holds the value each key of `updates` had locally when the call was
/// queued, including keys that carry no diff.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Contribution {
    pub ticket: u64,
    pub updates: FieldMap,
    pub changes: Vec<PendingChange>,
    pub originals: FieldMap,
    pub audited: bool,
}

/// All pending edits of one record while batch mode is on.
///
/// `updates` is always the right fold of the contributions' update maps and
/// `changes` their concatenation, so removing a contribution and recomputing
/// yields the same state as if it had never been queued.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    pub record_id: RecordId,
    pub updates: FieldMap,
    pub changes: Vec<PendingChange>,
    pub(crate) contributions: Vec<Contribution>,
    /// Highest ticket whose values the backend is known to hold
    pub(crate) persisted_ticket: u64,
}

impl BatchEntry {
    pub fn new(record_id: RecordId) -> Self {
        Self {
            record_id,
            updates: FieldMap::new(),
            changes: Vec::new(),
            contributions: Vec::new(),
            persisted_ticket: 0,
        }
    }

    pub fn change_count(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contributions.is_empty()
    }

    pub(crate) fn push(&mut self, contribution: Contribution) {
        self.contributions.push(contribution);
        self.recompute();
    }

    pub(crate) fn has_ticket(&self, ticket: u64) -> bool {
        self.contributions.iter().any(|c| c.ticket == ticket)
    }

    pub(crate) fn latest_ticket(&self) -> u64 {
        self.contributions.iter().map(|c| c.ticket).max().unwrap_or(0)
    }

    /// Drops the contribution of a failed write
    pub(crate) fn remove_ticket(&mut self, ticket: u64) {
        self.contributions.retain(|c| c.ticket != ticket);
        self.recompute();
    }

    fn recompute(&mut self) {
        self.updates = self
            .contributions
            .iter()
            .fold(FieldMap::new(), |mut merged, contribution| {
                merged.extend(contribution.updates.clone());
                merged
            });
        self.changes = self
            .contributions
            .iter()
            .flat_map(|c| c.changes.iter().cloned())
            .collect();
    }

    fn is_settled(&self, contribution: &Contribution) -> bool {
        contribution.ticket <= self.persisted_ticket
    }

    /// Persisted changes that still have no change-log entry, with the
    /// tickets they came from
    pub(crate) fn settled_unaudited(&self) -> (Vec<u64>, Vec<PendingChange>) {
        let mut tickets = Vec::new();
        let mut changes = Vec::new();
        for contribution in &self.contributions {
            if contribution.audited || !self.is_settled(contribution) {
                continue;
            }
            tickets.push(contribution.ticket);
            changes.extend(contribution.changes.iter().cloned());
        }
        (tickets, changes)
    }

    pub(crate) fn mark_audited(&mut self, tickets: &[u64]) {
        for contribution in &mut self.contributions {
            if tickets.contains(&contribution.ticket) {
                contribution.audited = true;
            }
        }
    }

    pub fn is_fully_audited(&self) -> bool {
        !self.contributions.is_empty() && self.contributions.iter().all(|c| c.audited)
    }

    pub(crate) fn audited_change_count(&self) -> usize {
        self.contributions
            .iter()
            .filter(|c| c.audited)
            .map(|c| c.changes.len())
            .sum()
    }

    /// Removes audited contributions, returning true when nothing is left
    pub(crate) fn drop_audited(&mut self) -> bool {
        self.contributions.retain(|c| !c.audited);
        self.recompute();
        self.is_empty()
    }

    /// Value each written field had before the batch touched it, taken from
    /// the earliest persisted, unaudited contribution that wrote it
    pub(crate) fn original_values(&self) -> FieldMap {
        let mut originals = FieldMap::new();
        for contribution in &self.contributions {
            if contribution.audited || !self.is_settled(contribution) {
                continue;
            }
            for (name, value) in &contribution.originals {
                originals
                    .entry(name.clone())
                    .or_insert_with(|| value.clone());
            }
            for change in &contribution.changes {
                originals
                    .entry(change.field_name.clone())
                    .or_insert_with(|| change.old_value.clone());
            }
        }
        originals
    }

    /// Drops everything the backend already holds; writes still waiting in
    /// the lane stay
    pub(crate) fn discard_settled(&mut self) -> bool {
        let persisted = self.persisted_ticket;
        self.contributions.retain(|c| c.ticket > persisted);
        self.recompute();
        self.is_empty()
    }
}
