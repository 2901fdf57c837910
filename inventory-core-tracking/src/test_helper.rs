use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use inventory_core_api::{
    ChangeError, ChangeResult, CreateChangeLogRequest, FieldMap, FieldValue, RecordId,
};
use inventory_core_db::{
    Auditable, ChangeLogBatch, ChangeLogModel, CreateChangeLog, EquipmentModel, FindSpecsByModel,
    LoadAll, LoadChangeLogsBatch, MachineSpecsModel, TrackedTable, UpdateFields,
};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::error::Error;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::batch::BatchAccumulator;
use crate::config::{BatchConfig, IndicatorConfig, TrackingConfig};
use crate::gate::{ChangeConfirmationGate, GateStatus};
use crate::indicator_cache::ChangeIndicatorCache;
use crate::local_records::LocalRecords;
use crate::navigation_guard::{NavigationPrompt, SaveCallback};
use crate::notifier::{NoticeLevel, Notifier};
use crate::requester::FieldChangeRequester;
use crate::tracker::{ChangeTracker, TrackingRepositories};

type BoxError = Box<dyn Error + Send + Sync>;

/// Backend double implementing every repository trait in memory, with call
/// counters and failure injection
pub struct InMemoryBackend<T: Auditable> {
    records: Mutex<Vec<T>>,
    puts: Mutex<Vec<(RecordId, FieldMap)>>,
    posts: Mutex<Vec<CreateChangeLogRequest>>,
    logs: Mutex<Vec<ChangeLogModel>>,
    purchase_logs: Mutex<HashMap<RecordId, Vec<ChangeLogModel>>>,
    new_purchase_logs: Mutex<HashMap<RecordId, Vec<ChangeLogModel>>>,
    specs: Mutex<HashMap<String, MachineSpecsModel>>,
    failing_puts: AtomicUsize,
    failing_posts: Mutex<HashSet<RecordId>>,
    failing_history: AtomicBool,
    failing_specs: AtomicBool,
    failing_load: AtomicBool,
    yield_on_put: AtomicBool,
    history_requests: AtomicUsize,
    specs_lookups: AtomicUsize,
    next_log_id: AtomicU64,
}

impl<T: Auditable> InMemoryBackend<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self {
            records: Mutex::new(records),
            puts: Mutex::new(Vec::new()),
            posts: Mutex::new(Vec::new()),
            logs: Mutex::new(Vec::new()),
            purchase_logs: Mutex::new(HashMap::new()),
            new_purchase_logs: Mutex::new(HashMap::new()),
            specs: Mutex::new(HashMap::new()),
            failing_puts: AtomicUsize::new(0),
            failing_posts: Mutex::new(HashSet::new()),
            failing_history: AtomicBool::new(false),
            failing_specs: AtomicBool::new(false),
            failing_load: AtomicBool::new(false),
            yield_on_put: AtomicBool::new(false),
            history_requests: AtomicUsize::new(0),
            specs_lookups: AtomicUsize::new(0),
            next_log_id: AtomicU64::new(1),
        }
    }

    pub fn record(&self, id: &RecordId) -> Option<T> {
        self.records.lock().iter().find(|r| &r.get_id() == id).cloned()
    }

    pub fn puts(&self) -> Vec<(RecordId, FieldMap)> {
        self.puts.lock().clone()
    }

    pub fn put_count(&self) -> usize {
        self.puts.lock().len()
    }

    /// Successful change-log writes only
    pub fn posts(&self) -> Vec<CreateChangeLogRequest> {
        self.posts.lock().clone()
    }

    pub fn post_count(&self) -> usize {
        self.posts.lock().len()
    }

    pub fn history_request_count(&self) -> usize {
        self.history_requests.load(Ordering::SeqCst)
    }

    pub fn specs_lookup_count(&self) -> usize {
        self.specs_lookups.load(Ordering::SeqCst)
    }

    pub fn fail_next_puts(&self, count: usize) {
        self.failing_puts.store(count, Ordering::SeqCst);
    }

    pub fn fail_posts_for(&self, id: &RecordId) {
        self.failing_posts.lock().insert(id.clone());
    }

    pub fn clear_post_failures(&self) {
        self.failing_posts.lock().clear();
    }

    pub fn fail_history(&self, fail: bool) {
        self.failing_history.store(fail, Ordering::SeqCst);
    }

    pub fn fail_specs(&self, fail: bool) {
        self.failing_specs.store(fail, Ordering::SeqCst);
    }

    pub fn fail_load(&self, fail: bool) {
        self.failing_load.store(fail, Ordering::SeqCst);
    }

    /// Makes every record write yield once so concurrent writes interleave
    pub fn yield_on_put(&self, enabled: bool) {
        self.yield_on_put.store(enabled, Ordering::SeqCst);
    }

    pub fn seed_specs(&self, specs: MachineSpecsModel) {
        self.specs.lock().insert(specs.model.clone(), specs);
    }

    pub fn seed_log(&self, row: ChangeLogModel) {
        self.logs.lock().push(row);
    }

    pub fn seed_purchase_log(&self, purchase_id: &str, row: ChangeLogModel) {
        self.purchase_logs
            .lock()
            .entry(RecordId::from(purchase_id))
            .or_default()
            .push(row);
    }

    pub fn seed_new_purchase_log(&self, new_purchase_id: &str, row: ChangeLogModel) {
        self.new_purchase_logs
            .lock()
            .entry(RecordId::from(new_purchase_id))
            .or_default()
            .push(row);
    }

    pub fn clear_logs(&self) {
        self.logs.lock().clear();
        self.purchase_logs.lock().clear();
        self.new_purchase_logs.lock().clear();
    }

    fn history_call(&self) -> Result<(), BoxError> {
        self.history_requests.fetch_add(1, Ordering::SeqCst);
        if self.failing_history.load(Ordering::SeqCst) {
            return Err("injected history failure".into());
        }
        Ok(())
    }
}

#[async_trait]
impl<T: Auditable> UpdateFields<T> for InMemoryBackend<T> {
    async fn update_fields(&self, id: &RecordId, updates: &FieldMap) -> Result<(), BoxError> {
        if self.yield_on_put.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
        let fail = self
            .failing_puts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if fail {
            return Err("injected write failure".into());
        }

        let mut records = self.records.lock();
        let record = records
            .iter_mut()
            .find(|r| &r.get_id() == id)
            .ok_or_else(|| format!("record {id} not found"))?;
        record.apply_updates(updates)?;
        self.puts.lock().push((id.clone(), updates.clone()));
        Ok(())
    }
}

#[async_trait]
impl<T: Auditable> LoadAll<T> for InMemoryBackend<T> {
    async fn load_all(&self) -> Result<Vec<T>, BoxError> {
        if self.failing_load.load(Ordering::SeqCst) {
            return Err("injected load failure".into());
        }
        Ok(self.records.lock().clone())
    }
}

#[async_trait]
impl<T: Auditable> CreateChangeLog for InMemoryBackend<T> {
    async fn create_change_log(&self, request: &CreateChangeLogRequest) -> Result<(), BoxError> {
        if self.failing_posts.lock().contains(&request.record_id) {
            return Err("injected change log failure".into());
        }
        let mut logs = self.logs.lock();
        for change in &request.changes {
            let n = self.next_log_id.fetch_add(1, Ordering::SeqCst);
            logs.push(ChangeLogModel {
                id: RecordId::from(format!("log-{n}")),
                table_name: request.table_name.clone(),
                record_id: request.record_id.clone(),
                field_name: change.field_name.clone(),
                field_label: Some(change.field_label.clone()),
                old_value: change.old_value.clone(),
                new_value: change.new_value.clone(),
                reason: request.change_reason.clone(),
                changed_at: at_minute(100 + n as i64),
                module_name: Some(request.module_name.clone()),
            });
        }
        self.posts.lock().push(request.clone());
        Ok(())
    }
}

#[async_trait]
impl<T: Auditable> LoadChangeLogsBatch for InMemoryBackend<T> {
    async fn load_batch(&self, table: TrackedTable, ids: &[RecordId]) -> Result<ChangeLogBatch, BoxError> {
        self.history_call()?;
        let logs = self.logs.lock();
        let mut batch = ChangeLogBatch::new();
        for row in logs.iter() {
            if row.table_name == table.as_str() && ids.contains(&row.record_id) {
                batch.entry(row.record_id.clone()).or_default().push(row.clone());
            }
        }
        Ok(batch)
    }

    async fn load_batch_by_purchase(&self, purchase_ids: &[RecordId]) -> Result<ChangeLogBatch, BoxError> {
        self.history_call()?;
        Ok(select(&self.purchase_logs.lock(), purchase_ids))
    }

    async fn load_batch_by_new_purchase(
        &self,
        new_purchase_ids: &[RecordId],
    ) -> Result<ChangeLogBatch, BoxError> {
        self.history_call()?;
        Ok(select(&self.new_purchase_logs.lock(), new_purchase_ids))
    }
}

#[async_trait]
impl<T: Auditable> FindSpecsByModel for InMemoryBackend<T> {
    async fn find_specs_by_model(&self, model: &str) -> Result<Option<MachineSpecsModel>, BoxError> {
        self.specs_lookups.fetch_add(1, Ordering::SeqCst);
        if self.failing_specs.load(Ordering::SeqCst) {
            return Err("injected specs failure".into());
        }
        Ok(self.specs.lock().get(model).cloned())
    }
}

fn select(source: &HashMap<RecordId, Vec<ChangeLogModel>>, ids: &[RecordId]) -> ChangeLogBatch {
    ids.iter()
        .filter_map(|id| source.get(id).map(|rows| (id.clone(), rows.clone())))
        .collect()
}

/// Notifier that keeps every notice
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<(NoticeLevel, String)>>,
}

impl RecordingNotifier {
    pub fn all(&self) -> Vec<(NoticeLevel, String)> {
        self.notices.lock().clone()
    }

    pub fn count(&self, level: NoticeLevel) -> usize {
        self.notices.lock().iter().filter(|(l, _)| *l == level).count()
    }

    pub fn error_count(&self) -> usize {
        self.count(NoticeLevel::Error)
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        self.notices.lock().push((level, message.to_string()));
    }
}

/// Prompt answering from a script, then `false`
#[derive(Default)]
pub struct ScriptedPrompt {
    answers: Mutex<VecDeque<bool>>,
    questions: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn answering(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            questions: Mutex::new(Vec::new()),
        }
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().clone()
    }
}

#[async_trait]
impl NavigationPrompt for ScriptedPrompt {
    async fn confirm(&self, message: &str) -> bool {
        self.questions.lock().push(message.to_string());
        self.answers.lock().pop_front().unwrap_or(false)
    }
}

pub struct ScriptedSaver {
    remaining: Option<usize>,
    calls: AtomicUsize,
}

impl ScriptedSaver {
    pub fn succeeding(remaining: usize) -> Self {
        Self {
            remaining: Some(remaining),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            remaining: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SaveCallback for ScriptedSaver {
    async fn save(&self) -> ChangeResult<usize> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.remaining
            .ok_or_else(|| ChangeError::InternalError("save failed".to_string()))
    }
}

/// Components of one equipment page wired over an in-memory backend
pub struct Fixture {
    pub backend: Arc<InMemoryBackend<EquipmentModel>>,
    pub local: Arc<LocalRecords<EquipmentModel>>,
    pub batch: Arc<BatchAccumulator<EquipmentModel>>,
    pub gate: Arc<ChangeConfirmationGate<EquipmentModel>>,
    pub indicators: Arc<ChangeIndicatorCache<EquipmentModel>>,
    pub requester: Arc<FieldChangeRequester<EquipmentModel>>,
    pub notifier: Arc<RecordingNotifier>,
}

pub fn setup(records: Vec<EquipmentModel>) -> Fixture {
    let backend = Arc::new(InMemoryBackend::new(records.clone()));
    let local = Arc::new(LocalRecords::new(records));
    let notifier = Arc::new(RecordingNotifier::default());

    let indicators = Arc::new(ChangeIndicatorCache::<EquipmentModel>::new(
        backend.clone(),
        local.clone(),
        &IndicatorConfig::default(),
    ));
    let batch = Arc::new(BatchAccumulator::<EquipmentModel>::new(
        backend.clone(),
        local.clone(),
        notifier.clone(),
        BatchConfig::default(),
    ));
    let gate = Arc::new(ChangeConfirmationGate::<EquipmentModel>::new(
        backend.clone(),
        backend.clone(),
        local.clone(),
        indicators.clone(),
        notifier.clone(),
        "Equipos",
    ));
    let requester = Arc::new(FieldChangeRequester::<EquipmentModel>::new(
        backend.clone(),
        Some(backend.clone()),
        batch.clone(),
        gate.clone(),
        local.clone(),
        notifier.clone(),
    ));

    Fixture {
        backend,
        local,
        batch,
        gate,
        indicators,
        requester,
        notifier,
    }
}

/// A batch accumulator with batch mode already on
pub fn setup_batch(
    records: Vec<EquipmentModel>,
) -> (
    BatchAccumulator<EquipmentModel>,
    Arc<InMemoryBackend<EquipmentModel>>,
    Arc<RecordingNotifier>,
) {
    let backend = Arc::new(InMemoryBackend::new(records.clone()));
    let notifier = Arc::new(RecordingNotifier::default());
    let batch = BatchAccumulator::<EquipmentModel>::new(
        backend.clone(),
        Arc::new(LocalRecords::new(records)),
        notifier.clone(),
        BatchConfig::default(),
    );
    batch.set_enabled(true).unwrap();
    (batch, backend, notifier)
}

pub fn tracker_over(
    backend: &Arc<InMemoryBackend<EquipmentModel>>,
    prompt: Arc<ScriptedPrompt>,
) -> (ChangeTracker<EquipmentModel>, Arc<RecordingNotifier>) {
    tracker_for(backend, "Equipos", prompt)
}

/// A tracker of any record kind, with every repository served by `backend`
pub fn tracker_for<T: Auditable>(
    backend: &Arc<InMemoryBackend<T>>,
    module_name: &str,
    prompt: Arc<ScriptedPrompt>,
) -> (ChangeTracker<T>, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let repositories = TrackingRepositories::<T> {
        records: backend.clone(),
        change_logs: backend.clone(),
        specs: Some(backend.clone()),
    };
    let tracker = ChangeTracker::<T>::new(
        repositories,
        TrackingConfig::for_module(module_name),
        notifier.clone(),
        prompt,
    );
    (tracker, notifier)
}

pub fn equipment(id: &str, state: &str) -> EquipmentModel {
    let mut equipment = EquipmentModel::new(id);
    equipment.state = Some(state.to_string());
    equipment
}

pub fn specs(model: &str) -> MachineSpecsModel {
    MachineSpecsModel {
        model: model.to_string(),
        cabin: Some("Cerrada".to_string()),
        wet_line: Some("Sí".to_string()),
        dozer_blade: Some("Sí".to_string()),
        track_type: Some("Triple garra".to_string()),
        track_width: Some("600 mm".to_string()),
    }
}

pub fn at_minute(minute: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap() + ChronoDuration::minutes(minute)
}

pub fn log_row(
    id: &str,
    table: TrackedTable,
    record_id: &str,
    field: &str,
    old: &str,
    new: &str,
    minute: i64,
) -> ChangeLogModel {
    ChangeLogModel {
        id: RecordId::from(id),
        table_name: table.to_string(),
        record_id: RecordId::from(record_id),
        field_name: field.to_string(),
        field_label: None,
        old_value: FieldValue::text(old),
        new_value: FieldValue::text(new),
        reason: None,
        changed_at: at_minute(minute),
        module_name: None,
    }
}

pub async fn wait_for(condition: impl Fn() -> bool) {
    for _ in 0..1_000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}

pub async fn wait_for_status<T: Auditable>(gate: &ChangeConfirmationGate<T>, status: GateStatus) {
    wait_for(|| gate.status() == status).await;
}
