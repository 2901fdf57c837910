//! Stub backend for the REST repository tests
//!
//! Serves the inventory endpoints from memory with `axum` on an ephemeral
//! port. Every test starts its own server inside its own runtime, so tests
//! are isolated without any cleanup.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::{TimeZone, Utc};
use inventory_core_api::{BatchChangeLogRequest, CreateChangeLogRequest, RecordId};
use inventory_core_db::{ChangeLogModel, MachineSpecsModel, TrackedTable};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::config::RestConfig;
use crate::rest_repositories::RestRepositories;

/// In-memory state behind the stub endpoints
#[derive(Default)]
pub struct StubBackend {
    records: Mutex<HashMap<String, Vec<Value>>>,
    logs: Mutex<Vec<ChangeLogModel>>,
    specs: Mutex<HashMap<String, MachineSpecsModel>>,
    puts: Mutex<Vec<(String, String, Map<String, Value>)>>,
    posts: Mutex<Vec<CreateChangeLogRequest>>,
    history_requests: Mutex<Vec<(String, BatchChangeLogRequest)>>,
    failing_puts: AtomicUsize,
    failing_posts: AtomicUsize,
    next_log_id: AtomicU64,
}

impl StubBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn seed_records<T: Serialize>(&self, resource: &str, rows: &[T]) {
        let rows = rows
            .iter()
            .map(|row| serde_json::to_value(row).unwrap())
            .collect();
        self.records.lock().insert(resource.to_string(), rows);
    }

    pub fn seed_log(&self, row: ChangeLogModel) {
        self.logs.lock().push(row);
    }

    pub fn seed_specs(&self, specs: MachineSpecsModel) {
        self.specs.lock().insert(specs.model.clone(), specs);
    }

    pub fn record(&self, resource: &str, id: &str) -> Option<Value> {
        self.records
            .lock()
            .get(resource)?
            .iter()
            .find(|row| id_of(row).as_deref() == Some(id))
            .cloned()
    }

    pub fn puts(&self) -> Vec<(String, String, Map<String, Value>)> {
        self.puts.lock().clone()
    }

    pub fn posts(&self) -> Vec<CreateChangeLogRequest> {
        self.posts.lock().clone()
    }

    pub fn history_requests(&self) -> Vec<(String, BatchChangeLogRequest)> {
        self.history_requests.lock().clone()
    }

    pub fn fail_next_puts(&self, count: usize) {
        self.failing_puts.store(count, Ordering::SeqCst);
    }

    pub fn fail_next_posts(&self, count: usize) {
        self.failing_posts.store(count, Ordering::SeqCst);
    }

    fn take_failure(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn history(&self, tables: &[TrackedTable], ids: &[RecordId]) -> HashMap<String, Vec<ChangeLogModel>> {
        let mut result: HashMap<String, Vec<ChangeLogModel>> = HashMap::new();
        for row in self.logs.lock().iter() {
            let tracked = row.table().map(|t| tables.contains(&t)).unwrap_or(false);
            if tracked && ids.contains(&row.record_id) {
                result
                    .entry(row.record_id.to_string())
                    .or_default()
                    .push(row.clone());
            }
        }
        result
    }
}

fn id_of(row: &Value) -> Option<String> {
    match row.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

type Shared = State<Arc<StubBackend>>;

async fn list_records(State(stub): Shared, Path(resource): Path<String>) -> Result<Json<Vec<Value>>, StatusCode> {
    stub.records
        .lock()
        .get(&resource)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_record(
    State(stub): Shared,
    Path((resource, id)): Path<(String, String)>,
    Json(updates): Json<Map<String, Value>>,
) -> Result<Json<Value>, StatusCode> {
    if StubBackend::take_failure(&stub.failing_puts) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    let mut records = stub.records.lock();
    let row = records
        .get_mut(&resource)
        .and_then(|rows| rows.iter_mut().find(|row| id_of(row).as_deref() == Some(id.as_str())))
        .ok_or(StatusCode::NOT_FOUND)?;
    if let Value::Object(fields) = row {
        for (name, value) in &updates {
            fields.insert(name.clone(), value.clone());
        }
    }
    let updated = row.clone();
    drop(records);

    stub.puts.lock().push((resource, id, updates));
    Ok(Json(updated))
}

async fn create_change_log(
    State(stub): Shared,
    Json(request): Json<CreateChangeLogRequest>,
) -> StatusCode {
    if StubBackend::take_failure(&stub.failing_posts) {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }

    let changed_at = Utc::now();
    let mut logs = stub.logs.lock();
    for change in &request.changes {
        let id = stub.next_log_id.fetch_add(1, Ordering::SeqCst) + 1;
        logs.push(ChangeLogModel {
            id: RecordId::from(format!("log-{id}")),
            table_name: request.table_name.clone(),
            record_id: request.record_id.clone(),
            field_name: change.field_name.clone(),
            field_label: Some(change.field_label.clone()),
            old_value: change.old_value.clone(),
            new_value: change.new_value.clone(),
            reason: request.change_reason.clone(),
            changed_at,
            module_name: Some(request.module_name.clone()),
        });
    }
    drop(logs);

    stub.posts.lock().push(request);
    StatusCode::CREATED
}

async fn history_batch(
    State(stub): Shared,
    Json(request): Json<BatchChangeLogRequest>,
) -> Json<HashMap<String, Vec<ChangeLogModel>>> {
    let tables = match request.table_name.parse::<TrackedTable>() {
        Ok(table) => vec![table],
        Err(_) => Vec::new(),
    };
    let result = stub.history(&tables, &request.record_ids);
    stub.history_requests.lock().push(("batch".to_string(), request));
    Json(result)
}

async fn history_by_purchase(
    State(stub): Shared,
    Json(request): Json<BatchChangeLogRequest>,
) -> Json<HashMap<String, Vec<ChangeLogModel>>> {
    let result = stub.history(
        &[TrackedTable::Purchases, TrackedTable::ServiceRecords],
        &request.record_ids,
    );
    stub.history_requests.lock().push(("batch-by-purchase".to_string(), request));
    Json(result)
}

async fn history_by_new_purchase(
    State(stub): Shared,
    Json(request): Json<BatchChangeLogRequest>,
) -> Json<HashMap<String, Vec<ChangeLogModel>>> {
    let result = stub.history(&[TrackedTable::NewPurchases], &request.record_ids);
    stub.history_requests.lock().push(("batch-by-new-purchase".to_string(), request));
    Json(result)
}

async fn specs_by_model(
    State(stub): Shared,
    Path(model): Path<String>,
) -> Result<Json<MachineSpecsModel>, StatusCode> {
    stub.specs
        .lock()
        .get(&model)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

pub fn router(stub: Arc<StubBackend>) -> Router {
    Router::new()
        .route("/api/change-logs", post(create_change_log))
        .route("/api/change-logs/batch", post(history_batch))
        .route("/api/change-logs/batch-by-purchase", post(history_by_purchase))
        .route("/api/change-logs/batch-by-new-purchase", post(history_by_new_purchase))
        .route("/api/model-specs/:model", get(specs_by_model))
        .route("/api/:resource", get(list_records))
        .route("/api/:resource/:id", put(update_record))
        .with_state(stub)
}

/// Serves `stub` on 127.0.0.1 and returns its base URL
pub async fn spawn_stub(stub: Arc<StubBackend>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(stub)).await.unwrap();
    });
    format!("http://{addr}")
}

/// Starts a stub server and a repository factory pointed at it
pub async fn setup() -> (Arc<StubBackend>, RestRepositories) {
    let stub = StubBackend::new();
    let base_url = spawn_stub(stub.clone()).await;
    let repositories = RestRepositories::new(&RestConfig::new(base_url)).unwrap();
    (stub, repositories)
}

pub fn log_row(id: &str, table: TrackedTable, record_id: &str, field: &str, new: &str, minute: u32) -> ChangeLogModel {
    ChangeLogModel {
        id: RecordId::from(id),
        table_name: table.to_string(),
        record_id: RecordId::from(record_id),
        field_name: field.to_string(),
        field_label: None,
        old_value: Default::default(),
        new_value: new.into(),
        reason: None,
        changed_at: Utc.with_ymd_and_hms(2024, 1, 1, 8, minute, 0).unwrap(),
        module_name: None,
    }
}
