//! End-to-end reconciliation scenarios against an in-memory remote.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};

use mcpsync_core::{
    ConnectionEnsurer, ModelSummary, OpenAiSettings, PassQueue, Reconciler, SyncSettings,
    WebUiApi, WebUiError,
};

/// In-memory remote with scriptable failure modes and write counters.
#[derive(Default)]
struct FakeWebUi {
    state: Mutex<FakeState>,
}

#[derive(Default)]
struct FakeState {
    connections: Vec<Value>,
    models: Vec<ModelSummary>,
    /// Ids with a full record; `model_detail` answers `None` for the rest.
    details: Vec<(String, Value)>,
    openai: OpenAiSettings,
    /// Ids for which `update_model` answers 404 even though a detail exists.
    update_rejects: Vec<String>,
    connection_writes: usize,
    model_creates: usize,
    model_updates: usize,
    openai_writes: usize,
}

impl FakeWebUi {
    fn new() -> Self {
        Self::default()
    }

    fn with_connections(self, connections: Vec<Value>) -> Self {
        self.state.lock().unwrap().connections = connections;
        self
    }

    fn with_model(self, id: &str, info: Option<Value>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.models.push(ModelSummary {
                id: id.to_string(),
                name: id.to_string(),
                info: info.clone(),
                extra: serde_json::Map::new(),
            });
            if let Some(detail) = info {
                let mut record = detail;
                record["id"] = json!(id);
                record["name"] = json!(id);
                state.details.push((id.to_string(), record));
            }
        }
        self
    }

    fn reject_updates_for(self, id: &str) -> Self {
        self.state.lock().unwrap().update_rejects.push(id.to_string());
        self
    }

    fn connections(&self) -> Vec<Value> {
        self.state.lock().unwrap().connections.clone()
    }

    fn connection_writes(&self) -> usize {
        self.state.lock().unwrap().connection_writes
    }

    fn detail(&self, id: &str) -> Option<Value> {
        let state = self.state.lock().unwrap();
        state
            .details
            .iter()
            .find(|(detail_id, _)| detail_id == id)
            .map(|(_, record)| record.clone())
    }

    fn counters(&self) -> (usize, usize, usize) {
        let state = self.state.lock().unwrap();
        (
            state.connection_writes,
            state.model_creates,
            state.model_updates,
        )
    }
}

#[async_trait]
impl WebUiApi for FakeWebUi {
    async fn tool_server_connections(&self) -> Result<Vec<Value>, WebUiError> {
        Ok(self.state.lock().unwrap().connections.clone())
    }

    async fn set_tool_server_connections(
        &self,
        connections: &[Value],
    ) -> Result<(), WebUiError> {
        let mut state = self.state.lock().unwrap();
        state.connections = connections.to_vec();
        state.connection_writes += 1;
        Ok(())
    }

    async fn list_models(&self) -> Result<Vec<ModelSummary>, WebUiError> {
        Ok(self.state.lock().unwrap().models.clone())
    }

    async fn model_detail(&self, id: &str) -> Result<Option<Value>, WebUiError> {
        Ok(self.detail(id))
    }

    async fn create_model(&self, model: &Value) -> Result<(), WebUiError> {
        let mut state = self.state.lock().unwrap();
        let id = model["id"].as_str().unwrap_or_default().to_string();
        state.details.retain(|(detail_id, _)| *detail_id != id);
        state.details.push((id.clone(), model.clone()));
        state.update_rejects.retain(|rejected| *rejected != id);
        state.model_creates += 1;

        // Creating the record also refreshes the listing entry
        if let Some(summary) = state.models.iter_mut().find(|m| m.id == id) {
            summary.info = Some(model.clone());
        }
        Ok(())
    }

    async fn update_model(&self, id: &str, model: &Value) -> Result<(), WebUiError> {
        let mut state = self.state.lock().unwrap();
        if state.update_rejects.iter().any(|rejected| rejected == id) {
            return Err(WebUiError::ModelNotFound(id.to_string()));
        }
        let Some(slot) = state
            .details
            .iter_mut()
            .find(|(detail_id, _)| detail_id == id)
        else {
            return Err(WebUiError::ModelNotFound(id.to_string()));
        };
        slot.1 = model.clone();
        state.model_updates += 1;

        if let Some(summary) = state.models.iter_mut().find(|m| m.id == id) {
            summary.info = Some(model.clone());
        }
        Ok(())
    }

    async fn openai_config(&self) -> Result<OpenAiSettings, WebUiError> {
        Ok(self.state.lock().unwrap().openai.clone())
    }

    async fn set_openai_config(&self, settings: &OpenAiSettings) -> Result<(), WebUiError> {
        let mut state = self.state.lock().unwrap();
        state.openai = settings.clone();
        state.openai_writes += 1;
        Ok(())
    }
}

fn reconciler(api: Arc<FakeWebUi>) -> Reconciler {
    Reconciler::new(api, Arc::new(PassQueue::new()), SyncSettings::with_defaults())
}

fn foreign_connection(url: &str) -> Value {
    json!({
        "url": url,
        "path": "openapi.json",
        "type": "openapi",
        "auth_type": "bearer",
        "key": "sk-foreign",
        "config": {"enable": true, "access_control": null},
        "info": {"id": "ext", "name": "External", "description": ""},
        "created_at": 1_700_000_000
    })
}

const TIME_DOC: &str = r#"{
    "mcpServers": {
        "time": {
            "command": "uvx",
            "args": ["mcp-server-time", "--local-timezone=UTC"],
            "info": {"name": "Time", "description": "Clock and timezone tools"}
        }
    }
}"#;

#[tokio::test]
async fn declaring_a_server_adds_its_connection_and_model_assignment() {
    let api = Arc::new(
        FakeWebUi::new().with_model("llama3", Some(json!({"meta": {}, "params": {}}))),
    );
    let report = reconciler(Arc::clone(&api)).reconcile(TIME_DOC).await.unwrap();

    assert!(report.connections_written);
    assert_eq!(report.models_updated, 1);

    let connections = api.connections();
    assert_eq!(connections.len(), 1);
    assert_eq!(connections[0]["url"], json!("http://mcpo:8000/time"));
    assert_eq!(connections[0]["info"]["name"], json!("Time"));
    assert_eq!(
        connections[0]["info"]["description"],
        json!("Clock and timezone tools")
    );

    let detail = api.detail("llama3").unwrap();
    assert_eq!(detail["meta"]["toolIds"], json!(["server:time"]));
    assert_eq!(detail["params"]["function_calling"], json!("native"));
}

#[tokio::test]
async fn foreign_connections_and_tool_ids_survive() {
    let api = Arc::new(
        FakeWebUi::new()
            .with_connections(vec![foreign_connection("http://other-host:9000/svc")])
            .with_model(
                "llama3",
                Some(json!({
                    "meta": {"toolIds": ["web_search", "server:stale"]},
                    "params": {}
                })),
            ),
    );
    let report = reconciler(Arc::clone(&api)).reconcile(TIME_DOC).await.unwrap();
    assert!(report.connections_written);

    // Foreign entry first and byte-identical, managed entry appended
    let connections = api.connections();
    assert_eq!(connections.len(), 2);
    assert_eq!(connections[0], foreign_connection("http://other-host:9000/svc"));
    assert_eq!(connections[1]["url"], json!("http://mcpo:8000/time"));

    // Foreign tool id kept, stale managed id dropped, new one appended
    let detail = api.detail("llama3").unwrap();
    assert_eq!(
        detail["meta"]["toolIds"],
        json!(["web_search", "server:time"])
    );
}

#[tokio::test]
async fn second_pass_with_same_document_writes_nothing() {
    let api = Arc::new(
        FakeWebUi::new()
            .with_connections(vec![foreign_connection("http://other-host:9000/svc")])
            .with_model("llama3", Some(json!({"meta": {}, "params": {}}))),
    );
    let engine = reconciler(Arc::clone(&api));

    engine.reconcile(TIME_DOC).await.unwrap();
    let (writes_after_first, creates_after_first, updates_after_first) = api.counters();

    let report = engine.reconcile(TIME_DOC).await.unwrap();
    assert!(!report.connections_written);
    assert_eq!(report.models_updated, 0);
    assert_eq!(
        api.counters(),
        (writes_after_first, creates_after_first, updates_after_first)
    );
}

#[tokio::test]
async fn empty_document_converges_to_foreign_only() {
    let api = Arc::new(
        FakeWebUi::new()
            .with_connections(vec![foreign_connection("http://other-host:9000/svc")])
            .with_model(
                "llama3",
                Some(json!({
                    "meta": {"toolIds": ["web_search", "server:time"]},
                    "params": {"function_calling": "native"}
                })),
            ),
    );
    let engine = reconciler(Arc::clone(&api));

    engine.reconcile(TIME_DOC).await.unwrap();
    let report = engine.reconcile("{}").await.unwrap();

    assert!(report.connections_written);
    let connections = api.connections();
    assert_eq!(connections.len(), 1);
    assert_eq!(connections[0]["url"], json!("http://other-host:9000/svc"));

    let detail = api.detail("llama3").unwrap();
    assert_eq!(detail["meta"]["toolIds"], json!(["web_search"]));
}

#[tokio::test]
async fn malformed_document_reconciles_as_empty() {
    let api = Arc::new(FakeWebUi::new());
    let engine = reconciler(Arc::clone(&api));

    engine.reconcile(TIME_DOC).await.unwrap();
    assert_eq!(api.connections().len(), 1);

    engine.reconcile("{ this is not json").await.unwrap();
    assert!(api.connections().is_empty());
}

#[tokio::test]
async fn model_without_record_is_created() {
    let api = Arc::new(FakeWebUi::new().with_model("gemma", None));
    let report = reconciler(Arc::clone(&api)).reconcile(TIME_DOC).await.unwrap();

    assert_eq!(report.models_updated, 1);
    let (_, creates, updates) = api.counters();
    assert_eq!((creates, updates), (1, 0));

    let detail = api.detail("gemma").unwrap();
    assert_eq!(detail["id"], json!("gemma"));
    assert_eq!(detail["meta"]["toolIds"], json!(["server:time"]));
}

#[tokio::test]
async fn update_rejected_with_404_falls_back_to_create() {
    let api = Arc::new(
        FakeWebUi::new()
            .with_model("phi", Some(json!({"meta": {}, "params": {}})))
            .reject_updates_for("phi"),
    );
    let report = reconciler(Arc::clone(&api)).reconcile(TIME_DOC).await.unwrap();

    assert_eq!(report.models_updated, 1);
    let (_, creates, updates) = api.counters();
    assert_eq!((creates, updates), (1, 0));
    assert_eq!(
        api.detail("phi").unwrap()["meta"]["toolIds"],
        json!(["server:time"])
    );
}

#[tokio::test]
async fn queued_passes_apply_in_order_so_the_last_document_wins() {
    let api = Arc::new(FakeWebUi::new());
    let engine = reconciler(Arc::clone(&api));

    // reconcile() enqueues before its first await, so polling the futures
    // in creation order pins their queue positions: the TIME_DOC pass runs
    // to completion before the empty-document pass starts.
    let first = engine.reconcile(TIME_DOC);
    let second = engine.reconcile("{}");
    let (first, second) = tokio::join!(first, second);
    first.unwrap();
    second.unwrap();

    // The later document dictates the final state: the owned connection
    // written by the first pass is gone again.
    assert!(api.connections().is_empty());
    // Both passes saw a change and wrote; no interleaving collapsed them
    assert_eq!(api.connection_writes(), 2);
}

#[tokio::test]
async fn ensurer_and_reconciler_share_one_queue() {
    let api = Arc::new(FakeWebUi::new());
    let queue = Arc::new(PassQueue::new());
    let settings = SyncSettings {
        openai_key: "ollama".to_string(),
        ..SyncSettings::with_defaults()
    };

    let engine = Reconciler::new(
        Arc::clone(&api) as Arc<dyn WebUiApi>,
        Arc::clone(&queue),
        settings.clone(),
    );
    let ensurer = ConnectionEnsurer::new(Arc::clone(&api) as Arc<dyn WebUiApi>, queue, settings);

    assert!(ensurer.ensure().await.unwrap());
    engine.reconcile(TIME_DOC).await.unwrap();
    // Second ensure is a no-op
    assert!(!ensurer.ensure().await.unwrap());

    let state = api.state.lock().unwrap();
    assert!(state.openai.enabled);
    assert_eq!(state.openai.connections.len(), 1);
    assert_eq!(
        state.openai.connections[0].url,
        "http://host.docker.internal:11434/v1"
    );
    assert_eq!(state.openai.connections[0].key, "ollama");
    assert_eq!(state.openai_writes, 1);
}
