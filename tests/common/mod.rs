//! Common test utilities.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use futures::stream;
use tempfile::TempDir;

use health_connect::analysis::AnalysisService;
use health_connect::background::BackgroundTasks;
use health_connect::cache::ResponseCache;
use health_connect::llm::{
    Chunk, ChunkStream, GatewayConfig, GenerateRequest, GenerationGateway, GenerativeModel,
    LLMError,
};
use health_connect::server::{self, AppState};
use health_connect::session::SessionManager;
use health_connect::store::FileSessionStore;

// ============================================================================
// Scripted Model
// ============================================================================

type Script = Vec<Result<Chunk, LLMError>>;
type Responder = dyn Fn(&GenerateRequest) -> Result<Script, LLMError> + Send + Sync;

/// In-process model that answers from a closure and records every request.
pub struct ScriptedModel {
    responder: Box<Responder>,
    calls: AtomicUsize,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedModel {
    pub fn new<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&GenerateRequest) -> Result<Script, LLMError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            responder: Box::new(responder),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Streams `chunks` in order for every request.
    pub fn chunks(chunks: &[&str]) -> Arc<Self> {
        let chunks: Vec<String> = chunks.iter().map(|c| c.to_string()).collect();
        Self::new(move |_| Ok(chunks.iter().cloned().map(|c| Ok(Chunk::Text(c))).collect()))
    }

    pub fn replying(text: &str) -> Arc<Self> {
        Self::chunks(&[text])
    }

    /// Fails every call before producing output.
    pub fn failing() -> Arc<Self> {
        Self::new(|_| Err(rejected()))
    }

    /// Streams `partial`, then fails.
    pub fn failing_after(partial: &str) -> Arc<Self> {
        let partial = partial.to_string();
        Self::new(move |_| Ok(vec![Ok(Chunk::Text(partial.clone())), Err(rejected())]))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> GenerateRequest {
        self.requests().pop().expect("no request recorded")
    }

    fn record(&self, request: &GenerateRequest) -> Result<Script, LLMError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        (self.responder)(request)
    }
}

/// A non-retryable provider error.
pub fn rejected() -> LLMError {
    LLMError::Api {
        status: 400,
        message: "rejected by test".to_string(),
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    async fn generate(&self, request: GenerateRequest) -> Result<String, LLMError> {
        let mut text = String::new();
        for item in self.record(&request)? {
            text.push_str(&item?.into_text());
        }
        Ok(text)
    }

    async fn generate_stream(&self, request: GenerateRequest) -> Result<ChunkStream, LLMError> {
        let script = self.record(&request)?;
        Ok(Box::pin(stream::iter(script)))
    }
}

// ============================================================================
// App Construction
// ============================================================================

pub fn test_gateway_config() -> GatewayConfig {
    GatewayConfig {
        request_timeout: Duration::from_secs(5),
        idle_timeout: Duration::from_secs(5),
        max_retries: 0,
        retry_backoff: Duration::from_millis(1),
    }
}

/// Everything a test needs to drive the service and inspect its effects.
pub struct TestHarness {
    pub model: Arc<ScriptedModel>,
    pub state: AppState,
    pub background: BackgroundTasks,
    pub store: Arc<FileSessionStore>,
    _tmp: TempDir,
}

impl TestHarness {
    pub fn new(model: Arc<ScriptedModel>) -> Self {
        let tmp = TempDir::new().unwrap();
        let store = Arc::new(FileSessionStore::new(
            tmp.path().join("sessions"),
            chrono::Duration::days(30),
        ));
        let gateway = GenerationGateway::new(model.clone(), test_gateway_config());
        let background = BackgroundTasks::new();
        let sessions = SessionManager::new(store.clone(), gateway.clone(), background.clone());
        let analysis = AnalysisService::new(ResponseCache::default(), gateway);

        Self {
            model,
            state: AppState {
                sessions,
                analysis,
                max_connections: 64,
            },
            background,
            store,
            _tmp: tmp,
        }
    }

    pub fn app(&self) -> Router {
        server::build_app(self.state.clone(), 30)
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.state.sessions
    }
}

/// Create a test app backed by a model that always answers `"ok"`.
pub fn test_app() -> (TestHarness, Router) {
    let harness = TestHarness::new(ScriptedModel::replying("ok"));
    let app = harness.app();
    (harness, app)
}
