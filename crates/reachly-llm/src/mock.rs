use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use reachly_core::errors::GenerationError;
use reachly_core::provider::{GenerationClient, GenerationRequest};

/// Pre-programmed responses for deterministic testing without a model.
#[derive(Clone, Debug)]
pub enum MockResponse {
    Text(String),
    Error(GenerationError),
    /// Wait a duration, then resolve the inner response.
    Delay(Duration, Box<MockResponse>),
}

impl MockResponse {
    pub fn text(text: &str) -> Self {
        Self::Text(text.to_string())
    }

    pub fn delayed(delay: Duration, inner: MockResponse) -> Self {
        Self::Delay(delay, Box::new(inner))
    }
}

type Responder = Box<dyn Fn(&GenerationRequest) -> Result<String, GenerationError> + Send + Sync>;

/// Mock client that replays queued responses in order, or answers through a
/// closure once the queue is empty. Every request is recorded.
pub struct MockClient {
    responses: Mutex<VecDeque<MockResponse>>,
    responder: Option<Responder>,
    requests: Mutex<Vec<GenerationRequest>>,
    call_count: AtomicUsize,
    healthy: AtomicBool,
}

impl MockClient {
    pub fn new(responses: Vec<MockResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            responder: None,
            requests: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
            healthy: AtomicBool::new(true),
        }
    }

    /// Answer every request through `f`.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&GenerationRequest) -> Result<String, GenerationError> + Send + Sync + 'static,
    {
        Self {
            responder: Some(Box::new(f)),
            ..Self::new(Vec::new())
        }
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::Relaxed);
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Snapshot of every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl GenerationClient for MockClient {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn health(&self) -> Result<(), GenerationError> {
        if self.healthy.load(Ordering::Relaxed) {
            Ok(())
        } else {
            Err(GenerationError::Unavailable("mock endpoint marked unhealthy".into()))
        }
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let idx = self.call_count.fetch_add(1, Ordering::Relaxed);
        self.requests.lock().push(request.clone());

        let queued = self.responses.lock().pop_front();
        match queued {
            Some(response) => resolve_response(response).await,
            None => match &self.responder {
                Some(f) => f(request),
                None => Err(GenerationError::InvalidResponse(format!(
                    "MockClient: no response configured for call {idx}"
                ))),
            },
        }
    }
}

/// Unrolls nested delays iteratively to avoid recursive async.
async fn resolve_response(response: MockResponse) -> Result<String, GenerationError> {
    let mut current = response;
    loop {
        match current {
            MockResponse::Text(text) => return Ok(text),
            MockResponse::Error(e) => return Err(e),
            MockResponse::Delay(duration, inner) => {
                tokio::time::sleep(duration).await;
                current = *inner;
            }
        }
    }
}
