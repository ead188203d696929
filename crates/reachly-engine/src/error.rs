use reachly_core::{FetchError, GenerationError, PersonaError, ProspectId};
use reachly_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("invalid persona: {0}")]
    Persona(#[from] PersonaError),

    #[error("prospect not found: {0}")]
    ProspectNotFound(ProspectId),

    #[error("generation endpoint not ready: {0}")]
    Unhealthy(#[source] GenerationError),

    #[error("IO error: {0}")]
    Io(String),
}

impl EngineError {
    /// Failures caused by the generation endpoint, including a failed readiness probe.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Generation(_) | Self::Unhealthy(_))
    }
}
