use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::GenerationError;

/// A single-shot generation request: one system instruction, one user instruction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub system: String,
    pub user: String,
    pub temperature: f64,
}

impl GenerationRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>, temperature: f64) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            temperature,
        }
    }
}

/// The text-completion capability the engine orchestrates.
///
/// Implementations own their timeout and input budget; a timeout surfaces as
/// [`GenerationError::Timeout`] and is never retried here.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    fn name(&self) -> &str;
    fn model(&self) -> &str;

    /// Endpoint reachable and configured model available.
    async fn health(&self) -> Result<(), GenerationError>;

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}
