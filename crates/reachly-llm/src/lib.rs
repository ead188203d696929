pub mod ollama;
pub mod truncate;

pub mod mock;

pub use mock::{MockClient, MockResponse};
pub use ollama::{OllamaClient, OllamaConfig};
pub use truncate::{estimate_tokens, truncate_to_budget, TRUNCATION_MARKER};
