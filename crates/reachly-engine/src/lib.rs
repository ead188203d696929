pub mod archive;
pub mod error;
pub mod extract;
pub mod followup;
pub mod generation;
pub mod locks;
pub mod memory;
pub mod orchestrator;
pub mod persona;
pub mod prompts;
pub mod source;

pub use error::EngineError;
pub use extract::{extract_name, extract_role_company, extract_subject, find_subject_line};
pub use followup::generate_followups;
pub use generation::generate_messages;
pub use memory::build_memory_context;
pub use orchestrator::{EngineConfig, Reachly};
pub use persona::infer_persona;
pub use source::{RawTextSource, WebProfileSource};
