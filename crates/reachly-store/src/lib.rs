pub mod context;
pub mod database;
pub mod error;
pub mod messages;
pub mod prospects;
pub mod row_helpers;
pub mod schema;

pub use context::{ContextStore, SqliteStore};
pub use database::Database;
pub use error::StoreError;
pub use messages::MessageRepo;
pub use prospects::ProspectRepo;
