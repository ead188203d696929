pub mod channel;
pub mod errors;
pub mod ids;
pub mod persona;
pub mod profile;
pub mod prospect;
pub mod provider;

pub use channel::{Channel, ChannelLabel, FollowUpStage};
pub use errors::GenerationError;
pub use ids::{MessageId, ProspectId};
pub use persona::{Persona, PersonaError};
pub use profile::{FetchError, ProfileSource};
pub use prospect::{NewProspect, Prospect, ProspectSource, ProspectSummary, StoredMessage};
pub use provider::{GenerationClient, GenerationRequest};
