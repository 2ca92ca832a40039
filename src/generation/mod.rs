//! Generation lifecycle: records, storage, validation, and orchestration

pub mod orchestrator;
pub mod record;
pub mod store;
pub mod validate;

pub use record::{GenerationRecord, GenerationRequest, GenerationStatus, GenerationUpdate};
pub use store::GenerationStore;
