//! Session persistence - JSON snapshots with debounced writes

pub mod snapshot;
pub mod store;

pub use snapshot::{SaveSnapshot, SavedBuilding, Session};
pub use store::{SaveDebouncer, SaveStore};
