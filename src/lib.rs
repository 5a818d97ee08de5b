pub mod api;
pub mod error;
pub mod notes;

// Convenience re-exports
pub use api::client::SyncClient;
pub use error::{Result, ScrblError};
pub use notes::{DayDocument, DayStore};
