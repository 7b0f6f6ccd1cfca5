#![forbid(unsafe_code)]

pub mod progress_store;
pub mod repository;
pub mod session_store;
pub mod sqlite;

pub use progress_store::ProgressStore;
pub use repository::{InMemoryStore, KeyValueStore, Storage, StorageError};
pub use session_store::{SessionListing, SessionStore};
