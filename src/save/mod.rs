//! Persistence
//!
//! Durable storage for economy accounts and their ledgers.

pub mod store;
pub mod memory;
pub mod file;

pub use store::{EconomyStore, StorageError, UserBook, BOOK_VERSION};
pub use memory::MemoryStore;
pub use file::JsonFileStore;
