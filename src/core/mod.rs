// src/core/mod.rs
//! Backend access and local persistence shared by every page

pub mod service_client;
pub mod store;

pub use service_client::{CareerBackend, ServiceClient};
pub use store::{FileStorage, LocalStore, MemoryStorage, StorageBackend, StorageKey};
