// src/core/mod.rs
//! Infrastructure shared by the server and the CLI: configuration, the
//! SQLite pool, the blob store and the analysis function client.

pub mod blob_store;
pub mod config_manager;
pub mod database;
pub mod fs_ops;
pub mod service_client;

pub use blob_store::BlobStore;
pub use config_manager::ConfigManager;
pub use database::Database;
pub use fs_ops::FsOps;
pub use service_client::ServiceClient;
