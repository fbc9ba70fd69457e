//! Application layer for tasknest.
//!
//! This crate wires the hierarchy engine to a durable store and the date
//! extractor, and loads the TOML configuration shared by consumers of the
//! engine.

pub mod config;
pub mod service;
pub mod store;

// Re-exports for convenience
pub use config::{AppConfig, InputConfig, StorageConfig};
pub use service::TaskService;
pub use store::StateStore;
