//! Retrieval gateway for an establishment's stored files.
//!
//! Given an urn and a file category, [`FileManager`] looks up where the
//! files live, fetches them and returns either the single file or a zip of
//! all of them. When the urn has nothing, fallback urns are searched and
//! their files bundled into per-urn folders.
//!
//! # Architecture
//!
//! - `manager.rs` - Resolve, fetch and bundle for one request
//! - `config.rs` - Layered configuration and collaborator wiring
//! - `gateway.rs` - HTTP routes over the manager
//! - `logging.rs` - Subscriber setup

pub mod config;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod manager;

pub use config::{GatewayConfig, StorageConfig};
pub use error::{ConfigError, ManagerError, Result};
pub use gateway::{GatewayState, router};
pub use logging::init_logging;
pub use manager::FileManager;

pub use cdcfile_model::{FileCategory, FileRecord, LocationRecord, Urn};
