use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use axum::http::HeaderName;
use cdcfile_catalog::ManifestResolver;
use cdcfile_storage::{FsBlobFetcher, HttpBlobFetcher, ReqwestClient, StorageBackend};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::manager::FileManager;

pub const ENV_PREFIX: &str = "CDCFILE_";
pub const DEFAULT_FALLBACK_HEADER: &str = "x-fallback-urns";

/// Where blobs are read from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum StorageConfig {
    FileShare {
        root: PathBuf,
    },
    BlobContainer {
        #[serde(default)]
        timeout_secs: Option<u64>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub listen: SocketAddr,
    pub manifest_path: PathBuf,
    pub storage: StorageConfig,
    pub fetch_concurrency: usize,
    pub fallback_header: String,
}

/// Values used when neither the config file nor the environment sets them.
#[derive(Serialize)]
struct Defaults {
    listen: SocketAddr,
    fetch_concurrency: usize,
    fallback_header: &'static str,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 8080)),
            fetch_concurrency: 1,
            fallback_header: DEFAULT_FALLBACK_HEADER,
        }
    }
}

impl GatewayConfig {
    /// Defaults, then the TOML file (if any), then `CDCFILE_*` variables.
    /// Nested keys use `__`, e.g. `CDCFILE_STORAGE__KIND`.
    pub fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Defaults::default()));
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment(config_path))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch_concurrency == 0 {
            return Err(ConfigError::Invalid {
                field: "fetch_concurrency",
                reason: "must be at least 1".to_string(),
            });
        }
        self.fallback_header_name()?;
        Ok(())
    }

    pub fn fallback_header_name(&self) -> Result<HeaderName, ConfigError> {
        HeaderName::try_from(self.fallback_header.as_str()).map_err(|e| ConfigError::Invalid {
            field: "fallback_header",
            reason: e.to_string(),
        })
    }

    pub fn build_storage(&self) -> Result<StorageBackend, ConfigError> {
        let backend = match &self.storage {
            StorageConfig::FileShare { root } => StorageBackend::FileShare(FsBlobFetcher::new(root)),
            StorageConfig::BlobContainer { timeout_secs } => {
                let client = ReqwestClient::new(timeout_secs.map(Duration::from_secs))
                    .map_err(|e| ConfigError::Client(Box::new(e)))?;
                StorageBackend::BlobContainer(HttpBlobFetcher::new(client))
            }
        };
        Ok(backend)
    }

    pub fn build_manager(&self) -> Result<FileManager<ManifestResolver, StorageBackend>, ConfigError> {
        let storage = self.build_storage()?;
        tracing::info!(storage = storage.name(), manifest = %self.manifest_path.display(), "storage configured");
        Ok(FileManager::new(ManifestResolver::from_path(&self.manifest_path), storage)
            .with_fetch_concurrency(self.fetch_concurrency))
    }
}
