//! Portal configuration
//!
//! TOML configuration with three sections:
//!
//! ```toml
//! [cluster]
//! endpoint = "https://api.devnet.solana.com"
//! commitment = "processed"
//! program_id = "..."          # hex
//!
//! [registry]
//! keypair_path = "registry.json"   # omit for a per-session registry
//!
//! [logging]
//! level = "info"
//! ```
//!
//! Environment variables `PORTAL_CLUSTER_ENDPOINT`, `PORTAL_REGISTRY_KEYPAIR`
//! and `PORTAL_LOG_LEVEL` override the file.

use portal_core::{PortalError, ProgramId, RegistrySessionConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default cluster endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.devnet.solana.com";

/// Default registry program id (hex).
pub const DEFAULT_PROGRAM_ID: &str =
    "7a1f4a6c3f0e5b1d2c9a8e7f6d5c4b3a29181716151413121110090807060504";

const VALID_COMMITMENTS: [&str; 3] = ["processed", "confirmed", "finalized"];
const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Remote cluster settings
    pub cluster: ClusterConfig,
    /// Registry identity settings
    pub registry: RegistryConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

/// Remote cluster settings.
///
/// `endpoint` and `commitment` are validated here and reported by hosts, but
/// only an RPC handler talking to a live cluster consumes them; the in-memory
/// program answers locally and ignores both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// RPC endpoint URL
    pub endpoint: String,
    /// Preflight commitment level
    pub commitment: String,
    /// Registry program id (hex)
    pub program_id: String,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            commitment: "processed".to_string(),
            program_id: DEFAULT_PROGRAM_ID.to_string(),
        }
    }
}

/// Registry identity settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Persisted keypair; a fresh registry is generated per session when absent
    pub keypair_path: Option<PathBuf>,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing level
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl PortalConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, PortalError> {
        toml::from_str(contents).map_err(|e| PortalError::config(format!("Invalid TOML: {e}")))
    }

    /// Load configuration from a file.
    pub fn load_from_file(path: &Path) -> Result<Self, PortalError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            PortalError::config(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Load the file when it exists, otherwise start from defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, PortalError> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Serialize to TOML text.
    pub fn to_toml_string(&self) -> Result<String, PortalError> {
        toml::to_string_pretty(self)
            .map_err(|e| PortalError::config(format!("Failed to serialize config: {e}")))
    }

    /// Apply `PORTAL_*` overrides from the process environment.
    pub fn merge_with_env(&mut self) {
        self.apply_overrides(std::env::vars());
    }

    /// Apply `PORTAL_*` overrides from an explicit variable list.
    pub fn apply_overrides<I, K, V>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (key, value) in vars {
            match key.as_ref() {
                "PORTAL_CLUSTER_ENDPOINT" => self.cluster.endpoint = value.into(),
                "PORTAL_REGISTRY_KEYPAIR" => {
                    self.registry.keypair_path = Some(PathBuf::from(value.into()));
                }
                "PORTAL_LOG_LEVEL" => self.logging.level = value.into(),
                _ => {}
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), PortalError> {
        let endpoint = self.cluster.endpoint.as_str();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(PortalError::config(format!(
                "cluster.endpoint must be an http(s) URL, got {endpoint:?}"
            )));
        }

        if !VALID_COMMITMENTS.contains(&self.cluster.commitment.as_str()) {
            return Err(PortalError::config(format!(
                "cluster.commitment must be one of {VALID_COMMITMENTS:?}, got {:?}",
                self.cluster.commitment
            )));
        }

        self.program_id()?;

        if !VALID_LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(PortalError::config(format!(
                "logging.level must be one of {VALID_LOG_LEVELS:?}, got {:?}",
                self.logging.level
            )));
        }

        Ok(())
    }

    /// Parsed registry program id.
    pub fn program_id(&self) -> Result<ProgramId, PortalError> {
        self.cluster
            .program_id
            .parse()
            .map_err(|e| PortalError::config(format!("cluster.program_id: {e}")))
    }

    /// Build the session's registry configuration.
    ///
    /// Loads (or creates) the persisted keypair when one is configured,
    /// otherwise generates a registry for this session only.
    #[cfg(not(target_arch = "wasm32"))]
    pub async fn registry_session(&self) -> Result<RegistrySessionConfig, PortalError> {
        let program_id = self.program_id()?;
        match &self.registry.keypair_path {
            Some(path) => {
                let (keypair, created) = crate::keystore::KeypairFile::new(path)
                    .load_or_generate()
                    .await?;
                if created {
                    tracing::info!(path = %path.display(), "Created new registry keypair");
                }
                Ok(RegistrySessionConfig::persisted(keypair, program_id))
            }
            None => {
                let session = RegistrySessionConfig::ephemeral(program_id);
                tracing::info!(
                    registry = %session.registry_address(),
                    "Using per-session registry"
                );
                Ok(session)
            }
        }
    }
}
