//! Persisted registry keypair
//!
//! The registry address stays fixed across sessions when its keypair is kept
//! on disk. The file holds a JSON array of 64 byte values, the secret key
//! followed by the public key, which is the layout wallet CLIs write for
//! `keypair.json` files.

use portal_core::keys::KeyMaterialError;
use portal_core::{PortalError, RegistryKeypair};
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

/// Error type for keystore operations.
#[derive(Debug, thiserror::Error)]
pub enum KeystoreError {
    /// Reading or writing the key file failed
    #[error("key file {path}: {message}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying I/O error
        message: String,
    },
    /// The file was not a JSON byte array
    #[error("malformed key file: {0}")]
    Format(String),
    /// The bytes were not a usable keypair
    #[error(transparent)]
    KeyMaterial(#[from] KeyMaterialError),
}

impl From<KeystoreError> for PortalError {
    fn from(err: KeystoreError) -> Self {
        PortalError::keystore(err.to_string())
    }
}

/// Decode a keypair from its JSON byte-array form.
pub fn decode_keypair_json(contents: &str) -> Result<RegistryKeypair, KeystoreError> {
    let bytes: Zeroizing<Vec<u8>> = Zeroizing::new(
        serde_json::from_str(contents).map_err(|e| KeystoreError::Format(e.to_string()))?,
    );
    Ok(RegistryKeypair::from_key_material(&bytes)?)
}

/// Encode a keypair in its JSON byte-array form.
pub fn encode_keypair_json(keypair: &RegistryKeypair) -> String {
    let bytes = Zeroizing::new(keypair.to_keypair_bytes().to_vec());
    serde_json::to_string(&*bytes).unwrap_or_default()
}

/// A keypair file on disk.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct KeypairFile {
    path: PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl KeypairFile {
    /// Refer to the key file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the key file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, err: std::io::Error) -> KeystoreError {
        KeystoreError::Io {
            path: self.path.clone(),
            message: err.to_string(),
        }
    }

    /// Load the keypair. Called once at startup.
    pub async fn load(&self) -> Result<RegistryKeypair, KeystoreError> {
        let contents = Zeroizing::new(
            tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|e| self.io_error(e))?,
        );
        let keypair = decode_keypair_json(&contents)?;
        tracing::info!(
            path = %self.path.display(),
            registry = %keypair.address(),
            "Loaded registry keypair"
        );
        Ok(keypair)
    }

    /// Write the keypair, creating parent directories as needed.
    pub async fn save(&self, keypair: &RegistryKeypair) -> Result<(), KeystoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| self.io_error(e))?;
            }
        }
        let contents = Zeroizing::new(encode_keypair_json(keypair));
        tokio::fs::write(&self.path, contents.as_bytes())
            .await
            .map_err(|e| self.io_error(e))?;
        tracing::info!(path = %self.path.display(), "Saved registry keypair");
        Ok(())
    }

    /// Load the keypair, or generate and persist one when the file is absent.
    ///
    /// Returns the keypair and whether it was newly created.
    pub async fn load_or_generate(&self) -> Result<(RegistryKeypair, bool), KeystoreError> {
        match tokio::fs::try_exists(&self.path).await {
            Ok(true) => Ok((self.load().await?, false)),
            Ok(false) => {
                let keypair = RegistryKeypair::generate();
                self.save(&keypair).await?;
                Ok((keypair, true))
            }
            Err(e) => Err(self.io_error(e)),
        }
    }
}
