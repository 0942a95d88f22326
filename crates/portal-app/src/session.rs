//! Wallet identity session
//!
//! Holds the identity handed over by the wallet provider, if any. The
//! session never talks to the registry; it only tracks who is connected.

use parking_lot::RwLock;
use portal_core::effects::{ConnectOptions, WalletError, WalletProvider};
use portal_core::{Identity, PortalError};
use std::sync::Arc;

/// Connect/disconnect of a wallet-provided identity.
pub struct IdentitySession {
    wallet: Arc<dyn WalletProvider>,
    identity: RwLock<Option<Identity>>,
}

impl IdentitySession {
    /// Create a disconnected session over `wallet`.
    pub fn new(wallet: Arc<dyn WalletProvider>) -> Self {
        Self {
            wallet,
            identity: RwLock::new(None),
        }
    }

    /// Currently connected identity.
    pub fn identity(&self) -> Option<Identity> {
        *self.identity.read()
    }

    /// Connected identity, or `NotConnected`.
    pub fn require_identity(&self) -> Result<Identity, PortalError> {
        self.identity().ok_or(PortalError::NotConnected)
    }

    /// Reconnect using a grant the user already gave this site.
    ///
    /// Never prompts. Every reason for not connecting is logged and
    /// reported as `None`.
    pub async fn connect_silently(&self) -> Option<Identity> {
        if !self.wallet.is_available() {
            tracing::warn!("No wallet provider found, install a wallet extension to continue");
            return None;
        }
        if !self.wallet.is_trusted_provider_kind() {
            tracing::debug!("Wallet provider is not a supported kind, skipping silent connect");
            return None;
        }

        match self.wallet.connect(ConnectOptions::silent()).await {
            Ok(identity) => {
                *self.identity.write() = Some(identity);
                tracing::info!(identity = %identity, "Wallet reconnected silently");
                Some(identity)
            }
            Err(WalletError::NotTrusted) => {
                tracing::debug!("No trusted wallet grant, waiting for explicit connect");
                None
            }
            Err(err) => {
                tracing::debug!(error = %err, "Silent wallet connect unavailable");
                None
            }
        }
    }

    /// Interactive connect; may prompt the user.
    pub async fn connect(&self) -> Result<Identity, PortalError> {
        if !self.wallet.is_available() {
            tracing::warn!("Connect requested without a wallet provider");
            return Err(PortalError::WalletUnavailable);
        }

        let identity = self
            .wallet
            .connect(ConnectOptions::interactive())
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "Wallet connect failed");
                PortalError::from(err)
            })?;

        *self.identity.write() = Some(identity);
        tracing::info!(identity = %identity, "Wallet connected");
        Ok(identity)
    }

    /// Forget the identity. Safe to call when already disconnected.
    pub async fn disconnect(&self) {
        let previous = self.identity.write().take();
        let Some(previous) = previous else {
            return;
        };

        if self.wallet.is_available() {
            if let Err(err) = self.wallet.disconnect().await {
                tracing::warn!(error = %err, "Wallet provider disconnect failed");
            }
        }
        tracing::info!(identity = %previous, "Wallet disconnected");
    }
}

impl std::fmt::Debug for IdentitySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentitySession")
            .field("identity", &self.identity())
            .finish_non_exhaustive()
    }
}
