//! Keypair-backed wallet
//!
//! A wallet whose identity is a locally held keypair, the way command-line
//! tooling signs with a key file instead of a browser extension. It never
//! prompts, so silent and interactive connects behave the same.

use async_trait::async_trait;
use parking_lot::Mutex;
use portal_core::effects::{ConnectOptions, WalletError, WalletProvider};
use portal_core::{Identity, RegistryKeypair};

/// [`WalletProvider`] over a local keypair.
#[derive(Debug)]
pub struct LocalWallet {
    keypair: RegistryKeypair,
    connected: Mutex<bool>,
}

impl LocalWallet {
    /// Wallet signing with `keypair`.
    pub fn new(keypair: RegistryKeypair) -> Self {
        Self {
            keypair,
            connected: Mutex::new(false),
        }
    }

    /// Wallet with a fresh keypair.
    pub fn generate() -> Self {
        Self::new(RegistryKeypair::generate())
    }

    /// Identity this wallet hands out.
    pub fn identity(&self) -> Identity {
        Identity::from_bytes(self.keypair.address().to_bytes())
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl WalletProvider for LocalWallet {
    fn is_available(&self) -> bool {
        true
    }

    fn is_trusted_provider_kind(&self) -> bool {
        true
    }

    async fn connect(&self, options: ConnectOptions) -> Result<Identity, WalletError> {
        *self.connected.lock() = true;
        tracing::debug!(
            identity = %self.identity(),
            silent = options.only_if_trusted,
            "Local wallet connected"
        );
        Ok(self.identity())
    }

    fn public_key(&self) -> Option<Identity> {
        self.connected.lock().then(|| self.identity())
    }

    async fn disconnect(&self) -> Result<(), WalletError> {
        *self.connected.lock() = false;
        Ok(())
    }
}
