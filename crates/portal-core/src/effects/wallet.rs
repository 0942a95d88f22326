//! Wallet provider interface
//!
//! Mirrors the surface a browser wallet extension injects into the page:
//! availability, a provider-kind check, `connect({ onlyIfTrusted })` and the
//! connected public key.

use super::MaybeSendSync;
use crate::identifiers::Identity;
use async_trait::async_trait;

/// Options for a connection attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Only succeed if the user already trusted this site; never prompt
    pub only_if_trusted: bool,
}

impl ConnectOptions {
    /// Interactive connection that may prompt the user.
    pub const fn interactive() -> Self {
        Self {
            only_if_trusted: false,
        }
    }

    /// Silent connection using a previously granted trust.
    pub const fn silent() -> Self {
        Self {
            only_if_trusted: true,
        }
    }
}

/// Error type for wallet operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    /// No wallet provider is injected
    #[error("wallet provider unavailable")]
    Unavailable,
    /// Silent connection was refused because the site is not trusted yet
    #[error("site not trusted by wallet")]
    NotTrusted,
    /// The user declined the prompt
    #[error("user rejected the request")]
    UserRejected,
    /// Any other provider failure
    #[error("wallet provider error: {0}")]
    Provider(String),
}

/// A wallet able to hand the client an [`Identity`].
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait WalletProvider: MaybeSendSync {
    /// Whether a provider is injected at all.
    fn is_available(&self) -> bool;

    /// Whether the provider is a kind this client trusts for silent connects.
    fn is_trusted_provider_kind(&self) -> bool;

    /// Connect and return the wallet's public key.
    async fn connect(&self, options: ConnectOptions) -> Result<Identity, WalletError>;

    /// Public key of the current connection, if any.
    fn public_key(&self) -> Option<Identity>;

    /// Drop the current connection.
    async fn disconnect(&self) -> Result<(), WalletError>;
}
