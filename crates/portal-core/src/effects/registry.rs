//! Remote registry RPC interface
//!
//! Three named remote procedures: `initialize`, `appendEntry` and an
//! account fetch by address. Mutating calls take the accounts map and the
//! list of co-signatures the remote program checks; the wallet signature is
//! applied by the implementation's own provider.

use super::MaybeSendSync;
use crate::identifiers::RegistryAddress;
use crate::keys::Cosignature;
use crate::registry::{AccountsMap, Ack, RegistryAccount};
use async_trait::async_trait;

/// Error type for remote registry calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RpcError {
    /// No account exists at the address
    #[error("account not found")]
    AccountNotFound,
    /// The address already holds an account
    #[error("account already initialized")]
    AccountAlreadyInitialized,
    /// A required co-signature was not supplied
    #[error("missing required signature for {0}")]
    MissingSignature(RegistryAddress),
    /// A supplied co-signature did not verify
    #[error("invalid signature for {0}")]
    InvalidSignature(RegistryAddress),
    /// The account has no room for another entry
    #[error("account data too small for another entry")]
    AccountFull,
    /// The remote program rejected the call
    #[error("rejected by registry program: {0}")]
    Rejected(String),
    /// The request never reached the remote or the response was lost
    #[error("transport error: {0}")]
    Transport(String),
}

/// Request/response surface of the remote registry program.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait RegistryRpc: MaybeSendSync {
    /// Create the registry account at `accounts.registry_address`.
    async fn initialize(
        &self,
        accounts: AccountsMap,
        signers: Vec<Cosignature>,
    ) -> Result<Ack, RpcError>;

    /// Append `{ link, submitter: accounts.user_identity }`.
    async fn append_entry(
        &self,
        link: String,
        accounts: AccountsMap,
        signers: Vec<Cosignature>,
    ) -> Result<Ack, RpcError>;

    /// Read the account at `address`.
    async fn fetch_account(&self, address: RegistryAddress) -> Result<RegistryAccount, RpcError>;
}
