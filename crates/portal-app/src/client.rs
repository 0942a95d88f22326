//! Registry client
//!
//! The three remote operations against the session's registry address.
//! Every call is a single attempt; failures are mapped into [`PortalError`]
//! and handed back to the caller.

use portal_core::effects::RegistryRpc;
use portal_core::keys::request_message;
use portal_core::{
    AccountsMap, Ack, Identity, PortalError, RegistryAccount, RegistryAddress, RegistryOperation,
    RegistrySessionConfig,
};
use std::sync::Arc;

/// Reject links the registry must never store.
///
/// Only the empty string is refused; links are otherwise stored verbatim.
pub fn validate_link(link: &str) -> Result<(), PortalError> {
    if link.is_empty() {
        return Err(PortalError::EmptyLink);
    }
    Ok(())
}

/// Client for the one registry a session targets.
pub struct RegistryClient {
    rpc: Arc<dyn RegistryRpc>,
    config: RegistrySessionConfig,
}

impl RegistryClient {
    /// Create a client for `config`'s registry.
    pub fn new(rpc: Arc<dyn RegistryRpc>, config: RegistrySessionConfig) -> Self {
        Self { rpc, config }
    }

    /// Session configuration this client was built with.
    pub fn config(&self) -> &RegistrySessionConfig {
        &self.config
    }

    /// Address of the targeted registry.
    pub fn registry_address(&self) -> RegistryAddress {
        self.config.registry_address()
    }

    /// Create the registry account, paid for by `identity`.
    ///
    /// The request is co-signed by the session's registry keypair when one
    /// is held. An existing account is reported as `AlreadyInitialized`.
    pub async fn initialize(&self, identity: Identity) -> Result<Ack, PortalError> {
        let operation = RegistryOperation::Initialize;
        let accounts = AccountsMap::for_initialize(self.registry_address(), identity);
        let signers = self
            .config
            .signer()
            .map(|keypair| keypair.cosign(&request_message(operation, &accounts, None)))
            .into_iter()
            .collect::<Vec<_>>();

        tracing::debug!(
            registry = %accounts.registry_address,
            identity = %identity,
            cosigners = signers.len(),
            "Initializing registry"
        );

        let result = self.rpc.initialize(accounts, signers).await;
        self.finish(operation, result)
    }

    /// Append `link` with `identity` recorded as the submitter.
    ///
    /// Empty links are refused before any remote call.
    pub async fn append_entry(&self, identity: Identity, link: &str) -> Result<Ack, PortalError> {
        validate_link(link)?;

        let operation = RegistryOperation::AppendEntry;
        let accounts = AccountsMap::for_append(self.registry_address(), identity);
        tracing::debug!(
            registry = %accounts.registry_address,
            identity = %identity,
            link,
            "Appending registry entry"
        );

        let result = self
            .rpc
            .append_entry(link.to_string(), accounts, Vec::new())
            .await;
        self.finish(operation, result)
    }

    /// Read the current account. `NotFound` when it was never initialized.
    pub async fn fetch(&self) -> Result<RegistryAccount, PortalError> {
        let operation = RegistryOperation::Fetch;
        let address = self.registry_address();
        tracing::debug!(registry = %address, "Fetching registry");

        let result = self.rpc.fetch_account(address).await;
        let account = self.finish(operation, result)?;
        tracing::debug!(registry = %address, total = account.total(), "Fetched registry");
        Ok(account)
    }

    fn finish<T>(
        &self,
        operation: RegistryOperation,
        result: Result<T, portal_core::effects::RpcError>,
    ) -> Result<T, PortalError> {
        result.map_err(|err| {
            let mapped = PortalError::from_rpc(operation, err);
            if mapped == PortalError::NotFound {
                tracing::debug!(registry = %self.registry_address(), "Registry account not found");
            } else {
                tracing::warn!(
                    registry = %self.registry_address(),
                    operation = %operation,
                    error = %mapped,
                    "Registry call failed"
                );
            }
            mapped
        })
    }
}

impl std::fmt::Debug for RegistryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
