//! Fault-injecting registry wrapper
//!
//! Wraps any [`RegistryRpc`] and lets a test make the next call of a given
//! operation fail, or hold appends open so a second submission can be
//! issued while the first is suspended.

use async_trait::async_trait;
use parking_lot::Mutex;
use portal_core::effects::{RegistryRpc, RpcError};
use portal_core::{
    AccountsMap, Ack, Cosignature, RegistryAccount, RegistryAddress, RegistryOperation,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Notify;

/// Handle controlling a held append.
#[derive(Debug, Clone, Default)]
pub struct AppendGate {
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

impl AppendGate {
    /// Wait until an append reaches the gate.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    /// Let the held append proceed.
    pub fn release(&self) {
        self.release.notify_one();
    }
}

/// [`RegistryRpc`] wrapper with scripted failures.
pub struct FaultyRegistry {
    inner: Arc<dyn RegistryRpc>,
    failures: Mutex<HashMap<RegistryOperation, Vec<RpcError>>>,
    gate: Mutex<Option<AppendGate>>,
    calls: Mutex<Vec<RegistryOperation>>,
}

impl FaultyRegistry {
    /// Wrap `inner`.
    pub fn new(inner: Arc<dyn RegistryRpc>) -> Self {
        Self {
            inner,
            failures: Mutex::new(HashMap::new()),
            gate: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fail the next call of `operation` with `error` without reaching the
    /// wrapped handler. Queued failures apply in order.
    pub fn fail_next(&self, operation: RegistryOperation, error: RpcError) {
        self.failures
            .lock()
            .entry(operation)
            .or_default()
            .push(error);
    }

    /// Hold the next append until the returned gate is released.
    pub fn hold_next_append(&self) -> AppendGate {
        let gate = AppendGate::default();
        *self.gate.lock() = Some(gate.clone());
        gate
    }

    /// Every call received, in order, including injected failures.
    pub fn calls(&self) -> Vec<RegistryOperation> {
        self.calls.lock().clone()
    }

    /// Calls received for `operation`.
    pub fn call_count(&self, operation: RegistryOperation) -> usize {
        self.calls.lock().iter().filter(|op| **op == operation).count()
    }

    fn begin(&self, operation: RegistryOperation) -> Result<(), RpcError> {
        self.calls.lock().push(operation);
        let mut failures = self.failures.lock();
        match failures.get_mut(&operation) {
            Some(queue) if !queue.is_empty() => Err(queue.remove(0)),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl RegistryRpc for FaultyRegistry {
    async fn initialize(
        &self,
        accounts: AccountsMap,
        signers: Vec<Cosignature>,
    ) -> Result<Ack, RpcError> {
        self.begin(RegistryOperation::Initialize)?;
        self.inner.initialize(accounts, signers).await
    }

    async fn append_entry(
        &self,
        link: String,
        accounts: AccountsMap,
        signers: Vec<Cosignature>,
    ) -> Result<Ack, RpcError> {
        let gate = self.gate.lock().take();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        self.begin(RegistryOperation::AppendEntry)?;
        self.inner.append_entry(link, accounts, signers).await
    }

    async fn fetch_account(&self, address: RegistryAddress) -> Result<RegistryAccount, RpcError> {
        self.begin(RegistryOperation::Fetch)?;
        self.inner.fetch_account(address).await
    }
}

impl std::fmt::Debug for FaultyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaultyRegistry")
            .field("calls", &self.calls.lock().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{identity, KeyFixture};
    use crate::TEST_PROGRAM_ID;
    use assert_matches::assert_matches;
    use portal_effects::InMemoryRegistryProgram;

    fn registry() -> FaultyRegistry {
        FaultyRegistry::new(Arc::new(InMemoryRegistryProgram::new(TEST_PROGRAM_ID)))
    }

    #[tokio::test]
    async fn test_injected_failure_applies_once() {
        let registry = registry();
        let address = KeyFixture::from_seed_string("r").registry_address();
        registry.fail_next(
            RegistryOperation::Fetch,
            RpcError::Transport("timeout".into()),
        );

        assert_matches!(
            registry.fetch_account(address).await,
            Err(RpcError::Transport(_))
        );
        assert_matches!(
            registry.fetch_account(address).await,
            Err(RpcError::AccountNotFound)
        );
        assert_eq!(registry.call_count(RegistryOperation::Fetch), 2);
    }

    #[tokio::test]
    async fn test_held_append_waits_for_release() {
        let registry = registry();
        let gate = registry.hold_next_append();
        let accounts = AccountsMap::for_append(
            KeyFixture::from_seed_string("r").registry_address(),
            identity("alice"),
        );

        let append = registry.append_entry("a".into(), accounts, Vec::new());
        let control = async {
            gate.entered().await;
            assert!(registry.calls().is_empty());
            gate.release();
        };
        let (result, ()) = futures::join!(append, control);
        assert_matches!(result, Err(RpcError::AccountNotFound));
    }
}
