//! In-memory registry program
//!
//! Local stand-in for the remote registry program. It enforces the contract
//! the client relies on:
//!
//! - `initialize` creates an empty account exactly once, requires the system
//!   program in the accounts map and a valid co-signature from the keypair
//!   controlling the registry address
//! - `appendEntry` requires an existing account and room in its fixed space
//! - `fetch` is a pure read
//!
//! Used by the CLI harness and by tests; it is not a consensus model.

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use portal_core::effects::{RegistryRpc, RpcError};
use portal_core::keys::request_message;
use portal_core::registry::ACCOUNT_SPACE;
use portal_core::{
    AccountsMap, Ack, Cosignature, Entry, ProgramId, RegistryAccount, RegistryAddress,
    RegistryOperation,
};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// In-memory registry program handler
pub struct InMemoryRegistryProgram {
    program_id: ProgramId,
    space: usize,
    accounts: RwLock<HashMap<RegistryAddress, RegistryAccount>>,
    calls: Mutex<HashMap<RegistryOperation, u64>>,
    slot: Mutex<u64>,
}

impl InMemoryRegistryProgram {
    /// Create a program with the default account space.
    pub fn new(program_id: ProgramId) -> Self {
        Self::with_space(program_id, ACCOUNT_SPACE)
    }

    /// Create a program allocating `space` bytes per registry account.
    pub fn with_space(program_id: ProgramId, space: usize) -> Self {
        Self {
            program_id,
            space,
            accounts: RwLock::new(HashMap::new()),
            calls: Mutex::new(HashMap::new()),
            slot: Mutex::new(0),
        }
    }

    /// Program id this handler answers for.
    pub fn program_id(&self) -> ProgramId {
        self.program_id
    }

    /// Bytes allocated per account.
    pub fn space(&self) -> usize {
        self.space
    }

    /// Number of registry accounts created so far.
    pub fn account_count(&self) -> usize {
        self.accounts.read().len()
    }

    /// Number of calls received for `operation`, successful or not.
    pub fn call_count(&self, operation: RegistryOperation) -> u64 {
        self.calls.lock().get(&operation).copied().unwrap_or(0)
    }

    /// Number of calls received across all operations.
    pub fn total_calls(&self) -> u64 {
        self.calls.lock().values().sum()
    }

    fn record_call(&self, operation: RegistryOperation) {
        *self.calls.lock().entry(operation).or_insert(0) += 1;
    }

    /// Produce a transaction signature for a confirmed call.
    fn confirm(&self, operation: RegistryOperation, accounts: &AccountsMap) -> Ack {
        let slot = {
            let mut slot = self.slot.lock();
            *slot += 1;
            *slot
        };
        let mut hasher = Sha256::new();
        hasher.update(self.program_id.as_bytes());
        hasher.update(slot.to_le_bytes());
        hasher.update(operation.method_name().as_bytes());
        hasher.update(accounts.registry_address.as_bytes());
        hasher.update(accounts.user_identity.as_bytes());
        Ack::new(hex::encode(hasher.finalize()))
    }

    fn check_creator_signature(
        accounts: &AccountsMap,
        signers: &[Cosignature],
    ) -> Result<(), RpcError> {
        let address = accounts.registry_address;
        let cosignature = signers
            .iter()
            .find(|signer| signer.address == address)
            .ok_or(RpcError::MissingSignature(address))?;
        let message = request_message(RegistryOperation::Initialize, accounts, None);
        if !cosignature.verify(&message) {
            return Err(RpcError::InvalidSignature(address));
        }
        Ok(())
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl RegistryRpc for InMemoryRegistryProgram {
    async fn initialize(
        &self,
        accounts: AccountsMap,
        signers: Vec<Cosignature>,
    ) -> Result<Ack, RpcError> {
        self.record_call(RegistryOperation::Initialize);
        tracing::debug!(registry = %accounts.registry_address, "program: initialize");

        if accounts.system_program_id != Some(ProgramId::SYSTEM) {
            return Err(RpcError::Rejected(
                "account creation requires the system program".to_string(),
            ));
        }
        Self::check_creator_signature(&accounts, &signers)?;

        let empty = RegistryAccount::empty();
        if empty.encoded_len() > self.space {
            return Err(RpcError::AccountFull);
        }

        {
            let mut registry = self.accounts.write();
            if registry.contains_key(&accounts.registry_address) {
                return Err(RpcError::AccountAlreadyInitialized);
            }
            registry.insert(accounts.registry_address, empty);
        }

        Ok(self.confirm(RegistryOperation::Initialize, &accounts))
    }

    async fn append_entry(
        &self,
        link: String,
        accounts: AccountsMap,
        _signers: Vec<Cosignature>,
    ) -> Result<Ack, RpcError> {
        self.record_call(RegistryOperation::AppendEntry);
        tracing::debug!(
            registry = %accounts.registry_address,
            link = %link,
            "program: appendEntry"
        );

        {
            let mut registry = self.accounts.write();
            let account = registry
                .get_mut(&accounts.registry_address)
                .ok_or(RpcError::AccountNotFound)?;
            let entry = Entry::new(link, accounts.user_identity);
            if !account.fits(&entry, self.space) {
                return Err(RpcError::AccountFull);
            }
            account.push(entry);
        }

        Ok(self.confirm(RegistryOperation::AppendEntry, &accounts))
    }

    async fn fetch_account(&self, address: RegistryAddress) -> Result<RegistryAccount, RpcError> {
        self.record_call(RegistryOperation::Fetch);
        self.accounts
            .read()
            .get(&address)
            .cloned()
            .ok_or(RpcError::AccountNotFound)
    }
}
