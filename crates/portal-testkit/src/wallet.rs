//! Mock wallet provider
//!
//! Scriptable stand-in for a browser wallet extension: presence, provider
//! kind, whether the site is already trusted, whether the user accepts
//! the next prompt and whether the extension itself fails.

use async_trait::async_trait;
use parking_lot::Mutex;
use portal_core::effects::{ConnectOptions, WalletError, WalletProvider};
use portal_core::Identity;

#[derive(Debug, Default)]
struct WalletState {
    trusted: bool,
    reject_next_prompt: bool,
    provider_failure: Option<String>,
    connected: Option<Identity>,
    connect_calls: u64,
    prompts: u64,
    disconnects: u64,
}

/// Scriptable [`WalletProvider`].
#[derive(Debug)]
pub struct MockWallet {
    identity: Option<Identity>,
    trusted_kind: bool,
    state: Mutex<WalletState>,
}

impl MockWallet {
    /// An installed wallet holding `identity`; the site is not yet trusted.
    pub fn new(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
            trusted_kind: true,
            state: Mutex::new(WalletState::default()),
        }
    }

    /// No wallet installed.
    pub fn absent() -> Self {
        Self {
            identity: None,
            trusted_kind: false,
            state: Mutex::new(WalletState::default()),
        }
    }

    /// Installed wallet that already trusts the site.
    pub fn trusted(identity: Identity) -> Self {
        let wallet = Self::new(identity);
        wallet.grant_trust();
        wallet
    }

    /// Set whether the provider is a supported kind.
    pub fn with_trusted_kind(mut self, trusted_kind: bool) -> Self {
        self.trusted_kind = trusted_kind;
        self
    }

    /// Record that the user trusted this site.
    pub fn grant_trust(&self) {
        self.state.lock().trusted = true;
    }

    /// Make the user decline the next interactive prompt.
    pub fn reject_next_prompt(&self) {
        self.state.lock().reject_next_prompt = true;
    }

    /// Make the next `connect` fail inside the provider with `reason`.
    pub fn fail_next_connect(&self, reason: impl Into<String>) {
        self.state.lock().provider_failure = Some(reason.into());
    }

    /// Calls to `connect`, silent or not.
    pub fn connect_count(&self) -> u64 {
        self.state.lock().connect_calls
    }

    /// Interactive prompts shown to the user.
    pub fn prompt_count(&self) -> u64 {
        self.state.lock().prompts
    }

    /// Calls to `disconnect`.
    pub fn disconnect_count(&self) -> u64 {
        self.state.lock().disconnects
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    fn is_available(&self) -> bool {
        self.identity.is_some()
    }

    fn is_trusted_provider_kind(&self) -> bool {
        self.trusted_kind
    }

    async fn connect(&self, options: ConnectOptions) -> Result<Identity, WalletError> {
        let identity = self.identity.ok_or(WalletError::Unavailable)?;
        let mut state = self.state.lock();
        state.connect_calls += 1;
        if let Some(reason) = state.provider_failure.take() {
            return Err(WalletError::Provider(reason));
        }

        if options.only_if_trusted {
            if !state.trusted {
                return Err(WalletError::NotTrusted);
            }
        } else {
            state.prompts += 1;
            if std::mem::take(&mut state.reject_next_prompt) {
                return Err(WalletError::UserRejected);
            }
            state.trusted = true;
        }

        state.connected = Some(identity);
        Ok(identity)
    }

    fn public_key(&self) -> Option<Identity> {
        self.state.lock().connected
    }

    async fn disconnect(&self) -> Result<(), WalletError> {
        let mut state = self.state.lock();
        state.disconnects += 1;
        state.connected = None;
        Ok(())
    }
}
