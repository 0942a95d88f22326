//! Portal application orchestrator
//!
//! [`PortalApp`] wires the identity session, the registry client, the state
//! machine and the optimistic list together. Hosts (the browser binding,
//! the CLI harness) drive it and render [`PortalSnapshot`]s.
//!
//! Internal state sits behind short synchronous locks that are released
//! before every remote call, so a second submission issued while the first
//! is suspended observes `SubmissionInFlight`.

use crate::client::RegistryClient;
use crate::machine::{
    Failure, Operation, PhaseView, RegistryEvent, RegistryPhase, RegistryStateMachine,
};
use crate::session::IdentitySession;
use crate::sync::{ListItem, OptimisticListSync};
use parking_lot::Mutex;
use portal_core::effects::{RegistryRpc, WalletProvider};
use portal_core::{
    Ack, Identity, PortalError, RegistryAccount, RegistryAddress, RegistrySessionConfig,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[cfg(feature = "signals")]
use futures_signals::signal::{Mutable, Signal};

/// Everything a renderer needs, captured at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalSnapshot {
    /// Render branch
    pub phase: PhaseView,
    /// Displayed list
    pub items: Vec<ListItem>,
    /// Whether the submit control should be disabled
    pub submitting: bool,
    /// Connected wallet
    pub identity: Option<Identity>,
    /// Targeted registry
    pub registry_address: RegistryAddress,
    /// Confirmed entry count from the last fetch
    pub total: Option<u64>,
    /// Most recent failure
    pub last_failure: Option<Failure>,
}

/// Headless registry client application.
pub struct PortalApp {
    session: IdentitySession,
    client: RegistryClient,
    machine: Mutex<RegistryStateMachine>,
    list: Mutex<OptimisticListSync>,
    #[cfg(feature = "signals")]
    snapshot: Mutable<PortalSnapshot>,
}

impl PortalApp {
    /// Create a disconnected application for one session.
    pub fn new(
        wallet: Arc<dyn WalletProvider>,
        rpc: Arc<dyn RegistryRpc>,
        config: RegistrySessionConfig,
    ) -> Self {
        tracing::debug!(
            registry = %config.registry_address(),
            program = %config.program_id(),
            "Creating portal app"
        );
        #[cfg(feature = "signals")]
        let initial = PortalSnapshot {
            phase: PhaseView::ConnectWallet,
            items: Vec::new(),
            submitting: false,
            identity: None,
            registry_address: config.registry_address(),
            total: None,
            last_failure: None,
        };
        Self {
            session: IdentitySession::new(wallet),
            client: RegistryClient::new(rpc, config),
            machine: Mutex::new(RegistryStateMachine::new()),
            list: Mutex::new(OptimisticListSync::new()),
            #[cfg(feature = "signals")]
            snapshot: Mutable::new(initial),
        }
    }

    /// Identity session.
    pub fn session(&self) -> &IdentitySession {
        &self.session
    }

    /// Registry client.
    pub fn client(&self) -> &RegistryClient {
        &self.client
    }

    /// Current phase.
    pub fn phase(&self) -> RegistryPhase {
        self.machine.lock().phase().clone()
    }

    // ========================================================================
    // Wallet
    // ========================================================================

    /// Startup hook: reconnect silently and load the registry.
    ///
    /// Invoked once by the host after construction.
    pub async fn start(&self) -> Option<Identity> {
        let identity = self.session.connect_silently().await?;
        self.on_connected(identity).await;
        Some(identity)
    }

    /// Interactive connect, followed by the automatic fetch.
    pub async fn connect(&self) -> Result<Identity, PortalError> {
        match self.session.connect().await {
            Ok(identity) => {
                self.on_connected(identity).await;
                Ok(identity)
            }
            Err(err) => {
                self.session.disconnect().await;
                self.list.lock().clear();
                self.machine.lock().apply(RegistryEvent::Disconnected);
                self.fail(Operation::Connect, &err);
                Err(err)
            }
        }
    }

    /// Disconnect and forget the displayed list.
    ///
    /// An append still outstanding keeps the submit guard until it settles.
    pub async fn disconnect(&self) {
        self.session.disconnect().await;
        self.list.lock().clear();
        self.apply(RegistryEvent::Disconnected);
    }

    async fn on_connected(&self, identity: Identity) {
        self.apply(RegistryEvent::Connected(identity));
        let needs_fetch = self.machine.lock().needs_fetch();
        if needs_fetch {
            // Failures are recorded in the phase.
            let _ = self.refresh().await;
        }
    }

    // ========================================================================
    // Registry
    // ========================================================================

    /// Fetch the registry and adopt the result.
    ///
    /// Returns `None` when the account does not exist yet.
    pub async fn refresh(&self) -> Result<Option<RegistryAccount>, PortalError> {
        match self.client.fetch().await {
            Ok(account) => {
                self.list.lock().replace_authoritative(&account);
                self.apply(RegistryEvent::FetchSucceeded(account.clone()));
                Ok(Some(account))
            }
            Err(PortalError::NotFound) => {
                self.list.lock().replace_authoritative(&RegistryAccount::empty());
                self.apply(RegistryEvent::FetchNotFound);
                Ok(None)
            }
            Err(err) => {
                self.fail(Operation::Fetch, &err);
                Err(err)
            }
        }
    }

    /// Create the registry account, then load it.
    pub async fn initialize_registry(&self) -> Result<Ack, PortalError> {
        let identity = self.require_identity(Operation::Initialize)?;

        let ack = match self.client.initialize(identity).await {
            Ok(ack) => ack,
            Err(err) => {
                self.fail(Operation::Initialize, &err);
                return Err(err);
            }
        };
        tracing::info!(signature = %ack.signature, "Registry initialized");
        self.apply(RegistryEvent::OperationSucceeded(Operation::Initialize));

        // A failed follow-up fetch is recorded in the phase; the account exists.
        let _ = self.refresh().await;
        Ok(ack)
    }

    /// Submit `link` optimistically.
    ///
    /// The link shows as pending until the append is confirmed and the
    /// registry re-fetched, and is rolled back if the append fails.
    pub async fn submit_link(&self, link: &str) -> Result<Ack, PortalError> {
        let identity = self.require_identity(Operation::AppendEntry)?;

        let begun = self.list.lock().begin_submit(link, identity);
        let token = match begun {
            Ok(token) => token,
            Err(err) => {
                self.fail(Operation::AppendEntry, &err);
                return Err(err);
            }
        };
        self.publish();

        let ack = match self.client.append_entry(identity, link).await {
            Ok(ack) => ack,
            Err(err) => {
                self.list.lock().rollback(token);
                self.fail(Operation::AppendEntry, &err);
                return Err(err);
            }
        };
        tracing::info!(signature = %ack.signature, link, "Link submitted");
        self.apply(RegistryEvent::OperationSucceeded(Operation::AppendEntry));

        match self.client.fetch().await {
            Ok(account) => {
                let connected = self.session.identity().is_some();
                {
                    let mut list = self.list.lock();
                    list.reconcile(token, &account);
                    if connected {
                        // The row is gone when the wallet reconnected meanwhile.
                        list.replace_authoritative(&account);
                    }
                }
                self.apply(RegistryEvent::FetchSucceeded(account));
            }
            Err(err) => {
                self.list.lock().acknowledge(token);
                self.fail(Operation::Fetch, &err);
            }
        }
        Ok(ack)
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    /// Capture the current state for rendering.
    pub fn snapshot(&self) -> PortalSnapshot {
        let (phase, identity, total, last_failure) = {
            let machine = self.machine.lock();
            let total = match machine.phase() {
                RegistryPhase::ConnectedReady { account, .. } => Some(account.total()),
                _ => None,
            };
            (
                machine.view(),
                machine.identity(),
                total,
                machine.last_failure(),
            )
        };
        let (items, submitting) = {
            let list = self.list.lock();
            (list.items(), list.is_submitting())
        };

        PortalSnapshot {
            phase,
            items,
            submitting,
            identity,
            registry_address: self.client.registry_address(),
            total,
            last_failure,
        }
    }

    /// Signal re-emitting the snapshot after every state change.
    #[cfg(feature = "signals")]
    pub fn snapshot_signal(&self) -> impl Signal<Item = PortalSnapshot> {
        self.snapshot.signal_cloned()
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn require_identity(&self, operation: Operation) -> Result<Identity, PortalError> {
        self.session.require_identity().map_err(|err| {
            tracing::debug!(%operation, "Operation requires a connected wallet");
            self.fail(operation, &err);
            err
        })
    }

    fn apply(&self, event: RegistryEvent) {
        self.machine.lock().apply(event);
        self.publish();
    }

    fn fail(&self, operation: Operation, err: &PortalError) {
        self.apply(RegistryEvent::OperationFailed {
            operation,
            kind: err.kind(),
        });
    }

    #[cfg(feature = "signals")]
    fn publish(&self) {
        self.snapshot.set(self.snapshot());
    }

    #[cfg(not(feature = "signals"))]
    fn publish(&self) {}
}

impl std::fmt::Debug for PortalApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortalApp")
            .field("session", &self.session)
            .field("client", &self.client)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}
