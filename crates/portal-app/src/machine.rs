//! Registry state machine
//!
//! Derives the single application phase from wallet and registry signals.
//! The machine is a pure reducer: [`RegistryStateMachine::apply`] takes an
//! event and moves to the next phase. The orchestrator feeds it events as
//! calls complete; nothing here performs I/O.
//!
//! ```text
//! Disconnected ──connect──▶ ConnectedUnknown ──fetch──▶ ConnectedUninitialized
//!                                   │                          │ initialize + fetch
//!                                   │                          ▼
//!                                   └────────fetch───────▶ ConnectedReady ◀─┐
//!                                                              └─append+fetch┘
//! any failure ──▶ ConnectedError ──successful fetch──▶ Ready | Uninitialized
//! ```

use portal_core::{ErrorCategory, ErrorKind, Identity, RegistryAccount, RegistryOperation};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Operations
// ============================================================================

/// Operation whose outcome is reported to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    /// Interactive wallet connect
    Connect,
    /// Registry creation
    Initialize,
    /// Link submission
    AppendEntry,
    /// Registry read
    Fetch,
}

impl From<RegistryOperation> for Operation {
    fn from(operation: RegistryOperation) -> Self {
        match operation {
            RegistryOperation::Initialize => Self::Initialize,
            RegistryOperation::AppendEntry => Self::AppendEntry,
            RegistryOperation::Fetch => Self::Fetch,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connect => "connect",
            Self::Initialize => "initialize",
            Self::AppendEntry => "appendEntry",
            Self::Fetch => "fetch",
        };
        f.write_str(name)
    }
}

/// The most recent failure, kept for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    /// Operation that failed
    pub operation: Operation,
    /// What went wrong
    pub kind: ErrorKind,
}

impl Failure {
    /// Category used for presentation.
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }
}

// ============================================================================
// Phases and Events
// ============================================================================

/// Application phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryPhase {
    /// No wallet identity
    Disconnected,
    /// Connected; registry state not yet fetched
    ConnectedUnknown {
        /// Connected wallet
        identity: Identity,
    },
    /// Connected; the registry account does not exist
    ConnectedUninitialized {
        /// Connected wallet
        identity: Identity,
    },
    /// Connected; the registry account was fetched
    ConnectedReady {
        /// Connected wallet
        identity: Identity,
        /// Last fetched account
        account: RegistryAccount,
    },
    /// Connected; the last operation failed
    ConnectedError {
        /// Connected wallet
        identity: Identity,
        /// The failure
        failure: Failure,
    },
}

impl RegistryPhase {
    /// Identity of a connected phase.
    pub fn identity(&self) -> Option<Identity> {
        match self {
            Self::Disconnected => None,
            Self::ConnectedUnknown { identity }
            | Self::ConnectedUninitialized { identity }
            | Self::ConnectedReady { identity, .. }
            | Self::ConnectedError { identity, .. } => Some(*identity),
        }
    }

    /// Short phase name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::ConnectedUnknown { .. } => "connected-unknown",
            Self::ConnectedUninitialized { .. } => "connected-uninitialized",
            Self::ConnectedReady { .. } => "connected-ready",
            Self::ConnectedError { .. } => "connected-error",
        }
    }

    /// What a renderer should show for this phase.
    pub fn view(&self) -> PhaseView {
        match self {
            Self::Disconnected => PhaseView::ConnectWallet,
            Self::ConnectedUnknown { .. } => PhaseView::Loading,
            Self::ConnectedUninitialized { .. } => PhaseView::InitializeRegistry,
            Self::ConnectedReady { .. } => PhaseView::Ready,
            Self::ConnectedError { failure, .. } => PhaseView::Failed {
                operation: failure.operation,
                category: failure.category(),
                hint: failure.category().resolution_hint().to_string(),
            },
        }
    }
}

impl fmt::Display for RegistryPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Render branch for a phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "camelCase")]
pub enum PhaseView {
    /// Show the connect button
    ConnectWallet,
    /// Registry state is loading
    Loading,
    /// Show the one-time initialization button
    InitializeRegistry,
    /// Show the submit form and the list
    Ready,
    /// Show the failure with a way forward
    Failed {
        /// Operation that failed
        operation: Operation,
        /// Failure category
        category: ErrorCategory,
        /// Resolution hint
        hint: String,
    },
}

/// Signals fed into the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    /// A wallet identity became available
    Connected(Identity),
    /// The wallet identity went away
    Disconnected,
    /// A fetch returned the account
    FetchSucceeded(RegistryAccount),
    /// A fetch found no account
    FetchNotFound,
    /// A mutating operation was confirmed
    OperationSucceeded(Operation),
    /// An operation failed
    OperationFailed {
        /// Operation that failed
        operation: Operation,
        /// What went wrong
        kind: ErrorKind,
    },
}

// ============================================================================
// State Machine
// ============================================================================

/// Single source of truth for the application phase.
#[derive(Debug, Clone)]
pub struct RegistryStateMachine {
    phase: RegistryPhase,
    last_failure: Option<Failure>,
}

impl Default for RegistryStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryStateMachine {
    /// Start disconnected.
    pub fn new() -> Self {
        Self {
            phase: RegistryPhase::Disconnected,
            last_failure: None,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> &RegistryPhase {
        &self.phase
    }

    /// Identity of the current phase.
    pub fn identity(&self) -> Option<Identity> {
        self.phase.identity()
    }

    /// The most recent failure, including ones that did not change phase.
    pub fn last_failure(&self) -> Option<Failure> {
        self.last_failure
    }

    /// Whether the phase is waiting on its automatic fetch.
    pub fn needs_fetch(&self) -> bool {
        matches!(self.phase, RegistryPhase::ConnectedUnknown { .. })
    }

    /// Render branch for the current phase.
    pub fn view(&self) -> PhaseView {
        self.phase.view()
    }

    /// Apply `event`, returning the new phase.
    pub fn apply(&mut self, event: RegistryEvent) -> &RegistryPhase {
        let previous = self.phase.name();
        let next = self.transition(event);
        if let Some(next) = next {
            self.phase = next;
        }
        if self.phase.name() != previous {
            tracing::info!(from = previous, to = self.phase.name(), "Registry phase changed");
        }
        &self.phase
    }

    fn transition(&mut self, event: RegistryEvent) -> Option<RegistryPhase> {
        match event {
            RegistryEvent::Connected(identity) => {
                self.last_failure = None;
                Some(RegistryPhase::ConnectedUnknown { identity })
            }
            RegistryEvent::Disconnected => {
                self.last_failure = None;
                Some(RegistryPhase::Disconnected)
            }
            RegistryEvent::OperationFailed { operation, kind } => {
                let failure = Failure { operation, kind };
                self.last_failure = Some(failure);
                self.on_failure(failure)
            }
            event => {
                let Some(identity) = self.identity() else {
                    tracing::debug!(?event, "Ignoring registry event while disconnected");
                    return None;
                };
                self.on_connected_event(identity, event)
            }
        }
    }

    fn on_connected_event(
        &mut self,
        identity: Identity,
        event: RegistryEvent,
    ) -> Option<RegistryPhase> {
        match event {
            RegistryEvent::FetchSucceeded(account) => {
                self.last_failure = None;
                Some(RegistryPhase::ConnectedReady { identity, account })
            }
            RegistryEvent::FetchNotFound => {
                self.last_failure = None;
                Some(RegistryPhase::ConnectedUninitialized { identity })
            }
            RegistryEvent::OperationSucceeded(Operation::Initialize) => {
                // The new account is only trusted once it has been fetched.
                Some(RegistryPhase::ConnectedUnknown { identity })
            }
            RegistryEvent::OperationSucceeded(operation) => {
                tracing::debug!(%operation, "Operation confirmed, awaiting fetch");
                None
            }
            RegistryEvent::Connected(_)
            | RegistryEvent::Disconnected
            | RegistryEvent::OperationFailed { .. } => None,
        }
    }

    fn on_failure(&self, failure: Failure) -> Option<RegistryPhase> {
        let category = failure.category();
        if failure.kind.is_wallet_level() {
            return match self.phase {
                RegistryPhase::Disconnected => None,
                _ => Some(RegistryPhase::Disconnected),
            };
        }
        if category == ErrorCategory::Input {
            // Rejected locally; nothing remote changed.
            return None;
        }
        let identity = self.identity()?;
        Some(RegistryPhase::ConnectedError { identity, failure })
    }
}
