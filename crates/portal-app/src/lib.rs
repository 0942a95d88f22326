//! Portal App - Headless Registry Client Core
//!
//! Client-side synchronization and mutation protocol for a single remote
//! append-only registry. Hosts construct a [`PortalApp`] with a wallet, a
//! registry RPC handler and the session's [`RegistrySessionConfig`], call
//! [`PortalApp::start`] once, then drive it from user actions.
//!
//! # Components
//!
//! - [`session`]: wallet identity, silent and interactive connect
//! - [`client`]: initialize, append and fetch against the registry
//! - [`machine`]: the application phase reducer
//! - [`sync`]: optimistic list with rollback
//! - [`portal`]: the orchestrator wiring the four together
//!
//! # Features
//!
//! - `signals`: `PortalApp::snapshot_signal` via `futures-signals`
//!
//! [`RegistrySessionConfig`]: portal_core::RegistrySessionConfig

#![forbid(unsafe_code)]

pub mod client;
pub mod machine;
pub mod portal;
pub mod session;
pub mod sync;

pub use client::{validate_link, RegistryClient};
pub use machine::{
    Failure, Operation, PhaseView, RegistryEvent, RegistryPhase, RegistryStateMachine,
};
pub use portal::{PortalApp, PortalSnapshot};
pub use session::IdentitySession;
pub use sync::{CorrelationToken, DisplayState, ListItem, OptimisticListSync, PendingSubmission};

pub use portal_core::{Ack, Entry, ErrorCategory, ErrorKind, Identity, PortalError, RegistryAccount};
