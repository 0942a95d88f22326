//! Portal Core - Registry Client Foundation
//!
//! This crate provides the foundational types and effect interfaces shared by
//! every Portal crate. It contains no I/O and no application logic.
//!
//! # Layout
//!
//! - [`identifiers`]: `Identity`, `RegistryAddress`, `ProgramId`
//! - [`registry`]: the registry data model (`Entry`, `RegistryAccount`, `AccountsMap`)
//! - [`keys`]: the locally held registry keypair and its co-signatures
//! - [`config`]: the explicit per-session configuration passed to every component
//! - [`errors`]: the client error taxonomy
//! - [`effects`]: the external collaborators (`WalletProvider`, `RegistryRpc`)

#![forbid(unsafe_code)]

/// Wallet, registry and program identifiers
pub mod identifiers;

/// Registry account and entry types
pub mod registry;

/// Registry keypair and request co-signing
pub mod keys;

/// Per-session registry configuration
pub mod config;

/// Unified error handling
pub mod errors;

/// External collaborator interfaces
pub mod effects;

pub use config::RegistrySessionConfig;
pub use errors::{ErrorCategory, ErrorKind, PortalError};
pub use identifiers::{Identity, ProgramId, RegistryAddress};
pub use keys::{Cosignature, RegistryKeypair};
pub use registry::{AccountsMap, Ack, Entry, RegistryAccount, RegistryOperation};
