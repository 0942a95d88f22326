//! # Portal Effects
//!
//! Handler implementations for the interfaces defined in `portal-core`,
//! plus the ambient pieces every native host needs:
//!
//! - [`program::InMemoryRegistryProgram`]: local registry program
//! - [`keystore`]: persisted registry keypair
//! - [`config::PortalConfig`]: TOML configuration
//! - [`logging::init_tracing`]: tracing subscriber setup
//! - [`wallet::LocalWallet`]: keypair-backed wallet for native hosts

#![forbid(unsafe_code)]

pub mod config;
pub mod keystore;
pub mod logging;
pub mod program;
pub mod wallet;

pub use config::PortalConfig;
#[cfg(not(target_arch = "wasm32"))]
pub use keystore::KeypairFile;
pub use keystore::KeystoreError;
pub use program::InMemoryRegistryProgram;
pub use wallet::LocalWallet;
