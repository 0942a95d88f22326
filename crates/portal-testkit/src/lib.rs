//! Portal Testing Infrastructure
//!
//! Test doubles for the effect traits, deterministic key fixtures and
//! proptest strategies shared by the Portal test suites.
//!
//! ```toml
//! [dev-dependencies]
//! portal-testkit = { workspace = true }
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

pub mod keys;
pub mod registry;
pub mod strategies;
pub mod wallet;

pub use keys::KeyFixture;
pub use registry::{AppendGate, FaultyRegistry};
pub use wallet::MockWallet;

use portal_core::{ProgramId, RegistrySessionConfig};
use portal_effects::InMemoryRegistryProgram;
use std::sync::Arc;

/// Program id used by test registries.
pub const TEST_PROGRAM_ID: ProgramId = ProgramId::from_bytes([0x50; 32]);

/// Fresh in-memory program wrapped for fault injection.
pub fn test_registry() -> Arc<FaultyRegistry> {
    Arc::new(FaultyRegistry::new(Arc::new(InMemoryRegistryProgram::new(
        TEST_PROGRAM_ID,
    ))))
}

/// Session config over a deterministic registry keypair.
pub fn test_session(seed: &str) -> RegistrySessionConfig {
    RegistrySessionConfig::persisted(KeyFixture::from_seed_string(seed).keypair(), TEST_PROGRAM_ID)
}
