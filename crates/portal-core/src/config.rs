//! Per-session registry configuration
//!
//! A [`RegistrySessionConfig`] is built once when the host starts a session and
//! handed to every component that talks to the registry. Nothing reads the
//! registry address or signer from global state.

use crate::identifiers::{ProgramId, RegistryAddress};
use crate::keys::RegistryKeypair;

/// How the session's registry address was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrySource {
    /// Loaded from a persisted keypair; stable across sessions
    Persisted,
    /// Generated for this session only
    Ephemeral,
    /// Address supplied without key material; the session cannot initialize
    AddressOnly,
}

/// Immutable registry settings for one client session.
#[derive(Debug, Clone)]
pub struct RegistrySessionConfig {
    registry_address: RegistryAddress,
    signer: Option<RegistryKeypair>,
    program_id: ProgramId,
    source: RegistrySource,
}

impl RegistrySessionConfig {
    /// Session targeting the registry controlled by a persisted keypair.
    pub fn persisted(signer: RegistryKeypair, program_id: ProgramId) -> Self {
        Self {
            registry_address: signer.address(),
            signer: Some(signer),
            program_id,
            source: RegistrySource::Persisted,
        }
    }

    /// Session targeting a freshly generated registry.
    pub fn ephemeral(program_id: ProgramId) -> Self {
        let signer = RegistryKeypair::generate();
        Self {
            registry_address: signer.address(),
            signer: Some(signer),
            program_id,
            source: RegistrySource::Ephemeral,
        }
    }

    /// Session reading an existing registry it holds no key for.
    pub fn address_only(registry_address: RegistryAddress, program_id: ProgramId) -> Self {
        Self {
            registry_address,
            signer: None,
            program_id,
            source: RegistrySource::AddressOnly,
        }
    }

    /// The one registry this session targets.
    pub fn registry_address(&self) -> RegistryAddress {
        self.registry_address
    }

    /// Keypair co-signing registry creation, if held.
    pub fn signer(&self) -> Option<&RegistryKeypair> {
        self.signer.as_ref()
    }

    /// Remote registry program.
    pub fn program_id(&self) -> ProgramId {
        self.program_id
    }

    /// How the address was chosen.
    pub fn source(&self) -> RegistrySource {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persisted_address_follows_keypair() {
        let signer = RegistryKeypair::from_secret_bytes(&[4u8; 32]);
        let expected = signer.address();
        let config = RegistrySessionConfig::persisted(signer, ProgramId::from_bytes([1u8; 32]));
        assert_eq!(config.registry_address(), expected);
        assert_eq!(config.source(), RegistrySource::Persisted);
        assert!(config.signer().is_some());
    }

    #[test]
    fn test_ephemeral_sessions_differ() {
        let program = ProgramId::from_bytes([1u8; 32]);
        let a = RegistrySessionConfig::ephemeral(program);
        let b = RegistrySessionConfig::ephemeral(program);
        assert_ne!(a.registry_address(), b.registry_address());
    }

    #[test]
    fn test_address_only_has_no_signer() {
        let address = RegistryAddress::from_bytes([2u8; 32]);
        let config = RegistrySessionConfig::address_only(address, ProgramId::SYSTEM);
        assert!(config.signer().is_none());
        assert_eq!(config.registry_address(), address);
    }
}
