//! Deterministic key fixtures

use portal_core::{Identity, RegistryAddress, RegistryKeypair};
use sha2::{Digest, Sha256};

/// Keys derived from a seed so tests are reproducible.
#[derive(Debug, Clone)]
pub struct KeyFixture {
    seed: [u8; 32],
}

impl KeyFixture {
    /// Fixture from raw seed bytes.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self { seed: *seed }
    }

    /// Fixture from a seed string.
    pub fn from_seed_string(seed: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(seed.as_bytes());
        let digest = hasher.finalize();
        let seed_bytes: [u8; 32] = digest[..32].try_into().unwrap_or([0u8; 32]);
        Self::from_seed(&seed_bytes)
    }

    /// Registry keypair for this seed.
    pub fn keypair(&self) -> RegistryKeypair {
        RegistryKeypair::from_secret_bytes(&self.seed)
    }

    /// Address controlled by [`Self::keypair`].
    pub fn registry_address(&self) -> RegistryAddress {
        self.keypair().address()
    }

    /// A wallet identity for this seed.
    ///
    /// Real wallets hand out ed25519 public keys, so the identity is the
    /// public key of the seed's keypair.
    pub fn identity(&self) -> Identity {
        Identity::from_bytes(self.keypair().address().to_bytes())
    }
}

/// Identity derived from a name, e.g. `identity("alice")`.
pub fn identity(name: &str) -> Identity {
    KeyFixture::from_seed_string(&format!("identity:{name}")).identity()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_are_deterministic() {
        let a = KeyFixture::from_seed_string("registry");
        let b = KeyFixture::from_seed_string("registry");
        assert_eq!(a.registry_address(), b.registry_address());
        assert_ne!(
            a.registry_address(),
            KeyFixture::from_seed_string("other").registry_address()
        );
        assert_eq!(identity("alice"), identity("alice"));
        assert_ne!(identity("alice"), identity("bob"));
    }
}
