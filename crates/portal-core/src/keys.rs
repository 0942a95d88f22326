//! Registry Keypair
//!
//! The registry address is the public half of a locally held ed25519 keypair.
//! The keypair co-signs the call that creates the registry account so the
//! remote program can check the creator controls the address.
//!
//! ## Security
//!
//! The signing key is secret material. It is never logged; `Debug` prints the
//! address only.

use crate::identifiers::RegistryAddress;
use crate::registry::{AccountsMap, RegistryOperation};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of a serialized keypair: 32-byte secret followed by 32-byte public key.
pub const KEYPAIR_LENGTH: usize = 64;

/// Length of a bare secret key.
pub const SECRET_KEY_LENGTH: usize = 32;

/// Error building a keypair from stored bytes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyMaterialError {
    /// Neither a bare secret nor a full keypair
    #[error("key material must be {SECRET_KEY_LENGTH} or {KEYPAIR_LENGTH} bytes, got {0}")]
    InvalidLength(usize),
    /// The public half does not belong to the secret half
    #[error("stored public key does not match the secret key")]
    PublicKeyMismatch,
}

/// Locally held keypair whose public key is the registry address.
#[derive(Clone)]
pub struct RegistryKeypair {
    signing_key: SigningKey,
}

impl RegistryKeypair {
    /// Generate a fresh keypair from the operating system RNG.
    pub fn generate() -> Self {
        let mut rng = rand::rngs::OsRng;
        Self {
            signing_key: SigningKey::generate(&mut rng),
        }
    }

    /// Build from a 32-byte secret key.
    pub fn from_secret_bytes(secret: &[u8; SECRET_KEY_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(secret),
        }
    }

    /// Build from stored key material.
    ///
    /// Accepts either a bare 32-byte secret or the 64-byte `secret || public`
    /// layout, in which case the public half must match.
    pub fn from_key_material(bytes: &[u8]) -> Result<Self, KeyMaterialError> {
        match bytes.len() {
            SECRET_KEY_LENGTH => {
                let mut secret = [0u8; SECRET_KEY_LENGTH];
                secret.copy_from_slice(bytes);
                Ok(Self::from_secret_bytes(&secret))
            }
            KEYPAIR_LENGTH => {
                let mut keypair = [0u8; KEYPAIR_LENGTH];
                keypair.copy_from_slice(bytes);
                SigningKey::from_keypair_bytes(&keypair)
                    .map(|signing_key| Self { signing_key })
                    .map_err(|_| KeyMaterialError::PublicKeyMismatch)
            }
            other => Err(KeyMaterialError::InvalidLength(other)),
        }
    }

    /// Serialize as `secret || public`.
    pub fn to_keypair_bytes(&self) -> [u8; KEYPAIR_LENGTH] {
        self.signing_key.to_keypair_bytes()
    }

    /// Registry address controlled by this keypair.
    pub fn address(&self) -> RegistryAddress {
        RegistryAddress::from_bytes(self.signing_key.verifying_key().to_bytes())
    }

    /// Co-sign a request message.
    pub fn cosign(&self, message: &[u8]) -> Cosignature {
        let signature = self.signing_key.sign(message);
        Cosignature {
            address: self.address(),
            signature: signature.to_bytes().to_vec(),
        }
    }
}

impl fmt::Debug for RegistryKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryKeypair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// A signature over a request by the keypair controlling `address`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cosignature {
    /// Address whose keypair produced the signature
    pub address: RegistryAddress,
    /// 64-byte ed25519 signature
    pub signature: Vec<u8>,
}

impl Cosignature {
    /// Check the signature against `message`.
    pub fn verify(&self, message: &[u8]) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(self.address.as_bytes()) else {
            return false;
        };
        let Ok(signature) = Signature::from_slice(&self.signature) else {
            return false;
        };
        verifying_key.verify(message, &signature).is_ok()
    }
}

#[derive(Serialize)]
struct RequestMessage<'a> {
    method: &'static str,
    accounts: &'a AccountsMap,
    link: Option<&'a str>,
}

/// Canonical bytes a request is co-signed over.
///
/// Both sides build the message from the same inputs, so a signature made
/// for one operation or account set never verifies for another.
pub fn request_message(
    operation: RegistryOperation,
    accounts: &AccountsMap,
    link: Option<&str>,
) -> Vec<u8> {
    let message = RequestMessage {
        method: operation.method_name(),
        accounts,
        link,
    };
    // Serializing a struct of strings and hex keys cannot fail.
    serde_json::to_vec(&message).unwrap_or_default()
}
