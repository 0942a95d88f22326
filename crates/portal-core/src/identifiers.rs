//! Core identifier types used across Portal
//!
//! Every identifier is a 32-byte ed25519 public key. They are kept as distinct
//! types so a wallet identity can never be passed where a registry address is
//! expected. All of them display and parse as lowercase hex and serialize as
//! hex strings.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Length in bytes of every key-shaped identifier.
pub const KEY_LENGTH: usize = 32;

/// Error returned when parsing an identifier from text or bytes fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierParseError {
    /// The input was not valid hex
    #[error("invalid hex: {0}")]
    InvalidHex(String),
    /// The decoded input had the wrong length
    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Required length
        expected: usize,
        /// Length actually supplied
        actual: usize,
    },
}

fn decode_key(s: &str) -> Result<[u8; KEY_LENGTH], IdentifierParseError> {
    let bytes = hex::decode(s).map_err(|e| IdentifierParseError::InvalidHex(e.to_string()))?;
    key_from_slice(&bytes)
}

fn key_from_slice(bytes: &[u8]) -> Result<[u8; KEY_LENGTH], IdentifierParseError> {
    bytes
        .try_into()
        .map_err(|_| IdentifierParseError::InvalidLength {
            expected: KEY_LENGTH,
            actual: bytes.len(),
        })
}

macro_rules! key_identifier {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name([u8; KEY_LENGTH]);

        impl $name {
            /// Create from raw key bytes
            pub const fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
                Self(bytes)
            }

            /// Create from a byte slice, checking the length
            pub fn try_from_slice(bytes: &[u8]) -> Result<Self, IdentifierParseError> {
                key_from_slice(bytes).map(Self)
            }

            /// Borrow the raw key bytes
            pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
                &self.0
            }

            /// Copy out the raw key bytes
            pub fn to_bytes(self) -> [u8; KEY_LENGTH] {
                self.0
            }

            /// Short prefix used in log lines
            pub fn short(&self) -> String {
                hex::encode(&self.0[..4])
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({}..)", $label, self.short())
            }
        }

        impl FromStr for $name {
            type Err = IdentifierParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                decode_key(s.trim()).map(Self)
            }
        }

        impl From<[u8; KEY_LENGTH]> for $name {
            fn from(bytes: [u8; KEY_LENGTH]) -> Self {
                Self(bytes)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

key_identifier!(
    /// Public key of the connected wallet.
    ///
    /// Stable for the lifetime of a wallet session; the session reports `None`
    /// once the wallet disconnects.
    Identity,
    "Identity"
);

key_identifier!(
    /// Address of the one registry account a client instance targets.
    ///
    /// Chosen once per session from the registry keypair and never changed.
    RegistryAddress,
    "RegistryAddress"
);

key_identifier!(
    /// Id of the remote registry program.
    ProgramId,
    "ProgramId"
);

impl ProgramId {
    /// Id of the system program that pays for account creation.
    pub const SYSTEM: ProgramId = ProgramId([0u8; KEY_LENGTH]);
}
