//! Registry Data Model
//!
//! The registry is a single remote account holding an ordered list of
//! [`Entry`] values and a running total. The account is owned by the remote
//! program; the client only ever sees snapshots of it returned by a fetch.

use crate::identifiers::{Identity, ProgramId, RegistryAddress, KEY_LENGTH};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bytes allocated for a registry account when it is created.
pub const ACCOUNT_SPACE: usize = 9000;

/// Account type discriminator written ahead of the account data.
pub const DISCRIMINATOR_LEN: usize = 8;

const TOTAL_LEN: usize = 8;
const VEC_LEN_PREFIX: usize = 4;
const STRING_LEN_PREFIX: usize = 4;

// ============================================================================
// Entries
// ============================================================================

/// One confirmed `(link, submitter)` pair stored in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entry {
    /// Submitted link, stored verbatim
    pub link: String,
    /// Wallet that submitted the link
    pub submitter: Identity,
}

impl Entry {
    /// Create a new entry.
    pub fn new(link: impl Into<String>, submitter: Identity) -> Self {
        Self {
            link: link.into(),
            submitter,
        }
    }

    /// Bytes this entry occupies inside the account data.
    pub fn encoded_len(&self) -> usize {
        STRING_LEN_PREFIX + self.link.len() + KEY_LENGTH
    }
}

// ============================================================================
// Registry Account
// ============================================================================

/// Remote-owned aggregate holding every confirmed entry.
///
/// `total` always equals `entries.len()` and never decreases over the life
/// of the account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryAccount {
    total: u64,
    entries: Vec<Entry>,
}

impl RegistryAccount {
    /// A freshly initialized, empty account.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Rebuild an account from fetched parts, checking the count invariant.
    pub fn from_parts(total: u64, entries: Vec<Entry>) -> Result<Self, RegistryInvariantError> {
        if total != entries.len() as u64 {
            return Err(RegistryInvariantError::CountMismatch {
                total,
                entries: entries.len(),
            });
        }
        Ok(Self { total, entries })
    }

    /// Build an account from a list of entries.
    pub fn from_entries(entries: Vec<Entry>) -> Self {
        Self {
            total: entries.len() as u64,
            entries,
        }
    }

    /// Number of entries ever appended.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Entries in append order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Consume the account, returning its entries.
    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }

    /// Whether the account holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether an entry with this link has been confirmed.
    pub fn contains_link(&self, link: &str) -> bool {
        self.entries.iter().any(|entry| entry.link == link)
    }

    /// Append an entry. Only the remote program mutates accounts.
    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
        self.total += 1;
    }

    /// Bytes the account data occupies, discriminator included.
    pub fn encoded_len(&self) -> usize {
        DISCRIMINATOR_LEN
            + TOTAL_LEN
            + VEC_LEN_PREFIX
            + self.entries.iter().map(Entry::encoded_len).sum::<usize>()
    }

    /// Whether appending `entry` would still fit in `space` bytes.
    pub fn fits(&self, entry: &Entry, space: usize) -> bool {
        self.encoded_len() + entry.encoded_len() <= space
    }
}

/// A fetched account that violates `total == entries.len()`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryInvariantError {
    /// Reported total disagrees with the entry list
    #[error("registry total {total} does not match {entries} entries")]
    CountMismatch {
        /// Reported total
        total: u64,
        /// Actual entry count
        entries: usize,
    },
}

// ============================================================================
// Remote call shapes
// ============================================================================

/// Accounts passed alongside every remote registry call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountsMap {
    /// Registry account being created or mutated
    pub registry_address: RegistryAddress,
    /// Wallet paying for and signing the call
    pub user_identity: Identity,
    /// System program, required only when the call creates an account
    pub system_program_id: Option<ProgramId>,
}

impl AccountsMap {
    /// Accounts for creating the registry.
    pub fn for_initialize(registry_address: RegistryAddress, user_identity: Identity) -> Self {
        Self {
            registry_address,
            user_identity,
            system_program_id: Some(ProgramId::SYSTEM),
        }
    }

    /// Accounts for appending to an existing registry.
    pub fn for_append(registry_address: RegistryAddress, user_identity: Identity) -> Self {
        Self {
            registry_address,
            user_identity,
            system_program_id: None,
        }
    }
}

/// Acknowledgement of a confirmed mutating call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    /// Transaction signature reported by the remote
    pub signature: String,
}

impl Ack {
    /// Create an acknowledgement for a transaction signature.
    pub fn new(signature: impl Into<String>) -> Self {
        Self {
            signature: signature.into(),
        }
    }
}

/// The three remote registry operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegistryOperation {
    /// Create the registry account
    Initialize,
    /// Append one entry
    AppendEntry,
    /// Read the account
    Fetch,
}

impl RegistryOperation {
    /// Whether the operation changes remote state.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::Fetch)
    }

    /// Remote procedure name.
    pub fn method_name(&self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::AppendEntry => "appendEntry",
            Self::Fetch => "fetch",
        }
    }
}

impl fmt::Display for RegistryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn submitter() -> Identity {
        Identity::from_bytes([3u8; KEY_LENGTH])
    }

    #[test]
    fn test_empty_account() {
        let account = RegistryAccount::empty();
        assert_eq!(account.total(), 0);
        assert!(account.entries().is_empty());
        assert_eq!(account.encoded_len(), 20);
    }

    #[test]
    fn test_push_keeps_total_in_step() {
        let mut account = RegistryAccount::empty();
        account.push(Entry::new("https://example.com/a.gif", submitter()));
        account.push(Entry::new("https://example.com/b.gif", submitter()));
        assert_eq!(account.total(), 2);
        assert_eq!(account.entries().len(), 2);
        assert!(account.contains_link("https://example.com/b.gif"));
    }

    #[test]
    fn test_from_parts_rejects_count_mismatch() {
        let err = RegistryAccount::from_parts(2, vec![Entry::new("x", submitter())]).unwrap_err();
        assert_matches!(
            err,
            RegistryInvariantError::CountMismatch {
                total: 2,
                entries: 1
            }
        );
    }

    #[test]
    fn test_entry_size_accounting() {
        let entry = Entry::new("abcd", submitter());
        assert_eq!(entry.encoded_len(), 4 + 4 + 32);

        let account = RegistryAccount::from_entries(vec![entry.clone()]);
        assert_eq!(account.encoded_len(), 20 + 40);
        assert!(account.fits(&entry, 100));
        assert!(!account.fits(&entry, 99));
    }

    #[test]
    fn test_accounts_map_shapes() {
        let address = RegistryAddress::from_bytes([9u8; KEY_LENGTH]);
        let init = AccountsMap::for_initialize(address, submitter());
        assert_eq!(init.system_program_id, Some(ProgramId::SYSTEM));

        let append = AccountsMap::for_append(address, submitter());
        assert_eq!(append.system_program_id, None);
    }

    #[test]
    fn test_operation_names() {
        assert_eq!(RegistryOperation::Initialize.to_string(), "initialize");
        assert_eq!(RegistryOperation::AppendEntry.to_string(), "appendEntry");
        assert!(!RegistryOperation::Fetch.is_mutation());
    }

    proptest::proptest! {
        #[test]
        fn test_total_tracks_pushes(links in proptest::collection::vec("[a-z]{0,40}", 0..32)) {
            let mut account = RegistryAccount::empty();
            let mut last_total = 0;
            for link in links {
                account.push(Entry::new(link, submitter()));
                proptest::prop_assert_eq!(account.total(), last_total + 1);
                last_total = account.total();
            }
            proptest::prop_assert_eq!(account.total(), account.entries().len() as u64);
        }

        #[test]
        fn test_fits_matches_encoded_len(link in "[a-z]{0,64}", space in 20usize..200) {
            let account = RegistryAccount::empty();
            let entry = Entry::new(link, submitter());
            let mut grown = account.clone();
            grown.push(entry.clone());
            proptest::prop_assert_eq!(account.fits(&entry, space), grown.encoded_len() <= space);
        }
    }
}
