//! Property test strategies for Portal types
//!
//! ```rust
//! use portal_testkit::strategies::arb_link;
//! use proptest::prelude::*;
//!
//! proptest! {
//!     #[test]
//!     fn links_are_never_empty(link in arb_link()) {
//!         prop_assert!(!link.is_empty());
//!     }
//! }
//! ```

use proptest::prelude::*;

// Re-export proptest for convenience
pub use proptest;

use portal_core::{Entry, Identity, RegistryAccount};

/// Non-empty links shaped like the image URLs users submit.
pub fn arb_link() -> impl Strategy<Value = String> {
    "[a-z0-9]{1,24}".prop_map(|name| format!("https://example.com/{name}.gif"))
}

/// Arbitrary link text, including empty and non-URL strings.
pub fn arb_raw_link() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), ".{0,64}", arb_link()]
}

/// Identities from a small pool so submitters repeat.
pub fn arb_identity() -> impl Strategy<Value = Identity> {
    (0u8..8).prop_map(|seed| Identity::from_bytes([seed; 32]))
}

/// A registry entry.
pub fn arb_entry() -> impl Strategy<Value = Entry> {
    (arb_link(), arb_identity()).prop_map(|(link, submitter)| Entry::new(link, submitter))
}

/// A registry account with up to `max_entries` entries.
pub fn arb_account(max_entries: usize) -> impl Strategy<Value = RegistryAccount> {
    prop::collection::vec(arb_entry(), 0..=max_entries).prop_map(RegistryAccount::from_entries)
}

/// A sequence of links to submit.
pub fn arb_links(max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(arb_link(), 1..=max)
}
