//! Shapes exchanged with the page's registry program object
//!
//! Requests go out as `{ accounts, signers, link }` with every key encoded
//! as hex. `fetch` resolves to `{ total, entries: [{ link, submitter }] }`
//! or `null`. Rejections may carry a `code` naming the program error.

use portal_core::effects::RpcError;
use portal_core::registry::RegistryInvariantError;
use portal_core::{AccountsMap, Cosignature, Entry, RegistryAccount};
use serde::{Deserialize, Serialize};

/// Outgoing mutation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRequest {
    /// Accounts the program reads and writes
    pub accounts: AccountsMap,
    /// Co-signatures the program checks
    pub signers: Vec<Cosignature>,
    /// Link being appended, for `appendEntry`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Account as returned by `fetch`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WireAccount {
    /// Stored total
    pub total: u64,
    /// Stored entries
    pub entries: Vec<Entry>,
}

impl TryFrom<WireAccount> for RegistryAccount {
    type Error = RegistryInvariantError;

    fn try_from(wire: WireAccount) -> Result<Self, Self::Error> {
        RegistryAccount::from_parts(wire.total, wire.entries)
    }
}

/// Map a rejection's `code` and message onto [`RpcError`].
///
/// Rejections without a code never reached the program.
pub fn classify_rejection(code: Option<&str>, message: String) -> RpcError {
    match code {
        Some("AccountNotFound") | Some("AccountNotInitialized") => RpcError::AccountNotFound,
        Some("AccountAlreadyInitialized") | Some("AccountAlreadyInUse") => {
            RpcError::AccountAlreadyInitialized
        }
        Some("AccountFull") | Some("AccountDidNotSerialize") => RpcError::AccountFull,
        Some(_) => RpcError::Rejected(message),
        None => RpcError::Transport(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use portal_core::{Identity, RegistryAddress};

    #[test]
    fn test_request_shape() {
        let request = WireRequest {
            accounts: AccountsMap::for_append(
                RegistryAddress::from_bytes([1u8; 32]),
                Identity::from_bytes([2u8; 32]),
            ),
            signers: Vec::new(),
            link: Some("https://example.com/a.gif".into()),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["link"], "https://example.com/a.gif");
        assert_eq!(
            json["accounts"]["user_identity"],
            Identity::from_bytes([2u8; 32]).to_string()
        );
    }

    #[test]
    fn test_account_count_is_checked() {
        let submitter = Identity::from_bytes([2u8; 32]).to_string();
        let good: WireAccount = serde_json::from_value(serde_json::json!({
            "total": 1,
            "entries": [{ "link": "a", "submitter": submitter }],
        }))
        .unwrap();
        assert_eq!(RegistryAccount::try_from(good).unwrap().total(), 1);

        let bad: WireAccount = serde_json::from_value(serde_json::json!({
            "total": 2,
            "entries": [{ "link": "a", "submitter": submitter }],
        }))
        .unwrap();
        assert!(RegistryAccount::try_from(bad).is_err());
    }

    #[test]
    fn test_classify_rejection() {
        assert_matches!(
            classify_rejection(Some("AccountAlreadyInUse"), "x".into()),
            RpcError::AccountAlreadyInitialized
        );
        assert_matches!(
            classify_rejection(Some("ConstraintSigner"), "x".into()),
            RpcError::Rejected(_)
        );
        assert_matches!(
            classify_rejection(None, "Failed to fetch".into()),
            RpcError::Transport(_)
        );
    }
}
