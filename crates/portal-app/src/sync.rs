//! Optimistic list synchronization
//!
//! The displayed list is the last authoritative list fetched from the
//! registry plus at most one pending submission echoed locally while its
//! append is in flight. A pending entry leaves the list in exactly one of
//! two ways: superseded by the fetched list that contains it, or rolled
//! back when the append fails.
//!
//! The in-flight guard is tracked apart from the displayed row. Clearing the
//! list on disconnect drops the row, but the guard stays until the append
//! that owns it settles.

use crate::client::validate_link;
use portal_core::{Entry, Identity, PortalError, RegistryAccount};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one submission across its begin/reconcile/rollback calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CorrelationToken(u64);

impl CorrelationToken {
    /// Raw token value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CorrelationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "submission-{}", self.0)
    }
}

/// A locally echoed entry awaiting confirmation. Never sent anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    /// Correlation token handed to the submitter
    pub token: CorrelationToken,
    /// The entry as it will appear once confirmed
    pub entry: Entry,
}

/// Whether a displayed item is confirmed by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayState {
    /// Echoed locally, append in flight
    Pending,
    /// Present in the registry
    Confirmed,
}

/// One row of the displayed list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListItem {
    /// Submitted link
    pub link: String,
    /// Submitting wallet
    pub submitter: Identity,
    /// Confirmation state
    pub display_state: DisplayState,
}

impl ListItem {
    fn from_entry(entry: &Entry, display_state: DisplayState) -> Self {
        Self {
            link: entry.link.clone(),
            submitter: entry.submitter,
            display_state,
        }
    }
}

/// Reconciles pending submissions with the authoritative list.
#[derive(Debug, Clone, Default)]
pub struct OptimisticListSync {
    authoritative: Vec<Entry>,
    pending: Option<PendingSubmission>,
    in_flight: Option<CorrelationToken>,
    next_token: u64,
}

impl OptimisticListSync {
    /// Empty list, nothing in flight.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a submission is in flight.
    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// The in-flight submission, if any.
    pub fn pending(&self) -> Option<&PendingSubmission> {
        self.pending.as_ref()
    }

    /// Last authoritative list.
    pub fn authoritative(&self) -> &[Entry] {
        &self.authoritative
    }

    /// Echo `link` locally and return the token for its outcome.
    ///
    /// Refuses empty links and any submission while another is in flight.
    pub fn begin_submit(
        &mut self,
        link: &str,
        submitter: Identity,
    ) -> Result<CorrelationToken, PortalError> {
        validate_link(link)?;
        if let Some(in_flight) = self.in_flight {
            tracing::debug!(%in_flight, "Submission refused, another is in flight");
            return Err(PortalError::SubmissionInFlight);
        }

        self.next_token += 1;
        let token = CorrelationToken(self.next_token);
        self.in_flight = Some(token);
        self.pending = Some(PendingSubmission {
            token,
            entry: Entry::new(link, submitter),
        });
        tracing::debug!(%token, link, "Pending submission added");
        Ok(token)
    }

    /// Adopt the fetched list that follows a confirmed append.
    ///
    /// Returns false and changes nothing when `token` is not the in-flight
    /// submission. The list is left alone when it was cleared meanwhile.
    pub fn reconcile(&mut self, token: CorrelationToken, account: &RegistryAccount) -> bool {
        match self.settle(token, "reconcile") {
            Some(Some(_)) => {
                self.authoritative = account.entries().to_vec();
                true
            }
            Some(None) => true,
            None => false,
        }
    }

    /// Keep an acknowledged entry when the follow-up fetch failed.
    ///
    /// The entry moves into the authoritative list as confirmed; the next
    /// successful fetch replaces the list wholesale.
    pub fn acknowledge(&mut self, token: CorrelationToken) -> bool {
        match self.settle(token, "acknowledge") {
            Some(Some(pending)) => {
                self.authoritative.push(pending.entry);
                true
            }
            Some(None) => true,
            None => false,
        }
    }

    /// Drop the pending entry after a failed append.
    pub fn rollback(&mut self, token: CorrelationToken) -> bool {
        let rolled_back = self.settle(token, "rollback").is_some();
        if rolled_back {
            tracing::debug!(%token, "Pending submission rolled back");
        }
        rolled_back
    }

    /// Adopt a fetched list outside a submission; any pending entry stays.
    pub fn replace_authoritative(&mut self, account: &RegistryAccount) {
        self.authoritative = account.entries().to_vec();
    }

    /// Forget the displayed list, e.g. on disconnect.
    ///
    /// An outstanding submission still holds the guard.
    pub fn clear(&mut self) {
        self.authoritative.clear();
        self.pending = None;
    }

    /// Displayed list: authoritative entries followed by the pending one.
    pub fn items(&self) -> Vec<ListItem> {
        self.authoritative
            .iter()
            .map(|entry| ListItem::from_entry(entry, DisplayState::Confirmed))
            .chain(
                self.pending
                    .iter()
                    .map(|pending| ListItem::from_entry(&pending.entry, DisplayState::Pending)),
            )
            .collect()
    }

    /// Release the guard held by `token`.
    ///
    /// `None` for a stale token; otherwise the pending row, if it is still
    /// displayed.
    fn settle(
        &mut self,
        token: CorrelationToken,
        action: &'static str,
    ) -> Option<Option<PendingSubmission>> {
        if self.in_flight != Some(token) {
            tracing::debug!(%token, action, "Ignoring stale correlation token");
            return None;
        }
        self.in_flight = None;
        Some(self.pending.take().filter(|pending| pending.token == token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn alice() -> Identity {
        Identity::from_bytes([1u8; 32])
    }

    fn bob() -> Identity {
        Identity::from_bytes([2u8; 32])
    }

    fn account(entries: &[(&str, Identity)]) -> RegistryAccount {
        RegistryAccount::from_entries(
            entries
                .iter()
                .map(|(link, who)| Entry::new(*link, *who))
                .collect(),
        )
    }

    #[test]
    fn test_pending_is_appended_after_confirmed() {
        let mut sync = OptimisticListSync::new();
        sync.replace_authoritative(&account(&[("a", bob())]));
        sync.begin_submit("b", alice()).unwrap();

        let items = sync.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].display_state, DisplayState::Confirmed);
        assert_eq!(items[1].link, "b");
        assert_eq!(items[1].display_state, DisplayState::Pending);
        assert!(sync.is_submitting());
    }

    #[test]
    fn test_second_submit_is_refused_while_in_flight() {
        let mut sync = OptimisticListSync::new();
        sync.begin_submit("a", alice()).unwrap();
        assert_matches!(
            sync.begin_submit("a", alice()),
            Err(PortalError::SubmissionInFlight)
        );
        assert_matches!(
            sync.begin_submit("other", alice()),
            Err(PortalError::SubmissionInFlight)
        );
        assert_eq!(sync.items().len(), 1);
    }

    #[test]
    fn test_empty_link_is_refused() {
        let mut sync = OptimisticListSync::new();
        assert_matches!(sync.begin_submit("", alice()), Err(PortalError::EmptyLink));
        assert!(!sync.is_submitting());
    }

    #[test]
    fn test_reconcile_leaves_no_duplicate() {
        let mut sync = OptimisticListSync::new();
        let token = sync.begin_submit("a", alice()).unwrap();

        assert!(sync.reconcile(token, &account(&[("a", alice())])));

        let items = sync.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].display_state, DisplayState::Confirmed);
        assert!(!sync.is_submitting());
    }

    #[test]
    fn test_rollback_restores_previous_list() {
        let mut sync = OptimisticListSync::new();
        sync.replace_authoritative(&account(&[("a", bob())]));
        let before = sync.items();

        let token = sync.begin_submit("b", alice()).unwrap();
        assert!(sync.rollback(token));
        assert_eq!(sync.items(), before);
        assert!(!sync.is_submitting());
    }

    #[test]
    fn test_stale_tokens_are_ignored() {
        let mut sync = OptimisticListSync::new();
        let first = sync.begin_submit("a", alice()).unwrap();
        sync.rollback(first);
        let second = sync.begin_submit("b", alice()).unwrap();

        assert!(!sync.rollback(first));
        assert!(!sync.reconcile(first, &RegistryAccount::empty()));
        assert!(!sync.acknowledge(first));
        assert_eq!(sync.pending().map(|p| p.token), Some(second));
        assert_ne!(first, second);
    }

    #[test]
    fn test_refresh_keeps_pending() {
        let mut sync = OptimisticListSync::new();
        sync.begin_submit("b", alice()).unwrap();
        sync.replace_authoritative(&account(&[("a", bob())]));

        let links: Vec<_> = sync.items().into_iter().map(|i| i.link).collect();
        assert_eq!(links, vec!["a", "b"]);
    }

    #[test]
    fn test_acknowledge_confirms_locally() {
        let mut sync = OptimisticListSync::new();
        let token = sync.begin_submit("a", alice()).unwrap();
        assert!(sync.acknowledge(token));
        assert_eq!(sync.items()[0].display_state, DisplayState::Confirmed);
        assert!(!sync.is_submitting());
    }

    #[test]
    fn test_clear() {
        let mut sync = OptimisticListSync::new();
        sync.replace_authoritative(&account(&[("a", bob())]));
        sync.clear();
        assert!(sync.items().is_empty());
        assert!(!sync.is_submitting());
    }

    #[test]
    fn test_clear_keeps_outstanding_guard() {
        let mut sync = OptimisticListSync::new();
        sync.replace_authoritative(&account(&[("a", bob())]));
        let token = sync.begin_submit("b", alice()).unwrap();

        sync.clear();
        assert!(sync.items().is_empty());
        assert!(sync.is_submitting());
        assert_matches!(
            sync.begin_submit("c", alice()),
            Err(PortalError::SubmissionInFlight)
        );

        // Settling after a clear releases the guard without repopulating.
        assert!(sync.reconcile(token, &account(&[("a", bob()), ("b", alice())])));
        assert!(sync.items().is_empty());
        assert!(!sync.is_submitting());
        assert!(sync.begin_submit("c", alice()).is_ok());
    }

    #[test]
    fn test_list_item_serializes_lowercase_state() {
        let item = ListItem {
            link: "a".into(),
            submitter: alice(),
            display_state: DisplayState::Pending,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["display_state"], "pending");
        assert_eq!(json["submitter"], alice().to_string());
    }
}
