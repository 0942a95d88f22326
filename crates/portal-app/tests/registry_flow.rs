//! End-to-end registry flows against the in-memory program.

#![allow(clippy::unwrap_used)]

use assert_matches::assert_matches;
use portal_app::{DisplayState, Operation, PhaseView, PortalApp, RegistryPhase};
use portal_core::effects::{RegistryRpc, RpcError};
use portal_core::{Entry, ErrorKind, PortalError, RegistryOperation};
use portal_testkit::keys::identity;
use portal_testkit::{test_registry, test_session, FaultyRegistry, MockWallet};
use std::sync::Arc;

const LINK: &str = "https://example.com/a.gif";

struct Harness {
    app: PortalApp,
    wallet: Arc<MockWallet>,
    registry: Arc<FaultyRegistry>,
}

fn harness() -> Harness {
    let wallet = Arc::new(MockWallet::new(identity("alice")));
    let registry = test_registry();
    let app = PortalApp::new(wallet.clone(), registry.clone(), test_session("registry"));
    Harness {
        app,
        wallet,
        registry,
    }
}

async fn ready_harness() -> Harness {
    let h = harness();
    h.app.connect().await.unwrap();
    h.app.initialize_registry().await.unwrap();
    h
}

// ============================================================================
// Connection
// ============================================================================

#[tokio::test]
async fn test_start_without_provider_stays_disconnected() {
    let registry = test_registry();
    let app = PortalApp::new(
        Arc::new(MockWallet::absent()),
        registry.clone(),
        test_session("registry"),
    );

    assert_eq!(app.start().await, None);
    assert_eq!(app.snapshot().phase, PhaseView::ConnectWallet);
    assert!(registry.calls().is_empty());
}

#[tokio::test]
async fn test_start_with_trusted_wallet_fetches() {
    let h = harness();
    h.wallet.grant_trust();

    assert_eq!(h.app.start().await, Some(identity("alice")));
    assert_eq!(h.app.snapshot().phase, PhaseView::InitializeRegistry);
    assert_eq!(h.registry.calls(), vec![RegistryOperation::Fetch]);
    assert_eq!(h.wallet.prompt_count(), 0);
}

#[tokio::test]
async fn test_start_without_grant_waits_for_connect() {
    let h = harness();
    assert_eq!(h.app.start().await, None);
    assert_eq!(h.app.snapshot().phase, PhaseView::ConnectWallet);

    h.app.connect().await.unwrap();
    assert_eq!(h.app.snapshot().phase, PhaseView::InitializeRegistry);
}

#[tokio::test]
async fn test_rejected_connect_shows_connect_view() {
    let h = harness();
    h.wallet.reject_next_prompt();

    assert_matches!(
        h.app.connect().await,
        Err(PortalError::UserRejectedConnection)
    );
    let snapshot = h.app.snapshot();
    assert_eq!(snapshot.phase, PhaseView::ConnectWallet);
    assert_eq!(
        snapshot.last_failure.map(|f| (f.operation, f.kind)),
        Some((Operation::Connect, ErrorKind::UserRejectedConnection))
    );
}

#[tokio::test]
async fn test_provider_failure_on_reconnect_shows_connect_view() {
    let h = ready_harness().await;
    h.wallet.fail_next_connect("extension crashed");

    assert_matches!(
        h.app.connect().await,
        Err(PortalError::WalletFailed { .. })
    );
    let snapshot = h.app.snapshot();
    assert_eq!(snapshot.phase, PhaseView::ConnectWallet);
    assert_eq!(snapshot.identity, None);
    assert_eq!(h.app.session().identity(), None);
    assert!(snapshot.items.is_empty());
    assert_eq!(
        snapshot.last_failure.map(|f| (f.operation, f.kind)),
        Some((Operation::Connect, ErrorKind::WalletFailed))
    );

    h.app.connect().await.unwrap();
    assert_eq!(h.app.snapshot().phase, PhaseView::Ready);
    h.app.submit_link(LINK).await.unwrap();
}

#[tokio::test]
async fn test_disconnect_clears_list() {
    let h = ready_harness().await;
    h.app.submit_link(LINK).await.unwrap();

    h.app.disconnect().await;
    let snapshot = h.app.snapshot();
    assert_eq!(snapshot.phase, PhaseView::ConnectWallet);
    assert!(snapshot.items.is_empty());
    assert_eq!(snapshot.identity, None);
}

#[tokio::test]
async fn test_mutations_require_wallet() {
    let h = harness();
    assert_matches!(
        h.app.initialize_registry().await,
        Err(PortalError::NotConnected)
    );
    assert_matches!(h.app.submit_link(LINK).await, Err(PortalError::NotConnected));
    assert!(h.registry.calls().is_empty());
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_initialize_fresh_registry_is_empty() {
    let h = harness();
    h.app.connect().await.unwrap();

    let ack = h.app.initialize_registry().await.unwrap();
    assert!(!ack.signature.is_empty());

    let account = h.app.refresh().await.unwrap().unwrap();
    assert_eq!(account.total(), 0);
    assert!(account.entries().is_empty());
    assert_eq!(h.app.snapshot().phase, PhaseView::Ready);
}

#[tokio::test]
async fn test_append_is_confirmed_with_submitter() {
    let h = ready_harness().await;

    h.app.submit_link(LINK).await.unwrap();

    let account = h.app.refresh().await.unwrap().unwrap();
    assert_eq!(account.total(), 1);
    assert_eq!(account.entries(), &[Entry::new(LINK, identity("alice"))]);

    let snapshot = h.app.snapshot();
    assert_eq!(snapshot.items.len(), 1);
    assert_eq!(snapshot.items[0].display_state, DisplayState::Confirmed);
    assert_eq!(snapshot.total, Some(1));
    assert!(!snapshot.submitting);
}

#[tokio::test]
async fn test_empty_link_is_rejected_locally() {
    let h = ready_harness().await;
    let calls_before = h.registry.call_count(RegistryOperation::AppendEntry);

    assert_matches!(h.app.submit_link("").await, Err(PortalError::EmptyLink));

    assert_eq!(
        h.registry.call_count(RegistryOperation::AppendEntry),
        calls_before
    );
    let account = h.app.refresh().await.unwrap().unwrap();
    assert_eq!(account.total(), 0);
    assert_eq!(h.app.snapshot().phase, PhaseView::Ready);
}

#[tokio::test]
async fn test_second_initialize_is_rejected() {
    let h = ready_harness().await;

    assert_matches!(
        h.app.initialize_registry().await,
        Err(PortalError::AlreadyInitialized)
    );
    assert_matches!(
        h.app.phase(),
        RegistryPhase::ConnectedError { failure, .. }
            if failure.kind == ErrorKind::AlreadyInitialized
    );

    // The existing account is untouched and a refresh recovers.
    let account = h.app.refresh().await.unwrap().unwrap();
    assert_eq!(account.total(), 0);
    assert_eq!(h.app.snapshot().phase, PhaseView::Ready);
}

// ============================================================================
// Optimistic updates
// ============================================================================

#[tokio::test]
async fn test_failed_append_rolls_back() {
    let h = ready_harness().await;
    h.app.submit_link("https://example.com/first.gif").await.unwrap();
    let before = h.app.snapshot().items;

    h.registry.fail_next(
        RegistryOperation::AppendEntry,
        RpcError::Transport("connection reset".into()),
    );
    assert_matches!(
        h.app.submit_link(LINK).await,
        Err(PortalError::TransactionFailed { .. })
    );

    let snapshot = h.app.snapshot();
    assert_eq!(snapshot.items, before);
    assert!(!snapshot.submitting);
    assert_matches!(snapshot.phase, PhaseView::Failed { .. });
}

#[tokio::test]
async fn test_full_account_rolls_back() {
    let wallet = Arc::new(MockWallet::new(identity("alice")));
    let program = Arc::new(portal_effects::InMemoryRegistryProgram::with_space(
        portal_testkit::TEST_PROGRAM_ID,
        20 + 4 + LINK.len() + 32,
    ));
    let app = PortalApp::new(wallet, program.clone(), test_session("registry"));
    app.connect().await.unwrap();
    app.initialize_registry().await.unwrap();

    app.submit_link(LINK).await.unwrap();
    assert_matches!(
        app.submit_link(LINK).await,
        Err(PortalError::TransactionFailed { .. })
    );

    let snapshot = app.snapshot();
    assert_eq!(snapshot.items.len(), 1);
    let account = program
        .fetch_account(app.client().registry_address())
        .await
        .unwrap();
    assert_eq!(account.total(), 1);
}

#[tokio::test]
async fn test_concurrent_submit_is_refused() {
    let h = ready_harness().await;
    let gate = h.registry.hold_next_append();

    let first = h.app.submit_link("https://example.com/one.gif");
    let second = async {
        gate.entered().await;
        let snapshot = h.app.snapshot();
        assert!(snapshot.submitting);
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0].display_state, DisplayState::Pending);

        let result = h.app.submit_link("https://example.com/two.gif").await;
        gate.release();
        result
    };
    let (first, second) = futures::join!(first, second);

    assert!(first.is_ok());
    assert_matches!(second, Err(PortalError::SubmissionInFlight));
    let account = h.app.refresh().await.unwrap().unwrap();
    assert_eq!(account.total(), 1);
}

#[tokio::test]
async fn test_reconnect_does_not_release_outstanding_append() {
    let h = ready_harness().await;
    let gate = h.registry.hold_next_append();

    let first = h.app.submit_link("https://example.com/one.gif");
    let second = async {
        gate.entered().await;
        h.app.disconnect().await;
        assert!(h.app.snapshot().items.is_empty());
        assert!(h.app.snapshot().submitting);

        h.app.connect().await.unwrap();
        let result = h.app.submit_link("https://example.com/two.gif").await;
        gate.release();
        result
    };
    let (first, second) = futures::join!(first, second);

    assert!(first.is_ok());
    assert_matches!(second, Err(PortalError::SubmissionInFlight));
    assert_eq!(h.registry.call_count(RegistryOperation::AppendEntry), 1);
    let snapshot = h.app.snapshot();
    assert!(!snapshot.submitting);
    assert_eq!(snapshot.items.len(), 1);
    assert_eq!(snapshot.items[0].display_state, DisplayState::Confirmed);

    h.app.submit_link("https://example.com/two.gif").await.unwrap();
    let account = h.app.refresh().await.unwrap().unwrap();
    assert_eq!(account.total(), 2);
}

#[tokio::test]
async fn test_fetch_failure_after_append_keeps_entry() {
    let h = ready_harness().await;
    h.registry.fail_next(
        RegistryOperation::Fetch,
        RpcError::Transport("timeout".into()),
    );

    h.app.submit_link(LINK).await.unwrap();

    let snapshot = h.app.snapshot();
    assert_eq!(snapshot.items.len(), 1);
    assert_eq!(snapshot.items[0].display_state, DisplayState::Confirmed);
    assert!(!snapshot.submitting);
    assert_matches!(
        snapshot.phase,
        PhaseView::Failed {
            operation: Operation::Fetch,
            ..
        }
    );

    h.app.refresh().await.unwrap();
    assert_eq!(h.app.snapshot().items.len(), 1);
    assert_eq!(h.app.snapshot().phase, PhaseView::Ready);
}

#[tokio::test]
async fn test_append_after_missing_account_recovers_to_initialize() {
    let h = harness();
    h.app.connect().await.unwrap();

    assert_matches!(
        h.app.submit_link(LINK).await,
        Err(PortalError::AccountNotInitialized)
    );
    assert!(h.app.snapshot().items.is_empty());

    h.app.refresh().await.unwrap();
    assert_eq!(h.app.snapshot().phase, PhaseView::InitializeRegistry);
}

#[tokio::test]
async fn test_fetch_is_idempotent() {
    let h = ready_harness().await;
    h.app.submit_link(LINK).await.unwrap();

    let first = h.app.refresh().await.unwrap();
    let second = h.app.refresh().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(h.app.snapshot().items.len(), 1);
}

#[tokio::test]
async fn test_two_clients_share_registry() {
    let registry = test_registry();
    let alice = PortalApp::new(
        Arc::new(MockWallet::new(identity("alice"))),
        registry.clone(),
        test_session("shared"),
    );
    let bob = PortalApp::new(
        Arc::new(MockWallet::new(identity("bob"))),
        registry.clone(),
        test_session("shared"),
    );

    alice.connect().await.unwrap();
    alice.initialize_registry().await.unwrap();
    bob.connect().await.unwrap();
    assert_eq!(bob.snapshot().phase, PhaseView::Ready);

    alice.submit_link("https://example.com/a.gif").await.unwrap();
    bob.submit_link("https://example.com/b.gif").await.unwrap();

    let items = bob.snapshot().items;
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].submitter, identity("alice"));
    assert_eq!(items[1].submitter, identity("bob"));
}
