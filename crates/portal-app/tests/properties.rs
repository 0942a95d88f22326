//! Property tests for the optimistic list and the registry count.

#![allow(clippy::unwrap_used)]

use portal_app::{DisplayState, OptimisticListSync, PortalApp};
use portal_core::PortalError;
use portal_testkit::keys::identity;
use portal_testkit::strategies::{arb_account, arb_identity, arb_link, arb_links, arb_raw_link};
use portal_testkit::{test_registry, test_session, MockWallet};
use proptest::prelude::*;
use std::sync::Arc;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_total_is_monotonic(links in arb_links(12)) {
        let rt = runtime();
        rt.block_on(async {
            let app = PortalApp::new(
                Arc::new(MockWallet::new(identity("alice"))),
                test_registry(),
                test_session("monotonic"),
            );
            app.connect().await.unwrap();
            app.initialize_registry().await.unwrap();

            let mut last = 0;
            for link in &links {
                app.submit_link(link).await.unwrap();
                let total = app.refresh().await.unwrap().unwrap().total();
                prop_assert_eq!(total, last + 1);
                last = total;
            }
            Ok(())
        })?;
    }

    #[test]
    fn test_reconcile_never_duplicates(
        account in arb_account(8),
        link in arb_link(),
        who in arb_identity(),
    ) {
        let mut sync = OptimisticListSync::new();
        sync.replace_authoritative(&account);
        let token = sync.begin_submit(&link, who).unwrap();

        let mut confirmed = account.clone();
        confirmed.push(portal_core::Entry::new(link.clone(), who));
        sync.reconcile(token, &confirmed);

        let items = sync.items();
        prop_assert_eq!(items.len() as u64, confirmed.total());
        prop_assert!(items.iter().all(|i| i.display_state == DisplayState::Confirmed));
        prop_assert!(!sync.is_submitting());
    }

    #[test]
    fn test_rollback_restores_list(
        account in arb_account(8),
        link in arb_link(),
        who in arb_identity(),
    ) {
        let mut sync = OptimisticListSync::new();
        sync.replace_authoritative(&account);
        let before = sync.items();

        let token = sync.begin_submit(&link, who).unwrap();
        prop_assert_eq!(sync.items().len(), before.len() + 1);
        sync.rollback(token);

        prop_assert_eq!(sync.items(), before);
    }

    #[test]
    fn test_only_empty_links_are_refused(link in arb_raw_link(), who in arb_identity()) {
        let mut sync = OptimisticListSync::new();
        match sync.begin_submit(&link, who) {
            Err(PortalError::EmptyLink) => prop_assert!(link.is_empty()),
            Ok(_) => {
                prop_assert!(!link.is_empty());
                prop_assert_eq!(&sync.items()[0].link, &link);
            }
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }
}
