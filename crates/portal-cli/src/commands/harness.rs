//! `portal harness`
//!
//! Runs initialize → fetch → append → fetch against a fresh in-memory
//! registry program and prints what happened at each step.

use anyhow::{anyhow, Result};
use portal_app::PortalApp;
use portal_core::RegistryAccount;
use portal_effects::{InMemoryRegistryProgram, LocalWallet, PortalConfig};
use std::sync::Arc;

/// Link appended when none is given.
pub const DEFAULT_LINK: &str = "https://example.com/a.gif";

/// Counts observed by one harness run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessReport {
    /// Total after initialize
    pub initial_total: u64,
    /// Account after the append
    pub final_account: RegistryAccount,
}

/// Run the harness and print its steps.
pub async fn run(config: &PortalConfig, link: &str) -> Result<()> {
    let report = execute(config, link).await?;
    println!("Total links: {}", report.final_account.total());
    for entry in report.final_account.entries() {
        println!("  {} (submitted by {})", entry.link, entry.submitter);
    }
    Ok(())
}

/// Run the harness and return its observations.
pub async fn execute(config: &PortalConfig, link: &str) -> Result<HarnessReport> {
    let session = config.registry_session().await?;
    let program = Arc::new(InMemoryRegistryProgram::new(session.program_id()));
    let wallet = Arc::new(LocalWallet::generate());
    tracing::info!(
        endpoint = %config.cluster.endpoint,
        commitment = %config.cluster.commitment,
        registry = %session.registry_address(),
        "Starting harness"
    );

    let app = PortalApp::new(wallet, program, session);
    let identity = app.connect().await?;
    println!("Wallet: {identity}");
    println!("Registry: {}", app.client().registry_address());

    let ack = app.initialize_registry().await?;
    println!("Initialize transaction signature: {}", ack.signature);

    let initial = app
        .refresh()
        .await?
        .ok_or_else(|| anyhow!("registry missing after initialize"))?;
    println!("Total links: {}", initial.total());

    let ack = app.submit_link(link).await?;
    println!("Append transaction signature: {}", ack.signature);

    let final_account = app
        .refresh()
        .await?
        .ok_or_else(|| anyhow!("registry missing after append"))?;

    Ok(HarnessReport {
        initial_total: initial.total(),
        final_account,
    })
}
