//! `portal keygen`

use anyhow::{bail, Result};
use portal_core::RegistryKeypair;
use portal_effects::KeypairFile;
use std::path::Path;

/// Write a new registry keypair to `out`.
pub async fn run(out: &Path, force: bool) -> Result<()> {
    if !force && tokio::fs::try_exists(out).await? {
        bail!(
            "{} already exists; pass --force to overwrite it",
            out.display()
        );
    }

    let keypair = RegistryKeypair::generate();
    KeypairFile::new(out).save(&keypair).await?;

    println!("Wrote registry keypair to {}", out.display());
    println!("Registry address: {}", keypair.address());
    Ok(())
}
