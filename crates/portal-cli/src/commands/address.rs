//! `portal address`

use anyhow::Result;
use portal_effects::KeypairFile;
use std::path::Path;

/// Print the registry address controlled by the keypair at `path`.
pub async fn run(path: &Path) -> Result<()> {
    let keypair = KeypairFile::new(path).load().await?;
    println!("{}", keypair.address());
    Ok(())
}
