//! Clean the public directory

use anyhow::Result;
use std::fs;

use crate::cache::STAMP_DIR;
use crate::Comet;

/// Clean the public directory and the build stamp
pub fn run(app: &Comet) -> Result<()> {
    if app.public_dir.exists() {
        fs::remove_dir_all(&app.public_dir)?;
        tracing::info!("Deleted: {:?}", app.public_dir);
    }

    let stamp_dir = app.base_dir.join(STAMP_DIR);
    if stamp_dir.exists() {
        fs::remove_dir_all(&stamp_dir)?;
        tracing::info!("Deleted: {:?}", stamp_dir);
    }

    Ok(())
}
