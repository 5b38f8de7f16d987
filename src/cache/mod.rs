//! Build stamp for revalidation
//!
//! Records when the site was last generated so the server can tell
//! stale output from fresh. Persisted as JSON under `.comet/`.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::SystemTime;

/// Directory holding build bookkeeping
pub const STAMP_DIR: &str = ".comet";

/// Stamp file name
const STAMP_FILE: &str = ".comet/build.json";

/// Record of the most recent site generation
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BuildStamp {
    /// Version of the stamp format
    pub version: u32,
    /// Generation time as a unix timestamp
    pub built_at: u64,
    /// Number of posts the generated feed held
    pub post_count: usize,
}

impl BuildStamp {
    /// Current stamp format version
    const VERSION: u32 = 1;

    /// Stamp for a build finishing now
    pub fn now(post_count: usize) -> Self {
        Self {
            version: Self::VERSION,
            built_at: unix_now(),
            post_count,
        }
    }

    /// Load the stamp from disk
    ///
    /// A missing, unreadable, or version-mismatched stamp is treated as
    /// absent; callers count that as stale output.
    pub fn load(base_dir: &Path) -> Option<Self> {
        let path = base_dir.join(STAMP_FILE);
        let content = fs::read_to_string(&path).ok()?;
        match serde_json::from_str::<BuildStamp>(&content) {
            Ok(stamp) if stamp.version == Self::VERSION => Some(stamp),
            Ok(_) => {
                tracing::info!("Build stamp version mismatch, ignoring");
                None
            }
            Err(_) => None,
        }
    }

    /// Save the stamp to disk
    pub fn save(&self, base_dir: &Path) -> Result<()> {
        let dir = base_dir.join(STAMP_DIR);
        fs::create_dir_all(&dir)?;

        let path = base_dir.join(STAMP_FILE);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Seconds since this build
    pub fn age_secs(&self) -> u64 {
        unix_now().saturating_sub(self.built_at)
    }

    /// Whether output from this build is older than the given interval
    pub fn is_stale(&self, revalidate_secs: u64) -> bool {
        self.age_secs() >= revalidate_secs
    }
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
