//! Discovery of run folders under an ingestion root.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::io::layout::RunLayout;

/// List the immediate subdirectories of `root` as runs, sorted by folder name.
///
/// Non-directory entries are skipped, as are entries that cannot be read.
/// Errors only if `root` itself cannot be listed.
pub fn discover_runs(root: &Path) -> Result<Vec<RunLayout>> {
    let entries =
        fs::read_dir(root).with_context(|| format!("read root dir {}", root.display()))?;
    Ok(collect_runs(entries.map(|entry| entry.map(|entry| entry.path()))))
}

fn collect_runs(entries: impl IntoIterator<Item = io::Result<PathBuf>>) -> Vec<RunLayout> {
    let mut runs = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(path) => path,
            Err(err) => {
                warn!(error = %err, "skipping unreadable root entry");
                continue;
            }
        };
        if !path.is_dir() {
            debug!(path = %path.display(), "skipping non-directory entry");
            continue;
        }
        runs.push(RunLayout::new(&path));
    }
    runs.sort_by(|left, right| left.run_id.cmp(&right.run_id));
    runs
}
