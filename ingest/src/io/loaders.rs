//! Loaders for the files of a run folder.
//!
//! Each loader reads one file fully and returns its parsed content. I/O and
//! parse errors carry the file path as context.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::core::types::Metadata;
use crate::io::layout::RunLayout;

/// Read `print.gcode` as raw text.
pub fn load_gcode(layout: &RunLayout) -> Result<String> {
    read_text(&layout.gcode_path)
}

/// Read `sensors.csv` as an ordered list of lines.
pub fn load_sensors(layout: &RunLayout) -> Result<Vec<String>> {
    let contents = read_text(&layout.sensors_path)?;
    Ok(contents.lines().map(str::to_string).collect())
}

/// Read `metadata.json` if present.
///
/// Returns `Ok(None)` when the file does not exist. A present file must hold
/// a JSON object; anything else is an error.
pub fn load_metadata(layout: &RunLayout) -> Result<Option<Metadata>> {
    let path = &layout.metadata_path;
    if !path.is_file() {
        return Ok(None);
    }
    let contents = read_text(path)?;
    let metadata: Metadata =
        serde_json::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    Ok(Some(metadata))
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}
