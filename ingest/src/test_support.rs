//! Test-only helpers for laying out ingestion roots and run folders.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::TempDir;

use crate::io::layout::{GCODE_FILE, METADATA_FILE, RunLayout, SENSORS_FILE};

pub const SAMPLE_GCODE: &str = "G28\nG1 X10 Y10 Z0.2 E1.0\nG1 X20 Y10 E2.0\n";
pub const SAMPLE_SENSORS: &str = "t,nozzle_temp,bed_temp\n0,210.0,60.0\n1,210.5,60.1\n";

/// Description of one run folder to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFixture {
    pub name: String,
    pub gcode: Option<String>,
    pub sensors: Option<String>,
    pub metadata: Option<String>,
}

impl RunFixture {
    /// Run with both required files holding sample content and no metadata.
    pub fn complete(name: &str) -> Self {
        Self {
            name: name.to_string(),
            gcode: Some(SAMPLE_GCODE.to_string()),
            sensors: Some(SAMPLE_SENSORS.to_string()),
            metadata: None,
        }
    }

    pub fn with_gcode(mut self, contents: &str) -> Self {
        self.gcode = Some(contents.to_string());
        self
    }

    pub fn with_sensors(mut self, contents: &str) -> Self {
        self.sensors = Some(contents.to_string());
        self
    }

    pub fn with_metadata(mut self, contents: &str) -> Self {
        self.metadata = Some(contents.to_string());
        self
    }

    pub fn without_gcode(mut self) -> Self {
        self.gcode = None;
        self
    }

    pub fn without_sensors(mut self) -> Self {
        self.sensors = None;
        self
    }

    /// Create the run folder under `root` and return its layout.
    pub fn write_into(&self, root: &Path) -> Result<RunLayout> {
        let dir = root.join(&self.name);
        fs::create_dir_all(&dir).with_context(|| format!("create run dir {}", dir.display()))?;
        for (file, contents) in [
            (GCODE_FILE, &self.gcode),
            (SENSORS_FILE, &self.sensors),
            (METADATA_FILE, &self.metadata),
        ] {
            if let Some(contents) = contents {
                let path = dir.join(file);
                fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
            }
        }
        Ok(RunLayout::new(&dir))
    }
}

/// Temporary ingestion root, removed on drop.
#[derive(Debug)]
pub struct IngestRoot {
    temp: TempDir,
}

impl IngestRoot {
    pub fn new() -> Result<Self> {
        let temp = tempfile::tempdir().context("create temp root")?;
        Ok(Self { temp })
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn add_run(&self, fixture: &RunFixture) -> Result<RunLayout> {
        fixture.write_into(self.path())
    }

    /// Write a plain file directly under the root.
    pub fn add_file(&self, name: &str, contents: &[u8]) -> Result<()> {
        let path = self.path().join(name);
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))
    }
}
