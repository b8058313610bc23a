//! File layout of a single run folder.

use std::path::{Path, PathBuf};

pub const GCODE_FILE: &str = "print.gcode";
pub const SENSORS_FILE: &str = "sensors.csv";
pub const METADATA_FILE: &str = "metadata.json";

/// Files that must all exist for a run to be processed.
pub const REQUIRED_FILES: [&str; 2] = [GCODE_FILE, SENSORS_FILE];
/// Files loaded when present; absence is not an error.
pub const OPTIONAL_FILES: [&str; 1] = [METADATA_FILE];

/// Paths inside one run folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    /// Folder name, used as the run identifier.
    pub run_id: String,
    pub dir: PathBuf,
    pub gcode_path: PathBuf,
    pub sensors_path: PathBuf,
    pub metadata_path: PathBuf,
}

impl RunLayout {
    pub fn new(dir: &Path) -> Self {
        let run_id = dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| dir.display().to_string());
        Self {
            run_id,
            dir: dir.to_path_buf(),
            gcode_path: dir.join(GCODE_FILE),
            sensors_path: dir.join(SENSORS_FILE),
            metadata_path: dir.join(METADATA_FILE),
        }
    }

    /// Required file names that are not regular files directly under the run.
    pub fn missing_required_files(&self) -> Vec<String> {
        REQUIRED_FILES
            .iter()
            .filter(|name| !self.dir.join(name).is_file())
            .map(|name| name.to_string())
            .collect()
    }

    /// True iff every required file exists as a regular file.
    pub fn required_files_present(&self) -> bool {
        self.missing_required_files().is_empty()
    }
}
