//! Run content and per-run outcome types.

use std::fmt;

use serde_json::Value;

/// Parsed `metadata.json`: a key-value document.
pub type Metadata = serde_json::Map<String, Value>;

/// Content loaded from one run folder.
#[derive(Debug, Clone, PartialEq)]
pub struct RunData {
    /// Raw `print.gcode` text.
    pub gcode: String,
    /// `sensors.csv` lines, in file order, without terminators.
    pub sensors: Vec<String>,
    /// `metadata.json`, when the run ships one.
    pub metadata: Option<Metadata>,
}

/// Result of processing a single run.
///
/// Every failure is contained in the run it belongs to; the orchestrator
/// matches on this value to decide what to log before moving on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// All checks passed and the finalizer ran.
    Ingested,
    /// One or more required files are absent.
    MissingFiles { missing: Vec<String> },
    /// A required file was read but yielded no content.
    LoadFailure,
    /// The schema rule rejected the run.
    SchemaMismatch,
    /// The consistency rule rejected the run.
    ConsistencyFailure,
    /// Any other error raised while processing the run.
    Unexpected { message: String },
}

/// Outcome classification without payload, stable across repeated ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OutcomeKind {
    Ingested,
    MissingFiles,
    LoadFailure,
    SchemaMismatch,
    ConsistencyFailure,
    Unexpected,
}

impl RunOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            RunOutcome::Ingested => OutcomeKind::Ingested,
            RunOutcome::MissingFiles { .. } => OutcomeKind::MissingFiles,
            RunOutcome::LoadFailure => OutcomeKind::LoadFailure,
            RunOutcome::SchemaMismatch => OutcomeKind::SchemaMismatch,
            RunOutcome::ConsistencyFailure => OutcomeKind::ConsistencyFailure,
            RunOutcome::Unexpected { .. } => OutcomeKind::Unexpected,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Ingested)
    }
}

/// Renders the log message suffix that follows `<run path>: `.
impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Ingested => f.write_str("Ingestion successful"),
            RunOutcome::MissingFiles { missing } => {
                write!(f, "Missing required files ({})", missing.join(", "))
            }
            RunOutcome::LoadFailure => {
                f.write_str("Failed to load required files (gcode or sensors)")
            }
            RunOutcome::SchemaMismatch => f.write_str("Schema mismatch"),
            RunOutcome::ConsistencyFailure => f.write_str("Inconsistent data"),
            RunOutcome::Unexpected { message } => f.write_str(message),
        }
    }
}
