//! Ingestion of 3D-print run folders.
//!
//! An ingestion root holds one folder per print/simulation run. Each run must
//! carry `print.gcode` and `sensors.csv` and may carry `metadata.json`. The
//! crate keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (run content, outcomes, rules).
//!   No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (directory walking, file loading,
//!   the ingestion log, configuration).
//!
//! [`ingest`] coordinates core logic with I/O to implement the CLI.

pub mod core;
pub mod exit_codes;
pub mod ingest;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
