//! Stable exit codes for the ingest CLI.

/// Ingestion pass completed, whatever the per-run outcomes.
pub const OK: i32 = 0;
/// Fatal error: unreadable root, bad config, or unwritable log.
pub const INVALID: i32 = 1;
/// Wrong arguments; usage was printed.
pub const USAGE: i32 = 2;
