//! I/O helpers for the ingestion pipeline.

pub mod config;
pub mod finalize;
pub mod layout;
pub mod loaders;
pub mod run_log;
pub mod walker;
