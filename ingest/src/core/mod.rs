//! Deterministic, pure logic shared by the ingestion pipeline.
//!
//! Core modules must be free of I/O side effects. They operate on loaded run
//! content and return deterministic outputs suitable for tests.

pub mod rules;
pub mod types;
