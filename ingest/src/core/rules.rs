//! Acceptance rules applied to loaded run content.
//!
//! Rules are strategies: the orchestrator only asks accept/reject, so real
//! schema or cross-file checks can be plugged in without touching its control
//! flow. The baseline [`AcceptAll`] accepts every run.

use crate::core::types::Metadata;

/// Checks sensor data against the (optional) run metadata.
pub trait SchemaRule {
    fn validate_schema(&self, sensors: &[String], metadata: Option<&Metadata>) -> bool;
}

/// Checks that sensor data agrees with the G-code it was recorded for.
pub trait ConsistencyRule {
    fn check_consistency(&self, sensors: &[String], gcode: &str) -> bool;
}

/// Baseline rule: accepts everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl SchemaRule for AcceptAll {
    fn validate_schema(&self, _sensors: &[String], _metadata: Option<&Metadata>) -> bool {
        true
    }
}

impl ConsistencyRule for AcceptAll {
    fn check_consistency(&self, _sensors: &[String], _gcode: &str) -> bool {
        true
    }
}

impl<F> SchemaRule for F
where
    F: Fn(&[String], Option<&Metadata>) -> bool,
{
    fn validate_schema(&self, sensors: &[String], metadata: Option<&Metadata>) -> bool {
        self(sensors, metadata)
    }
}

impl<F> ConsistencyRule for F
where
    F: Fn(&[String], &str) -> bool,
{
    fn check_consistency(&self, sensors: &[String], gcode: &str) -> bool {
        self(sensors, gcode)
    }
}
