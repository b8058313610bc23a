//! Finalization of runs that passed every check.

use anyhow::Result;

use crate::io::layout::RunLayout;

/// Persists or marks a validated run.
pub trait Finalizer {
    fn save_validated_run(&self, run: &RunLayout) -> Result<()>;
}

impl<T: Finalizer + ?Sized> Finalizer for &T {
    fn save_validated_run(&self, run: &RunLayout) -> Result<()> {
        (**self).save_validated_run(run)
    }
}

/// Leaves validated runs where they are.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFinalizer;

impl Finalizer for NoopFinalizer {
    fn save_validated_run(&self, _run: &RunLayout) -> Result<()> {
        Ok(())
    }
}
