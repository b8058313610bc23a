//! Orchestration of a full ingestion pass over a root directory.
//!
//! Each run goes through presence check, loading, schema and consistency
//! rules, then finalization. [`Ingestor::process_run`] turns everything that
//! can go wrong into a [`RunOutcome`]; [`Ingestor::ingest`] logs that outcome
//! and moves on, so one bad run never stops the pass.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use tracing::{debug, info, instrument, warn};

use crate::core::rules::{AcceptAll, ConsistencyRule, SchemaRule};
use crate::core::types::{OutcomeKind, RunData, RunOutcome};
use crate::io::config::IngestConfig;
use crate::io::finalize::{Finalizer, NoopFinalizer};
use crate::io::layout::RunLayout;
use crate::io::loaders::{load_gcode, load_metadata, load_sensors};
use crate::io::run_log::IngestLog;
use crate::io::walker::discover_runs;

pub const COMPLETION_MESSAGE: &str = "Ingestion complete. See log for details.";

/// Per-pass options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOptions {
    /// Treat a required file with no content as a load failure.
    pub reject_empty_required: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            reject_empty_required: true,
        }
    }
}

impl From<&IngestConfig> for IngestOptions {
    fn from(cfg: &IngestConfig) -> Self {
        Self {
            reject_empty_required: cfg.reject_empty_required,
        }
    }
}

/// Outcome of one run within a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub run_id: String,
    pub outcome: RunOutcome,
}

/// Outcomes of a whole pass, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub runs: Vec<RunReport>,
    /// Log lines that could not be written; the pass continues regardless.
    pub log_errors: Vec<String>,
}

impl IngestSummary {
    pub fn total(&self) -> usize {
        self.runs.len()
    }

    pub fn ingested(&self) -> usize {
        self.runs
            .iter()
            .filter(|report| report.outcome.is_success())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.ingested()
    }

    /// Number of runs per outcome kind; kinds with no runs are absent.
    pub fn counts(&self) -> BTreeMap<OutcomeKind, usize> {
        let mut counts = BTreeMap::new();
        for report in &self.runs {
            *counts.entry(report.outcome.kind()).or_insert(0) += 1;
        }
        counts
    }

    /// `(run_id, kind)` pairs; equal across passes over an unchanged root.
    pub fn classifications(&self) -> Vec<(String, OutcomeKind)> {
        self.runs
            .iter()
            .map(|report| (report.run_id.clone(), report.outcome.kind()))
            .collect()
    }

    fn note_log_write(&mut self, written: Result<()>) {
        if let Err(err) = written {
            let message = format!("{err:#}");
            warn!(error = %message, "failed to write ingestion log");
            self.log_errors.push(message);
        }
    }
}

/// Runs the ingestion pipeline with pluggable rules and finalizer.
#[derive(Debug, Clone)]
pub struct Ingestor<S, C, F> {
    schema: S,
    consistency: C,
    finalizer: F,
    options: IngestOptions,
}

impl Ingestor<AcceptAll, AcceptAll, NoopFinalizer> {
    /// Accept-everything rules and a finalizer that leaves runs in place.
    pub fn baseline(options: IngestOptions) -> Self {
        Self::new(AcceptAll, AcceptAll, NoopFinalizer, options)
    }
}

impl<S: SchemaRule, C: ConsistencyRule, F: Finalizer> Ingestor<S, C, F> {
    pub fn new(schema: S, consistency: C, finalizer: F, options: IngestOptions) -> Self {
        Self {
            schema,
            consistency,
            finalizer,
            options,
        }
    }

    /// Process every run folder directly under `root`, logging each outcome.
    ///
    /// Per-run failures are logged and skipped. A log line that cannot be
    /// written is recorded in [`IngestSummary::log_errors`] and does not stop
    /// the pass. Errors only when `root` cannot be listed.
    #[instrument(skip_all, fields(root = %root.display()))]
    pub fn ingest(&self, root: &Path, log: &mut IngestLog) -> Result<IngestSummary> {
        let runs = discover_runs(root)?;
        debug!(count = runs.len(), "discovered runs");

        let mut summary = IngestSummary::default();
        for run in &runs {
            summary.note_log_write(log.info(format_args!("Processing {}", run.dir.display())));
            let outcome = self.process_run(run);
            let written = if outcome.is_success() {
                info!(run_id = %run.run_id, "run ingested");
                log.info(format_args!("{}: {}", run.dir.display(), outcome))
            } else {
                warn!(run_id = %run.run_id, kind = ?outcome.kind(), "run skipped");
                log.error(format_args!("{}: {}", run.dir.display(), outcome))
            };
            summary.note_log_write(written);
            summary.runs.push(RunReport {
                run_id: run.run_id.clone(),
                outcome,
            });
        }

        summary.note_log_write(log.info(COMPLETION_MESSAGE));
        info!(
            runs = summary.total(),
            ingested = summary.ingested(),
            log_errors = summary.log_errors.len(),
            "ingestion complete"
        );
        Ok(summary)
    }

    /// Process a single run folder.
    pub fn process_run(&self, run: &RunLayout) -> RunOutcome {
        match self.try_process_run(run) {
            Ok(outcome) => outcome,
            Err(err) => RunOutcome::Unexpected {
                message: format!("{err:#}"),
            },
        }
    }

    fn try_process_run(&self, run: &RunLayout) -> Result<RunOutcome> {
        let missing = run.missing_required_files();
        if !missing.is_empty() {
            return Ok(RunOutcome::MissingFiles { missing });
        }

        let gcode = load_gcode(run)?;
        let sensors = load_sensors(run)?;
        if self.options.reject_empty_required && (is_blank(&gcode) || sensors_blank(&sensors)) {
            return Ok(RunOutcome::LoadFailure);
        }
        let data = RunData {
            gcode,
            sensors,
            metadata: load_metadata(run)?,
        };

        if !self.schema.validate_schema(&data.sensors, data.metadata.as_ref()) {
            return Ok(RunOutcome::SchemaMismatch);
        }
        if !self.consistency.check_consistency(&data.sensors, &data.gcode) {
            return Ok(RunOutcome::ConsistencyFailure);
        }

        self.finalizer.save_validated_run(run)?;
        Ok(RunOutcome::Ingested)
    }
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

fn sensors_blank(lines: &[String]) -> bool {
    lines.iter().all(|line| is_blank(line))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::fs;

    use anyhow::anyhow;

    use super::*;
    use crate::core::types::Metadata;
    use crate::io::run_log::LogLevel;
    use crate::test_support::{IngestRoot, RunFixture};

    fn baseline() -> Ingestor<AcceptAll, AcceptAll, NoopFinalizer> {
        Ingestor::baseline(IngestOptions::default())
    }

    #[test]
    fn complete_run_is_ingested() {
        let root = IngestRoot::new().expect("root");
        let run = root.add_run(&RunFixture::complete("a")).expect("run");

        assert_eq!(baseline().process_run(&run), RunOutcome::Ingested);
    }

    #[test]
    fn missing_sensors_is_reported_by_name() {
        let root = IngestRoot::new().expect("root");
        let run = root
            .add_run(&RunFixture::complete("b").without_sensors())
            .expect("run");

        assert_eq!(
            baseline().process_run(&run),
            RunOutcome::MissingFiles {
                missing: vec!["sensors.csv".to_string()]
            }
        );
    }

    #[test]
    fn empty_required_file_is_a_load_failure() {
        let root = IngestRoot::new().expect("root");
        let run = root
            .add_run(&RunFixture::complete("e").with_gcode("  \n"))
            .expect("run");

        assert_eq!(baseline().process_run(&run), RunOutcome::LoadFailure);
    }

    #[test]
    fn empty_required_file_is_accepted_when_allowed() {
        let root = IngestRoot::new().expect("root");
        let run = root
            .add_run(&RunFixture::complete("e").with_sensors(""))
            .expect("run");
        let ingestor = Ingestor::baseline(IngestOptions {
            reject_empty_required: false,
        });

        assert_eq!(ingestor.process_run(&run), RunOutcome::Ingested);
    }

    #[test]
    fn malformed_metadata_is_unexpected() {
        let root = IngestRoot::new().expect("root");
        let run = root
            .add_run(&RunFixture::complete("m").with_metadata("{not json"))
            .expect("run");

        let outcome = baseline().process_run(&run);
        assert_eq!(outcome.kind(), OutcomeKind::Unexpected);
        assert!(outcome.to_string().contains("metadata.json"));
    }

    #[test]
    fn required_loads_happen_before_metadata() {
        let root = IngestRoot::new().expect("root");
        let run = root
            .add_run(&RunFixture::complete("o").with_metadata("{not json"))
            .expect("run");
        fs::write(&run.gcode_path, [0xc3_u8, 0x28]).expect("write invalid gcode");

        let outcome = baseline().process_run(&run);
        let message = outcome.to_string();
        assert!(message.contains("print.gcode"), "{message}");
        assert!(!message.contains("metadata.json"), "{message}");
    }

    #[test]
    fn rules_see_loaded_content() {
        let root = IngestRoot::new().expect("root");
        let run = root
            .add_run(
                &RunFixture::complete("r")
                    .with_sensors("t,temp\n0,210\n")
                    .with_metadata(r#"{"sensor_columns": 2}"#),
            )
            .expect("run");

        let seen = RefCell::new(None);
        let schema = |sensors: &[String], metadata: Option<&Metadata>| {
            *seen.borrow_mut() = Some((sensors.to_vec(), metadata.cloned()));
            true
        };
        {
            let ingestor =
                Ingestor::new(schema, AcceptAll, NoopFinalizer, IngestOptions::default());
            assert_eq!(ingestor.process_run(&run), RunOutcome::Ingested);
        }

        let (sensors, metadata) = seen.into_inner().expect("schema rule called");
        assert_eq!(sensors, vec!["t,temp", "0,210"]);
        assert_eq!(metadata.expect("metadata")["sensor_columns"], 2);
    }

    #[test]
    fn rejecting_schema_rule_short_circuits() {
        let root = IngestRoot::new().expect("root");
        let run = root.add_run(&RunFixture::complete("s")).expect("run");
        let consistency_called = RefCell::new(false);
        let consistency = |_: &[String], _: &str| {
            *consistency_called.borrow_mut() = true;
            true
        };
        let ingestor = Ingestor::new(
            |_: &[String], _: Option<&Metadata>| false,
            consistency,
            NoopFinalizer,
            IngestOptions::default(),
        );

        assert_eq!(ingestor.process_run(&run), RunOutcome::SchemaMismatch);
        assert!(!*consistency_called.borrow());
    }

    #[test]
    fn rejecting_consistency_rule_skips_finalizer() {
        struct CountingFinalizer(RefCell<u32>);
        impl Finalizer for CountingFinalizer {
            fn save_validated_run(&self, _run: &RunLayout) -> Result<()> {
                *self.0.borrow_mut() += 1;
                Ok(())
            }
        }

        let root = IngestRoot::new().expect("root");
        let run = root.add_run(&RunFixture::complete("c")).expect("run");
        let finalizer = CountingFinalizer(RefCell::new(0));
        let ingestor = Ingestor::new(
            AcceptAll,
            |_: &[String], _: &str| false,
            &finalizer,
            IngestOptions::default(),
        );

        assert_eq!(ingestor.process_run(&run), RunOutcome::ConsistencyFailure);
        assert_eq!(*finalizer.0.borrow(), 0);
    }

    #[test]
    fn failing_finalizer_is_unexpected() {
        struct FailingFinalizer;
        impl Finalizer for FailingFinalizer {
            fn save_validated_run(&self, run: &RunLayout) -> Result<()> {
                Err(anyhow!("cannot mark {}", run.run_id))
            }
        }

        let root = IngestRoot::new().expect("root");
        let run = root.add_run(&RunFixture::complete("f")).expect("run");
        let ingestor = Ingestor::new(
            AcceptAll,
            AcceptAll,
            FailingFinalizer,
            IngestOptions::default(),
        );

        assert_eq!(
            ingestor.process_run(&run),
            RunOutcome::Unexpected {
                message: "cannot mark f".to_string()
            }
        );
    }

    #[test]
    fn ingest_logs_each_run_then_completion() {
        let root = IngestRoot::new().expect("root");
        root.add_run(&RunFixture::complete("a")).expect("run a");
        root.add_run(&RunFixture::complete("b").without_sensors())
            .expect("run b");
        let (mut log, buffer) = IngestLog::in_memory();

        let summary = baseline().ingest(root.path(), &mut log).expect("ingest");
        assert_eq!(summary.total(), 2);
        assert_eq!(summary.ingested(), 1);
        assert_eq!(summary.failed(), 1);

        let a = root.path().join("a");
        let b = root.path().join("b");
        assert_eq!(
            buffer.entries(),
            vec![
                (LogLevel::Info, format!("Processing {}", a.display())),
                (
                    LogLevel::Info,
                    format!("{}: Ingestion successful", a.display())
                ),
                (LogLevel::Info, format!("Processing {}", b.display())),
                (
                    LogLevel::Error,
                    format!("{}: Missing required files (sensors.csv)", b.display())
                ),
                (LogLevel::Info, COMPLETION_MESSAGE.to_string()),
            ]
        );
    }

    #[test]
    fn empty_root_logs_only_completion() {
        let root = IngestRoot::new().expect("root");
        let (mut log, buffer) = IngestLog::in_memory();

        let summary = baseline().ingest(root.path(), &mut log).expect("ingest");
        assert_eq!(summary, IngestSummary::default());
        assert_eq!(
            buffer.entries(),
            vec![(LogLevel::Info, COMPLETION_MESSAGE.to_string())]
        );
    }

    struct DiskFull;

    impl std::io::Write for DiskFull {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failing_log_does_not_stop_the_pass() {
        let root = IngestRoot::new().expect("root");
        for name in ["a", "b", "c"] {
            root.add_run(&RunFixture::complete(name)).expect("run");
        }
        let mut log = IngestLog::new(DiskFull);

        let summary = baseline().ingest(root.path(), &mut log).expect("ingest");

        assert_eq!(
            summary.classifications(),
            vec![
                ("a".to_string(), OutcomeKind::Ingested),
                ("b".to_string(), OutcomeKind::Ingested),
                ("c".to_string(), OutcomeKind::Ingested),
            ]
        );
        // start + outcome per run, then completion
        assert_eq!(summary.log_errors.len(), 3 * 2 + 1);
        assert!(
            summary
                .log_errors
                .iter()
                .all(|message| message.contains("disk full"))
        );
    }

    #[test]
    fn counts_group_runs_by_kind() {
        let root = IngestRoot::new().expect("root");
        root.add_run(&RunFixture::complete("a")).expect("run a");
        root.add_run(&RunFixture::complete("b")).expect("run b");
        root.add_run(&RunFixture::complete("c").without_gcode())
            .expect("run c");
        root.add_run(&RunFixture::complete("d").with_metadata("{"))
            .expect("run d");
        let (mut log, _buffer) = IngestLog::in_memory();

        let summary = baseline().ingest(root.path(), &mut log).expect("ingest");

        let counts = summary.counts();
        assert_eq!(counts.get(&OutcomeKind::Ingested), Some(&2));
        assert_eq!(counts.get(&OutcomeKind::MissingFiles), Some(&1));
        assert_eq!(counts.get(&OutcomeKind::Unexpected), Some(&1));
        assert_eq!(counts.get(&OutcomeKind::SchemaMismatch), None);
        assert_eq!(counts.values().sum::<usize>(), summary.total());
        assert!(summary.log_errors.is_empty());
    }

    #[test]
    fn missing_root_is_fatal() {
        let root = IngestRoot::new().expect("root");
        let (mut log, buffer) = IngestLog::in_memory();

        baseline()
            .ingest(&root.path().join("absent"), &mut log)
            .expect_err("missing root");
        assert!(buffer.contents().is_empty());
    }
}
