//! Record mutation driver
//!
//! Orchestrates a run: for each block of the update script, load the
//! source record, apply the metadata assignments, apply each SNP edit
//! through the resolution engine, serialize the result, and validate it
//! against the source. Batch outcomes are explicit values; an aborted
//! batch never blocks the batches after it.

use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use crate::edit::{apply_assignments, resolve};
use crate::error::{EditError, Error, Result};
use crate::events::EventLog;
use crate::gtc::GtcRecord;
use crate::manifest::Manifest;
use crate::script::{Block, Blocks};
use crate::validate::{validate, ValidationReport};

/// Shared flag for stopping a run between batches.
///
/// Cancellation is cooperative: a batch in flight completes, and no
/// further batch is started.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// The explicit result of processing one block.
#[derive(Debug)]
pub enum BatchOutcome {
    /// The output record was written; the attached validation report is
    /// advisory and may be failing.
    Written {
        output: PathBuf,
        report: ValidationReport,
    },
    /// The batch was aborted before an output record was produced.
    Aborted { output: String, error: Error },
}

/// Aggregate result of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Output records written
    pub written: usize,
    /// Batches aborted without an output record
    pub aborted: usize,
    /// Written records whose validation report failed
    pub validation_failures: usize,
    /// Whether the run stopped early through the cancel token
    pub cancelled: bool,
}

/// Drives record mutation over the blocks of an update script.
pub struct Driver<'a> {
    manifest: &'a Manifest,
    gtc_dir: PathBuf,
    out_dir: PathBuf,
    threads: usize,
    cancel: CancelToken,
}

impl<'a> Driver<'a> {
    pub fn new<P: AsRef<Path>>(manifest: &'a Manifest, gtc_dir: P, out_dir: P) -> Self {
        Self {
            manifest,
            gtc_dir: gtc_dir.as_ref().to_path_buf(),
            out_dir: out_dir.as_ref().to_path_buf(),
            threads: 1,
            cancel: CancelToken::new(),
        }
    }

    /// Number of worker threads for batch processing (default 1).
    #[must_use]
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    /// Installs an externally held cancel token.
    #[must_use]
    pub fn cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Processes every block of the script in file order.
    ///
    /// Sequential by default: one batch is fully loaded, mutated,
    /// serialized, and validated before the next begins. With more than
    /// one thread, batches are distributed over a worker pool; the only
    /// shared state is the immutable manifest.
    ///
    /// # Errors
    ///
    /// Returns an error only for script parse failures; batch-scoped
    /// failures are recorded in their [`BatchOutcome`] and the summary.
    pub fn run<R: BufRead>(&self, blocks: Blocks<R>, events: &mut EventLog) -> Result<RunSummary> {
        let outcomes = if self.threads > 1 {
            self.run_parallel(blocks, events)?
        } else {
            self.run_sequential(blocks, events)?
        };

        let mut summary = RunSummary {
            cancelled: self.cancel.is_cancelled(),
            ..RunSummary::default()
        };
        for outcome in &outcomes {
            match outcome {
                BatchOutcome::Written { report, .. } => {
                    summary.written += 1;
                    if !report.passed() {
                        summary.validation_failures += 1;
                    }
                }
                BatchOutcome::Aborted { .. } => summary.aborted += 1,
            }
        }
        Ok(summary)
    }

    fn run_sequential<R: BufRead>(
        &self,
        blocks: Blocks<R>,
        events: &mut EventLog,
    ) -> Result<Vec<BatchOutcome>> {
        let mut outcomes = Vec::new();
        for block in blocks {
            if self.cancel.is_cancelled() {
                break;
            }
            let block = block?;
            outcomes.push(self.process_block(&block, events));
        }
        Ok(outcomes)
    }

    fn run_parallel<R: BufRead>(
        &self,
        blocks: Blocks<R>,
        events: &mut EventLog,
    ) -> Result<Vec<BatchOutcome>> {
        // the pool needs the full block list up front; script errors are
        // surfaced before any batch starts
        let blocks = blocks.collect::<Result<Vec<_>>>()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build()
            .map_err(|err| std::io::Error::other(err.to_string()))?;

        let batches: Vec<(BatchOutcome, EventLog)> = pool.install(|| {
            blocks
                .par_iter()
                .filter_map(|block| {
                    if self.cancel.is_cancelled() {
                        return None;
                    }
                    let mut local = EventLog::new();
                    Some((self.process_block(block, &mut local), local))
                })
                .collect()
        });

        let mut outcomes = Vec::with_capacity(batches.len());
        for (outcome, local) in batches {
            events.absorb(local);
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// Processes one block: mutate, serialize, reload, validate.
    fn process_block(&self, block: &Block, events: &mut EventLog) -> BatchOutcome {
        let source_path = self.gtc_dir.join(&block.source);
        let output_path = self.out_dir.join(format!("{}.gtc", block.output));

        match self.mutate_and_write(block, &source_path, &output_path, events) {
            Ok(report) => {
                if report.passed() {
                    events.info(format!("{} passed validation!", output_path.display()));
                } else {
                    for mismatch in report.mismatches() {
                        events.warning(format!("{}: {mismatch}", output_path.display()));
                    }
                    events.warning(format!(
                        "{} failed validation -- please re-run this gtc",
                        output_path.display()
                    ));
                }
                BatchOutcome::Written {
                    output: output_path,
                    report,
                }
            }
            Err(error) => {
                events.error(format!(
                    "Aborted batch for output {}: {error}",
                    block.output
                ));
                BatchOutcome::Aborted {
                    output: block.output.clone(),
                    error,
                }
            }
        }
    }

    fn mutate_and_write(
        &self,
        block: &Block,
        source_path: &Path,
        output_path: &Path,
        events: &mut EventLog,
    ) -> Result<ValidationReport> {
        let mut record = GtcRecord::from_path(source_path)?;

        if let Some(assignments) = &block.metadata {
            events.info("Metadata found. Updating metadata...");
            apply_assignments(&mut record, assignments, events)?;
        }

        for edit in &block.edits {
            let (pos, marker) = self
                .manifest
                .lookup(&edit.marker)
                .ok_or_else(|| EditError::UnknownMarker(edit.marker.clone()))?;
            let call = resolve(marker, edit.alleles)?;
            record.set_call(pos, call.code, call.bases)?;
        }

        events.info(format!(
            "Writing updated GTC to {}...",
            output_path.display()
        ));
        record.write_path(output_path)?;

        // both sides are reloaded from disk so the check covers the
        // serialized bytes, not the in-memory mutation
        let original = GtcRecord::from_path(source_path)?;
        let rewritten = GtcRecord::from_path(output_path)?;
        Ok(validate(&original, &rewritten, self.manifest.len()))
    }
}
