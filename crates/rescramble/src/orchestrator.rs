//! Rename orchestration across category phases.
//!
//! One job runs at most four phases in a fixed order: id attributes, plain
//! attributes, layout files, generic files. Ids come before the bulk
//! attribute churn because their renames trigger the generated-field
//! rewrite; layouts precede generic files for the symmetric reason. Phases
//! whose rule is disabled are skipped outright, empty phases never touch the
//! progress tracker, and the cancellation signal is polled between symbols.
//! Committed renames are never rolled back.

use std::fmt;

use anyhow::Result;
use log::{debug, info};

use crate::{
    collector,
    config::ObfuscateConfig,
    generator::NameSource,
    progress::{CancelToken, ProgressSink, ProgressTracker},
    project::ProjectLock,
    propagate::ReferencePropagator,
    resources::ResourceSymbol,
};

/// Terminal state of a rename job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    Cancelled,
}

/// Summary of one job: terminal state, committed rename count, and the
/// derived-name diagnostics emitted along the way.
#[derive(Debug)]
pub struct RunReport {
    pub outcome: Outcome,
    pub renamed: usize,
    pub diagnostics: Vec<String>,
}

/// Phase being executed; selects the name kind and the rename label.
#[derive(Debug, Clone, Copy)]
enum Phase {
    Ids,
    Attributes,
    Layouts,
    Files,
}

impl Phase {
    fn label(self) -> &'static str {
        match self {
            Self::Ids => "IdResource",
            Self::Attributes => "Resource",
            Self::Layouts => "LayoutResource",
            Self::Files => "FileResource",
        }
    }

    fn rename_label(self) -> &'static str {
        match self {
            Self::Ids => "IdAttribute",
            Self::Attributes => "Attribute",
            Self::Layouts => "Layout",
            Self::Files => "File",
        }
    }

    fn uses_file_names(self) -> bool {
        matches!(self, Self::Layouts | Self::Files)
    }
}

/// Drives a full rename job over an obfuscation project.
///
/// All collaborators are injected: the project lock, the name source, the
/// progress sink, the cancellation token, and the configuration gates.
pub struct Obfuscator<'a> {
    lock: &'a ProjectLock,
    names: &'a dyn NameSource,
    cancel: &'a dyn CancelToken,
    config: &'a ObfuscateConfig,
    tracker: ProgressTracker<'a>,
}

impl fmt::Debug for Obfuscator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Obfuscator")
            .field("config", &self.config)
            .field("tracker", &self.tracker)
            .finish_non_exhaustive()
    }
}

impl<'a> Obfuscator<'a> {
    pub fn new(
        lock: &'a ProjectLock,
        names: &'a dyn NameSource,
        sink: &'a mut dyn ProgressSink,
        cancel: &'a dyn CancelToken,
        config: &'a ObfuscateConfig,
    ) -> Self {
        Self {
            lock,
            names,
            cancel,
            config,
            tracker: ProgressTracker::new("Resource", sink),
        }
    }

    /// Run the job to completion or cancellation.
    pub fn run(&mut self) -> Result<RunReport> {
        self.tracker.begin();
        let mut propagator = ReferencePropagator::new(self.lock);
        let mut report = RunReport {
            outcome: Outcome::Done,
            renamed: 0,
            diagnostics: Vec::new(),
        };
        let finished = self.process_attributes(&mut propagator, &mut report)?
            && self.process_files(&mut propagator, &mut report)?;
        if !finished {
            report.outcome = Outcome::Cancelled;
        }
        report.diagnostics = propagator.take_diagnostics();
        info!(
            "job {}: {} symbols renamed",
            match report.outcome {
                Outcome::Done => "done",
                Outcome::Cancelled => "cancelled",
            },
            report.renamed
        );
        Ok(report)
    }

    fn process_attributes(
        &mut self,
        propagator: &mut ReferencePropagator<'_>,
        report: &mut RunReport,
    ) -> Result<bool> {
        if !self.config.attribute_rule {
            debug!("attribute rule disabled, skipping attribute phases");
            return Ok(true);
        }
        let symbols = self
            .lock
            .with_read(|project| collector::collect_attribute_symbols(&project.markup));
        let (ids, plain) = collector::partition_attribute_symbols(symbols);
        Ok(self.run_phase(&ids, Phase::Ids, propagator, report)?
            && self.run_phase(&plain, Phase::Attributes, propagator, report)?)
    }

    fn process_files(
        &mut self,
        propagator: &mut ReferencePropagator<'_>,
        report: &mut RunReport,
    ) -> Result<bool> {
        if !self.config.file_rule {
            debug!("file rule disabled, skipping file phases");
            return Ok(true);
        }
        let symbols = self
            .lock
            .with_read(|project| collector::collect_file_symbols(&project.markup));
        let (layouts, generic) = collector::partition_file_symbols(symbols);
        Ok(self.run_phase(&layouts, Phase::Layouts, propagator, report)?
            && self.run_phase(&generic, Phase::Files, propagator, report)?)
    }

    /// Process one phase batch; returns `false` on cancellation.
    fn run_phase(
        &mut self,
        batch: &[ResourceSymbol],
        phase: Phase,
        propagator: &mut ReferencePropagator<'_>,
        report: &mut RunReport,
    ) -> Result<bool> {
        if batch.is_empty() {
            debug!("phase {} has no symbols", phase.label());
            return Ok(true);
        }
        debug!("phase {}: {} symbols", phase.label(), batch.len());
        self.tracker.reset(batch.len(), phase.label());
        for symbol in batch {
            if self.cancel.is_cancelled() {
                info!(
                    "cancelled during phase {}; committed renames stand",
                    phase.label()
                );
                return Ok(false);
            }
            self.rename_symbol(symbol, phase, propagator)?;
            report.renamed += 1;
            self.tracker.increment();
        }
        debug_assert!(self.tracker.phase_complete());
        Ok(true)
    }

    /// One symbol's unit of work: new name, declaration rename, reference
    /// propagation. The write scope covers a single symbol only, so the
    /// propagation for symbol N observes N's fully applied rename before
    /// N+1 begins.
    fn rename_symbol(
        &mut self,
        symbol: &ResourceSymbol,
        phase: Phase,
        propagator: &mut ReferencePropagator<'_>,
    ) -> Result<()> {
        let new_name = if phase.uses_file_names() {
            self.names.next_file_name()?
        } else {
            self.names.next_attribute_name()?
        };
        self.lock.with_write(|project| {
            project.rename_declaration(&symbol.site, &new_name, phase.rename_label())
        })?;
        propagator.propagate(symbol, &new_name)
    }
}
