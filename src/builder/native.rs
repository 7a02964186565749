//! Native C compiler driver.
//!
//! Runs the compile steps of a [`BuildPlan`] and links the resulting
//! objects into the test program.

use std::time::Instant;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::builder::errors::BuildError;
use crate::builder::plan::{BuildPlan, CompileStep, LinkStep};
use crate::util::fs::ensure_dir;

/// Native C builder.
#[derive(Debug, Clone, Default)]
pub struct NativeBuilder {
    jobs: Option<usize>,
    verbose: bool,
}

impl NativeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the number of parallel compiler processes.
    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    /// Enable verbose output. Disables the progress bar.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Compile every unit of `plan`, then link the program.
    ///
    /// Units compile in parallel. When several fail, the error reported is
    /// the one for the earliest unit in link order.
    pub fn execute(&self, plan: &BuildPlan) -> Result<()> {
        let start = Instant::now();

        self.compile_all(&plan.compile)?;
        self.link(&plan.link)?;

        tracing::debug!(
            "Built {} from {} unit(s) in {:.2}s",
            plan.program,
            plan.compile_count(),
            start.elapsed().as_secs_f64()
        );
        Ok(())
    }

    /// Compile all units in parallel.
    pub fn compile_all(&self, steps: &[CompileStep]) -> Result<()> {
        if steps.is_empty() {
            return Ok(());
        }
        tracing::info!("Compiling {} unit(s)", steps.len());

        let pb = if !self.verbose && steps.len() > 1 {
            let pb = ProgressBar::new(steps.len() as u64);
            let style = ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .context("invalid progress template")?
                .progress_chars("#>-");
            pb.set_style(style);
            Some(pb)
        } else {
            None
        };

        let run = || -> Vec<Result<()>> {
            steps
                .par_iter()
                .map(|step| {
                    let result = self.compile(step);
                    if let Some(pb) = &pb {
                        pb.inc(1);
                    }
                    result
                })
                .collect()
        };

        let results = match self.jobs {
            Some(jobs) => rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build()
                .context("failed to start compile thread pool")?
                .install(run),
            None => run(),
        };

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        results.into_iter().collect()
    }

    /// Compile a single unit.
    fn compile(&self, step: &CompileStep) -> Result<()> {
        if let Some(parent) = step.output.parent() {
            ensure_dir(parent)?;
        }

        let cmd = step.command.to_process();
        tracing::debug!(
            "Compiling {} -> {}",
            step.source.display(),
            step.output.display()
        );
        if self.verbose {
            tracing::debug!("{}", cmd.display_command());
        }

        let output = cmd.exec().map_err(|e| BuildError::Compile {
            unit: step.source.clone(),
            status: None,
            stderr: format!("{:#}", e),
        })?;

        if !output.status.success() {
            return Err(BuildError::Compile {
                unit: step.source.clone(),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }
            .into());
        }

        Ok(())
    }

    /// Link the test program.
    pub fn link(&self, step: &LinkStep) -> Result<()> {
        if let Some(parent) = step.output.parent() {
            ensure_dir(parent)?;
        }

        let cmd = step.command.to_process();
        tracing::info!("Linking {}", step.output.display());
        if self.verbose {
            tracing::debug!("{}", cmd.display_command());
        }

        let output = cmd.exec().map_err(|e| BuildError::Link {
            output: step.output.clone(),
            status: None,
            stderr: format!("{:#}", e),
        })?;

        if !output.status.success() {
            return Err(BuildError::Link {
                output: step.output.clone(),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }
            .into());
        }

        Ok(())
    }
}
