//! Implementation of `tcbuild build`, `stage` and `clean`.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::builder::{
    BuildPlan, BuildRequest, CleanupTracker, ConfigResolver, DerivedFileGenerator, MacroExpander,
    NativeBuilder, TestDataStager, Toolchain,
};
use crate::core::asset::TestDataAsset;
use crate::util::context::Layout;
use crate::util::fs::ensure_dir;
use crate::util::process::find_m4;

/// A linked test program.
#[derive(Debug, Clone)]
pub struct CompiledProgram {
    pub name: String,
    pub path: PathBuf,
    /// Objects in link order
    pub objects: Vec<PathBuf>,
    /// Staged test data
    pub data: Vec<TestDataAsset>,
    /// Paths registered for cleanup by this build
    pub cleanup: Vec<PathBuf>,
}

/// Builds one test program and owns the files generated for it.
pub struct BuildOrchestrator<'a> {
    layout: &'a Layout,
    toolchain: &'a dyn Toolchain,
    resolver: ConfigResolver,
    m4: Option<PathBuf>,
    jobs: Option<usize>,
    verbose: bool,
    cleanup: CleanupTracker,
}

impl<'a> BuildOrchestrator<'a> {
    pub fn new(layout: &'a Layout, toolchain: &'a dyn Toolchain) -> Self {
        BuildOrchestrator {
            layout,
            toolchain,
            resolver: ConfigResolver::new(),
            m4: None,
            jobs: None,
            verbose: false,
            cleanup: CleanupTracker::new(),
        }
    }

    pub fn with_resolver(mut self, resolver: ConfigResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Use `m4` instead of looking one up on `PATH`.
    pub fn with_m4(mut self, m4: Option<PathBuf>) -> Self {
        self.m4 = m4;
        self
    }

    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn layout(&self) -> &Layout {
        self.layout
    }

    /// Files this orchestrator will remove on [`reset`](Self::reset).
    pub fn cleanup(&self) -> &CleanupTracker {
        &self.cleanup
    }

    /// Resolve everything `build` would do without running anything.
    pub fn plan(&self, request: &BuildRequest) -> Result<BuildPlan> {
        Ok(BuildPlan::new(
            self.layout,
            self.toolchain,
            &self.resolver,
            request,
        )?)
    }

    /// Build the test program described by `request`.
    ///
    /// Generated and staged paths are tracked before they are produced, so
    /// a failed build still leaves them removable by [`reset`](Self::reset).
    pub fn build(&mut self, request: &BuildRequest) -> Result<CompiledProgram> {
        let plan = self.plan(request)?;
        let obj_dir = &self.layout.obj_dir;

        tracing::info!(
            "Building {} ({} unit(s), {} data file(s){})",
            plan.program,
            plan.compile_count(),
            plan.data.len(),
            if request.generator_mode {
                ", generator mode"
            } else {
                ""
            }
        );

        ensure_dir(obj_dir)?;
        self.cleanup.track_all(plan.cleanup.iter().cloned());

        if !plan.expansions.is_empty() {
            let expander = MacroExpander::new(self.m4_path()?);
            for step in &plan.expansions {
                expander.expand(&step.source, obj_dir)?;
            }
        }

        DerivedFileGenerator::new(&self.layout.count_helper)
            .generate(obj_dir, request.generator_mode)?;

        let data = self.stager().stage_parallel(&request.data)?;

        NativeBuilder::new()
            .with_jobs(self.jobs)
            .verbose(self.verbose)
            .execute(&plan)?;

        Ok(CompiledProgram {
            name: plan.program,
            path: plan.link.output,
            objects: plan.link.objects,
            data,
            cleanup: plan.cleanup,
        })
    }

    /// Stage test data only, tracking the staged files and their sidecars.
    pub fn stage_data(&mut self, names: &[String]) -> Result<Vec<TestDataAsset>> {
        let stager = self.stager();
        let described = stager.describe(names)?;
        self.cleanup
            .track_all(described.iter().map(|a| a.local_path.clone()));
        self.cleanup.track_all(described.iter().map(|a| a.sidecar_path()));

        stager.stage_parallel(names)
    }

    /// Remove every tracked file. Returns the paths actually removed.
    pub fn reset(&mut self) -> Result<Vec<PathBuf>> {
        self.cleanup.reset()
    }

    /// Remove everything a build of `request` generates: tracked files,
    /// objects and the program.
    ///
    /// Uses a fresh tracker, so it works without a prior `build` in this
    /// process.
    pub fn clean(&self, request: &BuildRequest) -> Result<Vec<PathBuf>> {
        let plan = self.plan(request)?;

        let mut tracker = CleanupTracker::new();
        tracker.track_all(plan.cleanup);
        tracker.track_all(plan.link.objects);
        tracker.track(plan.link.output);

        tracker.reset().context("failed to clean test case")
    }

    fn stager(&self) -> TestDataStager {
        TestDataStager::new(&self.layout.obj_dir, &self.layout.canonical_store)
    }

    fn m4_path(&self) -> Result<PathBuf> {
        match &self.m4 {
            Some(m4) => Ok(m4.clone()),
            None => find_m4().context("no m4 found on PATH (set M4 or use --m4)"),
        }
    }
}
