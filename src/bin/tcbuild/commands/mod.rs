//! Command implementations

pub mod build;
pub mod clean;
pub mod completions;
pub mod flags;
pub mod stage;

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::cli::{GlobalArgs, TargetArgs};
use tcbuild::builder::config::DEFAULT_WARNS;
use tcbuild::builder::{
    detect_toolchain, BuildRequest, ConfigResolver, GccToolchain, Toolchain, ToolchainPlatform,
};
use tcbuild::util::diagnostic::{self, Diagnostic};
use tcbuild::util::Config;
use tcbuild::{BuildOrchestrator, Layout, TestCaseManifest};

/// Everything a command needs to know about the test case at hand.
pub struct Session {
    pub global: GlobalArgs,
    pub layout: Layout,
    pub config: Config,
    pub manifest: TestCaseManifest,
}

impl Session {
    /// Resolve the layout and load settings and the `tc.toml` manifest.
    pub fn load(global: GlobalArgs) -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        let opts = global.layout_options();

        let config = Layout::load_config(&cwd, &opts);
        let layout = Layout::resolve_with_config(&cwd, &opts, &config)?;
        let manifest = TestCaseManifest::load_from_dir(&layout.case_dir)?;

        tracing::debug!("Test case {}", layout.case_dir.display());
        tracing::debug!("Object directory {}", layout.obj_dir.display());

        Ok(Session {
            global,
            layout,
            config,
            manifest,
        })
    }

    /// Detect the C compiler. CLI/env wins over the settings file.
    pub fn toolchain(&self) -> Result<Box<dyn Toolchain>> {
        let cc = self.global.cc.as_ref().or(self.config.toolchain.cc.as_ref());
        detect_toolchain(cc.map(PathBuf::as_path))
    }

    /// The detected compiler, or a GCC-style stand-in when none is found.
    ///
    /// For commands that only need object naming and never run the compiler.
    pub fn toolchain_or_default(&self) -> Box<dyn Toolchain> {
        self.toolchain().unwrap_or_else(|err| {
            tracing::debug!("{err:#}; assuming GCC object naming");
            Box::new(GccToolchain::new(PathBuf::from("cc"), ToolchainPlatform::Gcc))
        })
    }

    pub fn m4(&self) -> Option<PathBuf> {
        self.global
            .m4
            .clone()
            .or_else(|| self.config.toolchain.m4.clone())
    }

    pub fn resolver(&self) -> ConfigResolver {
        ConfigResolver::new()
            .with_warns(self.manifest.test_case.warns.unwrap_or(DEFAULT_WARNS))
            .with_extra_flags(
                self.config.toolchain.cflags.clone(),
                self.config.toolchain.ldflags.clone(),
            )
    }

    pub fn orchestrator<'a>(&'a self, toolchain: &'a dyn Toolchain) -> BuildOrchestrator<'a> {
        BuildOrchestrator::new(&self.layout, toolchain)
            .with_resolver(self.resolver())
            .with_m4(self.m4())
            .with_jobs(self.global.jobs)
            .verbose(self.global.verbose)
    }

    /// Merge command-line target arguments over the manifest.
    pub fn request(&self, args: &TargetArgs) -> BuildRequest {
        let tc = &self.manifest.test_case;

        let program = args
            .program
            .clone()
            .or_else(|| tc.program.clone())
            .unwrap_or_else(|| self.layout.default_program_name());
        let sources = if args.sources.is_empty() {
            tc.sources.clone()
        } else {
            args.sources.clone()
        };
        let data = if args.data.is_empty() {
            tc.data.clone()
        } else {
            args.data.clone()
        };

        BuildRequest {
            program,
            sources,
            data,
            generator_mode: args.tcgen,
        }
    }

    /// Print a warning diagnostic.
    pub fn warn(&self, diag: Diagnostic) {
        diagnostic::emit(&diag, use_color(self.global.no_color));
    }
}

/// Color only when stderr is a terminal and color wasn't disabled.
pub fn use_color(no_color: bool) -> bool {
    use std::io::IsTerminal;
    !no_color && std::io::stderr().is_terminal()
}
