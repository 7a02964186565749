//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use tcbuild::LayoutOptions;

/// tcbuild - build DWARF test-suite test cases
#[derive(Parser)]
#[command(name = "tcbuild")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Test-case directory (defaults to the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub case_dir: Option<PathBuf>,

    /// Object directory (defaults to the test-case directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub obj_dir: Option<PathBuf>,

    /// Test-suite root (defaults to the parent of the test-case directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub ts_root: Option<PathBuf>,

    /// Directory of gzip test-data archives
    #[arg(long, global = true, value_name = "DIR")]
    pub canonical_store: Option<PathBuf>,

    /// TET installation root
    #[arg(long, global = true, env = "TET_ROOT", value_name = "DIR")]
    pub framework_root: Option<PathBuf>,

    /// DWARF headers for generator mode
    #[arg(long, global = true, env = "DWARF_INC", value_name = "DIR")]
    pub dwarf_include: Option<PathBuf>,

    /// DWARF libraries for generator mode
    #[arg(long, global = true, env = "DWARF_LIBS", value_name = "DIR")]
    pub dwarf_lib: Option<PathBuf>,

    /// Counting helper that writes ic_count.c
    #[arg(long, global = true, value_name = "PATH")]
    pub count_helper: Option<PathBuf>,

    /// C compiler
    #[arg(long, global = true, env = "CC", value_name = "PATH")]
    pub cc: Option<PathBuf>,

    /// m4 macro processor
    #[arg(long, global = true, env = "M4", value_name = "PATH")]
    pub m4: Option<PathBuf>,

    /// Number of parallel jobs
    #[arg(short, long, global = true)]
    pub jobs: Option<usize>,
}

impl GlobalArgs {
    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            case_dir: self.case_dir.clone(),
            obj_dir: self.obj_dir.clone(),
            ts_root: self.ts_root.clone(),
            canonical_store: self.canonical_store.clone(),
            framework_root: self.framework_root.clone(),
            dwarf_include: self.dwarf_include.clone(),
            dwarf_lib: self.dwarf_lib.clone(),
            count_helper: self.count_helper.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the test program
    Build(BuildArgs),

    /// Stage test data from the canonical store
    Stage(StageArgs),

    /// Show compile/link flags
    Flags(FlagsArgs),

    /// Remove generated files, staged data, objects and the program
    Clean(CleanArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// What to build. Values given here override `tc.toml`.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Program name (defaults to tc_<test-case directory>)
    #[arg(long)]
    pub program: Option<String>,

    /// Source file (.c or .m4), may be repeated
    #[arg(long = "source", value_name = "PATH")]
    pub sources: Vec<PathBuf>,

    /// Test-data asset name, may be repeated
    #[arg(long = "data", value_name = "NAME")]
    pub data: Vec<String>,

    /// Generator mode: define TCGEN and build against the DWARF library
    #[arg(long)]
    pub tcgen: bool,
}

#[derive(Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Emit build plan as JSON (no build)
    #[arg(long)]
    pub plan: bool,
}

#[derive(Args)]
pub struct StageArgs {
    /// Test-data asset name, may be repeated
    #[arg(long = "data", value_name = "NAME")]
    pub data: Vec<String>,
}

#[derive(Args)]
pub struct FlagsArgs {
    /// Show compile flags only
    #[arg(long, conflicts_with = "link")]
    pub compile: bool,

    /// Show link flags only
    #[arg(long)]
    pub link: bool,

    /// Show generator-mode flags
    #[arg(long)]
    pub tcgen: bool,
}

#[derive(Args)]
pub struct CleanArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
