//! Directory layout of one test case.
//!
//! A test case lives in its own directory inside a test-suite tree:
//!
//! ```text
//! <ts_root>/
//!   bin/count-ic          counting helper
//!   common/               shared headers
//!   <case>/               test-case directory (sources, tc.toml)
//! <obj_root>/
//!   common/object/*.gz    canonical test-data store
//!   <case>/               object directory (defaults to the case dir)
//! ```

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::builder::errors::BuildError;
use crate::util::config::{global_config_path, load_config, project_config_path, Config};
use crate::util::fs::{absolutize, file_stem};

/// Default DWARF header location for generator mode.
pub const DEFAULT_DWARF_INCLUDE: &str = "/usr/local/include";

/// Default DWARF library location for generator mode.
pub const DEFAULT_DWARF_LIB: &str = "/usr/local/lib";

/// Explicit layout choices, usually from the command line or environment.
#[derive(Debug, Clone, Default)]
pub struct LayoutOptions {
    pub case_dir: Option<PathBuf>,
    pub obj_dir: Option<PathBuf>,
    pub ts_root: Option<PathBuf>,
    pub canonical_store: Option<PathBuf>,
    pub framework_root: Option<PathBuf>,
    pub dwarf_include: Option<PathBuf>,
    pub dwarf_lib: Option<PathBuf>,
    pub count_helper: Option<PathBuf>,
}

/// Fully resolved layout. All paths are absolute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layout {
    /// Test-case directory holding the declared sources
    pub case_dir: PathBuf,
    /// Output directory for objects, generated files, data and the program
    pub obj_dir: PathBuf,
    /// Test-suite root
    pub ts_root: PathBuf,
    /// Canonical store of compressed test data
    pub canonical_store: PathBuf,
    /// TET installation root
    pub framework_root: PathBuf,
    /// DWARF headers (generator mode only)
    pub dwarf_include: PathBuf,
    /// DWARF libraries (generator mode only)
    pub dwarf_lib: PathBuf,
    /// Counting helper that writes `ic_count.c`
    pub count_helper: PathBuf,
}

fn parent_or_self(path: &Path) -> PathBuf {
    path.parent().unwrap_or(path).to_path_buf()
}

impl Layout {
    /// Test-suite root implied by `opts`, needed before config can be loaded.
    pub fn suite_root(cwd: &Path, opts: &LayoutOptions) -> PathBuf {
        let case_dir = Self::case_dir(cwd, opts);
        match &opts.ts_root {
            Some(root) => absolutize(cwd, root),
            None => parent_or_self(&case_dir),
        }
    }

    fn case_dir(cwd: &Path, opts: &LayoutOptions) -> PathBuf {
        opts.case_dir
            .as_deref()
            .map(|dir| absolutize(cwd, dir))
            .unwrap_or_else(|| cwd.to_path_buf())
    }

    /// Resolve the layout, loading global and project config files.
    pub fn resolve(cwd: &Path, opts: &LayoutOptions) -> Result<Layout, BuildError> {
        let config = Self::load_config(cwd, opts);
        Self::resolve_with_config(cwd, opts, &config)
    }

    /// Load the merged configuration that applies to this test case.
    pub fn load_config(cwd: &Path, opts: &LayoutOptions) -> Config {
        let project = project_config_path(&Self::suite_root(cwd, opts));
        load_config(global_config_path().as_deref(), &project)
    }

    /// Resolve the layout against an already-loaded configuration.
    ///
    /// Options win over config; config wins over built-in defaults. The
    /// framework root has no default.
    pub fn resolve_with_config(
        cwd: &Path,
        opts: &LayoutOptions,
        config: &Config,
    ) -> Result<Layout, BuildError> {
        let case_dir = Self::case_dir(cwd, opts);
        let ts_root = Self::suite_root(cwd, opts);

        let obj_dir = opts
            .obj_dir
            .as_deref()
            .map(|dir| absolutize(cwd, dir))
            .unwrap_or_else(|| case_dir.clone());

        let canonical_store = opts
            .canonical_store
            .as_ref()
            .or(config.paths.canonical_store.as_ref())
            .map(|dir| absolutize(cwd, dir))
            .unwrap_or_else(|| parent_or_self(&obj_dir).join("common").join("object"));

        let framework_root = opts
            .framework_root
            .as_ref()
            .or(config.paths.framework_root.as_ref())
            .map(|dir| absolutize(cwd, dir))
            .ok_or(BuildError::MissingDependencyPath {
                what: "test framework root",
                env: "TET_ROOT",
            })?;

        let dwarf_include = opts
            .dwarf_include
            .as_ref()
            .or(config.paths.dwarf_include.as_ref())
            .map(|dir| absolutize(cwd, dir))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DWARF_INCLUDE));

        let dwarf_lib = opts
            .dwarf_lib
            .as_ref()
            .or(config.paths.dwarf_lib.as_ref())
            .map(|dir| absolutize(cwd, dir))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DWARF_LIB));

        let count_helper = opts
            .count_helper
            .as_deref()
            .map(|helper| absolutize(cwd, helper))
            .unwrap_or_else(|| ts_root.join("bin").join("count-ic"));

        Ok(Layout {
            case_dir,
            obj_dir,
            ts_root,
            canonical_store,
            framework_root,
            dwarf_include,
            dwarf_lib,
            count_helper,
        })
    }

    /// TET header directory.
    pub fn tet_include_dir(&self) -> PathBuf {
        self.framework_root.join("inc").join("tet3")
    }

    /// TET library directory.
    pub fn tet_lib_dir(&self) -> PathBuf {
        self.framework_root.join("lib").join("tet3")
    }

    /// TET test-case manager object linked into every program.
    pub fn tcm_object(&self) -> PathBuf {
        self.tet_lib_dir().join("tcm.o")
    }

    /// Headers shared by all test cases in the suite.
    pub fn common_dir(&self) -> PathBuf {
        self.ts_root.join("common")
    }

    /// `tc_<case directory name without extension>`.
    pub fn default_program_name(&self) -> String {
        format!("tc_{}", file_stem(&self.case_dir))
    }

    /// Where the linked program for `name` goes.
    pub fn program_path(&self, name: &str) -> PathBuf {
        self.obj_dir.join(name)
    }
}
