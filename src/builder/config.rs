//! Compile and link configuration for a test case.
//!
//! Every test program is compiled against the TET headers and the suite's
//! common headers, and linked against libelf, the TET test-case manager,
//! libapi, libbsdxml and libdwarf. Generator mode additionally points at an
//! external DWARF installation and defines `TCGEN`.

use std::path::PathBuf;

use serde::Serialize;

use crate::util::context::Layout;

/// Preprocessor symbol defined in generator mode.
pub const GENERATOR_DEFINE: &str = "TCGEN";

/// Default warning level.
pub const DEFAULT_WARNS: u8 = 2;

/// Resolved configuration for one build. Immutable once resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildConfig {
    /// Header search paths, in order
    pub include_paths: Vec<PathBuf>,
    /// Library search paths, in order
    pub library_paths: Vec<PathBuf>,
    /// Compiler flags, in order
    pub flags: Vec<String>,
    /// Linker inputs and flags following the objects, in order
    pub ldadd: Vec<String>,
    /// Whether this is a generator-mode build
    pub generator_mode: bool,
}

impl BuildConfig {
    /// Whether the generator define is among the compile flags.
    pub fn defines_generator(&self) -> bool {
        let define = format!("-D{}", GENERATOR_DEFINE);
        self.flags.iter().any(|f| *f == define)
    }
}

/// Warning flags for a warning level, cumulative like `WARNS` in BSD make.
pub fn warning_flags(level: u8) -> Vec<&'static str> {
    let mut flags = Vec::new();
    if level >= 1 {
        flags.push("-Wsystem-headers");
    }
    if level >= 2 {
        flags.push("-Wall");
    }
    if level >= 3 {
        flags.extend([
            "-W",
            "-Wno-unused-parameter",
            "-Wstrict-prototypes",
            "-Wmissing-prototypes",
            "-Wpointer-arith",
        ]);
    }
    if level >= 4 {
        flags.extend([
            "-Wreturn-type",
            "-Wcast-qual",
            "-Wwrite-strings",
            "-Wswitch",
            "-Wshadow",
        ]);
    }
    flags
}

/// Composes a [`BuildConfig`] from a layout and the generator-mode switch.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    warns: u8,
    extra_cflags: Vec<String>,
    extra_ldflags: Vec<String>,
}

impl Default for ConfigResolver {
    fn default() -> Self {
        ConfigResolver {
            warns: DEFAULT_WARNS,
            extra_cflags: Vec::new(),
            extra_ldflags: Vec::new(),
        }
    }
}

impl ConfigResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the warning level.
    pub fn with_warns(mut self, warns: u8) -> Self {
        self.warns = warns;
        self
    }

    /// Append user compiler and linker flags after the built-in ones.
    pub fn with_extra_flags(mut self, cflags: Vec<String>, ldflags: Vec<String>) -> Self {
        self.extra_cflags = cflags;
        self.extra_ldflags = ldflags;
        self
    }

    /// Resolve the configuration. Pure: touches no files.
    pub fn resolve(&self, layout: &Layout, generator_mode: bool) -> BuildConfig {
        let mut include_paths = vec![layout.tet_include_dir(), layout.common_dir()];
        let mut library_paths = vec![layout.tet_lib_dir()];

        let mut flags: Vec<String> = include_paths
            .iter()
            .map(|dir| format!("-I{}", dir.display()))
            .collect();

        if generator_mode {
            include_paths.push(layout.dwarf_include.clone());
            library_paths.push(layout.dwarf_lib.clone());
            flags.push(format!("-D{}", GENERATOR_DEFINE));
            flags.push(format!("-I{}", layout.dwarf_include.display()));
        }

        flags.extend(warning_flags(self.warns).into_iter().map(String::from));
        flags.extend(self.extra_cflags.iter().cloned());

        let mut ldadd = vec![
            "-lelf".to_string(),
            layout.tcm_object().display().to_string(),
            format!("-L{}", layout.tet_lib_dir().display()),
            "-lapi".to_string(),
            "-lbsdxml".to_string(),
        ];
        if generator_mode {
            ldadd.push(format!("-L{}", layout.dwarf_lib.display()));
        }
        ldadd.push("-ldwarf".to_string());
        ldadd.extend(self.extra_ldflags.iter().cloned());

        BuildConfig {
            include_paths,
            library_paths,
            flags,
            ldadd,
            generator_mode,
        }
    }
}
