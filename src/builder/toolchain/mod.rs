//! Toolchain abstraction for the C compiler.
//!
//! Test programs are plain C, compiled one unit at a time and linked with
//! the same compiler driver.
//!
//! Toolchain detection priority:
//! 1. Explicit compiler (`--cc`, `CC`, or `[toolchain] cc` in tcbuild.toml)
//! 2. Auto-detection (searching PATH for common compilers)

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::util::process::ProcessBuilder;

mod detect;
mod gcc;

pub use detect::detect_toolchain;
pub use gcc::GccToolchain;

/// A command to execute, with program, arguments, and environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSpec {
    /// The program to run (e.g., "cc")
    pub program: PathBuf,
    /// Command arguments
    pub args: Vec<String>,
    /// Environment variables to set
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    /// Create a new command spec.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        CommandSpec {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    /// Add an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(|a| a.into()));
        self
    }

    /// Add an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Turn the spec into a runnable process.
    pub fn to_process(&self) -> ProcessBuilder {
        let mut cmd = ProcessBuilder::new(&self.program).args(&self.args);

        for (key, value) in &self.env {
            cmd = cmd.env(key, value);
        }

        cmd
    }
}

/// Input for a compile step.
#[derive(Debug, Clone)]
pub struct CompileInput {
    /// Source file to compile
    pub source: PathBuf,
    /// Output object file
    pub output: PathBuf,
    /// Compiler flags (include paths, defines, warnings)
    pub cflags: Vec<String>,
}

/// Input for a link step.
#[derive(Debug, Clone)]
pub struct LinkInput {
    /// Object files to link, in order
    pub objects: Vec<PathBuf>,
    /// Output executable
    pub output: PathBuf,
    /// Libraries, extra objects and search paths following the objects
    pub ldadd: Vec<String>,
}

/// The family of a toolchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolchainPlatform {
    /// GCC (GNU Compiler Collection)
    Gcc,
    /// Clang/LLVM
    Clang,
}

impl ToolchainPlatform {
    /// Get the platform name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolchainPlatform::Gcc => "gcc",
            ToolchainPlatform::Clang => "clang",
        }
    }
}

/// Trait for toolchain implementations.
///
/// Each toolchain knows how to generate commands for its specific compiler.
pub trait Toolchain: Send + Sync {
    /// Get the toolchain platform.
    fn platform(&self) -> ToolchainPlatform;

    /// Get the C compiler path.
    fn compiler_path(&self) -> &Path;

    /// Generate a compile command for one unit.
    fn compile_command(&self, input: &CompileInput) -> CommandSpec;

    /// Generate a link command for an executable.
    fn link_exe_command(&self, input: &LinkInput) -> CommandSpec;

    /// Get the object file extension.
    fn object_extension(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_spec_to_process() {
        let spec = CommandSpec::new("cc")
            .arg("-c")
            .args(["a.c", "-o", "a.o"])
            .env("LC_ALL", "C");

        let process = spec.to_process();
        assert_eq!(process.display_command(), "cc -c a.c -o a.o");
    }
}
