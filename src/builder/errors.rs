//! Build error taxonomy and diagnostics.
//!
//! Every variant is terminal for the current test case. Variants produced by
//! an external tool keep that tool's exit status and output verbatim.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Exit codes used when no external tool status is available.
pub mod exit_codes {
    pub const FAILURE: i32 = 1;
    pub const DATA_ERR: i32 = 65;
    pub const NO_INPUT: i32 = 66;
    pub const UNAVAILABLE: i32 = 69;
    pub const IO_ERR: i32 = 74;
    pub const CONFIG: i32 = 78;
}

/// Error while building a test case.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum BuildError {
    #[error("unrecognized source kind for `{}`", path.display())]
    #[diagnostic(
        code(tcbuild::classify::unrecognized_kind),
        help("test-case sources must end in `.c` or `.m4`")
    )]
    UnrecognizedSourceKind { path: PathBuf },

    #[error("invalid test-data name `{name}`: {reason}")]
    #[diagnostic(
        code(tcbuild::stage::invalid_name),
        help("test-data names are relative file names inside the object directory")
    )]
    InvalidAssetName { name: String, reason: &'static str },

    #[error("`{}` and `{}` both produce {}", first.display(), second.display(), output.display())]
    #[diagnostic(code(tcbuild::plan::output_collision))]
    OutputCollision {
        output: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("counting helper `{}` failed: {message}", helper.display())]
    #[diagnostic(code(tcbuild::generate::helper_failed))]
    HelperInvocation {
        helper: PathBuf,
        status: Option<i32>,
        message: String,
    },

    #[error("no canonical archive for test data `{name}` at {}", archive.display())]
    #[diagnostic(code(tcbuild::stage::missing_archive))]
    MissingCanonicalAsset { name: String, archive: PathBuf },

    #[error("failed to decompress `{}`: {message}", archive.display())]
    #[diagnostic(code(tcbuild::stage::decompress))]
    Decompression {
        name: String,
        archive: PathBuf,
        message: String,
    },

    #[error("{what} is not set (use {env} or the config file)")]
    #[diagnostic(code(tcbuild::config::missing_path))]
    MissingDependencyPath {
        what: &'static str,
        env: &'static str,
    },

    #[error("compilation failed for {}\n{stderr}", unit.display())]
    #[diagnostic(code(tcbuild::build::compile))]
    Compile {
        unit: PathBuf,
        status: Option<i32>,
        stderr: String,
    },

    #[error("linking failed for {}\n{stderr}", output.display())]
    #[diagnostic(code(tcbuild::build::link))]
    Link {
        output: PathBuf,
        status: Option<i32>,
        stderr: String,
    },
}

/// Prefer the tool's own non-zero status over the fallback code.
fn tool_status(status: Option<i32>, fallback: i32) -> i32 {
    status.filter(|code| *code != 0).unwrap_or(fallback)
}

impl BuildError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            BuildError::UnrecognizedSourceKind { .. }
            | BuildError::InvalidAssetName { .. }
            | BuildError::OutputCollision { .. } => exit_codes::DATA_ERR,
            BuildError::HelperInvocation { status, .. } => {
                tool_status(*status, exit_codes::UNAVAILABLE)
            }
            BuildError::MissingCanonicalAsset { .. } => exit_codes::NO_INPUT,
            BuildError::Decompression { .. } => exit_codes::IO_ERR,
            BuildError::MissingDependencyPath { .. } => exit_codes::CONFIG,
            BuildError::Compile { status, .. } | BuildError::Link { status, .. } => {
                tool_status(*status, exit_codes::FAILURE)
            }
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            BuildError::UnrecognizedSourceKind { path } => Diagnostic::error(format!(
                "cannot tell how to compile `{}`",
                path.display()
            ))
            .with_location(path)
            .with_suggestion("Rename the file to `.c`, or to `.m4` if it needs macro expansion"),

            BuildError::InvalidAssetName { name, reason } => {
                Diagnostic::error(format!("invalid test-data name `{}`", name))
                    .with_context(*reason)
                    .with_suggestion("Name the file relative to the canonical store, without `..`")
            }

            BuildError::OutputCollision {
                output,
                first,
                second,
            } => Diagnostic::error(format!(
                "`{}` and `{}` both produce the same file",
                first.display(),
                second.display()
            ))
            .with_location(output)
            .with_suggestion("Rename one of them so every unit and data file has its own name"),

            BuildError::HelperInvocation {
                helper,
                status,
                message,
            } => {
                let mut diag = Diagnostic::error("failed to generate ic_count.c")
                    .with_location(helper)
                    .with_context(message.clone());
                if let Some(code) = status {
                    diag = diag.with_context(format!("helper exited with status {}", code));
                }
                diag.with_suggestion("Build in generator mode (--tcgen) to skip the counting helper")
            }

            BuildError::MissingCanonicalAsset { name, archive } => {
                Diagnostic::error(format!("test data `{}` has no canonical archive", name))
                    .with_location(archive)
                    .with_suggestion(suggestions::MISSING_ARCHIVE)
            }

            BuildError::Decompression {
                name,
                archive,
                message,
            } => Diagnostic::error(format!("test data `{}` could not be decompressed", name))
                .with_location(archive)
                .with_context(message.clone())
                .with_suggestion("Regenerate the archive with `gzip`"),

            BuildError::MissingDependencyPath { what, .. } => {
                Diagnostic::error(format!("{} is not set", what))
                    .with_suggestion(suggestions::SET_TET_ROOT)
            }

            BuildError::Compile { unit, stderr, .. } => {
                Diagnostic::error(format!("compilation failed for {}", unit.display()))
                    .with_location(unit)
                    .with_context(stderr.clone())
                    .with_suggestion(suggestions::BUILD_FAILED)
            }

            BuildError::Link { output, stderr, .. } => {
                Diagnostic::error(format!("linking failed for {}", output.display()))
                    .with_location(output)
                    .with_context(stderr.clone())
                    .with_suggestion(suggestions::BUILD_FAILED)
            }
        }
    }
}
