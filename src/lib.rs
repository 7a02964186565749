//! tcbuild - build orchestrator for DWARF test-suite test cases
//!
//! This crate provides the library behind the `tcbuild` command: layout
//! and configuration resolution, source classification, generated-source
//! production, test-data staging, compilation and cleanup.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test fixtures for tcbuild unit tests.
///
/// This module is only available when running tests. It provides a
/// throwaway test-suite tree with a fake compiler, m4 and counting helper.
#[cfg(test)]
pub mod test_support;

pub use builder::{BuildConfig, BuildError, BuildPlan, BuildRequest, CleanupTracker};
pub use crate::core::{asset::TestDataAsset, manifest::TestCaseManifest, source::SourceKind};
pub use ops::{BuildOrchestrator, CompiledProgram};
pub use util::context::{Layout, LayoutOptions};
