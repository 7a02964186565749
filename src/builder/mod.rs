//! Test-case build system.
//!
//! This module implements configuration resolution, source generation,
//! test-data staging, build planning and the native compiler driver.

pub mod cleanup;
pub mod config;
pub mod errors;
pub mod generate;
pub mod macros;
pub mod native;
pub mod plan;
pub mod stage;
pub mod toolchain;

pub use cleanup::CleanupTracker;
pub use config::{BuildConfig, ConfigResolver};
pub use errors::BuildError;
pub use generate::DerivedFileGenerator;
pub use macros::MacroExpander;
pub use native::NativeBuilder;
pub use plan::{BuildPlan, BuildRequest};
pub use stage::TestDataStager;
pub use toolchain::{detect_toolchain, CommandSpec, GccToolchain, Toolchain, ToolchainPlatform};
