//! High-level operations.
//!
//! This module contains the implementation of tcbuild commands.

pub mod tc_build;

pub use crate::builder::BuildRequest;
pub use tc_build::{BuildOrchestrator, CompiledProgram};
