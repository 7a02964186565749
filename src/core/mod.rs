//! Core data structures for tcbuild.
//!
//! - Declared sources and their classification
//! - Test-data assets
//! - The `tc.toml` test-case manifest

pub mod asset;
pub mod manifest;
pub mod source;

pub use asset::TestDataAsset;
pub use manifest::TestCaseManifest;
pub use source::{classify, Classified, SourceFile, SourceKind};
