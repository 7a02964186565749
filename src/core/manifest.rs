//! `tc.toml` test-case manifest.
//!
//! A test-case directory may describe itself instead of passing every
//! source and data file on the command line:
//!
//! ```toml
//! [test-case]
//! program = "tc_dwarf_attr"
//! sources = ["attr.c", "attr_gen.m4"]
//! data = ["dwarf_attr.o"]
//! warns = 2
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// File name of the test-case manifest.
pub const MANIFEST_NAME: &str = "tc.toml";

/// Parsed test-case manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestCaseManifest {
    #[serde(rename = "test-case")]
    pub test_case: TestCaseSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TestCaseSection {
    /// Program name (defaults to `tc_<directory name>`)
    pub program: Option<String>,

    /// Sources, relative to the test-case directory
    pub sources: Vec<PathBuf>,

    /// Test-data asset names
    pub data: Vec<String>,

    /// Warning level
    pub warns: Option<u8>,
}

impl TestCaseManifest {
    /// Load a manifest from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("failed to parse manifest: {}", path.display()))
    }

    /// Parse manifest content.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load `tc.toml` from a test-case directory, or an empty manifest if
    /// the directory has none.
    pub fn load_from_dir(case_dir: &Path) -> Result<Self> {
        let path = case_dir.join(MANIFEST_NAME);
        if path.exists() {
            tracing::debug!("Loading manifest {}", path.display());
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_manifest() {
        let manifest = TestCaseManifest::parse(
            r#"
[test-case]
program = "tc_attr"
sources = ["attr.c", "gen.m4"]
data = ["a.o", "b.so"]
warns = 3
"#,
        )
        .unwrap();

        let tc = &manifest.test_case;
        assert_eq!(tc.program.as_deref(), Some("tc_attr"));
        assert_eq!(
            tc.sources,
            vec![PathBuf::from("attr.c"), PathBuf::from("gen.m4")]
        );
        assert_eq!(tc.data, vec!["a.o", "b.so"]);
        assert_eq!(tc.warns, Some(3));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(TestCaseManifest::parse("[test-case]\nsrcs = []\n").is_err());
    }

    #[test]
    fn test_missing_manifest_is_empty() {
        let tmp = TempDir::new().unwrap();
        let manifest = TestCaseManifest::load_from_dir(tmp.path()).unwrap();
        assert_eq!(manifest, TestCaseManifest::default());
    }
}
