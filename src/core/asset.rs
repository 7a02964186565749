//! Test-data assets.

use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::builder::errors::BuildError;

/// Suffix of archives in the canonical store.
pub const ARCHIVE_SUFFIX: &str = "gz";

/// Suffix of the result file TET writes next to a data file.
pub const SIDECAR_SUFFIX: &str = "xml";

/// One declared test-data file and where it comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestDataAsset {
    /// Name as declared in the test case
    pub name: String,
    /// Location in the object directory
    pub local_path: PathBuf,
    /// Compressed source in the canonical store
    pub canonical_archive_path: PathBuf,
    /// Whether `local_path` holds the data
    pub materialized: bool,
}

impl TestDataAsset {
    /// Describe an asset that has not been staged yet.
    ///
    /// `name` must stay inside `out_dir`: empty, absolute and `..` names
    /// are rejected.
    pub fn new(name: &str, out_dir: &Path, canonical_store: &Path) -> Result<Self, BuildError> {
        validate_name(name)?;
        Ok(TestDataAsset {
            name: name.to_string(),
            local_path: out_dir.join(name),
            canonical_archive_path: canonical_store.join(format!("{}.{}", name, ARCHIVE_SUFFIX)),
            materialized: false,
        })
    }

    /// The `.xml` sidecar path, tracked for cleanup alongside the data.
    pub fn sidecar_path(&self) -> PathBuf {
        let mut name = self.local_path.clone().into_os_string();
        name.push(".");
        name.push(SIDECAR_SUFFIX);
        PathBuf::from(name)
    }
}

fn validate_name(name: &str) -> Result<(), BuildError> {
    let invalid = |reason| BuildError::InvalidAssetName {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    let path = Path::new(name);
    if path.is_absolute() {
        return Err(invalid("name is an absolute path"));
    }
    if !path.components().all(|c| matches!(c, Component::Normal(_))) {
        return Err(invalid("name must not leave the object directory"));
    }
    Ok(())
}
