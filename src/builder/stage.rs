//! Staging of test data from the canonical store.
//!
//! Test data (ELF objects, archives, DWARF-laden binaries) is kept gzipped
//! in a shared, read-only canonical store. A build copies the archive for
//! each declared name into the object directory and decompresses it there,
//! unless the decompressed file is already present.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use rayon::prelude::*;
use tempfile::{Builder, NamedTempFile};

use crate::builder::errors::BuildError;
use crate::core::asset::{TestDataAsset, ARCHIVE_SUFFIX};
use crate::util::fs::ensure_dir;

/// Bytes decompressed per read while streaming an archive.
const STREAM_CHUNK: usize = 64 * 1024;

/// Materializes test-data assets into an object directory.
#[derive(Debug, Clone)]
pub struct TestDataStager {
    out_dir: PathBuf,
    canonical_store: PathBuf,
}

impl TestDataStager {
    pub fn new(out_dir: impl Into<PathBuf>, canonical_store: impl Into<PathBuf>) -> Self {
        TestDataStager {
            out_dir: out_dir.into(),
            canonical_store: canonical_store.into(),
        }
    }

    /// Describe the assets for `names` without touching the filesystem.
    pub fn describe(&self, names: &[String]) -> Result<Vec<TestDataAsset>, BuildError> {
        names
            .iter()
            .map(|name| TestDataAsset::new(name, &self.out_dir, &self.canonical_store))
            .collect()
    }

    /// Stage every name in order, stopping at the first failure.
    pub fn stage(&self, names: &[String]) -> Result<Vec<TestDataAsset>> {
        names.iter().map(|name| self.stage_one(name)).collect()
    }

    /// Stage distinct names concurrently. Results keep the input order.
    pub fn stage_parallel(&self, names: &[String]) -> Result<Vec<TestDataAsset>> {
        names.par_iter().map(|name| self.stage_one(name)).collect()
    }

    /// Stage a single asset.
    ///
    /// An asset already present in the object directory is left untouched.
    pub fn stage_one(&self, name: &str) -> Result<TestDataAsset> {
        let mut asset = TestDataAsset::new(name, &self.out_dir, &self.canonical_store)?;

        if asset.local_path.exists() {
            tracing::debug!("Fresh {}", asset.local_path.display());
            asset.materialized = true;
            return Ok(asset);
        }

        if !asset.canonical_archive_path.is_file() {
            return Err(BuildError::MissingCanonicalAsset {
                name: name.to_string(),
                archive: asset.canonical_archive_path.clone(),
            }
            .into());
        }

        ensure_dir(&self.out_dir)?;
        if let Some(parent) = asset.local_path.parent() {
            ensure_dir(parent)?;
        }
        tracing::info!("Staging {}", name);

        let staged = self.copy_and_decompress(&asset)?;
        self.persist(staged, &asset)?;

        asset.materialized = true;
        Ok(asset)
    }

    /// Copy the archive next to its destination and decompress the copy
    /// into a second temporary file.
    ///
    /// The archive copy is removed when this returns; the decompressed
    /// file is removed unless it gets persisted.
    fn copy_and_decompress(&self, asset: &TestDataAsset) -> Result<NamedTempFile> {
        let copy = Builder::new()
            .prefix(&format!(".{}.", file_name(asset)))
            .suffix(&format!(".{}", ARCHIVE_SUFFIX))
            .tempfile_in(&self.out_dir)
            .with_context(|| {
                format!("failed to create temporary file in {}", self.out_dir.display())
            })?;

        fs::copy(&asset.canonical_archive_path, copy.path()).with_context(|| {
            format!(
                "failed to copy {} to {}",
                asset.canonical_archive_path.display(),
                copy.path().display()
            )
        })?;

        let file = File::open(copy.path())
            .with_context(|| format!("failed to open {}", copy.path().display()))?;
        let mut decoder = MultiGzDecoder::new(file);

        let mut staged = NamedTempFile::new_in(&self.out_dir).with_context(|| {
            format!("failed to create temporary file in {}", self.out_dir.display())
        })?;

        let mut buf = vec![0u8; STREAM_CHUNK];
        loop {
            let n = match decoder.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(BuildError::Decompression {
                        name: asset.name.clone(),
                        archive: asset.canonical_archive_path.clone(),
                        message: e.to_string(),
                    }
                    .into())
                }
            };
            staged
                .write_all(&buf[..n])
                .with_context(|| format!("failed to write staged data for `{}`", asset.name))?;
        }

        Ok(staged)
    }

    /// Move `staged` to the asset's final path without clobbering it.
    ///
    /// If another builder created the final path first, its file is kept and
    /// `staged` is discarded.
    fn persist(&self, staged: NamedTempFile, asset: &TestDataAsset) -> Result<()> {
        match staged.persist_noclobber(&asset.local_path) {
            Ok(_) => Ok(()),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                tracing::debug!("{} appeared while staging", asset.local_path.display());
                Ok(())
            }
            Err(e) => Err(e.error)
                .with_context(|| format!("failed to create {}", asset.local_path.display())),
        }
    }
}

/// Final path component of the asset, for temporary-file prefixes.
fn file_name(asset: &TestDataAsset) -> String {
    asset
        .local_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| asset.name.clone())
}
