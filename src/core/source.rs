//! Test-case source classification.
//!
//! A test case declares its sources as one ordered list. Plain C files are
//! compiled directly; `.m4` files are expanded to C first, each yielding
//! exactly one compiled unit.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::builder::errors::BuildError;

/// Kind of a declared source file, decided by its suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// `.c`, compiled directly
    Plain,
    /// `.m4`, run through the macro processor first
    MacroExpanded,
}

impl SourceKind {
    /// Classify a path by its suffix.
    pub fn from_path(path: &Path) -> Option<SourceKind> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("c") => Some(SourceKind::Plain),
            Some("m4") => Some(SourceKind::MacroExpanded),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Plain => "c",
            SourceKind::MacroExpanded => "m4",
        }
    }
}

/// A declared source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: PathBuf,
    pub kind: SourceKind,
}

impl SourceFile {
    /// Create a source file, failing if the suffix is not recognized.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, BuildError> {
        let path = path.into();
        match SourceKind::from_path(&path) {
            Some(kind) => Ok(SourceFile { path, kind }),
            None => Err(BuildError::UnrecognizedSourceKind { path }),
        }
    }
}

/// Sources split by kind, each bucket in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classified {
    pub plain: Vec<PathBuf>,
    pub macro_sources: Vec<PathBuf>,
}

impl Classified {
    /// Total number of compiled units (one per declared source).
    pub fn len(&self) -> usize {
        self.plain.len() + self.macro_sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partition `sources` into plain and macro buckets.
///
/// The first source with an unrecognized suffix fails the whole call.
pub fn classify<P: AsRef<Path>>(sources: &[P]) -> Result<Classified, BuildError> {
    let mut classified = Classified::default();

    for source in sources {
        let file = SourceFile::new(source.as_ref())?;
        match file.kind {
            SourceKind::Plain => classified.plain.push(file.path),
            SourceKind::MacroExpanded => classified.macro_sources.push(file.path),
        }
    }

    Ok(classified)
}
