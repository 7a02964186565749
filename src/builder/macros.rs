//! Expansion of `.m4` test-case sources into C.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::builder::errors::BuildError;
use crate::util::fs::file_stem;
use crate::util::process::ProcessBuilder;

/// Runs the m4 macro processor over macro sources.
#[derive(Debug, Clone)]
pub struct MacroExpander {
    m4: PathBuf,
}

impl MacroExpander {
    pub fn new(m4: impl Into<PathBuf>) -> Self {
        MacroExpander { m4: m4.into() }
    }

    /// Where the C file for `source` is written: `<out_dir>/<stem>.c`.
    pub fn expanded_path(source: &Path, out_dir: &Path) -> PathBuf {
        out_dir.join(format!("{}.c", file_stem(source)))
    }

    /// Expand one macro source. The output only appears once m4 succeeded.
    pub fn expand(&self, source: &Path, out_dir: &Path) -> Result<PathBuf, BuildError> {
        let target = Self::expanded_path(source, out_dir);
        let fail = |status: Option<i32>, stderr: String| BuildError::Compile {
            unit: source.to_path_buf(),
            status,
            stderr,
        };

        let mut cmd = ProcessBuilder::new(&self.m4).arg(source);
        if let Some(dir) = source.parent().filter(|d| !d.as_os_str().is_empty()) {
            cmd = cmd.cwd(dir);
        }
        tracing::debug!("Expanding {} -> {}", source.display(), target.display());

        let output = cmd.exec().map_err(|e| fail(None, format!("{:#}", e)))?;
        if !output.status.success() {
            return Err(fail(
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).into_owned(),
            ));
        }

        let io_fail = |e: std::io::Error| {
            fail(
                None,
                format!("failed to write {}: {}", target.display(), e),
            )
        };
        let mut tmp = NamedTempFile::new_in(out_dir).map_err(io_fail)?;
        tmp.write_all(&output.stdout).map_err(io_fail)?;
        tmp.persist(&target).map_err(|e| io_fail(e.error))?;

        Ok(target)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::test_support::write_script;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_expanded_path() {
        assert_eq!(
            MacroExpander::expanded_path(Path::new("/tc/gen_attr.m4"), Path::new("/obj")),
            PathBuf::from("/obj/gen_attr.c")
        );
    }

    #[test]
    fn test_expand_writes_stdout() {
        let tmp = TempDir::new().unwrap();
        let m4 = write_script(tmp.path(), "m4", "cat \"$1\"");
        let source = tmp.path().join("gen.m4");
        fs::write(&source, "int generated;\n").unwrap();
        let out = tmp.path().join("obj");
        fs::create_dir(&out).unwrap();

        let expanded = MacroExpander::new(m4).expand(&source, &out).unwrap();

        assert_eq!(expanded, out.join("gen.c"));
        assert_eq!(fs::read_to_string(&expanded).unwrap(), "int generated;\n");
    }

    #[test]
    fn test_failed_expansion_leaves_nothing() {
        let tmp = TempDir::new().unwrap();
        let m4 = write_script(tmp.path(), "m4", "echo 'm4: bad macro' >&2; exit 1");
        let source = tmp.path().join("gen.m4");
        fs::write(&source, "dnl\n").unwrap();

        let err = MacroExpander::new(m4).expand(&source, tmp.path()).unwrap_err();

        match err {
            BuildError::Compile { unit, stderr, .. } => {
                assert_eq!(unit, source);
                assert!(stderr.contains("bad macro"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!tmp.path().join("gen.c").exists());
    }
}
