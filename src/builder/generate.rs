//! Generation of the instrumentation counter source.

use std::path::{Path, PathBuf};

use crate::builder::errors::BuildError;
use crate::util::process::ProcessBuilder;

/// Name of the file the counting helper writes.
pub const IC_COUNT_SOURCE: &str = "ic_count.c";

/// Runs the counting helper that writes `ic_count.c`.
#[derive(Debug, Clone)]
pub struct DerivedFileGenerator {
    helper: PathBuf,
}

impl DerivedFileGenerator {
    pub fn new(helper: impl Into<PathBuf>) -> Self {
        DerivedFileGenerator {
            helper: helper.into(),
        }
    }

    /// Path the counter source will have in `out_dir`.
    pub fn output_path(out_dir: &Path) -> PathBuf {
        out_dir.join(IC_COUNT_SOURCE)
    }

    /// Produce `out_dir/ic_count.c`, or nothing in generator mode.
    pub fn generate(
        &self,
        out_dir: &Path,
        generator_mode: bool,
    ) -> Result<Option<PathBuf>, BuildError> {
        if generator_mode {
            tracing::debug!("Generator mode, skipping {}", IC_COUNT_SOURCE);
            return Ok(None);
        }

        let cmd = ProcessBuilder::new(&self.helper).arg(out_dir);
        tracing::debug!("Running {}", cmd.display_command());

        let output = cmd.exec().map_err(|e| BuildError::HelperInvocation {
            helper: self.helper.clone(),
            status: None,
            message: format!("{:#}", e),
        })?;

        if !output.status.success() {
            return Err(BuildError::HelperInvocation {
                helper: self.helper.clone(),
                status: output.status.code(),
                message: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let generated = Self::output_path(out_dir);
        if !generated.is_file() {
            return Err(BuildError::HelperInvocation {
                helper: self.helper.clone(),
                status: output.status.code(),
                message: format!("helper did not produce {}", generated.display()),
            });
        }

        Ok(Some(generated))
    }
}
