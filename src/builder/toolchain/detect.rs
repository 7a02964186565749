//! Toolchain detection functions.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::util::process::{find_c_compiler, find_executable};

use super::{GccToolchain, Toolchain, ToolchainPlatform};

/// Guess the compiler family from its file name.
fn detect_compiler_family(cc: &Path) -> ToolchainPlatform {
    let name = cc
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if name.contains("clang") {
        ToolchainPlatform::Clang
    } else {
        ToolchainPlatform::Gcc
    }
}

/// Resolve an explicitly named compiler: a path is used as-is, a bare name
/// is looked up in PATH.
fn resolve_compiler(cc: &Path) -> Option<PathBuf> {
    if cc.components().count() > 1 || cc.is_absolute() {
        return cc.exists().then(|| cc.to_path_buf());
    }
    find_executable(&cc.to_string_lossy())
}

/// Detect the available toolchain.
///
/// `cc` is the explicitly requested compiler, if any; otherwise CC and the
/// usual compiler names on PATH are tried.
pub fn detect_toolchain(cc: Option<&Path>) -> Result<Box<dyn Toolchain>> {
    let found = match cc {
        Some(cc) => match resolve_compiler(cc) {
            Some(path) => path,
            None => bail!("configured C compiler not found: {}", cc.display()),
        },
        None => match find_c_compiler() {
            Some(path) => path,
            None => bail!(
                "no C compiler found\n\
                 \n\
                 Set the CC environment variable, pass --cc, or install cc/gcc/clang."
            ),
        },
    };

    let family = detect_compiler_family(&found);
    tracing::debug!("Using {} compiler {}", family.as_str(), found.display());

    Ok(Box::new(GccToolchain::new(found, family)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_compiler_family() {
        assert_eq!(
            detect_compiler_family(Path::new("/usr/bin/clang-17")),
            ToolchainPlatform::Clang
        );
        assert_eq!(
            detect_compiler_family(Path::new("/usr/bin/x86_64-linux-gnu-gcc")),
            ToolchainPlatform::Gcc
        );
        assert_eq!(
            detect_compiler_family(Path::new("cc")),
            ToolchainPlatform::Gcc
        );
    }

    #[test]
    fn test_missing_explicit_compiler() {
        let err = detect_toolchain(Some(Path::new("/nonexistent/bin/cc"))).err().unwrap();
        assert!(err.to_string().contains("configured C compiler not found"));
    }
}
