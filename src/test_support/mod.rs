//! Test utilities for tcbuild unit tests.
//!
//! External collaborators (compiler, counting helper, m4) are replaced by
//! small shell scripts so builds can run without TET or libdwarf.
//!
//! # Example
//!
//! ```rust,ignore
//! use tcbuild::test_support::SuiteFixture;
//!
//! #[test]
//! fn test_example() {
//!     let suite = SuiteFixture::new("tc_foo");
//!     suite.add_source("foo.c", "int main(void) { return 0; }");
//!     suite.add_archive("attr.o", b"\x7fELF");
//!     // Build against suite.layout() with suite.toolchain()...
//! }
//! ```

pub mod fixtures;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;

pub use fixtures::*;

/// Write an executable `/bin/sh` script named `name` into `dir`.
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Gzip `contents` into `<store>/<name>.gz`.
pub fn gzip_into(store: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(contents).unwrap();
    let compressed = encoder.finish().unwrap();

    let path = store.join(format!("{}.gz", name));
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, compressed).unwrap();
    path
}

/// Sorted file names in `dir`, hidden files included.
pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;
    use tempfile::TempDir;

    #[test]
    fn test_gzip_into() {
        let tmp = TempDir::new().unwrap();
        let archive = gzip_into(tmp.path(), "x.o", b"payload");

        let mut decoded = Vec::new();
        GzDecoder::new(fs::File::open(&archive).unwrap())
            .read_to_end(&mut decoded)
            .unwrap();
        assert_eq!(decoded, b"payload");
        assert_eq!(dir_entries(tmp.path()), vec!["x.o.gz"]);
    }
}
