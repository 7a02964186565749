//! Test-suite tree fixture.
//!
//! ```text
//! <tmp>/tet/inc/tet3/
//! <tmp>/tet/lib/tet3/tcm.o
//! <tmp>/tools/{cc,m4}          fake toolchain
//! <tmp>/suite/bin/count-ic     fake counting helper
//! <tmp>/suite/common/
//! <tmp>/suite/common/object/   canonical store
//! <tmp>/suite/<case>/          test case and object directory
//! ```

#![cfg(unix)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::builder::toolchain::{GccToolchain, ToolchainPlatform};
use crate::util::config::Config;
use crate::util::context::{Layout, LayoutOptions};

use super::{gzip_into, write_script};

/// Fake compiler: logs its arguments, fails on `broken.c` or when linking
/// `tc_nolink`, and otherwise creates whatever `-o` names.
const FAKE_CC: &str = r#"echo "$*" >> "$(dirname "$0")/cc.log"
case "$*" in
  *broken.c*) echo "broken.c:1:1: error: expected declaration" >&2; exit 2 ;;
  *"-o "*tc_nolink*) echo "undefined reference to 'dwarf_init'" >&2; exit 5 ;;
esac
out=
while [ $# -gt 0 ]; do
  if [ "$1" = "-o" ]; then out="$2"; fi
  shift
done
[ -n "$out" ] && echo built > "$out"
exit 0"#;

const FAKE_COUNT_IC: &str = r#"echo 'int tet_ic_count = 0;' > "$1/ic_count.c""#;

const FAKE_M4: &str = r#"cat "$1""#;

/// A complete, throwaway test-suite tree with a fake toolchain.
pub struct SuiteFixture {
    tmp: TempDir,
    case: String,
}

impl SuiteFixture {
    /// Create the tree with an empty test case named `case`.
    pub fn new(case: &str) -> Self {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();

        fs::create_dir_all(root.join("tet/inc/tet3")).unwrap();
        fs::create_dir_all(root.join("tet/lib/tet3")).unwrap();
        fs::write(root.join("tet/lib/tet3/tcm.o"), b"tcm").unwrap();

        fs::create_dir_all(root.join("tools")).unwrap();
        write_script(&root.join("tools"), "cc", FAKE_CC);
        write_script(&root.join("tools"), "m4", FAKE_M4);

        fs::create_dir_all(root.join("suite/bin")).unwrap();
        write_script(&root.join("suite/bin"), "count-ic", FAKE_COUNT_IC);
        fs::create_dir_all(root.join("suite/common/object")).unwrap();
        fs::create_dir_all(root.join("suite").join(case)).unwrap();

        SuiteFixture {
            tmp,
            case: case.to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    pub fn case_dir(&self) -> PathBuf {
        self.root().join("suite").join(&self.case)
    }

    pub fn framework_root(&self) -> PathBuf {
        self.root().join("tet")
    }

    pub fn canonical_store(&self) -> PathBuf {
        self.root().join("suite/common/object")
    }

    pub fn cc(&self) -> PathBuf {
        self.root().join("tools/cc")
    }

    pub fn m4(&self) -> PathBuf {
        self.root().join("tools/m4")
    }

    /// Add a source file to the test case.
    pub fn add_source(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.case_dir().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    /// Add a gzip archive to the canonical store.
    pub fn add_archive(&self, name: &str, contents: &[u8]) -> PathBuf {
        gzip_into(&self.canonical_store(), name, contents)
    }

    /// Layout options pointing at this tree.
    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            case_dir: Some(self.case_dir()),
            framework_root: Some(self.framework_root()),
            dwarf_include: Some(self.root().join("dwarf/include")),
            dwarf_lib: Some(self.root().join("dwarf/lib")),
            ..Default::default()
        }
    }

    pub fn layout(&self) -> Layout {
        Layout::resolve_with_config(self.root(), &self.layout_options(), &Config::default())
            .unwrap()
    }

    pub fn toolchain(&self) -> GccToolchain {
        GccToolchain::new(self.cc(), ToolchainPlatform::Gcc)
    }

    /// Every command line the fake compiler saw, one per line.
    pub fn cc_log(&self) -> Vec<String> {
        fs::read_to_string(self.root().join("tools/cc.log"))
            .unwrap_or_default()
            .lines()
            .map(String::from)
            .collect()
    }
}
