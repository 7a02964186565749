//! Build plan generation.
//!
//! A BuildPlan describes everything one test-case build will do: which
//! macro sources get expanded, whether the counter source is generated,
//! which data files are staged, every compile step, the link step, and the
//! files `clean` removes afterwards. Planning touches no files.

use std::collections::hash_map::{Entry, HashMap};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::builder::cleanup::TET_RESULTS_FILE;
use crate::builder::config::{BuildConfig, ConfigResolver};
use crate::builder::errors::BuildError;
use crate::builder::generate::DerivedFileGenerator;
use crate::builder::macros::MacroExpander;
use crate::builder::stage::TestDataStager;
use crate::builder::toolchain::{CommandSpec, CompileInput, LinkInput, Toolchain};
use crate::core::asset::TestDataAsset;
use crate::core::source::{classify, SourceKind};
use crate::util::context::Layout;
use crate::util::fs::{absolutize, file_stem};

/// What to build: one test program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildRequest {
    /// Program name
    pub program: String,
    /// Declared sources, relative to the test-case directory or absolute
    pub sources: Vec<PathBuf>,
    /// Declared test-data names
    pub data: Vec<String>,
    /// Build against an external DWARF library with `TCGEN` defined
    pub generator_mode: bool,
}

/// A macro source and the C file it expands to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpandStep {
    pub source: PathBuf,
    pub output: PathBuf,
}

/// A step to compile one unit to an object file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileStep {
    /// Declared source this unit comes from
    pub origin: PathBuf,
    /// Kind of the declared source; `None` for the generated counter
    pub kind: Option<SourceKind>,
    /// C file handed to the compiler
    pub source: PathBuf,
    /// Object file produced
    pub output: PathBuf,
    /// Full compiler invocation
    pub command: CommandSpec,
}

/// The step linking all objects into the test program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkStep {
    pub objects: Vec<PathBuf>,
    pub output: PathBuf,
    pub command: CommandSpec,
}

/// A complete build plan for one test program.
#[derive(Debug, Clone, Serialize)]
pub struct BuildPlan {
    pub program: String,
    pub config: BuildConfig,
    pub expansions: Vec<ExpandStep>,
    /// Counter source to generate, outside generator mode
    pub counter_source: Option<PathBuf>,
    pub data: Vec<TestDataAsset>,
    pub compile: Vec<CompileStep>,
    pub link: LinkStep,
    /// Generated and staged files, in the order they are tracked
    pub cleanup: Vec<PathBuf>,
}

impl BuildPlan {
    /// Plan `request` for `layout`.
    pub fn new(
        layout: &Layout,
        toolchain: &dyn Toolchain,
        resolver: &ConfigResolver,
        request: &BuildRequest,
    ) -> Result<BuildPlan, BuildError> {
        let config = resolver.resolve(layout, request.generator_mode);
        let classified = classify(&request.sources)?;
        let obj_dir = &layout.obj_dir;

        let expansions: Vec<ExpandStep> = classified
            .macro_sources
            .iter()
            .map(|src| {
                let source = absolutize(&layout.case_dir, src);
                let output = MacroExpander::expanded_path(&source, obj_dir);
                ExpandStep { source, output }
            })
            .collect();

        let counter_source =
            (!request.generator_mode).then(|| DerivedFileGenerator::output_path(obj_dir));

        let object_for = |source: &PathBuf| {
            obj_dir.join(format!(
                "{}.{}",
                file_stem(source),
                toolchain.object_extension()
            ))
        };
        let compile_step = |origin: PathBuf, kind: Option<SourceKind>, source: PathBuf| {
            let output = object_for(&source);
            let command = toolchain.compile_command(&CompileInput {
                source: source.clone(),
                output: output.clone(),
                cflags: config.flags.clone(),
            });
            CompileStep {
                origin,
                kind,
                source,
                output,
                command,
            }
        };

        // Units in link order: plain sources, expanded macros, the counter.
        let mut compile: Vec<CompileStep> = classified
            .plain
            .iter()
            .map(|src| {
                let source = absolutize(&layout.case_dir, src);
                compile_step(source.clone(), Some(SourceKind::Plain), source)
            })
            .collect();
        compile.extend(expansions.iter().map(|step| {
            compile_step(
                step.source.clone(),
                Some(SourceKind::MacroExpanded),
                step.output.clone(),
            )
        }));
        if let Some(counter) = &counter_source {
            compile.push(compile_step(counter.clone(), None, counter.clone()));
        }

        let objects: Vec<PathBuf> = compile.iter().map(|s| s.output.clone()).collect();
        let output = layout.program_path(&request.program);
        let link = LinkStep {
            command: toolchain.link_exe_command(&LinkInput {
                objects: objects.clone(),
                output: output.clone(),
                ldadd: config.ldadd.clone(),
            }),
            objects,
            output,
        };

        let data = TestDataStager::new(obj_dir, &layout.canonical_store).describe(&request.data)?;

        // Every declared input owns its own paths; nothing generated may
        // land on a declared source or on another unit's output.
        let mut claims = Claims::default();
        for step in compile.iter().filter(|s| s.kind == Some(SourceKind::Plain)) {
            claims.claim(&step.source, &step.origin)?;
        }
        for step in &expansions {
            claims.claim(&step.source, &step.source)?;
        }
        for step in &expansions {
            claims.claim(&step.output, &step.source)?;
        }
        if let Some(counter) = &counter_source {
            claims.claim(counter, &layout.count_helper)?;
        }
        for step in &compile {
            claims.claim(&step.output, &step.origin)?;
        }
        for asset in &data {
            claims.claim(&asset.local_path, Path::new(&asset.name))?;
        }
        claims.claim(&link.output, Path::new(&request.program))?;

        let mut cleanup: Vec<PathBuf> = expansions.iter().map(|s| s.output.clone()).collect();
        cleanup.extend(data.iter().map(|a| a.local_path.clone()));
        cleanup.extend(data.iter().map(|a| a.sidecar_path()));
        cleanup.extend(counter_source.iter().cloned());
        cleanup.push(obj_dir.join(TET_RESULTS_FILE));

        Ok(BuildPlan {
            program: request.program.clone(),
            config,
            expansions,
            counter_source,
            data,
            compile,
            link,
            cleanup,
        })
    }

    /// Number of compiled units.
    pub fn compile_count(&self) -> usize {
        self.compile.len()
    }

    /// Serialize the plan as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize build plan")
    }
}

/// Which declared input each planned path belongs to.
#[derive(Debug, Default)]
struct Claims(HashMap<PathBuf, PathBuf>);

impl Claims {
    fn claim(&mut self, path: &Path, owner: &Path) -> Result<(), BuildError> {
        match self.0.entry(path.to_path_buf()) {
            Entry::Occupied(first) => Err(BuildError::OutputCollision {
                output: path.to_path_buf(),
                first: first.get().clone(),
                second: owner.to_path_buf(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(owner.to_path_buf());
                Ok(())
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::test_support::{dir_entries, SuiteFixture};

    fn request(sources: &[&str], data: &[&str], generator_mode: bool) -> BuildRequest {
        BuildRequest {
            program: "tc_attr".to_string(),
            sources: sources.iter().map(PathBuf::from).collect(),
            data: data.iter().map(|s| s.to_string()).collect(),
            generator_mode,
        }
    }

    fn plan(suite: &SuiteFixture, req: &BuildRequest) -> BuildPlan {
        BuildPlan::new(
            &suite.layout(),
            &suite.toolchain(),
            &ConfigResolver::new(),
            req,
        )
        .unwrap()
    }

    #[test]
    fn test_plan_orders_units() {
        let suite = SuiteFixture::new("attr");
        let obj = suite.case_dir();
        let plan = plan(&suite, &request(&["gen.m4", "attr.c"], &[], false));

        let sources: Vec<&Path> = plan.compile.iter().map(|s| s.source.as_path()).collect();
        let expected = [obj.join("attr.c"), obj.join("gen.c"), obj.join("ic_count.c")];
        assert_eq!(sources, expected.iter().map(PathBuf::as_path).collect::<Vec<_>>());
        assert_eq!(
            plan.link.objects,
            vec![obj.join("attr.o"), obj.join("gen.o"), obj.join("ic_count.o")]
        );
        assert_eq!(plan.link.output, obj.join("tc_attr"));
        assert_eq!(plan.compile[1].origin, obj.join("gen.m4"));
        assert_eq!(plan.compile[2].kind, None);
    }

    #[test]
    fn test_plan_generator_mode_has_no_counter() {
        let suite = SuiteFixture::new("attr");
        let plan = plan(&suite, &request(&["attr.c"], &[], true));

        assert!(plan.counter_source.is_none());
        assert_eq!(plan.compile_count(), 1);
        assert!(plan.compile[0].command.args.contains(&"-DTCGEN".to_string()));
        let dwarf_lib = format!("-L{}", suite.root().join("dwarf/lib").display());
        assert!(plan.link.command.args.contains(&dwarf_lib));
    }

    #[test]
    fn test_plan_cleanup_list() {
        let suite = SuiteFixture::new("attr");
        let obj = suite.case_dir();
        let plan = plan(&suite, &request(&["attr.c", "gen.m4"], &["a.o"], false));

        assert_eq!(
            plan.cleanup,
            vec![
                obj.join("gen.c"),
                obj.join("a.o"),
                obj.join("a.o.xml"),
                obj.join("ic_count.c"),
                obj.join("tet_xres"),
            ]
        );
    }

    #[test]
    fn test_plan_touches_nothing() {
        let suite = SuiteFixture::new("attr");
        suite.add_source("attr.c", "int x;");
        suite.add_archive("a.o", b"data");

        let plan = plan(&suite, &request(&["attr.c"], &["a.o"], false));

        assert!(!plan.data[0].materialized);
        assert_eq!(dir_entries(&suite.case_dir()), vec!["attr.c"]);
        assert!(suite.cc_log().is_empty());
    }

    #[test]
    fn test_plan_rejects_unknown_source() {
        let suite = SuiteFixture::new("attr");
        let err = BuildPlan::new(
            &suite.layout(),
            &suite.toolchain(),
            &ConfigResolver::new(),
            &request(&["attr.cc"], &[], false),
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::UnrecognizedSourceKind { .. }));
    }

    #[test]
    fn test_plan_to_json() {
        let suite = SuiteFixture::new("attr");
        let json = plan(&suite, &request(&["attr.c"], &["a.o"], false))
            .to_json()
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["program"], "tc_attr");
        assert_eq!(value["config"]["generator_mode"], false);
        assert_eq!(value["compile"][0]["kind"], "plain");
        assert_eq!(value["data"][0]["name"], "a.o");
    }

    fn plan_err(suite: &SuiteFixture, req: &BuildRequest) -> BuildError {
        BuildPlan::new(
            &suite.layout(),
            &suite.toolchain(),
            &ConfigResolver::new(),
            req,
        )
        .unwrap_err()
    }

    #[test]
    fn test_plan_rejects_expansion_over_declared_source() {
        let suite = SuiteFixture::new("attr");
        let case = suite.case_dir();

        match plan_err(&suite, &request(&["foo.c", "foo.m4"], &[], true)) {
            BuildError::OutputCollision {
                output,
                first,
                second,
            } => {
                assert_eq!(output, case.join("foo.c"));
                assert_eq!(first, case.join("foo.c"));
                assert_eq!(second, case.join("foo.m4"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_plan_rejects_shared_object() {
        let suite = SuiteFixture::new("attr");
        let case = suite.case_dir();

        match plan_err(&suite, &request(&["dir1/x.c", "dir2/x.c"], &[], true)) {
            BuildError::OutputCollision { output, second, .. } => {
                assert_eq!(output, case.join("x.o"));
                assert_eq!(second, case.join("dir2/x.c"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_plan_rejects_declared_counter_source() {
        let suite = SuiteFixture::new("attr");
        let err = plan_err(&suite, &request(&["ic_count.c"], &[], false));
        assert!(matches!(err, BuildError::OutputCollision { .. }));

        // Without the generated counter there is nothing to collide with.
        plan(&suite, &request(&["ic_count.c"], &[], true));
    }

    #[test]
    fn test_plan_rejects_data_over_source() {
        let suite = SuiteFixture::new("attr");
        let err = plan_err(&suite, &request(&["attr.c"], &["attr.c"], false));
        assert!(matches!(err, BuildError::OutputCollision { .. }));
    }

    #[test]
    fn test_plan_rejects_unsafe_data_name() {
        let suite = SuiteFixture::new("attr");
        let victim = suite.root().join("victim.txt").display().to_string();

        for name in ["", victim.as_str(), "../victim.txt"] {
            let err = plan_err(&suite, &request(&["attr.c"], &[name], false));
            assert!(
                matches!(err, BuildError::InvalidAssetName { .. }),
                "{name:?} accepted"
            );
        }
    }
}
