//! `tcbuild build` command

use std::time::Instant;

use anyhow::Result;

use super::Session;
use crate::cli::{BuildArgs, GlobalArgs};
use tcbuild::util::Diagnostic;

pub fn execute(global: GlobalArgs, args: BuildArgs) -> Result<()> {
    let session = Session::load(global)?;
    let request = session.request(&args.target);

    if request.sources.is_empty() {
        session.warn(
            Diagnostic::warning(format!("no sources declared for `{}`", request.program))
                .with_location(&session.layout.case_dir)
                .with_suggestion("Pass --source, or list `sources` under [test-case] in tc.toml"),
        );
    }

    let toolchain = session.toolchain()?;
    let mut orchestrator = session.orchestrator(toolchain.as_ref());

    if args.plan {
        let plan = orchestrator.plan(&request)?;
        println!("{}", plan.to_json()?);
        return Ok(());
    }

    let start = Instant::now();
    let program = orchestrator.build(&request)?;

    eprintln!(
        "    Finished `{}` -> {} in {:.2}s",
        program.name,
        program.path.display(),
        start.elapsed().as_secs_f64()
    );

    Ok(())
}
