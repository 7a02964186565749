//! `tcbuild stage` command

use anyhow::Result;

use super::Session;
use crate::cli::{GlobalArgs, StageArgs};

pub fn execute(global: GlobalArgs, args: StageArgs) -> Result<()> {
    let session = Session::load(global)?;

    let names = if args.data.is_empty() {
        session.manifest.test_case.data.clone()
    } else {
        args.data
    };
    if names.is_empty() {
        eprintln!("     Nothing to stage");
        return Ok(());
    }

    let toolchain = session.toolchain_or_default();
    let mut orch = session.orchestrator(toolchain.as_ref());
    for asset in orch.stage_data(&names)? {
        eprintln!("      Staged {} -> {}", asset.name, asset.local_path.display());
    }

    Ok(())
}
