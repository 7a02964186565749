//! `tcbuild clean` command

use anyhow::Result;

use super::Session;
use crate::cli::{CleanArgs, GlobalArgs};

pub fn execute(global: GlobalArgs, args: CleanArgs) -> Result<()> {
    let session = Session::load(global)?;
    let request = session.request(&args.target);

    let toolchain = session.toolchain_or_default();
    let removed = session.orchestrator(toolchain.as_ref()).clean(&request)?;

    for path in &removed {
        eprintln!("     Removed {}", path.display());
    }
    if removed.is_empty() {
        eprintln!("     Nothing to clean");
    }

    Ok(())
}
