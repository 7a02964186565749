//! `tcbuild flags` command
//!
//! Prints the resolved compile flags and link set, one line each, so they
//! can be pasted into a compiler invocation.

use anyhow::Result;

use super::Session;
use crate::cli::{FlagsArgs, GlobalArgs};

pub fn execute(global: GlobalArgs, args: FlagsArgs) -> Result<()> {
    let session = Session::load(global)?;
    let config = session.resolver().resolve(&session.layout, args.tcgen);

    if !args.link {
        println!("{}", config.flags.join(" "));
    }
    if !args.compile {
        println!("{}", config.ldadd.join(" "));
    }

    Ok(())
}
