use anyhow::{Context, Result};
use clap::Parser;
use vole_commit::cli_utils::Args;
use vole_commit::session::bin::run;

fn main() -> Result<()> {
    pretty_env_logger::init_timed();

    let args = Args::parse();

    println!("{:?}", args);

    run(args).with_context(|| "Failed to run the protocol.")?;

    Ok(())
}
