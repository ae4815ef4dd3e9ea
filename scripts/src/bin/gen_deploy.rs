//! Rewrites a Foundry broadcast file into a succinct, readable deployment summary

use broadcast_scripts::{cli::GenDeployCli, summary::generate_summary, utils::setup_logging};
use clap::Parser;
use eyre::Result;

fn main() -> Result<()> {
    let config = GenDeployCli::parse().into_config();
    setup_logging();

    let file_path = generate_summary(&config)?;
    println!("success: wrote to file: {}", file_path.display());

    Ok(())
}
