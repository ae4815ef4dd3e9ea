//! Verifies already-deployed contracts using the Foundry broadcast file

use broadcast_scripts::{
    cli::VerifyCli,
    utils::{setup_logging, SystemCommandRunner},
    verify::verify_broadcast_file,
};
use clap::Parser;
use eyre::Result;
use tracing::warn;

fn main() -> Result<()> {
    let cli = VerifyCli::parse();
    setup_logging();

    let config = cli.config()?;
    let report = verify_broadcast_file(&cli.input, &config, &mut SystemCommandRunner)?;

    let failures = report.failures().count();
    if failures > 0 {
        warn!(
            "{} of {} verifications did not succeed",
            failures,
            report.outcomes.len()
        );
        for outcome in report.failures() {
            warn!("\t{} at {}", outcome.contract_name, outcome.address);
        }
    }

    println!("done");
    Ok(())
}
