//! Submits every contract created in a broadcast for block explorer verification.
//!
//! Each `CREATE` transaction becomes one `forge verify-contract` invocation. Contracts
//! with constructor arguments first have them ABI-encoded with `cast abi-encode`, using
//! the constructor types found in the contract's `forge build` artifact. A failure for one
//! contract is logged and the batch moves on to the next.

use std::{
    fmt,
    path::{Path, PathBuf},
    thread,
    time::Duration,
};

use itertools::Itertools;
use tracing::{error, info, warn};

use crate::{
    constants::{
        ABI_ENCODE_COMMAND, CAST_COMMAND, CHAIN_FLAG, CONSTRUCTOR_ABI_TYPE, CONSTRUCTOR_ARGS_FLAG,
        ETHERSCAN_API_KEY_ENV_VAR, FORGE_COMMAND, VERIFY_CONTRACT_COMMAND,
    },
    errors::ScriptError,
    types::{BroadcastRecord, TransactionRecord},
    utils::{
        read_broadcast, read_constructor_types, CommandOutput, CommandRunner, ExternalCommand,
    },
};

/// Configuration for a verification run
#[derive(Clone)]
pub struct VerifyConfig {
    /// The block explorer API key handed to `forge`
    pub etherscan_api_key: String,
    /// The chain the contracts are deployed on, as an ID or name `forge` understands
    pub chain_id: String,
    /// The directory containing `forge build` artifacts
    pub artifacts_dir: PathBuf,
    /// How long to wait between verification submissions
    pub delay: Duration,
}

impl fmt::Debug for VerifyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifyConfig")
            .field("etherscan_api_key", &"<redacted>")
            .field("chain_id", &self.chain_id)
            .field("artifacts_dir", &self.artifacts_dir)
            .field("delay", &self.delay)
            .finish()
    }
}

/// How a single contract's verification went
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationStatus {
    /// The verifier accepted the submission
    Submitted,
    /// The verifier ran but exited unsuccessfully
    Rejected(String),
    /// The submission could not be prepared or the verifier could not be run
    Failed(String),
}

/// The verification result for one created contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationOutcome {
    /// The on-chain contract name
    pub contract_name: String,
    /// The address of the contract
    pub address: String,
    /// What happened
    pub status: VerificationStatus,
}

/// The results of a verification run, in broadcast order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationReport {
    /// One outcome per created contract
    pub outcomes: Vec<VerificationOutcome>,
}

impl VerificationReport {
    /// The outcomes that did not end in a successful submission
    pub fn failures(&self) -> impl Iterator<Item = &VerificationOutcome> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.status != VerificationStatus::Submitted)
    }
}

/// Read the broadcast at the given path and verify every contract it created.
///
/// Only an unreadable broadcast is an error; per-contract failures are
/// recorded in the report.
pub fn verify_broadcast_file(
    path: &Path,
    config: &VerifyConfig,
    runner: &mut impl CommandRunner,
) -> Result<VerificationReport, ScriptError> {
    let broadcast = read_broadcast(path)?;
    info!(
        "verifying {} contracts from {} on chain {}",
        broadcast.creations().count(),
        path.display(),
        config.chain_id
    );

    Ok(verify_broadcast(&broadcast, config, runner))
}

/// Verify every contract created in the broadcast, waiting `config.delay`
/// between submissions
pub fn verify_broadcast(
    broadcast: &BroadcastRecord,
    config: &VerifyConfig,
    runner: &mut impl CommandRunner,
) -> VerificationReport {
    let mut report = VerificationReport::default();

    for (i, tx) in broadcast.creations().enumerate() {
        if i > 0 && !config.delay.is_zero() {
            thread::sleep(config.delay);
        }

        let contract_name = tx.contract_name.clone().unwrap_or_default();
        let address = tx.contract_address.clone().unwrap_or_default();
        println!("\nSending verification for: {address}");

        let status = match verify_contract(tx, config, runner) {
            Ok(output) => {
                println!("Output: \n{}\n", output.stdout);
                if !output.stderr.is_empty() {
                    println!("Error: \n{}\n", output.stderr);
                }

                if output.success {
                    info!("submitted {contract_name} at {address} for verification");
                    VerificationStatus::Submitted
                } else {
                    warn!("verification of {contract_name} at {address} was rejected");
                    VerificationStatus::Rejected(output.stderr.trim().to_string())
                }
            }
            Err(e) => {
                error!("could not verify {contract_name} at {address}: {e}");
                VerificationStatus::Failed(e.to_string())
            }
        };

        report.outcomes.push(VerificationOutcome {
            contract_name,
            address,
            status,
        });
    }

    report
}

/// Build and run the verification command for a single created contract
fn verify_contract(
    tx: &TransactionRecord,
    config: &VerifyConfig,
    runner: &mut impl CommandRunner,
) -> Result<CommandOutput, ScriptError> {
    let contract_name = tx.contract_name()?;
    let address = tx.contract_address()?;

    let constructor_args = match tx.constructor_args() {
        Some(args) => Some(encode_constructor_args(contract_name, args, config, runner)?),
        None => None,
    };

    let cmd = verify_contract_command(config, address, contract_name, constructor_args.as_deref());
    runner.run(&cmd)
}

/// ABI-encode a contract's constructor arguments using the types in its artifact
pub fn encode_constructor_args(
    contract_name: &str,
    args: &[String],
    config: &VerifyConfig,
    runner: &mut impl CommandRunner,
) -> Result<String, ScriptError> {
    let types = read_constructor_types(&config.artifacts_dir, contract_name)?;
    let cmd = abi_encode_command(&types, args);
    let output = runner.run(&cmd)?.success_or(&cmd)?;

    let encoded = output.stdout.trim();
    if encoded.is_empty() {
        return Err(ScriptError::CommandExecution(format!("`{}` produced no output", cmd)));
    }

    Ok(encoded.to_string())
}

/// The `cast abi-encode "constructor(<types>)" <args>...` command
pub fn abi_encode_command(types: &[String], args: &[String]) -> ExternalCommand {
    let signature = format!("{}({})", CONSTRUCTOR_ABI_TYPE, types.iter().join(","));

    ExternalCommand::new(CAST_COMMAND)
        .arg(ABI_ENCODE_COMMAND)
        .arg(signature)
        .args(args.iter().cloned())
}

/// The `forge verify-contract` command for a deployed contract
pub fn verify_contract_command(
    config: &VerifyConfig,
    address: &str,
    contract_name: &str,
    constructor_args: Option<&str>,
) -> ExternalCommand {
    let mut cmd = ExternalCommand::new(FORGE_COMMAND)
        .arg(VERIFY_CONTRACT_COMMAND)
        .arg(CHAIN_FLAG)
        .arg(config.chain_id.as_str());

    if let Some(encoded) = constructor_args {
        cmd = cmd.arg(CONSTRUCTOR_ARGS_FLAG).arg(encoded);
    }

    cmd.arg(address)
        .arg(contract_name)
        .env(ETHERSCAN_API_KEY_ENV_VAR, config.etherscan_api_key.as_str())
}
