//! Definitions of CLI arguments for the broadcast scripts

use std::{path::PathBuf, time::Duration};

use clap::Parser;

use crate::{
    constants::{
        CHAIN_ID_ENV_VAR, DEFAULT_ARTIFACTS_DIR, DEFAULT_OUTPUT_DIR, DEFAULT_PROXY_TARGETS,
        DEFAULT_VERIFY_DELAY_SECS, ETHERSCAN_API_KEY_ENV_VAR,
    },
    errors::ScriptError,
    summary::SummaryConfig,
    verify::VerifyConfig,
};

/// Rewrite a Foundry broadcast file into a succinct, readable deployment summary
///
/// e.g. `gen-deploy broadcast/DeployScript.s.sol/11155111/run-latest.json sepolia.json`
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct GenDeployCli {
    /// The broadcast file to summarize
    pub input: PathBuf,

    /// The name of the summary file to write within the output directory
    pub output_file: PathBuf,

    /// The directory in which to write the summary
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    pub out_dir: PathBuf,

    /// A contract deployed behind a `TransparentUpgradeableProxy`. Its proxy is
    /// recorded as `<CONTRACT>Proxy`. May be given more than once
    #[arg(long = "proxy-target", value_name = "CONTRACT", default_values = DEFAULT_PROXY_TARGETS)]
    pub proxy_targets: Vec<String>,
}

impl GenDeployCli {
    /// The summary generator configuration described by the arguments
    pub fn into_config(self) -> SummaryConfig {
        SummaryConfig {
            input: self.input,
            out_dir: self.out_dir,
            output_file: self.output_file,
            proxy_targets: self.proxy_targets,
        }
    }
}

/// Verify the contracts created in a Foundry broadcast file on a block explorer
///
/// e.g. `verify ./broadcast/DeployScript.s.sol/5/run-latest.json`
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct VerifyCli {
    /// The broadcast file listing the contracts to verify
    pub input: PathBuf,

    /// The block explorer API key
    #[arg(long, env = ETHERSCAN_API_KEY_ENV_VAR, hide_env_values = true)]
    pub etherscan_api_key: String,

    /// The chain the contracts were deployed to
    #[arg(long, env = CHAIN_ID_ENV_VAR)]
    pub chain_id: String,

    /// The directory containing `forge build` artifacts
    #[arg(long, default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts_dir: PathBuf,

    /// Seconds to wait between verification submissions
    #[arg(long, default_value_t = DEFAULT_VERIFY_DELAY_SECS)]
    pub delay_secs: u64,
}

impl VerifyCli {
    /// The verification configuration described by the arguments
    ///
    /// Blank values, e.g. from an exported but empty environment variable,
    /// count as missing.
    pub fn config(&self) -> Result<VerifyConfig, ScriptError> {
        if self.etherscan_api_key.trim().is_empty() {
            return Err(ScriptError::MissingConfig(format!(
                "{ETHERSCAN_API_KEY_ENV_VAR} environment variable not set"
            )));
        }
        if self.chain_id.trim().is_empty() {
            return Err(ScriptError::MissingConfig(format!(
                "{CHAIN_ID_ENV_VAR} environment variable not set"
            )));
        }

        Ok(VerifyConfig {
            etherscan_api_key: self.etherscan_api_key.clone(),
            chain_id: self.chain_id.trim().to_string(),
            artifacts_dir: self.artifacts_dir.clone(),
            delay: Duration::from_secs(self.delay_secs),
        })
    }
}
