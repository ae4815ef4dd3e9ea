use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use broadcast_scripts::{
    errors::ScriptError,
    utils::{CommandOutput, CommandRunner, ExternalCommand},
    verify::{verify_broadcast_file, VerificationStatus, VerifyConfig},
};
use eyre::Result;

/// Path of a broadcast fixture under `tests/data`
fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Stands in for `cast` and `forge`, recording what it was asked to run
#[derive(Default)]
struct FakeFoundry {
    commands: Vec<ExternalCommand>,
}

impl CommandRunner for FakeFoundry {
    fn run(&mut self, command: &ExternalCommand) -> Result<CommandOutput, ScriptError> {
        self.commands.push(command.clone());
        let stdout = match command.program.as_str() {
            "cast" => "0x000000000000000000000000aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa\n",
            _ => "Submitted contract for verification\n",
        };

        Ok(CommandOutput {
            success: true,
            exit_code: Some(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
        })
    }
}

fn config(artifacts_dir: &Path) -> VerifyConfig {
    VerifyConfig {
        etherscan_api_key: "test-key".to_string(),
        chain_id: "11155111".to_string(),
        artifacts_dir: artifacts_dir.to_path_buf(),
        delay: Duration::ZERO,
    }
}

fn write_proxy_artifact(artifacts_dir: &Path) -> Result<()> {
    let dir = artifacts_dir.join("TransparentUpgradeableProxy.sol");
    fs::create_dir_all(&dir)?;
    fs::write(
        dir.join("TransparentUpgradeableProxy.json"),
        serde_json::json!({
            "abi": [
                {
                    "type": "constructor",
                    "inputs": [
                        { "name": "_logic", "type": "address", "internalType": "address" },
                        { "name": "initialOwner", "type": "address", "internalType": "address" },
                        { "name": "_data", "type": "bytes", "internalType": "bytes" }
                    ],
                    "stateMutability": "payable"
                },
                { "type": "fallback", "stateMutability": "payable" }
            ]
        })
        .to_string(),
    )?;

    Ok(())
}

#[test]
fn test_every_creation_is_verified() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    write_proxy_artifact(tmp.path())?;

    let mut foundry = FakeFoundry::default();
    let report = verify_broadcast_file(
        &fixture("run-latest.json"),
        &config(tmp.path()),
        &mut foundry,
    )?;

    let programs: Vec<_> = foundry.commands.iter().map(|c| c.program.as_str()).collect();
    assert_eq!(programs, vec!["forge", "cast", "forge"]);

    // The allow list takes no constructor arguments
    assert_eq!(
        foundry.commands[0].to_string(),
        "forge verify-contract --chain 11155111 0xAaAaaAAAaAAAAaaaAaAaAaAAAaaAAaAaaAaaaAAA AllowList"
    );
    assert_eq!(foundry.commands[1].args[1], "constructor(address,address,bytes)");
    assert_eq!(foundry.commands[1].args.len(), 5);
    assert_eq!(
        foundry.commands[2].args[3..5],
        [
            "--constructor-args".to_string(),
            "0x000000000000000000000000aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa".to_string()
        ]
    );

    assert_eq!(report.outcomes.len(), 2);
    assert!(report
        .outcomes
        .iter()
        .all(|o| o.status == VerificationStatus::Submitted));

    Ok(())
}

#[test]
fn test_unreadable_broadcast_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    let mut foundry = FakeFoundry::default();

    let res = verify_broadcast_file(
        &fixture("does-not-exist.json"),
        &config(tmp.path()),
        &mut foundry,
    );

    assert!(matches!(res, Err(ScriptError::ReadFile(_))));
    assert!(foundry.commands.is_empty());
}
