//! Condenses a Foundry broadcast into a deployment summary keyed by logical contract name.
//!
//! Proxies are all deployed as `TransparentUpgradeableProxy`, so they are told apart by
//! their first constructor argument: the address of the implementation they wrap. A proxy
//! wrapping the `AllowList` deployed in the same broadcast is recorded as `AllowListProxy`.

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use alloy_primitives::Address;
use tracing::{info, warn};

use crate::{
    constants::{PROXY_CONTRACT_NAME, PROXY_NAME_SUFFIX},
    errors::ScriptError,
    types::{BroadcastRecord, DeployedContract, DeploymentSummary, TransactionRecord},
    utils::{read_broadcast, write_json_to_file},
};

/// Configuration for a single run of the summary generator
#[derive(Debug, Clone)]
pub struct SummaryConfig {
    /// The broadcast document to summarize
    pub input: PathBuf,
    /// The directory in which to write the summary
    pub out_dir: PathBuf,
    /// The file name of the summary within `out_dir`
    pub output_file: PathBuf,
    /// The contract names that may sit behind a proxy
    pub proxy_targets: Vec<String>,
}

/// A contract deployed in the broadcast that a proxy may point at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyTarget {
    /// The contract name of the implementation
    pub contract_name: String,
    /// The address the implementation was deployed at
    pub address: Address,
}

impl ProxyTarget {
    /// The logical name given to a proxy wrapping this target
    pub fn proxy_name(&self) -> String {
        format!("{}{}", self.contract_name, PROXY_NAME_SUFFIX)
    }
}

/// Summarize the configured broadcast and write the summary to disk,
/// returning the path written
pub fn generate_summary(config: &SummaryConfig) -> Result<PathBuf, ScriptError> {
    let broadcast = read_broadcast(&config.input)?;
    let summary = build_summary(&broadcast, &config.proxy_targets)?;
    write_summary(&summary, &config.out_dir, &config.output_file)
}

/// Find the deployed address of each proxy target.
///
/// Targets absent from the broadcast are omitted. If a target is deployed more
/// than once, the last deployment wins.
pub fn find_proxy_targets(
    broadcast: &BroadcastRecord,
    target_names: &[String],
) -> Result<Vec<ProxyTarget>, ScriptError> {
    let mut addresses: Vec<Option<Address>> = vec![None; target_names.len()];

    for tx in broadcast.creations() {
        let Some(name) = tx.contract_name.as_deref() else {
            continue;
        };
        let Some(idx) = target_names.iter().position(|target| target == name) else {
            continue;
        };

        let raw_address = tx.contract_address()?;
        let address = Address::from_str(raw_address).map_err(|e| {
            ScriptError::BroadcastFormat(format!("invalid address `{}`: {}", raw_address, e))
        })?;

        if addresses[idx].replace(address).is_some() {
            warn!("{name} deployed more than once, using the deployment at {raw_address}");
        }
    }

    Ok(target_names
        .iter()
        .zip(addresses)
        .filter_map(|(name, address)| {
            address.map(|address| ProxyTarget {
                contract_name: name.clone(),
                address,
            })
        })
        .collect())
}

/// Resolve the logical name of a created contract.
///
/// Proxies are named after the target whose address matches their first
/// constructor argument; every other contract keeps its on-chain name.
pub fn resolve_logical_name(
    tx: &TransactionRecord,
    targets: &[ProxyTarget],
) -> Result<String, ScriptError> {
    let name = tx.contract_name()?;
    if name != PROXY_CONTRACT_NAME {
        return Ok(name.to_string());
    }

    let implementation = tx
        .arguments
        .as_deref()
        .and_then(|args| args.first())
        .ok_or_else(|| {
            ScriptError::UnknownProxy(format!(
                "proxy at {} has no constructor arguments",
                tx.contract_address().unwrap_or("<unknown>")
            ))
        })?;

    let matched = Address::from_str(implementation)
        .ok()
        .and_then(|addr| targets.iter().find(|target| target.address == addr));

    match matched {
        Some(target) => Ok(target.proxy_name()),
        None => Err(ScriptError::UnknownProxy(implementation.clone())),
    }
}

/// Build the deployment summary of a broadcast.
///
/// Each creation is joined to its receipt by transaction hash to recover the
/// deploy block; creations without a receipt are left out.
pub fn build_summary(
    broadcast: &BroadcastRecord,
    target_names: &[String],
) -> Result<DeploymentSummary, ScriptError> {
    let targets = find_proxy_targets(broadcast, target_names)?;
    let mut summary = DeploymentSummary {
        chain_id: broadcast.chain,
        ..Default::default()
    };

    for tx in broadcast.creations() {
        if tx.contract_name.is_none() {
            warn!(
                "unidentified contract at {}, leaving it out of the summary",
                tx.contract_address.as_deref().unwrap_or("<unknown>")
            );
            continue;
        }
        let logical_name = resolve_logical_name(tx, &targets)?;

        let receipt = tx
            .hash
            .as_deref()
            .and_then(|hash| broadcast.receipt_for(hash).map(|receipt| (hash, receipt)));
        let Some((hash, receipt)) = receipt else {
            warn!("no receipt found for {logical_name}, leaving it out of the summary");
            continue;
        };

        let contract = DeployedContract {
            transaction_hash: hash.to_string(),
            address: tx.contract_address()?.to_string(),
            deploy_block: receipt.block_number()?,
            contract_name: tx.contract_name()?.to_string(),
        };

        if summary
            .contracts
            .insert(logical_name.clone(), contract)
            .is_some()
        {
            warn!("{logical_name} appears more than once, keeping the latest deployment");
        }
    }

    Ok(summary)
}

/// Write the summary to `<out_dir>/<output_file>`, creating the directory if
/// needed, and return the path written
pub fn write_summary(
    summary: &DeploymentSummary,
    out_dir: &Path,
    output_file: &Path,
) -> Result<PathBuf, ScriptError> {
    fs::create_dir_all(out_dir)
        .map_err(|e| ScriptError::WriteFile(format!("{}: {}", out_dir.display(), e)))?;

    let file_path = out_dir.join(output_file);
    write_json_to_file(&file_path, summary)?;
    info!("wrote deployment summary to {}", file_path.display());

    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use alloy_primitives::Address;

    use crate::{errors::ScriptError, types::BroadcastRecord};

    use super::{build_summary, find_proxy_targets, resolve_logical_name, ProxyTarget};

    const ALLOW_LIST: &str = "0xaAaAaAaaAaAaAaaAaAAAAAAAAaaaAaAaAaaAaaAa";
    const USTB: &str = "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB";

    const PROXY: &str = "TransparentUpgradeableProxy";

    fn addr(n: u8) -> String {
        format!("0x{:040x}", n)
    }

    fn targets() -> Vec<String> {
        vec!["AllowList".to_string(), "USTB".to_string()]
    }

    fn create(hash: &str, name: &str, address: &str, args: Option<&[&str]>) -> serde_json::Value {
        serde_json::json!({
            "hash": hash,
            "transactionType": "CREATE",
            "contractName": name,
            "contractAddress": address,
            "arguments": args.map(|a| a.to_vec()),
        })
    }

    fn receipt(hash: &str, block: &str) -> serde_json::Value {
        serde_json::json!({ "transactionHash": hash, "blockNumber": block })
    }

    fn broadcast(txs: Vec<serde_json::Value>, receipts: Vec<serde_json::Value>) -> BroadcastRecord {
        serde_json::from_value(serde_json::json!({
            "chain": 11155111,
            "transactions": txs,
            "receipts": receipts,
        }))
        .unwrap()
    }

    #[test]
    fn test_plain_contracts_keep_their_names() {
        let b = broadcast(
            vec![
                create("0x01", "Token", &addr(1), None),
                create("0x02", "Vault", &addr(2), None),
            ],
            vec![receipt("0x01", "0x10"), receipt("0x02", "0x11")],
        );

        let summary = build_summary(&b, &targets()).unwrap();
        assert_eq!(summary.chain_id, 11155111);
        assert_eq!(
            summary.contracts.keys().collect::<Vec<_>>(),
            vec!["Token", "Vault"]
        );
        assert_eq!(summary.contracts["Token"].contract_name, "Token");
        assert_eq!(summary.contracts["Vault"].deploy_block, 17);
    }

    #[test]
    fn test_proxies_are_named_after_their_target() {
        let admin = addr(9);
        let b = broadcast(
            vec![
                create("0x01", "AllowList", ALLOW_LIST, None),
                create("0x02", "USTB", USTB, Some(&[ALLOW_LIST])),
                create("0x03", PROXY, &addr(3), Some(&[ALLOW_LIST, admin.as_str(), "0x"])),
                create("0x04", PROXY, &addr(4), Some(&[USTB, admin.as_str(), "0x"])),
            ],
            vec![
                receipt("0x01", "0x64"),
                receipt("0x02", "0x64"),
                receipt("0x03", "0x65"),
                receipt("0x04", "0x66"),
            ],
        );

        let summary = build_summary(&b, &targets()).unwrap();
        let allow_list_proxy = &summary.contracts["AllowListProxy"];
        assert_eq!(allow_list_proxy.contract_name, "TransparentUpgradeableProxy");
        assert_eq!(allow_list_proxy.deploy_block, 101);
        assert_eq!(allow_list_proxy.transaction_hash, "0x03");

        let ustb_proxy = &summary.contracts["USTBProxy"];
        assert_eq!(ustb_proxy.address, "0x0000000000000000000000000000000000000004");
        assert_eq!(ustb_proxy.deploy_block, 102);

        assert!(!summary.contracts.contains_key("TransparentUpgradeableProxy"));
        assert_eq!(summary.contracts.len(), 4);
    }

    #[test]
    fn test_proxy_argument_matching_ignores_checksum_case() {
        let lowercase = ALLOW_LIST.to_lowercase();
        let b = broadcast(
            vec![
                create("0x01", "AllowList", ALLOW_LIST, None),
                create("0x02", PROXY, &addr(3), Some(&[lowercase.as_str()])),
            ],
            vec![receipt("0x01", "0x1"), receipt("0x02", "0x2")],
        );

        let summary = build_summary(&b, &targets()).unwrap();
        assert!(summary.contracts.contains_key("AllowListProxy"));
    }

    #[test]
    fn test_unknown_proxy_is_fatal() {
        let unknown = addr(0xff);
        let b = broadcast(
            vec![
                create("0x01", "AllowList", ALLOW_LIST, None),
                create("0x02", PROXY, &addr(3), Some(&[unknown.as_str()])),
            ],
            vec![receipt("0x01", "0x1"), receipt("0x02", "0x2")],
        );

        match build_summary(&b, &targets()) {
            Err(ScriptError::UnknownProxy(address)) => {
                assert_eq!(address, "0x00000000000000000000000000000000000000ff")
            }
            other => panic!("expected unknown proxy, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_proxy_is_fatal_even_without_receipt() {
        let b = broadcast(
            vec![create("0x02", PROXY, &addr(3), Some(&[ALLOW_LIST]))],
            vec![],
        );

        assert!(matches!(
            build_summary(&b, &targets()),
            Err(ScriptError::UnknownProxy(_))
        ));
    }

    #[test]
    fn test_proxy_without_arguments_is_unknown() {
        let b = broadcast(
            vec![create("0x02", PROXY, &addr(3), None)],
            vec![receipt("0x02", "0x2")],
        );

        let tx = &b.transactions[0];
        assert!(matches!(
            resolve_logical_name(tx, &[]),
            Err(ScriptError::UnknownProxy(_))
        ));
    }

    #[test]
    fn test_missing_receipt_drops_only_that_contract() {
        let b = broadcast(
            vec![
                create("0x01", "Token", &addr(1), None),
                create("0x02", "Vault", &addr(2), None),
            ],
            vec![receipt("0x01", "0xa")],
        );

        let summary = build_summary(&b, &targets()).unwrap();
        assert_eq!(summary.contracts.len(), 1);
        assert_eq!(summary.contracts["Token"].deploy_block, 10);
        assert!(!summary.contracts.contains_key("Vault"));
    }

    #[test]
    fn test_unidentified_creations_are_skipped() {
        let mut unknown = create("0x01", "Token", &addr(1), None);
        unknown["contractName"] = serde_json::Value::Null;
        let b = broadcast(
            vec![unknown, create("0x02", "Vault", &addr(2), None)],
            vec![receipt("0x01", "0x1"), receipt("0x02", "0x2")],
        );

        let summary = build_summary(&b, &targets()).unwrap();
        assert_eq!(summary.contracts.keys().collect::<Vec<_>>(), vec!["Vault"]);
    }

    #[test]
    fn test_non_create_transactions_are_ignored() {
        let mut call = create("0x05", "Token", &addr(1), Some(&["1"]));
        call["transactionType"] = "CALL".into();
        let b = broadcast(vec![call], vec![receipt("0x05", "0x1")]);

        let summary = build_summary(&b, &targets()).unwrap();
        assert!(summary.contracts.is_empty());
        assert_eq!(summary.chain_id, 11155111);
    }

    #[test]
    fn test_last_target_deployment_wins() {
        let first = "0x0000000000000000000000000000000000000001";
        let second = "0x0000000000000000000000000000000000000002";
        let b = broadcast(
            vec![
                create("0x01", "AllowList", first, None),
                create("0x02", "AllowList", second, None),
            ],
            vec![],
        );

        let found = find_proxy_targets(&b, &targets()).unwrap();
        assert_eq!(
            found,
            vec![ProxyTarget {
                contract_name: "AllowList".to_string(),
                address: Address::from_str(second).unwrap(),
            }]
        );

        // A proxy pointing at the earlier deployment no longer resolves
        let proxy = broadcast(
            vec![create("0x03", PROXY, &addr(3), Some(&[first]))],
            vec![],
        );
        assert!(resolve_logical_name(&proxy.transactions[0], &found).is_err());
    }

    #[test]
    fn test_custom_proxy_targets() {
        let registry = "0x0000000000000000000000000000000000000042";
        let b = broadcast(
            vec![
                create("0x01", "Registry", registry, None),
                create("0x02", PROXY, &addr(3), Some(&[registry])),
            ],
            vec![receipt("0x02", "0x2")],
        );

        let summary = build_summary(&b, &["Registry".to_string()]).unwrap();
        assert_eq!(summary.contracts["RegistryProxy"].deploy_block, 2);
        assert!(build_summary(&b, &targets()).is_err());
    }
}
