//! Type definitions for Foundry broadcast documents and the deployment summaries derived from them

use std::collections::BTreeMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{CONSTRUCTOR_ABI_TYPE, CREATE_TRANSACTION_TYPE},
    errors::ScriptError,
};

// -------------
// | Broadcast |
// -------------

/// The subset of a Foundry broadcast file (`broadcast/<Script>/<chain>/run-latest.json`)
/// used by the scripts. Unrecognized fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastRecord {
    /// The chain the broadcast was sent to
    pub chain: u64,
    /// The transactions sent, in broadcast order
    pub transactions: Vec<TransactionRecord>,
    /// The receipts of the mined transactions
    #[serde(default)]
    pub receipts: Vec<ReceiptRecord>,
}

impl BroadcastRecord {
    /// Iterate over the contract creation transactions in broadcast order
    pub fn creations(&self) -> impl Iterator<Item = &TransactionRecord> {
        self.transactions.iter().filter(|tx| tx.is_create())
    }

    /// Find the receipt of the transaction with the given hash, if it was mined
    pub fn receipt_for(&self, tx_hash: &str) -> Option<&ReceiptRecord> {
        self.receipts
            .iter()
            .find(|receipt| receipt.transaction_hash == tx_hash)
    }
}

/// A single transaction in a broadcast
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    /// The transaction hash, absent if the transaction was never sent
    #[serde(default)]
    pub hash: Option<String>,
    /// The kind of transaction, e.g. `CREATE`, `CREATE2`, or `CALL`
    pub transaction_type: String,
    /// The name of the contract created or called
    #[serde(default)]
    pub contract_name: Option<String>,
    /// The address of the contract created or called
    #[serde(default)]
    pub contract_address: Option<String>,
    /// The constructor or call arguments, as Foundry renders them
    #[serde(default)]
    pub arguments: Option<Vec<String>>,
}

impl TransactionRecord {
    /// Whether this transaction deploys a contract with `CREATE`
    pub fn is_create(&self) -> bool {
        self.transaction_type == CREATE_TRANSACTION_TYPE
    }

    /// The name of the contract, which every creation must carry
    pub fn contract_name(&self) -> Result<&str, ScriptError> {
        self.contract_name.as_deref().ok_or_else(|| {
            ScriptError::BroadcastFormat(format!(
                "transaction {} has no contract name",
                self.display_hash()
            ))
        })
    }

    /// The address of the contract, which every creation must carry
    pub fn contract_address(&self) -> Result<&str, ScriptError> {
        self.contract_address.as_deref().ok_or_else(|| {
            ScriptError::BroadcastFormat(format!(
                "transaction {} has no contract address",
                self.display_hash()
            ))
        })
    }

    /// The constructor arguments, or `None` if the contract takes none
    pub fn constructor_args(&self) -> Option<&[String]> {
        self.arguments
            .as_deref()
            .filter(|args| !args.is_empty())
    }

    /// The hash for use in log and error messages
    fn display_hash(&self) -> &str {
        self.hash.as_deref().unwrap_or("<unsent>")
    }
}

/// The receipt of a mined transaction
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptRecord {
    /// The hash of the transaction this receipt belongs to
    pub transaction_hash: String,
    /// The block the transaction was mined in, as a hex string
    pub block_number: String,
}

impl ReceiptRecord {
    /// Decode the hex-encoded block number
    pub fn block_number(&self) -> Result<u64, ScriptError> {
        let raw = self.block_number.as_str();
        let digits = raw
            .strip_prefix("0x")
            .or_else(|| raw.strip_prefix("0X"))
            .unwrap_or(raw);

        u64::from_str_radix(digits, 16).map_err(|e| {
            ScriptError::BroadcastFormat(format!("invalid block number `{}`: {}", raw, e))
        })
    }
}

// -----------
// | Summary |
// -----------

/// A condensed, human readable record of a deployment run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentSummary {
    /// The deployed contracts, keyed by their logical name
    #[serde(flatten)]
    pub contracts: BTreeMap<String, DeployedContract>,
    /// The chain the contracts were deployed to
    pub chain_id: u64,
}

/// A deployed contract as recorded in a [`DeploymentSummary`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployedContract {
    /// The hash of the creation transaction
    pub transaction_hash: String,
    /// The address of the deployed contract
    pub address: String,
    /// The block in which the contract was deployed
    pub deploy_block: u64,
    /// The on-chain contract name, which differs from the logical name for proxies
    pub contract_name: String,
}

// -------------
// | Artifacts |
// -------------

/// The subset of a `forge build` compilation artifact used to verify contracts
#[derive(Debug, Clone, Deserialize)]
pub struct ContractArtifact {
    /// The contract's ABI
    pub abi: Vec<AbiEntry>,
}

impl ContractArtifact {
    /// The constructor's parameter types in canonical form
    ///
    /// The constructor entry is preferred, falling back to the first ABI entry
    /// when the artifact does not tag one.
    pub fn constructor_types(&self) -> Result<Vec<String>, ScriptError> {
        let entry = self
            .abi
            .iter()
            .find(|entry| entry.kind.as_deref() == Some(CONSTRUCTOR_ABI_TYPE))
            .or_else(|| self.abi.first())
            .ok_or_else(|| ScriptError::ArtifactParsing("artifact ABI is empty".to_string()))?;

        Ok(entry.inputs.iter().map(AbiParam::canonical_type).collect())
    }
}

/// A single function, event, error, or constructor in a contract ABI
#[derive(Debug, Clone, Deserialize)]
pub struct AbiEntry {
    /// The kind of entry, e.g. `constructor` or `function`
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// The entry's input parameters
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
}

/// A parameter of an ABI entry
#[derive(Debug, Clone, Deserialize)]
pub struct AbiParam {
    /// The Solidity type, e.g. `address`, `uint256[]`, or `tuple`
    #[serde(rename = "type")]
    pub kind: String,
    /// The members of a `tuple` type
    #[serde(default)]
    pub components: Vec<AbiParam>,
}

impl AbiParam {
    /// The type as it appears in a function signature, with tuples expanded
    /// into their components, e.g. `(address,uint256)[]`
    pub fn canonical_type(&self) -> String {
        match self.kind.strip_prefix("tuple") {
            Some(suffix) => format!(
                "({}){}",
                self.components.iter().map(AbiParam::canonical_type).join(","),
                suffix
            ),
            None => self.kind.clone(),
        }
    }
}
