//! Constants used in the broadcast scripts

/// The transaction type Foundry records for a contract creation
pub const CREATE_TRANSACTION_TYPE: &str = "CREATE";

/// The name of the upgradeable proxy contract wrapping the deployed targets
///
/// See https://docs.openzeppelin.com/contracts/5.x/api/proxy#transparent_proxy
pub const PROXY_CONTRACT_NAME: &str = "TransparentUpgradeableProxy";

/// The contracts deployed behind a `TransparentUpgradeableProxy`, matched
/// against the proxy's first constructor argument
pub const DEFAULT_PROXY_TARGETS: [&str; 2] = ["AllowList", "USTB"];

/// Appended to a target's contract name to form the logical name of its proxy
pub const PROXY_NAME_SUFFIX: &str = "Proxy";

/// The directory in which deployment summaries are written
pub const DEFAULT_OUTPUT_DIR: &str = "contract_deployment";

/// The indentation used when writing the deployment summary
pub const SUMMARY_INDENT: &[u8] = b"    ";

/// The directory in which `forge build` places compilation artifacts
pub const DEFAULT_ARTIFACTS_DIR: &str = "out";

/// The extension of a Solidity source file, used as the artifact subdirectory
pub const SOLIDITY_EXTENSION: &str = "sol";

/// The extension of a compilation artifact
pub const JSON_EXTENSION: &str = "json";

/// The type tag of a constructor entry in a contract ABI
pub const CONSTRUCTOR_ABI_TYPE: &str = "constructor";

/// The number of seconds to wait between verification submissions
pub const DEFAULT_VERIFY_DELAY_SECS: u64 = 10;

/// The name of the environment variable holding the block explorer API key
pub const ETHERSCAN_API_KEY_ENV_VAR: &str = "ETHERSCAN_API_KEY";

/// The name of the environment variable holding the target chain ID
pub const CHAIN_ID_ENV_VAR: &str = "CHAIN_ID";

/// The name of the `cast` command
pub const CAST_COMMAND: &str = "cast";

/// The `cast` subcommand used to ABI-encode constructor arguments
pub const ABI_ENCODE_COMMAND: &str = "abi-encode";

/// The name of the `forge` command
pub const FORGE_COMMAND: &str = "forge";

/// The `forge` subcommand used to submit a contract for verification
pub const VERIFY_CONTRACT_COMMAND: &str = "verify-contract";

/// The flag passing the target chain to `forge verify-contract`
pub const CHAIN_FLAG: &str = "--chain";

/// The flag passing ABI-encoded constructor arguments to `forge verify-contract`
pub const CONSTRUCTOR_ARGS_FLAG: &str = "--constructor-args";

/// The log filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info";
