//! Centralized constants for CLI and library defaults.

use alloy::primitives::U256;

// =============================================================================
// State and config files
// =============================================================================

/// State file holding the generated key and deployed contract addresses.
pub const STATE_FILE: &str = "creatorpay.env";

/// Default TOML config file looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "creatorpay.toml";

/// Default directory with compiled contract artifacts (Hardhat layout).
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

// State file keys.
pub const KEY_PRIVATE_KEY: &str = "PRIVATE_KEY";
pub const KEY_PUBLIC_KEY: &str = "PUBLIC_KEY";
pub const KEY_RPC_URL: &str = "RPC_URL";
pub const KEY_CREATOR_ROUTER: &str = "CREATOR_ROUTER_ADDRESS";
pub const KEY_SUBSCRIPTION_PASS: &str = "SUBSCRIPTION_PASS_ADDRESS";
pub const KEY_MULTISIG_VAULT: &str = "MULTISIG_VAULT_ADDRESS";

// =============================================================================
// Chain defaults
// =============================================================================

pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

/// Default number of blocks to look back when querying historical events.
pub const DEFAULT_LOOKBACK_BLOCKS: u64 = 50;

/// Solidity Error(string) function selector, used when decoding revert data.
pub const ERROR_STRING_SELECTOR: &str = "08c379a0";

/// Convert ETH to wei at compile time.
const fn eth_to_wei(eth: f64) -> U256 {
    let wei = (eth * 1_000_000_000_000_000_000.0) as u64;
    U256::from_limbs([wei, 0, 0, 0])
}

/// Minimum ETH balance required before sending transactions.
pub const MIN_ETH_BALANCE: U256 = eth_to_wei(0.00001);

// =============================================================================
// Withdrawal defaults
// =============================================================================

/// 10000 basis points = 100%.
pub const BASIS_POINT_DENOMINATOR: u64 = 10_000;

/// Default platform service fee: 1%.
pub const DEFAULT_FEE_BASIS_POINTS: u16 = 100;

/// Default flat reservation for the miner fee, in satoshis.
pub const DEFAULT_MINER_ALLOWANCE: u64 = 1_000;
