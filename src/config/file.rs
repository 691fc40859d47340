//! Optional TOML config file (`creatorpay.toml`).

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::config::consts::{DEFAULT_FEE_BASIS_POINTS, DEFAULT_MINER_ALLOWANCE};

/// Known contract addresses, as hex strings so a partially-filled file parses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContractsSection {
    pub creator_router: Option<String>,
    pub subscription_pass: Option<String>,
    pub multisig_vault: Option<String>,
    pub marketplace: Option<String>,
    pub governor: Option<String>,
    pub governance_token: Option<String>,
    pub treasury: Option<String>,
}

/// Withdrawal defaults used by `test-withdraw` when flags are omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawSection {
    #[serde(default = "default_fee_basis_points")]
    pub fee_basis_points: u16,
    #[serde(default = "default_miner_allowance")]
    pub miner_allowance: u64,
    pub service_address: Option<String>,
}

impl Default for WithdrawSection {
    fn default() -> Self {
        Self {
            fee_basis_points: default_fee_basis_points(),
            miner_allowance: default_miner_allowance(),
            service_address: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub rpc_url: Option<String>,
    #[serde(default)]
    pub contracts: ContractsSection,
    #[serde(default)]
    pub withdraw: WithdrawSection,
}

/// Load the config file if it exists; a missing file is not an error.
pub fn load_config_file<P: AsRef<Path>>(path: P) -> Result<ConfigFile> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(ConfigFile::default());
    }
    let s = fs::read_to_string(path)?;
    let cfg: ConfigFile = toml::from_str(&s)?;
    Ok(cfg)
}

fn default_fee_basis_points() -> u16 {
    DEFAULT_FEE_BASIS_POINTS
}

fn default_miner_allowance() -> u64 {
    DEFAULT_MINER_ALLOWANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_default() {
        let cfg = load_config_file("does_not_exist.toml").unwrap();
        assert!(cfg.rpc_url.is_none());
        assert_eq!(cfg.withdraw.fee_basis_points, DEFAULT_FEE_BASIS_POINTS);
    }

    #[test]
    fn test_partial_file_parses() {
        let cfg: ConfigFile = toml::from_str(
            r#"
            rpc_url = "http://localhost:8545"

            [contracts]
            creator_router = "0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0"

            [withdraw]
            fee_basis_points = 250
            "#,
        )
        .unwrap();

        assert_eq!(cfg.rpc_url.as_deref(), Some("http://localhost:8545"));
        assert!(cfg.contracts.creator_router.is_some());
        assert!(cfg.contracts.governor.is_none());
        assert_eq!(cfg.withdraw.fee_basis_points, 250);
        assert_eq!(cfg.withdraw.miner_allowance, DEFAULT_MINER_ALLOWANCE);
    }

    #[test]
    fn test_empty_file_parses() {
        let cfg: ConfigFile = toml::from_str("").unwrap();
        assert!(cfg.contracts.treasury.is_none());
        assert!(cfg.withdraw.service_address.is_none());
    }
}
