//! Global CLI arguments and the resolved application configuration.
//!
//! Values are resolved with priority: CLI/env -> config file -> state file ->
//! defaults. Contract addresses stay optional; commands that need one fail
//! loud with a message naming the flag to set.

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use crate::config::consts::{
    DEFAULT_ARTIFACTS_DIR, DEFAULT_CONFIG_PATH, DEFAULT_LOOKBACK_BLOCKS, DEFAULT_RPC_URL,
    KEY_CREATOR_ROUTER, KEY_MULTISIG_VAULT, KEY_PRIVATE_KEY, KEY_RPC_URL, KEY_SUBSCRIPTION_PASS,
    STATE_FILE,
};
use crate::config::file::{load_config_file, WithdrawSection};
use crate::state::StateFile;
use crate::wallet;

/// Connection and addressing flags shared by every subcommand.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Ethereum RPC endpoint
    #[arg(long, env = "RPC_URL", global = true)]
    pub rpc_url: Option<String>,

    /// Private key for signing transactions
    #[arg(long, env = "PRIVATE_KEY", global = true)]
    pub private_key: Option<String>,

    /// Path to the TOML config file
    #[arg(long, env = "CREATORPAY_CONFIG", global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Directory with compiled contract artifacts
    #[arg(long, env = "ARTIFACTS_DIR", global = true, default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts_dir: String,

    /// CreatorRouter contract address
    #[arg(long, env = "CREATOR_ROUTER_ADDRESS", global = true)]
    pub creator_router: Option<Address>,

    /// SubscriptionPass contract address
    #[arg(long, env = "SUBSCRIPTION_PASS_ADDRESS", global = true)]
    pub subscription_pass: Option<Address>,

    /// MultiSigVault contract address
    #[arg(long, env = "MULTISIG_VAULT_ADDRESS", global = true)]
    pub multisig_vault: Option<Address>,

    /// LazyNFTMarketplace contract address
    #[arg(long, env = "MARKETPLACE_ADDRESS", global = true)]
    pub marketplace: Option<Address>,

    /// Governor contract address
    #[arg(long, env = "GOVERNOR_ADDRESS", global = true)]
    pub governor: Option<Address>,

    /// GovernanceToken contract address
    #[arg(long, env = "GOVERNANCE_TOKEN_ADDRESS", global = true)]
    pub governance_token: Option<Address>,

    /// Treasury contract address
    #[arg(long, env = "TREASURY_ADDRESS", global = true)]
    pub treasury: Option<Address>,

    /// Lookback blocks for historical event queries
    #[arg(long, env = "LOOKBACK_BLOCKS", global = true, default_value_t = DEFAULT_LOOKBACK_BLOCKS)]
    pub lookback_blocks: u64,
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub rpc_url: String,
    pub private_key: Option<String>,
    pub artifacts_dir: String,
    pub lookback_blocks: u64,
    pub creator_router: Option<Address>,
    pub subscription_pass: Option<Address>,
    pub multisig_vault: Option<Address>,
    pub marketplace: Option<Address>,
    pub governor: Option<Address>,
    pub governance_token: Option<Address>,
    pub treasury: Option<Address>,
    pub withdraw: WithdrawSection,
}

impl AppConfig {
    pub fn load(args: GlobalArgs) -> Result<Self> {
        let file = load_config_file(&args.config)
            .with_context(|| format!("Failed to parse config file {}", args.config))?;
        let state = StateFile::new(STATE_FILE);

        let rpc_url = args
            .rpc_url
            .or(file.rpc_url)
            .or_else(|| state.load_value(KEY_RPC_URL))
            .unwrap_or_else(|| DEFAULT_RPC_URL.to_string());

        let private_key = args
            .private_key
            .or_else(|| state.load_value(KEY_PRIVATE_KEY));

        let creator_router = resolve_address(
            args.creator_router,
            file.contracts.creator_router.as_deref(),
            state.load_value(KEY_CREATOR_ROUTER).as_deref(),
        )?;
        let subscription_pass = resolve_address(
            args.subscription_pass,
            file.contracts.subscription_pass.as_deref(),
            state.load_value(KEY_SUBSCRIPTION_PASS).as_deref(),
        )?;
        let multisig_vault = resolve_address(
            args.multisig_vault,
            file.contracts.multisig_vault.as_deref(),
            state.load_value(KEY_MULTISIG_VAULT).as_deref(),
        )?;
        let marketplace =
            resolve_address(args.marketplace, file.contracts.marketplace.as_deref(), None)?;
        let governor = resolve_address(args.governor, file.contracts.governor.as_deref(), None)?;
        let governance_token = resolve_address(
            args.governance_token,
            file.contracts.governance_token.as_deref(),
            None,
        )?;
        let treasury = resolve_address(args.treasury, file.contracts.treasury.as_deref(), None)?;

        debug!(rpc_url = %rpc_url, "Configuration resolved");

        Ok(Self {
            rpc_url,
            private_key,
            artifacts_dir: args.artifacts_dir,
            lookback_blocks: args.lookback_blocks,
            creator_router,
            subscription_pass,
            multisig_vault,
            marketplace,
            governor,
            governance_token,
            treasury,
            withdraw: file.withdraw,
        })
    }

    /// The signer for on-chain commands. Fails when no key is configured.
    pub fn signer(&self) -> Result<PrivateKeySigner> {
        let key = self.private_key.as_deref().context(
            "No private key configured. Pass --private-key, set PRIVATE_KEY, or run generate-keys",
        )?;
        wallet::load_signer(key)
    }

    pub fn require_creator_router(&self) -> Result<Address> {
        self.creator_router
            .context("CreatorRouter address not configured (--creator-router)")
    }

    pub fn require_subscription_pass(&self) -> Result<Address> {
        self.subscription_pass
            .context("SubscriptionPass address not configured (--subscription-pass)")
    }

    pub fn require_multisig_vault(&self) -> Result<Address> {
        self.multisig_vault
            .context("MultiSigVault address not configured (--multisig-vault)")
    }

    pub fn require_marketplace(&self) -> Result<Address> {
        self.marketplace
            .context("Marketplace address not configured (--marketplace)")
    }

    pub fn require_governor(&self) -> Result<Address> {
        self.governor
            .context("Governor address not configured (--governor)")
    }

    pub fn require_governance_token(&self) -> Result<Address> {
        self.governance_token
            .context("GovernanceToken address not configured (--governance-token)")
    }

    pub fn require_treasury(&self) -> Result<Address> {
        self.treasury
            .context("Treasury address not configured (--treasury)")
    }
}

fn resolve_address(
    cli: Option<Address>,
    file: Option<&str>,
    state: Option<&str>,
) -> Result<Option<Address>> {
    if let Some(addr) = cli {
        return Ok(Some(addr));
    }
    for candidate in [file, state].into_iter().flatten() {
        let addr = candidate
            .parse::<Address>()
            .with_context(|| format!("Invalid contract address: {candidate}"))?;
        return Ok(Some(addr));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_address_cli_wins() {
        let cli: Address = "0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0".parse().unwrap();
        let resolved = resolve_address(
            Some(cli),
            Some("0x70997970C51812dc3A010C7d01b50e0d17dc79C8"),
            None,
        )
        .unwrap();
        assert_eq!(resolved, Some(cli));
    }

    #[test]
    fn test_resolve_address_falls_back_to_file() {
        let resolved =
            resolve_address(None, Some("0x70997970C51812dc3A010C7d01b50e0d17dc79C8"), None)
                .unwrap()
                .unwrap();
        assert_eq!(
            resolved,
            "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".parse::<Address>().unwrap()
        );
    }

    #[test]
    fn test_resolve_address_invalid_fails() {
        assert!(resolve_address(None, Some("not-an-address"), None).is_err());
    }

    #[test]
    fn test_resolve_address_none() {
        assert_eq!(resolve_address(None, None, None).unwrap(), None);
    }
}
