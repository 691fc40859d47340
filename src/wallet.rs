use alloy::primitives::{
    utils::format_ether,
    Address, U256,
};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};
use term_table::row::Row;
use term_table::table_cell::{Alignment as CellAlignment, TableCell};
use term_table::{Table, TableStyle};
use tracing::{info, warn};

/// Wallet validation status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletStatus {
    /// Wallet was just created, needs funding
    Created,
    /// Wallet has no ETH balance
    InsufficientFunds,
    /// Wallet is ready to operate
    Ready,
}

/// Generate a new random signing key.
pub fn generate_signer() -> PrivateKeySigner {
    PrivateKeySigner::random()
}

/// Load a signer from a private key string (with or without 0x prefix).
pub fn load_signer(private_key: &str) -> Result<PrivateKeySigner> {
    let key = private_key.trim_start_matches("0x");
    key.parse::<PrivateKeySigner>()
        .context("Failed to parse private key")
}

/// Hex-encode a signer's private key for persistence, 0x-prefixed.
pub fn private_key_hex(signer: &PrivateKeySigner) -> String {
    format!("0x{}", hex::encode(signer.to_bytes()))
}

/// Check the native balance of an address over HTTP RPC.
pub async fn check_balance(rpc_url: &str, address: Address) -> Result<U256> {
    let provider = ProviderBuilder::new()
        .connect_http(rpc_url.parse().context("Invalid RPC URL")?);

    let balance = provider
        .get_balance(address)
        .await
        .context("Failed to fetch balance")?;

    Ok(balance)
}

/// Display a wallet status banner with address, balance and RPC endpoint.
pub fn display_wallet_status(status: WalletStatus, address: Address, rpc_url: &str, balance: U256) {
    let eth_formatted = format_ether(balance);

    let mut table = Table::new();
    table.style = TableStyle::extended();

    let (header, use_warn) = match status {
        WalletStatus::Created => ("✅  Account Created Successfully ✅", true),
        WalletStatus::InsufficientFunds => ("❌  INSUFFICIENT FUNDS  ❌", true),
        WalletStatus::Ready => ("🎉 WALLET LOADED SUCCESSFULLY 🎉", false),
    };
    table.add_row(Row::new(vec![TableCell::builder(header)
        .col_span(2)
        .alignment(CellAlignment::Center)
        .build()]));

    table.add_row(Row::new(vec![
        TableCell::builder("Address")
            .alignment(CellAlignment::Right)
            .build(),
        TableCell::builder(format!("{address}"))
            .alignment(CellAlignment::Left)
            .build(),
    ]));

    table.add_row(Row::new(vec![
        TableCell::builder("ETH Balance")
            .alignment(CellAlignment::Right)
            .build(),
        TableCell::builder(format!("{} ETH", eth_formatted))
            .alignment(CellAlignment::Left)
            .build(),
    ]));

    table.add_row(Row::new(vec![
        TableCell::builder("RPC URL")
            .alignment(CellAlignment::Right)
            .build(),
        TableCell::builder(rpc_url.to_owned())
            .alignment(CellAlignment::Left)
            .build(),
    ]));

    let status_message = match status {
        WalletStatus::Created | WalletStatus::InsufficientFunds => {
            "❗ Please fund this address with ETH to continue ❗"
        }
        WalletStatus::Ready => "✅ Ready to operate",
    };
    table.add_row(Row::new(vec![TableCell::builder(status_message)
        .col_span(2)
        .alignment(CellAlignment::Center)
        .build()]));

    if use_warn {
        warn!("\n{}", table.render());
    } else {
        info!("\n{}", table.render());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_signer() {
        let a = generate_signer();
        let b = generate_signer();
        assert_ne!(a.address(), b.address());
    }

    #[test]
    fn test_load_signer() {
        let private_key = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
        let signer = load_signer(private_key).unwrap();

        // This is the known address for this private key
        let expected_address = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8"
            .parse::<Address>()
            .unwrap();
        assert_eq!(signer.address(), expected_address);
    }

    #[test]
    fn test_load_signer_without_prefix() {
        let private_key = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
        let signer = load_signer(private_key).unwrap();

        let expected_address = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8"
            .parse::<Address>()
            .unwrap();
        assert_eq!(signer.address(), expected_address);
    }

    #[test]
    fn test_private_key_hex_round_trips() {
        let signer = generate_signer();
        let hex_key = private_key_hex(&signer);
        let reloaded = load_signer(&hex_key).unwrap();
        assert_eq!(signer.address(), reloaded.address());
    }
}
