//! Clients for the on-chain side of the platform.
//!
//! Each contract gets a thin typed client built on the `sol!`-generated
//! bindings plus a [`TransactionSubmitter`](common::tx_submitter::TransactionSubmitter)
//! that serializes mutating calls and decodes reverts.

pub mod common;
pub mod creator_router;
pub mod governance;
pub mod marketplace;
pub mod multisig_vault;
pub mod subscription_pass;

use alloy::{
    network::EthereumWallet,
    providers::{DynProvider, Provider, ProviderBuilder, WsConnect},
    signers::local::PrivateKeySigner,
};
use anyhow::{Context, Result};

/// Connect over WebSocket with a signing wallet. HTTP URLs are rewritten to
/// their WebSocket equivalents so config only needs a single RPC URL.
/// Required for event subscriptions.
pub async fn connect_ws(
    rpc_url: &str,
    signer: PrivateKeySigner,
) -> Result<(DynProvider, EthereumWallet)> {
    let ws_url = rpc_url
        .replace("http://", "ws://")
        .replace("https://", "wss://");
    let ws = WsConnect::new(ws_url).with_max_retries(u32::MAX);
    let wallet = EthereumWallet::from(signer);

    let provider: DynProvider = ProviderBuilder::new()
        .wallet(wallet.clone())
        .with_simple_nonce_management()
        .with_gas_estimation()
        .connect_ws(ws)
        .await
        .with_context(|| format!("Failed to connect to {rpc_url} over WebSocket"))?
        .erased();

    Ok((provider, wallet))
}

/// Connect over HTTP with a signing wallet. Sufficient for everything except
/// event subscriptions.
pub async fn connect_http(
    rpc_url: &str,
    signer: PrivateKeySigner,
) -> Result<(DynProvider, EthereumWallet)> {
    let wallet = EthereumWallet::from(signer);

    let provider: DynProvider = ProviderBuilder::new()
        .wallet(wallet.clone())
        .with_simple_nonce_management()
        .with_gas_estimation()
        .connect_http(
            rpc_url
                .parse()
                .with_context(|| format!("Invalid RPC URL: {rpc_url}"))?,
        )
        .erased();

    Ok((provider, wallet))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::providers::Provider;

    // These need a local dev node (anvil or hardhat) on the default port.

    #[tokio::test]
    #[ignore]
    async fn test_connect_http_local_node() {
        let signer = PrivateKeySigner::random();
        let (provider, _) = connect_http("http://127.0.0.1:8545", signer)
            .await
            .unwrap();
        assert!(provider.get_chain_id().await.unwrap() > 0);
    }

    #[tokio::test]
    #[ignore]
    async fn test_connect_ws_rewrites_http_url() {
        let signer = PrivateKeySigner::random();
        let (provider, _) = connect_ws("http://127.0.0.1:8545", signer).await.unwrap();
        provider.get_block_number().await.unwrap();
    }
}
