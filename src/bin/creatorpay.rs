//! creatorpay: deployment and operations CLI for the creator-payments
//! platform. Covers contract deployment, wallet management, payments,
//! subscriptions, multisig vault actions, lazy-mint vouchers and DAO
//! governance, plus offline helpers for the payload codec and the
//! withdrawal builder.

use alloy::{
    network::EthereumWallet,
    primitives::{
        utils::{format_ether, parse_ether},
        Address, Bytes, U256,
    },
    providers::{DynProvider, Provider},
};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use std::{fs, sync::Arc};
use tokio::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use creatorpay::config::consts::{
    KEY_CREATOR_ROUTER, KEY_MULTISIG_VAULT, KEY_PRIVATE_KEY, KEY_PUBLIC_KEY,
    KEY_SUBSCRIPTION_PASS, MIN_ETH_BALANCE, STATE_FILE,
};
use creatorpay::config::{AppConfig, GlobalArgs};
use creatorpay::contract_client::{
    common::deploy::load_artifact,
    connect_http, connect_ws,
    creator_router::CreatorRouterClient,
    governance::{GovernanceTokenClient, GovernorClient, ProposalAction, TreasuryClient},
    marketplace::MarketplaceClient,
    multisig_vault::MultiSigVaultClient,
    subscription_pass::SubscriptionPassClient,
};
use creatorpay::payload::{PaymentKind, PaymentPayload};
use creatorpay::state::StateFile;
use creatorpay::voucher::{self, MintVoucher};
use creatorpay::wallet::{self, WalletStatus};
use creatorpay::withdraw::{build_withdrawal, Utxo};

/// creatorpay ops CLI
#[derive(Parser)]
#[command(name = "creatorpay")]
#[command(about = "Creator payments platform CLI", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new wallet and persist it in the state file
    GenerateKeys,

    /// Show the configured wallet's address and balance
    Balance,

    /// Deploy a CreatorRouter contract
    DeployCreator {
        /// Creator payout address (defaults to the signer)
        #[arg(long)]
        creator: Option<Address>,
        /// Service fee recipient (defaults to the signer)
        #[arg(long)]
        service: Option<Address>,
        /// Service fee in basis points
        #[arg(long)]
        fee_bps: Option<u16>,
    },

    /// Deploy a SubscriptionPass contract
    DeploySubscription {
        /// Subscription price in ETH
        #[arg(long, default_value = "0.01")]
        price_eth: String,
        /// Subscription period in seconds
        #[arg(long, default_value_t = 2_592_000)]
        period_secs: u64,
    },

    /// Deploy a MultiSigVault contract
    DeployMultisig {
        /// Owner addresses
        #[arg(long, num_args = 1.., required = true)]
        owners: Vec<Address>,
        /// Confirmations required to execute
        #[arg(long)]
        required: u64,
    },

    /// Build a withdrawal transaction from a UTXO set (offline)
    TestWithdraw {
        /// Path to a JSON file with the UTXO array
        utxos_file: String,
        /// Creator payout address
        #[arg(long)]
        creator_address: String,
        /// Service fee address (defaults to config; fee forced to 0 if absent)
        #[arg(long)]
        service_address: Option<String>,
        /// Service fee in basis points (defaults to config)
        #[arg(long)]
        fee_bps: Option<u16>,
        /// Amount left for the miner fee (defaults to config)
        #[arg(long)]
        miner_allowance: Option<u64>,
    },

    /// Encode a payment payload to hex (offline)
    EncodePayload {
        /// Creator id as 16 hex chars
        #[arg(long)]
        creator_id: String,
        /// Payment kind: tip, unlock or subscription
        #[arg(long)]
        kind: PaymentKind,
        /// Content id
        #[arg(long, default_value_t = 0)]
        content_id: u32,
        /// Optional UTF-8 metadata
        #[arg(long)]
        metadata: Option<String>,
    },

    /// Decode a hex payment payload (offline)
    DecodePayload {
        /// Payload bytes as hex, with or without 0x prefix
        payload_hex: String,
    },

    /// Send a payment through the CreatorRouter
    Pay {
        /// Creator id as 16 hex chars (carried in the payload)
        #[arg(long)]
        creator_id: String,
        /// Payment kind: tip, unlock or subscription
        #[arg(long)]
        kind: PaymentKind,
        /// Content id
        #[arg(long, default_value_t = 0)]
        content_id: u32,
        /// Amount in ETH
        #[arg(long)]
        amount_eth: String,
        /// Optional UTF-8 metadata
        #[arg(long)]
        metadata: Option<String>,
    },

    /// List recent PaymentReceived events
    Payments,

    /// Stream PaymentReceived events live (requires WebSocket RPC)
    WatchPayments,

    /// Show the CreatorRouter's configuration and pending balance
    CreatorStatus,

    /// Withdraw the CreatorRouter's pending balance
    Withdraw,

    /// Mint a subscription pass, paying the on-chain price
    Subscribe {
        /// Recipient (defaults to the signer)
        #[arg(long)]
        to: Option<Address>,
    },

    /// Renew an existing subscription pass
    Renew {
        /// Pass token id
        token_id: U256,
    },

    /// Show a subscriber's pass status
    SubscriptionStatus {
        /// Subscriber address (defaults to the signer)
        #[arg(long)]
        subscriber: Option<Address>,
    },

    /// Queue a transaction in the multisig vault
    VaultSubmit {
        /// Call target
        #[arg(long)]
        to: Address,
        /// Value in ETH
        #[arg(long, default_value = "0")]
        value_eth: String,
        /// Calldata as hex
        #[arg(long, default_value = "0x")]
        data: String,
    },

    /// Confirm a queued vault transaction
    VaultConfirm {
        tx_id: U256,
    },

    /// Execute a vault transaction with enough confirmations
    VaultExecute {
        tx_id: U256,
    },

    /// Show the vault's owners and confirmation threshold
    VaultStatus,

    /// Sign a lazy-mint voucher with the configured key
    SignVoucher {
        #[arg(long)]
        token_id: U256,
        /// Minimum redemption price in ETH
        #[arg(long)]
        min_price_eth: String,
        /// Token metadata URI
        #[arg(long)]
        uri: String,
        /// Redemption nonce (random if omitted)
        #[arg(long)]
        nonce: Option<U256>,
        /// Write the signed voucher to this file instead of stdout
        #[arg(long)]
        out: Option<String>,
    },

    /// Redeem a signed voucher on the marketplace
    RedeemVoucher {
        /// Path to a signed voucher JSON file
        voucher_file: String,
        /// Payment in ETH (must cover the voucher's minimum price)
        #[arg(long)]
        value_eth: String,
    },

    /// Delegate governance token voting power
    Delegate {
        /// Delegatee (defaults to the signer, i.e. self-delegation)
        #[arg(long)]
        delegatee: Option<Address>,
    },

    /// Create a governance proposal
    Propose {
        #[arg(long)]
        target: Address,
        #[arg(long, default_value = "0")]
        value_eth: String,
        /// Calldata as hex
        #[arg(long, default_value = "0x")]
        calldata: String,
        #[arg(long)]
        description: String,
    },

    /// Vote on a proposal: 0 = against, 1 = for, 2 = abstain
    Vote {
        proposal_id: U256,
        #[arg(long, default_value_t = 1)]
        support: u8,
    },

    /// Queue a succeeded proposal in the timelock
    Queue {
        #[arg(long)]
        target: Address,
        #[arg(long, default_value = "0")]
        value_eth: String,
        #[arg(long, default_value = "0x")]
        calldata: String,
        #[arg(long)]
        description: String,
    },

    /// Execute a queued proposal
    Execute {
        #[arg(long)]
        target: Address,
        #[arg(long, default_value = "0")]
        value_eth: String,
        #[arg(long, default_value = "0x")]
        calldata: String,
        #[arg(long)]
        description: String,
    },

    /// Release treasury funds (requires authorization, normally via proposal)
    Release {
        #[arg(long)]
        to: Address,
        #[arg(long)]
        amount_eth: String,
    },
}

/// A voucher with its signature, as written by `sign-voucher` and read by
/// `redeem-voucher`.
#[derive(Debug, Serialize, Deserialize)]
struct SignedVoucher {
    voucher: MintVoucher,
    /// 65-byte signature as 0x-hex.
    signature: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(true))
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.global)?;

    match cli.command {
        Commands::GenerateKeys => generate_keys(&config).await,
        Commands::Balance => balance(&config).await,
        Commands::DeployCreator {
            creator,
            service,
            fee_bps,
        } => deploy_creator(&config, creator, service, fee_bps).await,
        Commands::DeploySubscription {
            price_eth,
            period_secs,
        } => deploy_subscription(&config, &price_eth, period_secs).await,
        Commands::DeployMultisig { owners, required } => {
            deploy_multisig(&config, owners, required).await
        }
        Commands::TestWithdraw {
            utxos_file,
            creator_address,
            service_address,
            fee_bps,
            miner_allowance,
        } => test_withdraw(
            &config,
            &utxos_file,
            &creator_address,
            service_address,
            fee_bps,
            miner_allowance,
        ),
        Commands::EncodePayload {
            creator_id,
            kind,
            content_id,
            metadata,
        } => encode_payload(&creator_id, kind, content_id, metadata),
        Commands::DecodePayload { payload_hex } => decode_payload(&payload_hex),
        Commands::Pay {
            creator_id,
            kind,
            content_id,
            amount_eth,
            metadata,
        } => pay(&config, &creator_id, kind, content_id, &amount_eth, metadata).await,
        Commands::Payments => payments(&config).await,
        Commands::WatchPayments => watch_payments(&config).await,
        Commands::CreatorStatus => creator_status(&config).await,
        Commands::Withdraw => withdraw(&config).await,
        Commands::Subscribe { to } => subscribe(&config, to).await,
        Commands::Renew { token_id } => renew(&config, token_id).await,
        Commands::SubscriptionStatus { subscriber } => {
            subscription_status(&config, subscriber).await
        }
        Commands::VaultSubmit {
            to,
            value_eth,
            data,
        } => vault_submit(&config, to, &value_eth, &data).await,
        Commands::VaultConfirm { tx_id } => vault_confirm(&config, tx_id).await,
        Commands::VaultExecute { tx_id } => vault_execute(&config, tx_id).await,
        Commands::VaultStatus => vault_status(&config).await,
        Commands::SignVoucher {
            token_id,
            min_price_eth,
            uri,
            nonce,
            out,
        } => sign_voucher(&config, token_id, &min_price_eth, uri, nonce, out).await,
        Commands::RedeemVoucher {
            voucher_file,
            value_eth,
        } => redeem_voucher(&config, &voucher_file, &value_eth).await,
        Commands::Delegate { delegatee } => delegate(&config, delegatee).await,
        Commands::Propose {
            target,
            value_eth,
            calldata,
            description,
        } => propose(&config, target, &value_eth, &calldata, description).await,
        Commands::Vote {
            proposal_id,
            support,
        } => vote(&config, proposal_id, support).await,
        Commands::Queue {
            target,
            value_eth,
            calldata,
            description,
        } => queue(&config, target, &value_eth, &calldata, &description).await,
        Commands::Execute {
            target,
            value_eth,
            calldata,
            description,
        } => execute(&config, target, &value_eth, &calldata, &description).await,
        Commands::Release { to, amount_eth } => release(&config, to, &amount_eth).await,
    }
}

/// Connect over HTTP with the configured signer.
async fn connect(config: &AppConfig) -> Result<(DynProvider, EthereumWallet, Arc<Mutex<()>>)> {
    let signer = config.signer()?;
    let (provider, wallet) = connect_http(&config.rpc_url, signer).await?;
    Ok((provider, wallet, Arc::new(Mutex::new(()))))
}

fn signer_address(config: &AppConfig) -> Result<Address> {
    Ok(config.signer()?.address())
}

fn parse_calldata(data: &str) -> Result<Bytes> {
    let raw = hex::decode(data.trim_start_matches("0x")).context("Calldata is not valid hex")?;
    Ok(Bytes::from(raw))
}

async fn generate_keys(config: &AppConfig) -> Result<()> {
    let signer = wallet::generate_signer();
    let address = signer.address();

    let state = StateFile::new(STATE_FILE);
    state.save_value(KEY_PRIVATE_KEY, &wallet::private_key_hex(&signer))?;
    state.save_value(KEY_PUBLIC_KEY, &address.to_string())?;

    let balance = wallet::check_balance(&config.rpc_url, address)
        .await
        .unwrap_or(U256::ZERO);
    wallet::display_wallet_status(WalletStatus::Created, address, &config.rpc_url, balance);
    println!("Keys saved to {STATE_FILE}");
    Ok(())
}

async fn balance(config: &AppConfig) -> Result<()> {
    let address = signer_address(config)?;
    let balance = wallet::check_balance(&config.rpc_url, address).await?;

    let status = if balance < MIN_ETH_BALANCE {
        WalletStatus::InsufficientFunds
    } else {
        WalletStatus::Ready
    };
    wallet::display_wallet_status(status, address, &config.rpc_url, balance);
    Ok(())
}

async fn deploy_creator(
    config: &AppConfig,
    creator: Option<Address>,
    service: Option<Address>,
    fee_bps: Option<u16>,
) -> Result<()> {
    let (provider, _, tx_lock) = connect(config).await?;
    let signer = signer_address(config)?;

    let creator = creator.unwrap_or(signer);
    let service = service.unwrap_or(signer);
    let fee_bps = fee_bps.unwrap_or(config.withdraw.fee_basis_points);

    let artifact = load_artifact(&config.artifacts_dir, "CreatorRouter")?;
    let client =
        CreatorRouterClient::deploy(provider, &artifact, creator, service, fee_bps, tx_lock)
            .await?;

    StateFile::new(STATE_FILE).save_value(KEY_CREATOR_ROUTER, &client.address().to_string())?;

    println!("CreatorRouter deployed!");
    println!("  Address: {}", client.address());
    println!("  Creator: {creator}");
    println!("  Service: {service} ({fee_bps} bps)");
    Ok(())
}

async fn deploy_subscription(config: &AppConfig, price_eth: &str, period_secs: u64) -> Result<()> {
    let (provider, _, tx_lock) = connect(config).await?;
    let price_wei = parse_ether(price_eth)?;

    let artifact = load_artifact(&config.artifacts_dir, "SubscriptionPass")?;
    let client =
        SubscriptionPassClient::deploy(provider, &artifact, price_wei, period_secs, tx_lock)
            .await?;

    StateFile::new(STATE_FILE).save_value(KEY_SUBSCRIPTION_PASS, &client.address().to_string())?;

    println!("SubscriptionPass deployed!");
    println!("  Address: {}", client.address());
    println!("  Price: {price_eth} ETH / {period_secs}s");
    Ok(())
}

async fn deploy_multisig(config: &AppConfig, owners: Vec<Address>, required: u64) -> Result<()> {
    if required == 0 || required as usize > owners.len() {
        bail!(
            "Required confirmations ({required}) must be between 1 and the owner count ({})",
            owners.len()
        );
    }

    let (provider, _, tx_lock) = connect(config).await?;
    let artifact = load_artifact(&config.artifacts_dir, "MultiSigVault")?;
    let client = MultiSigVaultClient::deploy(
        provider,
        &artifact,
        owners.clone(),
        U256::from(required),
        tx_lock,
    )
    .await?;

    StateFile::new(STATE_FILE).save_value(KEY_MULTISIG_VAULT, &client.address().to_string())?;

    println!("MultiSigVault deployed!");
    println!("  Address: {}", client.address());
    println!("  Owners ({}):", owners.len());
    for (i, owner) in owners.iter().enumerate() {
        println!("    [{i}] {owner}");
    }
    println!("  Required confirmations: {required}");
    Ok(())
}

fn test_withdraw(
    config: &AppConfig,
    utxos_file: &str,
    creator_address: &str,
    service_address: Option<String>,
    fee_bps: Option<u16>,
    miner_allowance: Option<u64>,
) -> Result<()> {
    let raw = fs::read_to_string(utxos_file)
        .with_context(|| format!("Failed to read UTXO file {utxos_file}"))?;
    let utxos: Vec<Utxo> = serde_json::from_str(&raw).context("UTXO file is not a JSON array")?;

    let service_address = service_address.or_else(|| config.withdraw.service_address.clone());
    let fee_bps = fee_bps.unwrap_or(config.withdraw.fee_basis_points);
    let miner_allowance = miner_allowance.unwrap_or(config.withdraw.miner_allowance);

    let withdrawal = build_withdrawal(
        utxos,
        creator_address,
        service_address.as_deref(),
        fee_bps,
        miner_allowance,
    )?;

    println!("{}", serde_json::to_string_pretty(&withdrawal)?);
    Ok(())
}

fn build_payload(
    creator_id: &str,
    kind: PaymentKind,
    content_id: u32,
    metadata: Option<String>,
) -> Result<PaymentPayload> {
    let mut payload = PaymentPayload::new(creator_id, kind)?.with_content_id(content_id);
    if let Some(meta) = metadata {
        payload = payload.with_metadata(meta.into_bytes());
    }
    Ok(payload)
}

fn encode_payload(
    creator_id: &str,
    kind: PaymentKind,
    content_id: u32,
    metadata: Option<String>,
) -> Result<()> {
    let payload = build_payload(creator_id, kind, content_id, metadata)?;
    println!("0x{}", hex::encode(payload.encode()));
    Ok(())
}

fn decode_payload(payload_hex: &str) -> Result<()> {
    let bytes = hex::decode(payload_hex.trim_start_matches("0x"))
        .context("Payload is not valid hex")?;

    match PaymentPayload::decode(&bytes) {
        Some(payload) => println!("{}", serde_json::to_string_pretty(&payload)?),
        None => println!("Not a valid payment payload"),
    }
    Ok(())
}

async fn pay(
    config: &AppConfig,
    creator_id: &str,
    kind: PaymentKind,
    content_id: u32,
    amount_eth: &str,
    metadata: Option<String>,
) -> Result<()> {
    let payload = build_payload(creator_id, kind, content_id, metadata)?;
    let amount = parse_ether(amount_eth)?;

    let (provider, _, tx_lock) = connect(config).await?;
    let client = CreatorRouterClient::new(provider, config.require_creator_router()?, tx_lock);

    let tx_hash = client.pay(&payload, amount).await?;
    println!("Payment sent!");
    println!("  Amount: {amount_eth} ETH ({kind:?}, content {content_id})");
    println!("  Transaction hash: {tx_hash:?}");
    Ok(())
}

async fn payments(config: &AppConfig) -> Result<()> {
    let (provider, _, tx_lock) = connect(config).await?;
    let client =
        CreatorRouterClient::new(provider.clone(), config.require_creator_router()?, tx_lock);

    let latest = provider.get_block_number().await?;
    let from_block = latest.saturating_sub(config.lookback_blocks);
    let observed = client.payments_since(from_block).await?;

    println!(
        "Payments in blocks {from_block}..{latest} ({}):",
        observed.len()
    );
    for payment in observed {
        print_payment(&payment);
    }
    Ok(())
}

async fn watch_payments(config: &AppConfig) -> Result<()> {
    let signer = config.signer()?;
    let (provider, _) = connect_ws(&config.rpc_url, signer).await?;
    let client = CreatorRouterClient::new(
        provider,
        config.require_creator_router()?,
        Arc::new(Mutex::new(())),
    );

    println!("Watching payments on {} (Ctrl-C to stop)", client.address());
    let mut stream = std::pin::pin!(client.payment_stream().await?);
    while let Some(payment) = stream.next().await {
        print_payment(&payment);
    }
    Ok(())
}

fn print_payment(payment: &creatorpay::contract_client::creator_router::ObservedPayment) {
    println!(
        "  [block {}] {} paid {} ETH (kind {}, content {})",
        payment
            .block_number
            .map_or_else(|| "pending".to_string(), |n| n.to_string()),
        payment.payer,
        format_ether(payment.amount),
        payment.kind,
        payment.content_id,
    );
    match &payment.payload {
        Some(payload) => {
            println!("    creator id: {}", payload.creator_id_hex());
            if let Some(meta) = payload.metadata_utf8() {
                if !meta.is_empty() {
                    println!("    metadata: {meta}");
                }
            }
        }
        None => println!("    (payload did not decode)"),
    }
}

async fn creator_status(config: &AppConfig) -> Result<()> {
    let (provider, _, tx_lock) = connect(config).await?;
    let client = CreatorRouterClient::new(provider, config.require_creator_router()?, tx_lock);

    println!("CreatorRouter {}", client.address());
    println!("  Creator: {}", client.creator().await?);
    println!("  Service: {}", client.service_address().await?);
    println!("  Fee: {} bps", client.fee_basis_points().await?);
    println!(
        "  Pending balance: {} ETH",
        format_ether(client.pending_balance().await?)
    );
    Ok(())
}

async fn withdraw(config: &AppConfig) -> Result<()> {
    let (provider, _, tx_lock) = connect(config).await?;
    let client = CreatorRouterClient::new(provider, config.require_creator_router()?, tx_lock);

    let pending = client.pending_balance().await?;
    let tx_hash = client.withdraw().await?;
    println!("Withdrawn {} ETH", format_ether(pending));
    println!("  Transaction hash: {tx_hash:?}");
    Ok(())
}

async fn subscribe(config: &AppConfig, to: Option<Address>) -> Result<()> {
    let (provider, _, tx_lock) = connect(config).await?;
    let client =
        SubscriptionPassClient::new(provider, config.require_subscription_pass()?, tx_lock);

    let to = to.unwrap_or(signer_address(config)?);
    let price = client.price_wei().await?;
    let tx_hash = client.mint(to, price).await?;

    println!("Subscription pass minted for {to}");
    println!("  Paid: {} ETH", format_ether(price));
    println!("  Transaction hash: {tx_hash:?}");
    Ok(())
}

async fn renew(config: &AppConfig, token_id: U256) -> Result<()> {
    let (provider, _, tx_lock) = connect(config).await?;
    let client =
        SubscriptionPassClient::new(provider, config.require_subscription_pass()?, tx_lock);

    let price = client.price_wei().await?;
    let tx_hash = client.renew(token_id, price).await?;

    println!("Pass {token_id} renewed");
    println!("  Paid: {} ETH", format_ether(price));
    println!("  Transaction hash: {tx_hash:?}");
    Ok(())
}

async fn subscription_status(config: &AppConfig, subscriber: Option<Address>) -> Result<()> {
    let (provider, _, tx_lock) = connect(config).await?;
    let client =
        SubscriptionPassClient::new(provider, config.require_subscription_pass()?, tx_lock);

    let subscriber = subscriber.unwrap_or(signer_address(config)?);
    let active = client.is_active(subscriber).await?;
    let expires = client.expires_at(subscriber).await?;

    println!("Subscriber {subscriber}");
    println!("  Active: {active}");
    println!("  Expires at: {expires}");
    println!(
        "  Price: {} ETH / {}s",
        format_ether(client.price_wei().await?),
        client.period_secs().await?
    );
    Ok(())
}

async fn vault_submit(config: &AppConfig, to: Address, value_eth: &str, data: &str) -> Result<()> {
    let (provider, _, tx_lock) = connect(config).await?;
    let client = MultiSigVaultClient::new(provider, config.require_multisig_vault()?, tx_lock);

    let value = parse_ether(value_eth)?;
    let tx_hash = client.submit(to, value, parse_calldata(data)?).await?;
    println!("Vault transaction submitted (target {to}, value {value_eth} ETH)");
    println!("  Transaction hash: {tx_hash:?}");
    Ok(())
}

async fn vault_confirm(config: &AppConfig, tx_id: U256) -> Result<()> {
    let (provider, _, tx_lock) = connect(config).await?;
    let client = MultiSigVaultClient::new(provider, config.require_multisig_vault()?, tx_lock);

    let tx_hash = client.confirm(tx_id).await?;
    let confirmations = client.confirmations(tx_id).await?;
    let required = client.required().await?;
    println!("Vault transaction {tx_id} confirmed ({confirmations}/{required})");
    println!("  Transaction hash: {tx_hash:?}");
    Ok(())
}

async fn vault_execute(config: &AppConfig, tx_id: U256) -> Result<()> {
    let (provider, _, tx_lock) = connect(config).await?;
    let client = MultiSigVaultClient::new(provider, config.require_multisig_vault()?, tx_lock);

    let tx_hash = client.execute(tx_id).await?;
    println!("Vault transaction {tx_id} executed");
    println!("  Transaction hash: {tx_hash:?}");
    Ok(())
}

async fn vault_status(config: &AppConfig) -> Result<()> {
    let (provider, _, tx_lock) = connect(config).await?;
    let client = MultiSigVaultClient::new(provider, config.require_multisig_vault()?, tx_lock);

    let owners = client.get_owners().await?;
    println!("MultiSigVault {}", client.address());
    println!("  Owners ({}):", owners.len());
    for (i, owner) in owners.iter().enumerate() {
        println!("    [{i}] {owner}");
    }
    println!("  Required confirmations: {}", client.required().await?);
    Ok(())
}

async fn sign_voucher(
    config: &AppConfig,
    token_id: U256,
    min_price_eth: &str,
    uri: String,
    nonce: Option<U256>,
    out: Option<String>,
) -> Result<()> {
    let signer = config.signer()?;
    let marketplace = config.require_marketplace()?;

    let (provider, _, _) = connect(config).await?;
    let chain_id = provider.get_chain_id().await?;

    let mint_voucher = MintVoucher {
        tokenId: token_id,
        minPrice: parse_ether(min_price_eth)?,
        uri,
        nonce: nonce.unwrap_or_else(voucher::random_nonce),
    };

    let domain = voucher::marketplace_domain(chain_id, marketplace);
    let signature = voucher::sign_voucher(&signer, &mint_voucher, &domain)?;

    let signed = SignedVoucher {
        voucher: mint_voucher,
        signature: format!("0x{}", hex::encode(signature.as_bytes())),
    };
    let json = serde_json::to_string_pretty(&signed)?;

    match out {
        Some(path) => {
            fs::write(&path, &json)?;
            println!("Signed voucher written to {path}");
        }
        None => println!("{json}"),
    }
    Ok(())
}

async fn redeem_voucher(config: &AppConfig, voucher_file: &str, value_eth: &str) -> Result<()> {
    let raw = fs::read_to_string(voucher_file)
        .with_context(|| format!("Failed to read voucher file {voucher_file}"))?;
    let signed: SignedVoucher =
        serde_json::from_str(&raw).context("Voucher file is not valid JSON")?;

    let sig_bytes = hex::decode(signed.signature.trim_start_matches("0x"))
        .context("Voucher signature is not valid hex")?;
    let signature = alloy::primitives::Signature::from_raw(&sig_bytes)
        .context("Voucher signature is malformed")?;

    let marketplace = config.require_marketplace()?;
    let (provider, _, tx_lock) = connect(config).await?;
    let chain_id = provider.get_chain_id().await?;

    let domain = voucher::marketplace_domain(chain_id, marketplace);
    let creator = voucher::recover_signer(&signed.voucher, &domain, &signature)?;

    let client = MarketplaceClient::new(provider, marketplace, tx_lock);
    if client.voucher_used(signed.voucher.nonce).await? {
        bail!("Voucher nonce {} already redeemed", signed.voucher.nonce);
    }

    let value = parse_ether(value_eth)?;
    let tx_hash = client.redeem(&signed.voucher, &signature, value).await?;

    println!("Voucher redeemed!");
    println!("  Signed by: {creator}");
    println!("  Token id: {}", signed.voucher.tokenId);
    println!("  Paid: {value_eth} ETH");
    println!("  Transaction hash: {tx_hash:?}");
    Ok(())
}

async fn delegate(config: &AppConfig, delegatee: Option<Address>) -> Result<()> {
    let (provider, _, tx_lock) = connect(config).await?;
    let client = GovernanceTokenClient::new(provider, config.require_governance_token()?, tx_lock);

    let delegatee = delegatee.unwrap_or(signer_address(config)?);
    let tx_hash = client.delegate(delegatee).await?;

    println!("Delegated to {delegatee}");
    println!("  Balance: {}", client.balance_of(delegatee).await?);
    println!("  Votes: {}", client.get_votes(delegatee).await?);
    println!("  Transaction hash: {tx_hash:?}");
    Ok(())
}

async fn propose(
    config: &AppConfig,
    target: Address,
    value_eth: &str,
    calldata: &str,
    description: String,
) -> Result<()> {
    let (provider, _, tx_lock) = connect(config).await?;
    let client = GovernorClient::new(provider, config.require_governor()?, tx_lock);

    let action = ProposalAction::single(target, parse_ether(value_eth)?, parse_calldata(calldata)?);
    let tx_hash = client.propose(action, description).await?;

    println!("Proposal created");
    println!("  Transaction hash: {tx_hash:?}");
    Ok(())
}

async fn vote(config: &AppConfig, proposal_id: U256, support: u8) -> Result<()> {
    if support > 2 {
        bail!("Support must be 0 (against), 1 (for) or 2 (abstain)");
    }

    let (provider, _, tx_lock) = connect(config).await?;
    let client = GovernorClient::new(provider, config.require_governor()?, tx_lock);

    let tx_hash = client.cast_vote(proposal_id, support).await?;
    let state = client.state(proposal_id).await?;

    println!("Vote cast on proposal {proposal_id}");
    println!("  Proposal state: {state}");
    println!("  Transaction hash: {tx_hash:?}");
    Ok(())
}

async fn queue(
    config: &AppConfig,
    target: Address,
    value_eth: &str,
    calldata: &str,
    description: &str,
) -> Result<()> {
    let (provider, _, tx_lock) = connect(config).await?;
    let client = GovernorClient::new(provider, config.require_governor()?, tx_lock);

    let action = ProposalAction::single(target, parse_ether(value_eth)?, parse_calldata(calldata)?);
    let tx_hash = client.queue(action, description).await?;

    println!("Proposal queued");
    println!("  Transaction hash: {tx_hash:?}");
    Ok(())
}

async fn execute(
    config: &AppConfig,
    target: Address,
    value_eth: &str,
    calldata: &str,
    description: &str,
) -> Result<()> {
    let (provider, _, tx_lock) = connect(config).await?;
    let client = GovernorClient::new(provider, config.require_governor()?, tx_lock);

    let action = ProposalAction::single(target, parse_ether(value_eth)?, parse_calldata(calldata)?);
    let tx_hash = client.execute(action, description).await?;

    println!("Proposal executed");
    println!("  Transaction hash: {tx_hash:?}");
    Ok(())
}

async fn release(config: &AppConfig, to: Address, amount_eth: &str) -> Result<()> {
    let (provider, _, tx_lock) = connect(config).await?;
    let client = TreasuryClient::new(provider, config.require_treasury()?, tx_lock);

    let tx_hash = client.release(to, parse_ether(amount_eth)?).await?;
    println!("Released {amount_eth} ETH to {to}");
    println!("  Transaction hash: {tx_hash:?}");
    Ok(())
}
