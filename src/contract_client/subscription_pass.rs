use crate::contract_client::common::{
    deploy::{self, Artifact},
    tx_submitter::TransactionSubmitter,
};
use alloy::{
    primitives::{Address, B256, U256},
    providers::DynProvider,
    sol,
    sol_types::SolValue,
};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Mutex;

sol!(
    #[sol(rpc)]
    #[derive(Debug)]
    contract SubscriptionPass {
        error WrongPrice();
        error NotTokenOwner();
        error NonexistentToken();

        function priceWei() external view returns (uint256);
        function periodSecs() external view returns (uint64);
        function isActive(address subscriber) external view returns (bool);
        function expiresAt(address subscriber) external view returns (uint64);
        function mint(address to) external payable returns (uint256);
        function renew(uint256 tokenId) external payable;
    }
);

use SubscriptionPass::SubscriptionPassInstance;

/// Client for the SubscriptionPass contract: time-boxed membership NFTs.
#[derive(Clone)]
pub struct SubscriptionPassClient {
    contract: SubscriptionPassInstance<DynProvider>,
    submitter: TransactionSubmitter<SubscriptionPass::SubscriptionPassErrors>,
}

impl SubscriptionPassClient {
    pub fn new(provider: DynProvider, address: Address, tx_lock: Arc<Mutex<()>>) -> Self {
        let contract = SubscriptionPassInstance::new(address, provider);
        let submitter = TransactionSubmitter::new(tx_lock);

        Self {
            contract,
            submitter,
        }
    }

    pub async fn deploy(
        provider: DynProvider,
        artifact: &Artifact,
        price_wei: U256,
        period_secs: u64,
        tx_lock: Arc<Mutex<()>>,
    ) -> Result<Self> {
        let args = (price_wei, period_secs).abi_encode_params();
        let address = deploy::deploy_contract(&provider, artifact, &args).await?;
        Ok(Self::new(provider, address, tx_lock))
    }

    pub fn address(&self) -> Address {
        *self.contract.address()
    }

    pub async fn price_wei(&self) -> Result<U256> {
        Ok(self.contract.priceWei().call().await?)
    }

    pub async fn period_secs(&self) -> Result<u64> {
        Ok(self.contract.periodSecs().call().await?)
    }

    /// Whether the subscriber holds a pass that has not expired.
    pub async fn is_active(&self, subscriber: Address) -> Result<bool> {
        Ok(self.contract.isActive(subscriber).call().await?)
    }

    /// Unix timestamp at which the subscriber's pass lapses (0 if none).
    pub async fn expires_at(&self, subscriber: Address) -> Result<u64> {
        Ok(self.contract.expiresAt(subscriber).call().await?)
    }

    /// Mint a new pass for `to`, paying the subscription price.
    pub async fn mint(&self, to: Address, value: U256) -> Result<B256> {
        let call = self.contract.mint(to).value(value);
        self.submitter.invoke("mint", call).await
    }

    /// Extend an existing pass by one period.
    pub async fn renew(&self, token_id: U256, value: U256) -> Result<B256> {
        let call = self.contract.renew(token_id).value(value);
        self.submitter.invoke("renew", call).await
    }
}
