use crate::contract_client::common::{
    deploy::{self, Artifact},
    tx_submitter::TransactionSubmitter,
};
use alloy::{
    primitives::{Address, B256, Bytes, U256},
    providers::DynProvider,
    sol,
    sol_types::SolValue,
};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Vault executions run arbitrary calldata, so gas estimation on the outer
/// call can undershoot. Pin a generous limit instead.
const EXECUTE_GAS_LIMIT: u64 = 1_000_000;

sol!(
    #[sol(rpc)]
    #[derive(Debug)]
    contract MultiSigVault {
        error NotOwner();
        error AlreadyConfirmed();
        error AlreadyExecuted();
        error NotEnoughConfirmations();
        error TxDoesNotExist();

        function getOwners() external view returns (address[] memory);
        function required() external view returns (uint256);
        function confirmations(uint256 txId) external view returns (uint256);
        function submitTransaction(address to, uint256 value, bytes calldata data) external returns (uint256);
        function confirmTransaction(uint256 txId) external;
        function executeTransaction(uint256 txId) external;
    }
);

use MultiSigVault::MultiSigVaultInstance;

/// Client for the MultiSigVault contract: N-of-M confirmation treasury.
#[derive(Clone)]
pub struct MultiSigVaultClient {
    contract: MultiSigVaultInstance<DynProvider>,
    submitter: TransactionSubmitter<MultiSigVault::MultiSigVaultErrors>,
}

impl MultiSigVaultClient {
    pub fn new(provider: DynProvider, address: Address, tx_lock: Arc<Mutex<()>>) -> Self {
        let contract = MultiSigVaultInstance::new(address, provider);
        let submitter = TransactionSubmitter::new(tx_lock);

        Self {
            contract,
            submitter,
        }
    }

    pub async fn deploy(
        provider: DynProvider,
        artifact: &Artifact,
        owners: Vec<Address>,
        required: U256,
        tx_lock: Arc<Mutex<()>>,
    ) -> Result<Self> {
        let args = (owners, required).abi_encode_params();
        let address = deploy::deploy_contract(&provider, artifact, &args).await?;
        Ok(Self::new(provider, address, tx_lock))
    }

    pub fn address(&self) -> Address {
        *self.contract.address()
    }

    pub async fn get_owners(&self) -> Result<Vec<Address>> {
        Ok(self.contract.getOwners().call().await?)
    }

    /// Number of owner confirmations a transaction needs before execution.
    pub async fn required(&self) -> Result<U256> {
        Ok(self.contract.required().call().await?)
    }

    pub async fn confirmations(&self, tx_id: U256) -> Result<U256> {
        Ok(self.contract.confirmations(tx_id).call().await?)
    }

    /// Queue a transaction for owner confirmation.
    pub async fn submit(&self, to: Address, value: U256, data: Bytes) -> Result<B256> {
        let call = self.contract.submitTransaction(to, value, data);
        self.submitter.invoke("submitTransaction", call).await
    }

    /// Confirm a queued transaction as the signing owner.
    pub async fn confirm(&self, tx_id: U256) -> Result<B256> {
        let call = self.contract.confirmTransaction(tx_id);
        self.submitter.invoke("confirmTransaction", call).await
    }

    /// Execute a transaction once enough confirmations are in.
    pub async fn execute(&self, tx_id: U256) -> Result<B256> {
        let call = self.contract.executeTransaction(tx_id);
        self.submitter
            .with_gas_limit(EXECUTE_GAS_LIMIT)
            .invoke("executeTransaction", call)
            .await
    }
}
