use crate::{
    contract_client::common::{
        deploy::{self, Artifact},
        tx_submitter::TransactionSubmitter,
    },
    payload::PaymentPayload,
};
use alloy::{
    primitives::{Address, B256, Bytes, U256},
    providers::DynProvider,
    sol,
    sol_types::SolValue,
};
use anyhow::Result;
use futures_util::{Stream, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

sol!(
    #[sol(rpc)]
    #[derive(Debug)]
    contract CreatorRouter {
        error NotCreator();
        error ZeroPayment();
        error NothingToWithdraw();
        error FeeTooHigh();

        event PaymentReceived(address indexed payer, uint8 kind, uint32 contentId, uint256 amount, bytes payload);
        event Withdrawn(address indexed creator, uint256 payout, uint256 serviceFee);

        function creator() external view returns (address);
        function serviceAddress() external view returns (address);
        function feeBasisPoints() external view returns (uint16);
        function pendingBalance() external view returns (uint256);
        function pay(uint8 kind, uint32 contentId, bytes calldata payload) external payable;
        function withdraw() external;
    }
);

use CreatorRouter::CreatorRouterInstance;

/// A payment observed on-chain, with its payload decoded where possible.
#[derive(Debug, Clone, Serialize)]
pub struct ObservedPayment {
    pub payer: Address,
    pub amount: U256,
    pub kind: u8,
    pub content_id: u32,
    pub block_number: Option<u64>,
    pub tx_hash: Option<B256>,
    /// `None` when the raw payload bytes do not form a valid payload.
    pub payload: Option<PaymentPayload>,
}

/// Client for the CreatorRouter contract: per-creator payment intake and
/// fee-splitting withdrawal.
#[derive(Clone)]
pub struct CreatorRouterClient {
    contract: CreatorRouterInstance<DynProvider>,
    submitter: TransactionSubmitter<CreatorRouter::CreatorRouterErrors>,
}

impl CreatorRouterClient {
    pub fn new(provider: DynProvider, address: Address, tx_lock: Arc<Mutex<()>>) -> Self {
        let contract = CreatorRouterInstance::new(address, provider);
        let submitter = TransactionSubmitter::new(tx_lock);

        Self {
            contract,
            submitter,
        }
    }

    /// Deploy a new router for a creator and return a client for it.
    pub async fn deploy(
        provider: DynProvider,
        artifact: &Artifact,
        creator: Address,
        service_address: Address,
        fee_basis_points: u16,
        tx_lock: Arc<Mutex<()>>,
    ) -> Result<Self> {
        let args = (creator, service_address, fee_basis_points).abi_encode_params();
        let address = deploy::deploy_contract(&provider, artifact, &args).await?;
        Ok(Self::new(provider, address, tx_lock))
    }

    pub fn address(&self) -> Address {
        *self.contract.address()
    }

    // ------------------------------------------------------------------------
    // View Functions
    // ------------------------------------------------------------------------

    pub async fn creator(&self) -> Result<Address> {
        Ok(self.contract.creator().call().await?)
    }

    pub async fn service_address(&self) -> Result<Address> {
        Ok(self.contract.serviceAddress().call().await?)
    }

    pub async fn fee_basis_points(&self) -> Result<u16> {
        Ok(self.contract.feeBasisPoints().call().await?)
    }

    /// Balance accumulated from payments that has not been withdrawn yet.
    pub async fn pending_balance(&self) -> Result<U256> {
        Ok(self.contract.pendingBalance().call().await?)
    }

    // ------------------------------------------------------------------------
    // Payment Functions
    // ------------------------------------------------------------------------

    /// Send a payment carrying an encoded payload. The kind and content id
    /// are passed both in clear (for the contract) and inside the payload
    /// (for off-chain consumers).
    pub async fn pay(&self, payload: &PaymentPayload, amount: U256) -> Result<B256> {
        let call = self
            .contract
            .pay(
                payload.kind.as_byte(),
                payload.content_id,
                Bytes::from(payload.encode()),
            )
            .value(amount);
        self.submitter.invoke("pay", call).await
    }

    /// Withdraw the pending balance, splitting the service fee on-chain.
    pub async fn withdraw(&self) -> Result<B256> {
        let call = self.contract.withdraw();
        self.submitter.invoke("withdraw", call).await
    }

    // ------------------------------------------------------------------------
    // Event Access
    // ------------------------------------------------------------------------

    /// Query PaymentReceived events from `from_block` to the latest block.
    pub async fn payments_since(&self, from_block: u64) -> Result<Vec<ObservedPayment>> {
        let logs = self
            .contract
            .PaymentReceived_filter()
            .from_block(from_block)
            .query()
            .await?;

        Ok(logs
            .into_iter()
            .map(|(event, log)| to_observed(event, log.block_number, log.transaction_hash))
            .collect())
    }

    /// Subscribe to PaymentReceived events as a live stream. Requires a
    /// WebSocket provider.
    pub async fn payment_stream(&self) -> Result<impl Stream<Item = ObservedPayment>> {
        let subscription = self.contract.PaymentReceived_filter().subscribe().await?;
        Ok(subscription.into_stream().filter_map(|item| async {
            item.ok()
                .map(|(event, log)| to_observed(event, log.block_number, log.transaction_hash))
        }))
    }
}

fn to_observed(
    event: CreatorRouter::PaymentReceived,
    block_number: Option<u64>,
    tx_hash: Option<B256>,
) -> ObservedPayment {
    ObservedPayment {
        payer: event.payer,
        amount: event.amount,
        kind: event.kind,
        content_id: event.contentId,
        block_number,
        tx_hash,
        payload: PaymentPayload::decode(&event.payload),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::PaymentKind;

    #[test]
    fn test_observed_payment_decodes_payload() {
        let payload = PaymentPayload::new("00112233aabbccdd", PaymentKind::Unlock)
            .unwrap()
            .with_content_id(9);

        let event = CreatorRouter::PaymentReceived {
            payer: Address::ZERO,
            kind: payload.kind.as_byte(),
            contentId: payload.content_id,
            amount: U256::from(1_000u64),
            payload: Bytes::from(payload.encode()),
        };

        let observed = to_observed(event, Some(42), None);
        let decoded = observed.payload.unwrap();
        assert_eq!(decoded.content_id, 9);
        assert_eq!(decoded.creator_id_hex(), "00112233aabbccdd");
    }

    #[test]
    fn test_observed_payment_tolerates_garbage_payload() {
        let event = CreatorRouter::PaymentReceived {
            payer: Address::ZERO,
            kind: 0,
            contentId: 0,
            amount: U256::ZERO,
            payload: Bytes::from(vec![0xff; 3]),
        };

        let observed = to_observed(event, None, None);
        assert!(observed.payload.is_none());
    }
}
