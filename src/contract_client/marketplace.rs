use crate::{
    contract_client::common::tx_submitter::TransactionSubmitter, voucher::MintVoucher,
};
use alloy::{
    primitives::{Address, B256, Bytes, Signature, U256},
    providers::DynProvider,
    sol,
};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Mutex;

sol!(
    #[sol(rpc)]
    #[derive(Debug)]
    contract LazyNFTMarketplace {
        error InvalidSignature();
        error VoucherAlreadyUsed();
        error InsufficientPayment();

        function voucherUsed(uint256 nonce) external view returns (bool);
        function redeem(uint256 tokenId, uint256 minPrice, string calldata uri, uint256 nonce, bytes calldata signature) external payable returns (uint256);
    }
);

use LazyNFTMarketplace::LazyNFTMarketplaceInstance;

/// Client for the LazyNFTMarketplace contract: voucher-based lazy minting.
/// Vouchers are signed off-chain ([`crate::voucher`]); the contract verifies
/// the EIP-712 signature and mints on redemption.
#[derive(Clone)]
pub struct MarketplaceClient {
    contract: LazyNFTMarketplaceInstance<DynProvider>,
    submitter: TransactionSubmitter<LazyNFTMarketplace::LazyNFTMarketplaceErrors>,
}

impl MarketplaceClient {
    pub fn new(provider: DynProvider, address: Address, tx_lock: Arc<Mutex<()>>) -> Self {
        let contract = LazyNFTMarketplaceInstance::new(address, provider);
        let submitter = TransactionSubmitter::new(tx_lock);

        Self {
            contract,
            submitter,
        }
    }

    pub fn address(&self) -> Address {
        *self.contract.address()
    }

    /// Whether a voucher nonce has already been redeemed.
    pub async fn voucher_used(&self, nonce: U256) -> Result<bool> {
        Ok(self.contract.voucherUsed(nonce).call().await?)
    }

    /// Redeem a signed voucher, paying at least its minimum price.
    pub async fn redeem(
        &self,
        voucher: &MintVoucher,
        signature: &Signature,
        value: U256,
    ) -> Result<B256> {
        let call = self
            .contract
            .redeem(
                voucher.tokenId,
                voucher.minPrice,
                voucher.uri.clone(),
                voucher.nonce,
                Bytes::from(signature.as_bytes().to_vec()),
            )
            .value(value);
        self.submitter.invoke("redeem", call).await
    }
}
