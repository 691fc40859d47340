//! Lazy-mint vouchers.
//!
//! A voucher is signed off-chain by the collection creator and redeemed
//! on-chain exactly once; the marketplace contract burns the nonce to prevent
//! replay. Signing uses EIP-712 typed data bound to the marketplace address
//! and chain id, so a voucher cannot be replayed across deployments either.

use alloy::primitives::{Address, Signature, U256};
use alloy::signers::{local::PrivateKeySigner, SignerSync};
use alloy::sol;
use alloy::sol_types::{eip712_domain, Eip712Domain, SolStruct};
use anyhow::{Context, Result};

sol! {
    /// Off-chain-signed authorization to mint one token.
    #[derive(Debug, serde::Serialize, serde::Deserialize)]
    struct MintVoucher {
        uint256 tokenId;
        uint256 minPrice;
        string uri;
        uint256 nonce;
    }
}

/// The EIP-712 domain the marketplace verifies redeem signatures against.
pub fn marketplace_domain(chain_id: u64, marketplace: Address) -> Eip712Domain {
    eip712_domain! {
        name: "LazyNFTMarketplace",
        version: "1",
        chain_id: chain_id,
        verifying_contract: marketplace,
    }
}

/// Sign a voucher with the creator key.
pub fn sign_voucher(
    signer: &PrivateKeySigner,
    voucher: &MintVoucher,
    domain: &Eip712Domain,
) -> Result<Signature> {
    let hash = voucher.eip712_signing_hash(domain);
    signer
        .sign_hash_sync(&hash)
        .context("Failed to sign voucher")
}

/// Recover the signer of a voucher. The marketplace does the same on-chain
/// and compares against the collection creator.
pub fn recover_signer(
    voucher: &MintVoucher,
    domain: &Eip712Domain,
    signature: &Signature,
) -> Result<Address> {
    let hash = voucher.eip712_signing_hash(domain);
    signature
        .recover_address_from_prehash(&hash)
        .context("Failed to recover voucher signer")
}

/// Random redemption nonce for a fresh voucher.
pub fn random_nonce() -> U256 {
    U256::from(rand::random::<u64>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet;

    fn test_domain() -> Eip712Domain {
        let marketplace: Address = "0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0"
            .parse()
            .unwrap();
        marketplace_domain(31337, marketplace)
    }

    fn test_voucher() -> MintVoucher {
        MintVoucher {
            tokenId: U256::from(1),
            minPrice: U256::from(1_000_000_000_000_000u64),
            uri: "ipfs://QmVoucherUri".to_string(),
            nonce: U256::from(42),
        }
    }

    #[test]
    fn test_sign_and_recover() {
        let signer = wallet::generate_signer();
        let domain = test_domain();
        let voucher = test_voucher();

        let sig = sign_voucher(&signer, &voucher, &domain).unwrap();
        let recovered = recover_signer(&voucher, &domain, &sig).unwrap();
        assert_eq!(recovered, signer.address());
    }

    #[test]
    fn test_tampered_voucher_recovers_different_signer() {
        let signer = wallet::generate_signer();
        let domain = test_domain();
        let voucher = test_voucher();

        let sig = sign_voucher(&signer, &voucher, &domain).unwrap();

        let mut tampered = voucher.clone();
        tampered.minPrice = U256::from(1u64);
        let recovered = recover_signer(&tampered, &domain, &sig).unwrap();
        assert_ne!(recovered, signer.address());
    }

    #[test]
    fn test_domain_binds_chain_id() {
        let signer = wallet::generate_signer();
        let voucher = test_voucher();
        let marketplace: Address = "0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0"
            .parse()
            .unwrap();

        let sig = sign_voucher(&signer, &voucher, &marketplace_domain(1, marketplace)).unwrap();
        let recovered =
            recover_signer(&voucher, &marketplace_domain(31337, marketplace), &sig).unwrap();
        assert_ne!(recovered, signer.address());
    }

    #[test]
    fn test_random_nonce_varies() {
        assert_ne!(random_nonce(), random_nonce());
    }
}
