//! Contract deployment from compiled artifacts.
//!
//! The contracts themselves are built by the Solidity toolchain; deployment
//! here means reading the compiled artifact (Hardhat JSON layout), appending
//! the ABI-encoded constructor arguments to its bytecode and sending the
//! create transaction.

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes};
use alloy::providers::{DynProvider, Provider};
use alloy::rpc::types::TransactionRequest;
use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};
use tracing::info;

/// The subset of a Hardhat artifact needed for deployment. Unknown fields
/// (abi, source maps, link references) are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub contract_name: Option<String>,
    pub bytecode: String,
}

impl Artifact {
    /// The creation bytecode as raw bytes.
    pub fn creation_code(&self) -> Result<Vec<u8>> {
        let code = hex::decode(self.bytecode.trim_start_matches("0x"))
            .context("Artifact bytecode is not valid hex")?;
        if code.is_empty() {
            bail!("Artifact has empty bytecode (interface-only artifact?)");
        }
        Ok(code)
    }
}

/// Load `<artifacts_dir>/<name>.json`.
pub fn load_artifact(artifacts_dir: &str, name: &str) -> Result<Artifact> {
    let path = Path::new(artifacts_dir).join(format!("{name}.json"));
    let contents = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read artifact {}", path.display()))?;
    let artifact: Artifact = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse artifact {}", path.display()))?;
    Ok(artifact)
}

/// Deploy a contract and return its address.
pub async fn deploy_contract(
    provider: &DynProvider,
    artifact: &Artifact,
    constructor_args: &[u8],
) -> Result<Address> {
    let mut data = artifact.creation_code()?;
    data.extend_from_slice(constructor_args);

    let tx = TransactionRequest::default().with_deploy_code(Bytes::from(data));

    let pending = provider
        .send_transaction(tx)
        .await
        .context("Failed to send deployment transaction")?;
    let receipt = pending.get_receipt().await?;

    if !receipt.status() {
        bail!(
            "Deployment reverted. Tx hash: {:?}",
            receipt.transaction_hash
        );
    }

    let address = receipt
        .contract_address
        .ok_or_else(|| anyhow!("No contract address in deployment receipt"))?;

    info!(
        contract = artifact.contract_name.as_deref().unwrap_or("unknown"),
        address = %address,
        tx_hash = ?receipt.transaction_hash,
        "Contract deployed"
    );

    Ok(address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_parses_hardhat_layout() {
        let artifact: Artifact = serde_json::from_str(
            r#"{
                "contractName": "CreatorRouter",
                "abi": [{"type": "constructor", "inputs": []}],
                "bytecode": "0x6080604052",
                "deployedBytecode": "0x00"
            }"#,
        )
        .unwrap();

        assert_eq!(artifact.contract_name.as_deref(), Some("CreatorRouter"));
        assert_eq!(
            artifact.creation_code().unwrap(),
            vec![0x60, 0x80, 0x60, 0x40, 0x52]
        );
    }

    #[test]
    fn test_empty_bytecode_rejected() {
        let artifact = Artifact {
            contract_name: None,
            bytecode: "0x".to_string(),
        };
        assert!(artifact.creation_code().is_err());
    }

    #[test]
    fn test_invalid_bytecode_rejected() {
        let artifact = Artifact {
            contract_name: None,
            bytecode: "0xzz".to_string(),
        };
        assert!(artifact.creation_code().is_err());
    }

    #[test]
    fn test_load_artifact_missing_file() {
        assert!(load_artifact("no_such_dir", "CreatorRouter").is_err());
    }
}
