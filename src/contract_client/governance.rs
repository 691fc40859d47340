//! Clients for the DAO trio: vote token, Governor and treasury.
//!
//! The Governor follows the OpenZeppelin flow: `propose` with the action
//! arrays and a human-readable description, then vote/queue/execute with the
//! keccak256 hash of that same description.

use crate::contract_client::common::tx_submitter::TransactionSubmitter;
use alloy::{
    primitives::{keccak256, Address, B256, Bytes, U256},
    providers::DynProvider,
    sol,
};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Mutex;

sol!(
    #[sol(rpc)]
    #[derive(Debug)]
    contract GovernanceToken {
        error ERC20InsufficientBalance(address sender, uint256 balance, uint256 needed);

        function delegate(address delegatee) external;
        function getVotes(address account) external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
    }

    #[sol(rpc)]
    #[derive(Debug)]
    contract Governor {
        error GovernorUnexpectedProposalState(uint256 proposalId, uint8 current, bytes32 expectedStates);
        error GovernorInsufficientProposerVotes(address proposer, uint256 votes, uint256 threshold);
        error GovernorAlreadyCastVote(address voter);

        function propose(address[] memory targets, uint256[] memory values, bytes[] memory calldatas, string memory description) external returns (uint256);
        function castVote(uint256 proposalId, uint8 support) external returns (uint256);
        function queue(address[] memory targets, uint256[] memory values, bytes[] memory calldatas, bytes32 descriptionHash) external returns (uint256);
        function execute(address[] memory targets, uint256[] memory values, bytes[] memory calldatas, bytes32 descriptionHash) external payable returns (uint256);
        function state(uint256 proposalId) external view returns (uint8);
    }

    #[sol(rpc)]
    #[derive(Debug)]
    contract Treasury {
        error NotAuthorized();
        error InsufficientFunds();

        function release(address payable to, uint256 amount) external;
    }
);

/// A proposal's lifecycle stage, as reported by `Governor::state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalState {
    Pending,
    Active,
    Canceled,
    Defeated,
    Succeeded,
    Queued,
    Expired,
    Executed,
    Unknown(u8),
}

impl ProposalState {
    pub fn from_byte(value: u8) -> Self {
        match value {
            0 => Self::Pending,
            1 => Self::Active,
            2 => Self::Canceled,
            3 => Self::Defeated,
            4 => Self::Succeeded,
            5 => Self::Queued,
            6 => Self::Expired,
            7 => Self::Executed,
            other => Self::Unknown(other),
        }
    }
}

impl std::fmt::Display for ProposalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Active => write!(f, "Active"),
            Self::Canceled => write!(f, "Canceled"),
            Self::Defeated => write!(f, "Defeated"),
            Self::Succeeded => write!(f, "Succeeded"),
            Self::Queued => write!(f, "Queued"),
            Self::Expired => write!(f, "Expired"),
            Self::Executed => write!(f, "Executed"),
            Self::Unknown(value) => write!(f, "Unknown({value})"),
        }
    }
}

/// The action arrays a proposal carries. A single-action proposal is the
/// common case for the CLI.
#[derive(Debug, Clone)]
pub struct ProposalAction {
    pub targets: Vec<Address>,
    pub values: Vec<U256>,
    pub calldatas: Vec<Bytes>,
}

impl ProposalAction {
    pub fn single(target: Address, value: U256, calldata: Bytes) -> Self {
        Self {
            targets: vec![target],
            values: vec![value],
            calldatas: vec![calldata],
        }
    }
}

/// Hash a proposal description the way the Governor does.
pub fn description_hash(description: &str) -> B256 {
    keccak256(description.as_bytes())
}

#[derive(Clone)]
pub struct GovernanceTokenClient {
    contract: GovernanceToken::GovernanceTokenInstance<DynProvider>,
    submitter: TransactionSubmitter<GovernanceToken::GovernanceTokenErrors>,
}

impl GovernanceTokenClient {
    pub fn new(provider: DynProvider, address: Address, tx_lock: Arc<Mutex<()>>) -> Self {
        let contract = GovernanceToken::GovernanceTokenInstance::new(address, provider);
        let submitter = TransactionSubmitter::new(tx_lock);

        Self {
            contract,
            submitter,
        }
    }

    /// Delegate voting power. Tokens carry no votes until delegated,
    /// including to oneself.
    pub async fn delegate(&self, delegatee: Address) -> Result<B256> {
        let call = self.contract.delegate(delegatee);
        self.submitter.invoke("delegate", call).await
    }

    pub async fn get_votes(&self, account: Address) -> Result<U256> {
        Ok(self.contract.getVotes(account).call().await?)
    }

    pub async fn balance_of(&self, account: Address) -> Result<U256> {
        Ok(self.contract.balanceOf(account).call().await?)
    }
}

#[derive(Clone)]
pub struct GovernorClient {
    contract: Governor::GovernorInstance<DynProvider>,
    submitter: TransactionSubmitter<Governor::GovernorErrors>,
}

impl GovernorClient {
    pub fn new(provider: DynProvider, address: Address, tx_lock: Arc<Mutex<()>>) -> Self {
        let contract = Governor::GovernorInstance::new(address, provider);
        let submitter = TransactionSubmitter::new(tx_lock);

        Self {
            contract,
            submitter,
        }
    }

    pub async fn propose(&self, action: ProposalAction, description: String) -> Result<B256> {
        let call = self.contract.propose(
            action.targets,
            action.values,
            action.calldatas,
            description,
        );
        self.submitter.invoke("propose", call).await
    }

    /// Cast a vote: 0 = against, 1 = for, 2 = abstain.
    pub async fn cast_vote(&self, proposal_id: U256, support: u8) -> Result<B256> {
        let call = self.contract.castVote(proposal_id, support);
        self.submitter.invoke("castVote", call).await
    }

    pub async fn queue(&self, action: ProposalAction, description: &str) -> Result<B256> {
        let call = self.contract.queue(
            action.targets,
            action.values,
            action.calldatas,
            description_hash(description),
        );
        self.submitter.invoke("queue", call).await
    }

    pub async fn execute(&self, action: ProposalAction, description: &str) -> Result<B256> {
        let call = self.contract.execute(
            action.targets,
            action.values,
            action.calldatas,
            description_hash(description),
        );
        self.submitter.invoke("execute", call).await
    }

    pub async fn state(&self, proposal_id: U256) -> Result<ProposalState> {
        let raw = self.contract.state(proposal_id).call().await?;
        Ok(ProposalState::from_byte(raw))
    }
}

#[derive(Clone)]
pub struct TreasuryClient {
    contract: Treasury::TreasuryInstance<DynProvider>,
    submitter: TransactionSubmitter<Treasury::TreasuryErrors>,
}

impl TreasuryClient {
    pub fn new(provider: DynProvider, address: Address, tx_lock: Arc<Mutex<()>>) -> Self {
        let contract = Treasury::TreasuryInstance::new(address, provider);
        let submitter = TransactionSubmitter::new(tx_lock);

        Self {
            contract,
            submitter,
        }
    }

    /// Pay out treasury funds. Reverts unless the caller is authorized
    /// (normally only via a passed proposal).
    pub async fn release(&self, to: Address, amount: U256) -> Result<B256> {
        let call = self.contract.release(to, amount);
        self.submitter.invoke("release", call).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proposal_state_mapping() {
        assert_eq!(ProposalState::from_byte(0), ProposalState::Pending);
        assert_eq!(ProposalState::from_byte(4), ProposalState::Succeeded);
        assert_eq!(ProposalState::from_byte(7), ProposalState::Executed);
        assert_eq!(ProposalState::from_byte(9), ProposalState::Unknown(9));
    }

    #[test]
    fn test_description_hash_matches_keccak() {
        let hash = description_hash("Proposal #1: fund the treasury");
        assert_eq!(
            hash,
            keccak256("Proposal #1: fund the treasury".as_bytes())
        );
        assert_ne!(hash, description_hash("Proposal #2: fund the treasury"));
    }

    #[test]
    fn test_single_action_shape() {
        let action = ProposalAction::single(Address::ZERO, U256::from(5u64), Bytes::new());
        assert_eq!(action.targets.len(), 1);
        assert_eq!(action.values, vec![U256::from(5u64)]);
    }
}
