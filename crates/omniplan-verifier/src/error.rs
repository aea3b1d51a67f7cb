use omniplan_core::encoding::to_hex;
use omniplan_core::{Address, H256};
use thiserror::Error;

/// Failures of the deployment primitive, propagated verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeployError {
    #[error("target address {} is already occupied", to_hex(.0))]
    TargetOccupied(Address),

    #[error("proxy creation failed at {}", to_hex(.0))]
    ProxyCreationFailed(Address),

    #[error("contract creation failed: {reason}")]
    ContractCreationFailed { reason: String },
}

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("gap leaf {chain_id} carries the fallback flag and cannot serve as a gap")]
    FallbackLeafAsGap { chain_id: u64 },

    #[error("chain {target} is not in the gap of leaf {chain_id} -> {next_chain_id} ({gap})")]
    NotInGap {
        target: u64,
        chain_id: u64,
        next_chain_id: u64,
        gap: String,
    },

    #[error("gap proof folds to {} but fallback proof folds to {}", to_hex(.gap_node), to_hex(.fallback_node))]
    ProofMismatch {
        gap_node: H256,
        fallback_node: H256,
    },

    #[error("deployment failed: {0}")]
    Deploy(#[from] DeployError),

    #[error("invalid call data: {0}")]
    Encoding(omniplan_core::Error),
}

impl From<omniplan_core::Error> for VerifyError {
    fn from(err: omniplan_core::Error) -> Self {
        match err {
            omniplan_core::Error::NotInGap {
                target,
                chain_id,
                next_chain_id,
                gap,
            } => VerifyError::NotInGap {
                target,
                chain_id,
                next_chain_id,
                gap,
            },
            other => VerifyError::Encoding(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, VerifyError>;
