use thiserror::Error;

/// Coarse grouping of [`Error`] variants.
///
/// Every category is terminal for the operation that raised it; the caller is
/// expected to correct its input and try again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Plan assembly rejected the chain entries.
    Validation,
    /// Malformed hex, wrong fixed-width length, or a non-canonical packed word.
    Encoding,
    /// The target chain may not use the fallback through the given leaf.
    Gap,
    /// Published plan data disagrees with what it should re-derive to.
    ProofConsistency,
    /// A query referred to something the plan does not contain.
    Lookup,
    /// JSON (de)serialization failed.
    Serialization,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("chain set is empty: a plan needs at least one chain entry")]
    EmptyChainSet,

    #[error("duplicate chain id {0}")]
    DuplicateChainId(u64),

    #[error("chain id {value} is out of range [0, 2^64-1]")]
    ChainIdOutOfRange { value: String },

    #[error("malformed chain id {value:?}: {reason}")]
    MalformedChainId { value: String, reason: String },

    #[error("missing init code for chain {chain_id}")]
    MissingInitCode { chain_id: u64 },

    #[error("missing fallback init code")]
    MissingFallbackInitCode,

    #[error("malformed hex in {field}: {reason}")]
    MalformedHex { field: String, reason: String },

    #[error("invalid length for {field}: expected {expected} bytes, got {actual}")]
    InvalidLength {
        field: String,
        expected: usize,
        actual: usize,
    },

    #[error("non-canonical leaf prefix 0x{word}: {reason}")]
    NonCanonicalPrefix { word: String, reason: &'static str },

    #[error("cannot build a Merkle tree without leaves")]
    EmptyTree,

    #[error("leaf index {index} out of bounds (tree has {len} leaves)")]
    LeafIndexOutOfBounds { index: usize, len: usize },

    #[error("chain {target} is not in the gap of leaf {chain_id} -> {next_chain_id} ({gap})")]
    NotInGap {
        target: u64,
        chain_id: u64,
        next_chain_id: u64,
        gap: String,
    },

    #[error("no leaf of the plan has chain {0} in its gap")]
    NoGapLeaf(u64),

    #[error("chain {0} is not part of the plan")]
    ChainNotInPlan(u64),

    #[error("chain {0} has its own leaf and must deploy through the primary path")]
    ChainInPlan(u64),

    #[error("plan mismatch in {field} of leaf {chain_id}")]
    PlanMismatch { field: &'static str, chain_id: u64 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::EmptyChainSet
            | Error::DuplicateChainId(_)
            | Error::ChainIdOutOfRange { .. }
            | Error::MalformedChainId { .. }
            | Error::MissingInitCode { .. }
            | Error::MissingFallbackInitCode => ErrorCategory::Validation,
            Error::MalformedHex { .. }
            | Error::InvalidLength { .. }
            | Error::NonCanonicalPrefix { .. } => ErrorCategory::Encoding,
            Error::NotInGap { .. } | Error::NoGapLeaf(_) | Error::ChainInPlan(_) => {
                ErrorCategory::Gap
            }
            Error::PlanMismatch { .. } => ErrorCategory::ProofConsistency,
            Error::EmptyTree
            | Error::LeafIndexOutOfBounds { .. }
            | Error::ChainNotInPlan(_) => ErrorCategory::Lookup,
            Error::Serialization(_) => ErrorCategory::Serialization,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
