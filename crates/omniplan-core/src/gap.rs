//! Fallback eligibility ("gap") of a leaf.
//!
//! Leaves are sorted by chain id and each points at its cyclic successor. The
//! gap of a leaf is the set of chain ids strictly between it and its successor,
//! so the gaps of all leaves partition the chain ids that have no leaf of their
//! own. The last leaf wraps: its gap runs past `u64::MAX` back to the first id.

use crate::error::{Error, Result};

/// Shape of a leaf's gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapKind {
    /// `chain_id == next_chain_id`: the plan has a single entry.
    SingleEntry,
    /// `chain_id < next_chain_id`: the open interval between them.
    Interval,
    /// `chain_id > next_chain_id`: above `chain_id` or below `next_chain_id`.
    Wrap,
}

impl GapKind {
    pub fn of(chain_id: u64, next_chain_id: u64) -> Self {
        match chain_id.cmp(&next_chain_id) {
            std::cmp::Ordering::Equal => GapKind::SingleEntry,
            std::cmp::Ordering::Less => GapKind::Interval,
            std::cmp::Ordering::Greater => GapKind::Wrap,
        }
    }
}

/// Whether `target` may deploy the fallback through the leaf `chain_id -> next_chain_id`.
pub fn in_gap(chain_id: u64, next_chain_id: u64, target: u64) -> bool {
    match GapKind::of(chain_id, next_chain_id) {
        GapKind::SingleEntry => target != chain_id,
        GapKind::Interval => chain_id < target && target < next_chain_id,
        GapKind::Wrap => target > chain_id || target < next_chain_id,
    }
}

/// Like [`in_gap`], but a rejection is an error naming the leaf and its gap.
pub fn require_in_gap(chain_id: u64, next_chain_id: u64, target: u64) -> Result<()> {
    if in_gap(chain_id, next_chain_id, target) {
        return Ok(());
    }
    Err(Error::NotInGap {
        target,
        chain_id,
        next_chain_id,
        gap: describe_gap(chain_id, next_chain_id),
    })
}

/// Human-readable description of a leaf's gap, for diagnostics.
pub fn describe_gap(chain_id: u64, next_chain_id: u64) -> String {
    match GapKind::of(chain_id, next_chain_id) {
        GapKind::SingleEntry => {
            format!("every chain id except {chain_id} (single-entry plan)")
        }
        GapKind::Interval if next_chain_id - chain_id == 1 => {
            format!("empty: {chain_id} and {next_chain_id} are adjacent")
        }
        GapKind::Interval => format!(
            "chain ids {}..={} (strictly between {chain_id} and {next_chain_id})",
            chain_id + 1,
            next_chain_id - 1
        ),
        GapKind::Wrap if chain_id == u64::MAX && next_chain_id == 0 => {
            format!("empty: wraps from {chain_id} straight to {next_chain_id}")
        }
        GapKind::Wrap => format!(
            "chain ids above {chain_id} or below {next_chain_id} \
             (wraps around from the last leaf to the first)"
        ),
    }
}
