//! Deployment plan assembly.
//!
//! Turns a [`PlanSpec`] into a [`Plan`]: sorted leaves with their successor
//! pointers, the fallback leaf, the shared root and one proof per leaf. The
//! plan answers the queries a deployer needs per chain ([`ProofQuery`],
//! [`PrimaryCall`], [`FallbackCall`]) and the address every chain ends up at
//! ([`AddressComputation`]).

pub mod plan;
pub mod query;
pub mod spec;

pub use plan::{build, Plan, PlanLeaf};
pub use query::{AddressComputation, FallbackCall, PrimaryCall, ProofQuery};
pub use spec::{ChainEntry, PlanMetadata, PlanSpec};
