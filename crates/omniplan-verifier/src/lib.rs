//! Proof re-derivation and fallback dispatch.
//!
//! [`DeploymentVerifier`] mirrors the two deploy entry points of the on-chain
//! deployer for a single chain: the primary path, which trusts the caller's
//! proof, and the fallback path, which cross-checks a gap leaf against the
//! fallback leaf. The deployment primitive itself is injected through the
//! [`Deployer`] trait; [`SimulatedDeployer`] is an in-memory implementation.

pub mod deployer;
pub mod error;
pub mod verifier;

pub use deployer::{Deployer, SimulatedDeployer};
pub use error::{DeployError, Result, VerifyError};
pub use verifier::{Deployment, DeploymentVerifier};
