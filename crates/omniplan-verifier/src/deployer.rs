//! The two-phase deployment primitive as an injected capability.

use std::collections::{BTreeMap, BTreeSet};

use omniplan_core::address::{derive_address, proxy_address};
use omniplan_core::{Address, H256};
use tracing::debug;

use crate::error::DeployError;

/// `REVERT`; init code starting with it never creates a contract.
const REVERT_OPCODE: u8 = 0xfd;

/// Deterministically deploy `init_code` under `deployment_salt`.
///
/// The resulting address must depend only on the implementor's factory and
/// the salt, never on the init code.
pub trait Deployer {
    fn deploy(&mut self, deployment_salt: &H256, init_code: &[u8]) -> Result<Address, DeployError>;
}

/// In-memory deployment primitive for one factory on one chain.
///
/// Records which init code was deployed at which address. A proxy slot is
/// consumed by its first successful use; a failed creation leaves no state.
#[derive(Debug, Clone, Default)]
pub struct SimulatedDeployer {
    factory: Address,
    proxies: BTreeSet<Address>,
    deployed: BTreeMap<Address, Vec<u8>>,
}

impl SimulatedDeployer {
    pub fn new(factory: Address) -> Self {
        Self {
            factory,
            ..Default::default()
        }
    }

    pub fn factory(&self) -> &Address {
        &self.factory
    }

    /// Init code deployed at `address`, if any.
    pub fn code_at(&self, address: &Address) -> Option<&[u8]> {
        self.deployed.get(address).map(Vec::as_slice)
    }

    /// Occupy the proxy slot for `deployment_salt` without deploying anything.
    pub fn occupy_proxy(&mut self, deployment_salt: &H256) -> Address {
        let proxy = proxy_address(&self.factory, deployment_salt);
        self.proxies.insert(proxy);
        proxy
    }
}

impl Deployer for SimulatedDeployer {
    fn deploy(&mut self, deployment_salt: &H256, init_code: &[u8]) -> Result<Address, DeployError> {
        let address = derive_address(&self.factory, deployment_salt);
        if self.deployed.contains_key(&address) {
            return Err(DeployError::TargetOccupied(address));
        }

        let proxy = proxy_address(&self.factory, deployment_salt);
        if self.proxies.contains(&proxy) {
            return Err(DeployError::ProxyCreationFailed(proxy));
        }

        match init_code.first() {
            None => {
                return Err(DeployError::ContractCreationFailed {
                    reason: "empty init code".to_string(),
                })
            }
            Some(&REVERT_OPCODE) => {
                return Err(DeployError::ContractCreationFailed {
                    reason: "constructor reverted".to_string(),
                })
            }
            Some(_) => {}
        }

        self.proxies.insert(proxy);
        debug!(
            address = %omniplan_core::encoding::to_hex(address),
            code_len = init_code.len(),
            "deployed contract"
        );
        self.deployed.insert(address, init_code.to_vec());
        Ok(address)
    }
}
