//! End-to-end deployments of built plans on simulated chains.

use hex_literal::hex;
use omniplan_core::address::predict_address;
use omniplan_core::precomputed::ZERO_HASH;
use omniplan_core::{Address, H256};
use omniplan_planner::{build, ChainEntry, FallbackCall, Plan};
use omniplan_verifier::{
    DeployError, Deployment, DeploymentVerifier, SimulatedDeployer, VerifyError,
};

const FACTORY: Address = hex!("1111111111111111111111111111111111111111");

fn chain(chain_id: u64) -> DeploymentVerifier<SimulatedDeployer> {
    DeploymentVerifier::new(chain_id, SimulatedDeployer::new(FACTORY))
}

fn plan(entries: &[(u64, Vec<u8>)], fallback: &[u8]) -> Plan {
    let entries: Vec<ChainEntry> = entries
        .iter()
        .map(|(id, code)| ChainEntry::new(*id, code.clone()))
        .collect();
    build(&entries, fallback).unwrap()
}

fn deploy_primary(plan: &Plan, chain_id: u64, salt: &H256) -> Deployment {
    let call = plan.primary_call(chain_id, Some(*salt)).unwrap();
    chain(chain_id)
        .deploy(&call.proof, &call.init_code, call.next_chain_id, &call.salt)
        .unwrap()
}

fn deploy_fallback(
    verifier: &mut DeploymentVerifier<SimulatedDeployer>,
    call: &FallbackCall,
) -> Result<Deployment, VerifyError> {
    verifier.deploy_fallback(
        &call.gap_leaf_prefix,
        &call.gap_leaf_hash,
        &call.gap_proof,
        &call.fallback_proof,
        &call.init_code,
        &call.salt,
    )
}

#[test]
fn every_chain_lands_on_the_predicted_address() {
    let plan = plan(
        &[(1, vec![0x60, 0x01]), (25, vec![0x60, 0x02])],
        &[0x60, 0x03],
    );
    let predicted = plan.address(&FACTORY, None).address;
    assert_eq!(predicted, hex!("42f52d23a4d43096c1471590e65fc7370fc8cd8f"));

    for chain_id in [1, 25] {
        let deployment = deploy_primary(&plan, chain_id, &ZERO_HASH);
        assert_eq!(deployment.node, plan.root);
        assert_eq!(deployment.address, predicted);
    }

    let mut other = chain(137);
    let deployment = deploy_fallback(&mut other, &plan.fallback_call(137, None).unwrap()).unwrap();
    assert_eq!(deployment.address, predicted);
    assert_eq!(other.deployer().code_at(&predicted), Some(&[0x60, 0x03][..]));
}

#[test]
fn wrong_proof_yields_a_different_address() {
    let plan = plan(
        &[(1, vec![0x60, 0x01]), (25, vec![0x60, 0x02])],
        &[0x60, 0x03],
    );
    let own = plan.proof_for(1).unwrap();
    let foreign = plan.proof_for(25).unwrap();

    let honest = chain(1)
        .deploy(&own.proof, &own.init_code, own.next_chain_id, &ZERO_HASH)
        .unwrap();
    let dishonest = chain(1)
        .deploy(&foreign.proof, &own.init_code, own.next_chain_id, &ZERO_HASH)
        .unwrap();

    assert_eq!(honest.node, plan.root);
    assert_ne!(dishonest.node, plan.root);
    assert_ne!(honest.address, dishonest.address);
    assert_eq!(
        dishonest.address,
        predict_address(&FACTORY, &dishonest.node, &ZERO_HASH)
    );
}

#[test]
fn fallback_wraps_past_the_highest_chain() {
    let plan = plan(
        &[(10, vec![0x60, 0x0a]), (25, vec![0x60, 0x19])],
        &[0x60, 0xff],
    );
    let wrap_leaf = plan.leaf(25).unwrap();
    assert_eq!(wrap_leaf.next_chain_id, 10);

    let call = plan.fallback_call(120, None).unwrap();
    assert_eq!(call.gap_leaf_prefix, wrap_leaf.prefix);
    let deployment = deploy_fallback(&mut chain(120), &call).unwrap();
    assert_eq!(deployment.node, plan.root);
    assert_eq!(deployment.address, plan.address(&FACTORY, None).address);

    // 15 lies between 10 and 25: the wrap leaf must not admit it.
    let err = deploy_fallback(&mut chain(15), &call).unwrap_err();
    assert!(matches!(
        err,
        VerifyError::NotInGap {
            target: 15,
            chain_id: 25,
            next_chain_id: 10,
            ..
        }
    ));

    // Through its proper gap leaf, 15 falls back fine.
    let call = plan.fallback_call(15, None).unwrap();
    assert_eq!(call.gap_leaf_prefix, plan.leaf(10).unwrap().prefix);
    assert!(deploy_fallback(&mut chain(15), &call).is_ok());
}

#[test]
fn single_leaf_plan_admits_every_other_chain() {
    let plan = plan(&[(77, vec![0x60, 0x77])], &[0x60, 0xff]);
    assert_eq!(
        plan.root,
        hex!("a9179637576b61890f4f756abfe9273ce89f67051e65d0e9f71264d31d0a6fd0")
    );
    let leaf = plan.leaf(77).unwrap();
    let predicted = plan.address(&FACTORY, None).address;

    for target in [0, 1, 76, 78, u64::MAX] {
        let call = plan.fallback_call(target, None).unwrap();
        assert_eq!(call.gap_leaf_prefix, leaf.prefix);
        let deployment = deploy_fallback(&mut chain(target), &call).unwrap();
        assert_eq!(deployment.address, predicted);
    }

    let call = FallbackCall {
        target_chain_id: 77,
        gap: String::new(),
        gap_leaf_prefix: leaf.prefix,
        gap_leaf_hash: leaf.init_code_hash,
        gap_proof: leaf.proof.clone(),
        fallback_proof: plan.fallback.proof.clone(),
        init_code: plan.fallback.init_code.clone(),
        salt: ZERO_HASH,
    };
    assert!(matches!(
        deploy_fallback(&mut chain(77), &call),
        Err(VerifyError::NotInGap { target: 77, .. })
    ));
    assert_eq!(deploy_primary(&plan, 77, &ZERO_HASH).address, predicted);
}

#[test]
fn salts_separate_addresses_not_code() {
    let plan = plan(&[(1, vec![0x60, 0x01]), (5, vec![0x60, 0x05])], &[0x60, 0xff]);
    let a = deploy_primary(&plan, 5, &[0x01; 32]);
    let b = deploy_primary(&plan, 5, &[0x02; 32]);
    assert_eq!(a.node, b.node);
    assert_ne!(a.address, b.address);
    assert_eq!(a.address, plan.address(&FACTORY, Some([0x01; 32])).address);

    let mut verifier = chain(5);
    let call = plan.primary_call(5, Some([0x01; 32])).unwrap();
    let first = verifier
        .deploy(&call.proof, &call.init_code, call.next_chain_id, &call.salt)
        .unwrap();
    let call = plan.primary_call(5, Some([0x02; 32])).unwrap();
    let second = verifier
        .deploy(&call.proof, &call.init_code, call.next_chain_id, &call.salt)
        .unwrap();
    let deployer = verifier.into_deployer();
    assert_eq!(deployer.code_at(&first.address), deployer.code_at(&second.address));
}

#[test]
fn redeploying_under_the_same_salt_fails() {
    let plan = plan(&[(1, vec![0x60, 0x01])], &[0x60, 0xff]);
    let call = plan.primary_call(1, None).unwrap();
    let mut verifier = chain(1);
    let first = verifier
        .deploy(&call.proof, &call.init_code, call.next_chain_id, &call.salt)
        .unwrap();
    let err = verifier
        .deploy(&call.proof, &call.init_code, call.next_chain_id, &call.salt)
        .unwrap_err();
    assert!(matches!(
        err,
        VerifyError::Deploy(DeployError::TargetOccupied(address)) if address == first.address
    ));
}

#[test]
fn reverting_fallback_code_surfaces_deploy_error() {
    let plan = plan(&[(1, vec![0x60, 0x01])], &[0xfd]);
    let call = plan.fallback_call(2, None).unwrap();
    assert!(matches!(
        deploy_fallback(&mut chain(2), &call),
        Err(VerifyError::Deploy(DeployError::ContractCreationFailed { .. }))
    ));
}
