//! Command implementations for the omniplan CLI.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use omniplan_core::chain_id;
use omniplan_core::encoding::{hex_fixed, to_hex};
use omniplan_core::gap::{describe_gap, in_gap, GapKind};
use omniplan_core::{Address, H256};
use omniplan_planner::{Plan, PlanSpec};
use serde::Serialize;
use tracing::info;

/// Parse a plan and re-derive it; lookups on the plan assume it is canonical.
fn load_plan(json: &str) -> Result<Plan> {
    let plan = Plan::from_json(json).context("Failed to parse plan")?;
    plan.verify().context("Plan does not verify")?;
    Ok(plan)
}

fn read_plan(path: &Path) -> Result<Plan> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read plan {}", path.display()))?;
    load_plan(&json).with_context(|| format!("Invalid plan {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Build command: assemble a plan from an input spec.
pub fn build(spec_path: &Path, output: Option<&Path>) -> Result<()> {
    let json = fs::read_to_string(spec_path)
        .with_context(|| format!("Failed to read spec {}", spec_path.display()))?;
    let spec = PlanSpec::from_json(&json)
        .with_context(|| format!("Failed to parse spec {}", spec_path.display()))?;
    let plan = Plan::build(&spec).context("Failed to build plan")?;
    info!(
        chains = plan.leaves.len(),
        root = %to_hex(plan.root),
        "built plan"
    );

    match output {
        Some(path) => {
            fs::write(path, plan.to_json_pretty()?)
                .with_context(|| format!("Failed to write plan {}", path.display()))?;
            eprintln!("Plan root {} written to {}", to_hex(plan.root), path.display());
            Ok(())
        }
        None => print_json(&plan),
    }
}

pub fn proof(plan_path: &Path, chain_id: u64) -> Result<()> {
    let plan = read_plan(plan_path)?;
    print_json(&plan.proof_for(chain_id)?)
}

pub fn fallback(plan_path: &Path, chain_id: u64, salt: Option<H256>) -> Result<()> {
    let plan = read_plan(plan_path)?;
    let call = plan
        .fallback_call(chain_id, salt)
        .with_context(|| format!("No fallback route for chain {chain_id}"))?;
    print_json(&call)
}

pub fn address(plan_path: &Path, factory: &Address, salt: Option<H256>) -> Result<()> {
    let plan = read_plan(plan_path)?;
    print_json(&plan.address(factory, salt))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GapReport {
    #[serde(with = "chain_id::as_decimal")]
    chain_id: u64,
    #[serde(with = "chain_id::as_decimal")]
    next_chain_id: u64,
    kind: &'static str,
    gap: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    in_gap: Option<bool>,
}

/// Gap command: describe a leaf's gap, and test `target` against it if given.
pub fn gap(chain_id: u64, next_chain_id: u64, target: Option<u64>) -> Result<()> {
    let kind = match GapKind::of(chain_id, next_chain_id) {
        GapKind::SingleEntry => "single-entry",
        GapKind::Interval => "interval",
        GapKind::Wrap => "wrap",
    };
    print_json(&GapReport {
        chain_id,
        next_chain_id,
        kind,
        gap: describe_gap(chain_id, next_chain_id),
        target: target.map(|t| t.to_string()),
        in_gap: target.map(|t| in_gap(chain_id, next_chain_id, t)),
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyReport {
    #[serde(with = "hex_fixed")]
    root: H256,
    chains: usize,
    valid: bool,
}

/// Verify command: fails on the first discrepancy in the plan.
pub fn verify(plan_path: &Path) -> Result<()> {
    let plan = read_plan(plan_path)?;
    print_json(&VerifyReport {
        root: plan.root,
        chains: plan.leaves.len(),
        valid: true,
    })
}
