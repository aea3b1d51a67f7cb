//! CLI tool for omniplan deployment plans.
//!
//! Builds plans from an input spec and answers per-chain queries against a
//! built plan. Results are printed to stdout as JSON; logs go to stderr.

mod commands;
mod logging;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use omniplan_core::chain_id::parse_chain_id;
use omniplan_core::encoding::{parse_address, parse_h256};
use omniplan_core::{Address, H256};

#[derive(Parser)]
#[command(name = "omniplan")]
#[command(about = "Build and query multi-chain deployment plans", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log filter, overridden by RUST_LOG
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a plan from an input spec
    Build {
        /// Path to the input spec (JSON)
        spec: PathBuf,

        /// Write the plan here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Print the leaf and proof of one chain
    Proof {
        /// Path to a built plan (JSON)
        plan: PathBuf,

        /// Chain id, decimal or 0x-hex
        #[arg(long, value_parser = parse_chain_id)]
        chain_id: u64,
    },

    /// Print the fallback deploy arguments for a chain without its own leaf
    Fallback {
        plan: PathBuf,

        #[arg(long, value_parser = parse_chain_id)]
        chain_id: u64,

        /// Salt override (32-byte hex)
        #[arg(long, value_parser = parse_salt)]
        salt: Option<H256>,
    },

    /// Predict the address the plan deploys to
    Address {
        plan: PathBuf,

        /// Factory address (20-byte hex)
        #[arg(long, value_parser = parse_factory)]
        factory: Address,

        /// Salt override (32-byte hex)
        #[arg(long, value_parser = parse_salt)]
        salt: Option<H256>,
    },

    /// Describe the gap of a leaf, optionally testing a target chain
    Gap {
        #[arg(long, value_parser = parse_chain_id)]
        chain_id: u64,

        #[arg(long, value_parser = parse_chain_id)]
        next_chain_id: u64,

        #[arg(long, value_parser = parse_chain_id)]
        target: Option<u64>,
    },

    /// Re-derive every hash and proof of a built plan
    Verify {
        plan: PathBuf,
    },
}

fn parse_salt(input: &str) -> omniplan_core::Result<H256> {
    parse_h256("salt", input)
}

fn parse_factory(input: &str) -> omniplan_core::Result<Address> {
    parse_address("factory", input)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level, cli.log_json)?;

    match cli.command {
        Commands::Build { spec, output } => commands::build(&spec, output.as_deref()),
        Commands::Proof { plan, chain_id } => commands::proof(&plan, chain_id),
        Commands::Fallback {
            plan,
            chain_id,
            salt,
        } => commands::fallback(&plan, chain_id, salt),
        Commands::Address {
            plan,
            factory,
            salt,
        } => commands::address(&plan, &factory, salt),
        Commands::Gap {
            chain_id,
            next_chain_id,
            target,
        } => commands::gap(chain_id, next_chain_id, target),
        Commands::Verify { plan } => commands::verify(&plan),
    }
}
