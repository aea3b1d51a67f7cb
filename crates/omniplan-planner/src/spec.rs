//! Plan input.
//!
//! This is what a plan author writes: an unordered set of chain entries, the
//! fallback init code, an optional salt and free-form metadata.

use omniplan_core::chain_id;
use omniplan_core::encoding::{hex_bytes, hex_fixed_opt};
use omniplan_core::{Result, H256};
use serde::{Deserialize, Serialize};

/// One chain's committed payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainEntry {
    #[serde(with = "chain_id::as_decimal")]
    pub chain_id: u64,
    /// Missing init code deserializes as empty and is rejected at build time.
    #[serde(default, with = "hex_bytes")]
    pub init_code: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ChainEntry {
    pub fn new(chain_id: u64, init_code: impl Into<Vec<u8>>) -> Self {
        Self {
            chain_id,
            init_code: init_code.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Free-form plan metadata, carried through to the plan output untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// The complete input to plan assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSpec {
    /// Defaults to the zero word only when absent.
    #[serde(default, with = "hex_fixed_opt", skip_serializing_if = "Option::is_none")]
    pub salt: Option<H256>,
    pub chains: Vec<ChainEntry>,
    #[serde(default, with = "hex_bytes")]
    pub fallback_init_code: Vec<u8>,
    #[serde(flatten)]
    pub metadata: PlanMetadata,
}

impl PlanSpec {
    pub fn new(chains: Vec<ChainEntry>, fallback_init_code: impl Into<Vec<u8>>) -> Self {
        Self {
            salt: None,
            chains,
            fallback_init_code: fallback_init_code.into(),
            metadata: PlanMetadata::default(),
        }
    }

    pub fn with_salt(mut self, salt: H256) -> Self {
        self.salt = Some(salt);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.metadata.name = Some(name.into());
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
