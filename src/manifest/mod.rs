use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// JSON payload describing one region's tile arrangement, exchanged between
/// the editing client and the server for both preview and save requests.
///
/// Every field the client may omit decodes to its default; the container
/// layer treats a missing selector as a no-op rather than an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// Target region key.
    #[serde(default)]
    pub region: String,
    /// Layout selector; save path only.
    #[serde(default)]
    pub selector: String,
    /// Container kind, echoed back in the `X-TILES` response header.
    #[serde(rename = "type", default)]
    pub container: String,
    /// Alternative selector form used by the legacy section container.
    #[serde(rename = "activeContext", default)]
    pub active_context: String,
    /// Client-side position lookup; accepted and ignored server-side.
    #[serde(rename = "blockIndex", default)]
    pub block_index: BTreeMap<String, i32>,
    #[serde(default)]
    pub blocks: Vec<ManifestBlock>,
}

/// One tile entry within a manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManifestBlock {
    pub module: String,
    pub delta: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub weight: i32,
    #[serde(default)]
    pub width: u16,
    #[serde(default)]
    pub offset: u16,
    #[serde(default)]
    pub breakpoints: BTreeMap<String, u16>,
}

impl ManifestBlock {
    pub fn bid(&self) -> String {
        format!("{}-{}", self.module, self.delta)
    }
}

impl Manifest {
    pub fn decode(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// The selector this manifest addresses: `selector`, falling back to the
    /// legacy `activeContext` form. `None` when the client sent neither.
    pub fn selector(&self) -> Option<&str> {
        if !self.selector.is_empty() {
            Some(&self.selector)
        } else if !self.active_context.is_empty() {
            Some(&self.active_context)
        } else {
            None
        }
    }
}
