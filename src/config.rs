//! Runtime options, loaded from JSON and the environment.
//!
//! ```json
//! {
//!   "kernels": { "max_tier": "sse2" },
//!   "view": { "active_types": ["background", "sprite"], "sprite_range": [0, 99], "human_order": [3, 1] }
//! }
//! ```
//!
//! Every field is optional. `VNLAYERS_MAX_TIER` overrides `kernels.max_tier`.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::compositor::LayerType;
use crate::cpu::Tier;
use crate::foundation::error::{VnError, VnResult};

/// Environment variable naming a tier ceiling for the accelerated kernel table.
pub const MAX_TIER_ENV: &str = "VNLAYERS_MAX_TIER";

/// Top-level options.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VnOpts {
    /// Kernel table selection.
    pub kernels: KernelOpts,
    /// Initial compositor view.
    pub view: ViewOpts,
}

/// Kernel table selection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KernelOpts {
    /// Never bind kernels above this tier. `null` forces the scalar set. A tier from another
    /// architecture family is ignored.
    pub max_tier: Option<Tier>,
}

/// Initial visibility and ordering state of a compositor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewOpts {
    /// Layer types drawn.
    pub active_types: Vec<LayerType>,
    /// Inclusive range of sprite ordinals drawn.
    pub sprite_range: (u16, u16),
    /// Human ordinals drawn first, in this order.
    pub human_order: Vec<u16>,
}

impl Default for ViewOpts {
    fn default() -> Self {
        Self {
            active_types: LayerType::ALL.to_vec(),
            sprite_range: (0, u16::MAX),
            human_order: Vec::new(),
        }
    }
}

impl VnOpts {
    /// Parse options from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> VnResult<Self> {
        serde_json::from_reader(r).map_err(|e| VnError::config(format!("parse options JSON: {e}")))
    }

    /// Parse options from a JSON string.
    pub fn from_json_str(s: &str) -> VnResult<Self> {
        serde_json::from_str(s).map_err(|e| VnError::config(format!("parse options JSON: {e}")))
    }

    /// Parse options from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> VnResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            VnError::config(format!("open options JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> VnResult<()> {
        self.apply_max_tier_override(std::env::var(MAX_TIER_ENV).ok().as_deref())
    }

    pub(crate) fn apply_max_tier_override(&mut self, value: Option<&str>) -> VnResult<()> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => {
                let tier = v.parse::<Tier>().map_err(|_| {
                    VnError::config(format!("{MAX_TIER_ENV}: unknown cpu tier '{v}'"))
                })?;
                tracing::debug!(tier = tier.name(), "tier ceiling from environment");
                self.kernels.max_tier = Some(tier);
                Ok(())
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
