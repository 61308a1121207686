//! Named interest rate model configurations.
//!
//! A market file may give a side's `irm` as a preset name instead of an
//! inline object; [`IrmPresets::expand`] substitutes the preset before the
//! file is deserialized.

use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::compiler::irm::validate_legacy_at;
use crate::errors::DeployerError;
use crate::types::IrmSelection;

#[derive(Debug, Clone, Default)]
pub struct IrmPresets {
    presets: BTreeMap<String, Value>,
}

impl IrmPresets {
    /// Load `{ "name": { "kind": ..., ... } }`. Every entry must parse as an
    /// [`IrmSelection`], and legacy entries must be within deploy bounds.
    pub fn from_json(contents: &str) -> Result<Self, DeployerError> {
        let presets: BTreeMap<String, Value> = serde_json::from_str(contents)?;
        for (name, value) in &presets {
            let selection = serde_json::from_value::<IrmSelection>(value.clone()).map_err(|e| {
                DeployerError::Catalog {
                    reason: format!("IRM preset '{name}': {e}"),
                }
            })?;
            if let IrmSelection::Legacy(cfg) = &selection {
                validate_legacy_at(cfg, &format!("irm_presets.{name}"))?;
            }
        }
        Ok(Self { presets })
    }

    /// Missing file means no presets.
    pub fn load(path: &Path) -> Result<Self, DeployerError> {
        if !path.exists() {
            debug!(path = %path.display(), "no IRM presets file");
            return Ok(Self::default());
        }
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn get(&self, name: &str) -> Option<IrmSelection> {
        self.presets
            .get(name)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    /// Replace string-valued `silo0.irm` / `silo1.irm` with the named preset.
    pub fn expand(&self, market: &mut Value) -> Result<(), DeployerError> {
        for side in ["silo0", "silo1"] {
            let Some(irm) = market.get_mut(side).and_then(|s| s.get_mut("irm")) else {
                continue;
            };
            let Some(name) = irm.as_str().map(str::to_string) else {
                continue;
            };
            let preset = self.presets.get(&name).ok_or_else(|| {
                DeployerError::validation(format!("{side}.irm"), format!("unknown IRM preset '{name}'"))
            })?;
            *irm = preset.clone();
        }
        Ok(())
    }
}
