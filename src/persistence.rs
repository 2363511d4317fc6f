//! Persistence: the YAML plugin configuration file and the JSON scope-state
//! snapshot.
//!
//! The plugin configuration describes extended channels and processing
//! bindings and is meant to be hand-edited; the state snapshot mirrors the
//! runtime controls (trigger, display, zoom, freeze, manual layout) so a
//! session can be restored.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::compositor::DisplayConfig;
use crate::config::MAX_EXTENDED_CHANNELS;
use crate::controller::OscilloscopeController;
use crate::data::channel::ChannelId;
use crate::data::triggers::TriggerConfig;
use crate::error::ScopeError;
use crate::layout::Region;
use crate::plugin::PluginBinding;

// ─────────────────────────────────────────────────────────────────────────────
// Plugin configuration file (YAML)
// ─────────────────────────────────────────────────────────────────────────────

/// On-disk plugin configuration: how many extended channels to allocate and
/// which processing plugins feed them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginConfigFile {
    #[serde(default)]
    pub extended_channels: usize,
    #[serde(default)]
    pub bindings: Vec<PluginBinding>,
}

impl PluginConfigFile {
    /// Parse a configuration file. The extended-channel count is clamped to
    /// the supported maximum.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScopeError> {
        let text = fs::read_to_string(path)?;
        let mut cfg: Self = serde_yaml::from_str(&text)?;
        cfg.extended_channels = cfg.extended_channels.min(MAX_EXTENDED_CHANNELS);
        Ok(cfg)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ScopeError> {
        let text = serde_yaml::to_string(self)?;
        fs::write(path, text)?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scope state snapshot (JSON)
// ─────────────────────────────────────────────────────────────────────────────

/// Serializable mirror of the controller's user-visible state. Buffers and
/// the accumulation surface are deliberately not captured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeStateSerde {
    pub trigger: TriggerConfig,
    pub trigger_timeout_cycles: u32,
    pub display: DisplayConfig,
    pub zoom: f64,
    pub frozen: bool,
    /// Manually pinned layout regions, keyed by channel id.
    #[serde(default)]
    pub manual_regions: BTreeMap<ChannelId, Region>,
}

impl From<&OscilloscopeController> for ScopeStateSerde {
    fn from(scope: &OscilloscopeController) -> Self {
        Self {
            trigger: scope.trigger().config,
            trigger_timeout_cycles: scope.trigger().timeout_cycles,
            display: *scope.display_config(),
            zoom: scope.zoom(),
            frozen: scope.is_frozen(),
            manual_regions: scope
                .layout()
                .manual_regions()
                .iter()
                .map(|(&id, &region)| (id, region))
                .collect(),
        }
    }
}

impl ScopeStateSerde {
    /// Apply the stored state to a live controller. Settings take effect on
    /// the next acquisition cycle.
    pub fn apply_to(&self, scope: &mut OscilloscopeController) {
        scope.trigger_mut().config = self.trigger;
        scope.trigger_mut().timeout_cycles = self.trigger_timeout_cycles.max(1);
        *scope.display_config_mut() = self.display;
        scope.set_zoom(self.zoom);
        scope.set_frozen(self.frozen);
        scope.layout_mut().reset_to_auto();
        for (&id, &region) in &self.manual_regions {
            scope.layout_mut().set_region(id, region);
        }
    }
}

/// Save the controller's user-visible state as pretty-printed JSON.
pub fn save_state_to_path(
    scope: &OscilloscopeController,
    path: impl AsRef<Path>,
) -> Result<(), ScopeError> {
    let state = ScopeStateSerde::from(scope);
    let json = serde_json::to_string_pretty(&state)?;
    fs::write(path, json)?;
    Ok(())
}

/// Load a state snapshot and apply it to a live controller.
pub fn load_state_from_path(
    scope: &mut OscilloscopeController,
    path: impl AsRef<Path>,
) -> Result<(), ScopeError> {
    let json = fs::read_to_string(path)?;
    let state: ScopeStateSerde = serde_json::from_str(&json)?;
    state.apply_to(scope);
    Ok(())
}
