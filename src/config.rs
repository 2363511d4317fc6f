//! Configuration types shared across the pipeline.

use serde::{Deserialize, Serialize};

use crate::compositor::DisplayConfig;
use crate::data::triggers::TriggerConfig;
use crate::plugin::PluginParams;

/// Upper bound on user-settable extended (plugin-derived) channels.
pub const MAX_EXTENDED_CHANNELS: usize = 8;

// ─────────────────────────────────────────────────────────────────────────────
// Source selection
// ─────────────────────────────────────────────────────────────────────────────

/// Which data source plugin to open. If the primary fails to initialize the
/// fallback is tried; with no fallback the failure is fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSelection {
    pub primary: String,
    pub fallback: Option<String>,
    #[serde(default)]
    pub params: PluginParams,
}

impl Default for SourceSelection {
    fn default() -> Self {
        Self {
            primary: crate::sources::SINUS_SOURCE_NAME.to_string(),
            fallback: None,
            params: PluginParams::new(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ScopeConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level configuration for the oscilloscope pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeConfig {
    // ── Acquisition ─────────────────────────────────────────────────────────
    /// Data source to open (with optional fallback).
    pub source: SourceSelection,
    /// Number of extended channels available to processing bindings,
    /// clamped to [`MAX_EXTENDED_CHANNELS`].
    pub extended_channels: usize,
    /// Ring-buffer capacity per channel, in samples.
    pub channel_capacity: usize,

    // ── Framing / trigger ───────────────────────────────────────────────────
    /// Samples per display frame at zoom 1.0.
    pub frame_window: usize,
    /// Trigger settings applied at startup.
    pub trigger: TriggerConfig,
    /// Auto mode: cycles without a qualifying edge before a frame is forced.
    pub trigger_timeout_cycles: u32,

    // ── Rendering ───────────────────────────────────────────────────────────
    /// Display surface size in pixels.
    pub surface_width: u32,
    pub surface_height: u32,
    /// Style, persistence, fade, antialiasing, blending.
    pub display: DisplayConfig,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            source: SourceSelection::default(),
            extended_channels: 2,
            channel_capacity: 16_384,
            frame_window: 2_048,
            trigger: TriggerConfig::default(),
            trigger_timeout_cycles: 4,
            surface_width: 800,
            surface_height: 600,
            display: DisplayConfig::default(),
        }
    }
}
