//! LiveScope crate root: re-exports and module wiring.
//!
//! A headless software oscilloscope pipeline:
//! - `sources`: data-source plugins producing per-channel sample batches
//! - `data`: channel ring buffers, display frames, edge triggering
//! - `processors`: processing plugins deriving extended channels
//! - `compositor`: persistence rendering onto a raster surface
//! - `layout`: per-channel display regions
//! - `controller`: the acquisition/render cycle tying it all together
//! - `persistence`: plugin configuration files and state snapshots

pub mod compositor;
pub mod config;
pub mod controller;
pub mod data;
pub mod error;
pub mod layout;
pub mod persistence;
pub mod plugin;
pub mod processors;
pub mod sources;

// Public re-exports for a compact external API
pub use compositor::{DisplayConfig, PersistenceCompositor, PersistenceMode, RenderStyle};
pub use config::{ScopeConfig, SourceSelection, MAX_EXTENDED_CHANNELS};
pub use controller::{CycleOutcome, FrameSink, NullSink, OscilloscopeController, PngSink};
pub use data::channel::{Channel, ChannelBuffer, ChannelId, Sample};
pub use data::frame::{DisplayFrame, FrameAnchor};
pub use data::triggers::{TriggerConfig, TriggerEdge, TriggerEngine, TriggerMode};
pub use error::ScopeError;
pub use layout::{LayoutManager, Region};
pub use persistence::{
    load_state_from_path, save_state_to_path, PluginConfigFile, ScopeStateSerde,
};
pub use plugin::{
    DataSourcePlugin, PluginBinding, PluginParams, PluginRegistry, ProcessingPlugin, SourceBatch,
};
pub use sources::{ManualSource, SinusSource};
