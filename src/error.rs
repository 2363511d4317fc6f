//! Error taxonomy for the acquisition and render pipeline.
//!
//! Fatal errors end the session (no usable data source). Everything else is
//! reported and skipped: the render path must keep producing frames.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScopeError {
    /// No data source plugin is registered at all.
    #[error("no data source available, quitting")]
    NoDataSource,

    /// The selected source (and any configured fallback) failed to initialize.
    #[error("data source '{name}' initialization failed: {reason}")]
    SourceInitFailed { name: String, reason: String },

    /// A named plugin could not be resolved in the registry.
    #[error("no plugin found of that name: '{0}'")]
    PluginNotFound(String),

    /// A plugin rejected its configuration or failed during a call.
    #[error("plugin '{name}' failed: {reason}")]
    PluginFailed { name: String, reason: String },

    /// Channel index outside the configured channel count.
    #[error("channel {0} out of range")]
    ChannelOutOfRange(usize),

    /// The requested display surface could not be allocated.
    #[error("invalid surface size {width}x{height}")]
    InvalidSurface { width: u32, height: u32 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("configuration parse error: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("state parse error: {0}")]
    StateParse(#[from] serde_json::Error),

    #[error("image encode error: {0}")]
    ImageEncode(#[from] image::ImageError),
}

impl ScopeError {
    /// Fatal errors terminate the acquisition loop; the rest are surfaced as
    /// notices and the cycle continues.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ScopeError::NoDataSource | ScopeError::SourceInitFailed { .. }
        )
    }
}
