//! Built-in data sources.
//!
//! `SinusSource` is the bundled signal generator: eight channels of sinus
//! waves at descending frequencies, useful as a fallback when no hardware
//! source is configured. `ManualSource` replays queued batches
//! deterministically, for tests and offline playback.

use std::collections::VecDeque;
use std::f64::consts::PI;

use crate::data::channel::Sample;
use crate::error::ScopeError;
use crate::plugin::{DataSourcePlugin, PluginParams, PluginRegistry, SourceBatch};

pub const SINUS_SOURCE_NAME: &str = "sinus";
pub const MANUAL_SOURCE_NAME: &str = "manual";

const DEFAULT_CHANNELS: usize = 8;
const DEFAULT_BATCH: usize = 512;
const DEFAULT_RATE: u32 = 10_000;

/// Multi-channel sinus generator. Channel `c` runs at period `100 * (c + 1)`
/// samples with unit amplitude.
pub struct SinusSource {
    channels: usize,
    batch: usize,
    rate: u32,
    t: u64,
}

impl Default for SinusSource {
    fn default() -> Self {
        Self {
            channels: DEFAULT_CHANNELS,
            batch: DEFAULT_BATCH,
            rate: DEFAULT_RATE,
            t: 0,
        }
    }
}

impl SinusSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DataSourcePlugin for SinusSource {
    fn initialize(&mut self, params: &PluginParams) -> Result<(), ScopeError> {
        if let Some(v) = params.get("channels") {
            self.channels = parse_param("channels", v)?;
        }
        if let Some(v) = params.get("batch") {
            self.batch = parse_param("batch", v)?;
        }
        if let Some(v) = params.get("rate") {
            self.rate = parse_param("rate", v)?;
        }
        if self.channels == 0 || self.batch == 0 {
            return Err(ScopeError::PluginFailed {
                name: SINUS_SOURCE_NAME.to_string(),
                reason: "channels and batch must be nonzero".to_string(),
            });
        }
        Ok(())
    }

    fn poll(&mut self) -> Result<Option<SourceBatch>, ScopeError> {
        let mut channels: Vec<Vec<Sample>> = vec![Vec::with_capacity(self.batch); self.channels];
        for _ in 0..self.batch {
            for (c, out) in channels.iter_mut().enumerate() {
                let period = 100.0 * (c + 1) as f64;
                out.push((self.t as f64 * 2.0 * PI / period).sin());
            }
            self.t += 1;
        }
        Ok(Some(SourceBatch { channels }))
    }

    fn channel_count(&self) -> usize {
        self.channels
    }

    fn sampling_rate(&self) -> u32 {
        self.rate
    }
}

fn parse_param<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ScopeError> {
    value.parse().map_err(|_| ScopeError::PluginFailed {
        name: SINUS_SOURCE_NAME.to_string(),
        reason: format!("invalid value for '{key}': {value}"),
    })
}

/// In-memory source replaying queued batches. `poll` yields `None` once the
/// queue is drained.
pub struct ManualSource {
    queue: VecDeque<SourceBatch>,
    channels: usize,
    rate: u32,
}

impl ManualSource {
    pub fn new(batches: impl IntoIterator<Item = SourceBatch>) -> Self {
        let queue: VecDeque<SourceBatch> = batches.into_iter().collect();
        let channels = queue.front().map(|b| b.channels.len()).unwrap_or(0);
        Self {
            queue,
            channels,
            rate: DEFAULT_RATE,
        }
    }

    /// Convenience constructor from raw per-channel sample runs, one batch.
    pub fn from_samples(channels: Vec<Vec<Sample>>) -> Self {
        Self::new([SourceBatch { channels }])
    }

    pub fn push_batch(&mut self, batch: SourceBatch) {
        if self.channels == 0 {
            self.channels = batch.channels.len();
        }
        self.queue.push_back(batch);
    }
}

impl DataSourcePlugin for ManualSource {
    fn initialize(&mut self, _params: &PluginParams) -> Result<(), ScopeError> {
        Ok(())
    }

    fn poll(&mut self) -> Result<Option<SourceBatch>, ScopeError> {
        Ok(self.queue.pop_front())
    }

    fn channel_count(&self) -> usize {
        self.channels
    }

    fn sampling_rate(&self) -> u32 {
        self.rate
    }
}

pub(crate) fn register_builtins(registry: &mut PluginRegistry) {
    registry.register_source(SINUS_SOURCE_NAME, || Box::new(SinusSource::new()));
}
