//! Plugin contract and registry.
//!
//! Data-source plugins feed per-channel sample batches; processing plugins
//! derive extended channels from snapshots of existing ones. Plugins are
//! resolved by name through a [`PluginRegistry`] at bind time, never per call.

use std::collections::BTreeMap;

use downcast_rs::{impl_downcast, Downcast};
use serde::{Deserialize, Serialize};

use crate::data::channel::{ChannelId, Sample};
use crate::error::ScopeError;

/// Free-form plugin parameters as parsed from the configuration file.
pub type PluginParams = BTreeMap<String, String>;

/// One poll result: a batch of samples for each source channel. All channels
/// of a batch carry the same number of samples.
pub struct SourceBatch {
    pub channels: Vec<Vec<Sample>>,
}

impl SourceBatch {
    pub fn samples_per_channel(&self) -> usize {
        self.channels.first().map(|c| c.len()).unwrap_or(0)
    }
}

/// A data source: something that can be initialized, polled for batches, and
/// shut down. `poll` returning `Ok(None)` signals a cycle without new data.
pub trait DataSourcePlugin: Downcast {
    fn initialize(&mut self, params: &PluginParams) -> Result<(), ScopeError>;
    fn poll(&mut self) -> Result<Option<SourceBatch>, ScopeError>;
    fn shutdown(&mut self) {}

    fn channel_count(&self) -> usize;
    fn sampling_rate(&self) -> u32;
}
impl_downcast!(DataSourcePlugin);

/// A processing plugin: transforms snapshots of input channels into derived
/// sample runs for its output channels. Stateless per invocation from the
/// pipeline's perspective; internal state is the plugin's own business.
pub trait ProcessingPlugin: Downcast {
    fn initialize(&mut self, _params: &PluginParams) -> Result<(), ScopeError> {
        Ok(())
    }
    /// `outputs` arrives sized to `output_count()` empty vectors; the plugin
    /// fills each with one sample per input sample.
    fn process(&mut self, inputs: &[&[Sample]], outputs: &mut [Vec<Sample>]);
    fn shutdown(&mut self) {}

    fn input_count(&self) -> usize;
    fn output_count(&self) -> usize;
}
impl_downcast!(ProcessingPlugin);

/// Maps channel slots to a named plugin instance. Created by configuration
/// load, read by the controller each acquisition cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginBinding {
    /// Registry name of the plugin.
    pub plugin: String,
    /// Channels read as plugin inputs.
    pub inputs: Vec<ChannelId>,
    /// Extended channels written as plugin outputs.
    pub outputs: Vec<ChannelId>,
    /// Instance parameters, passed to `initialize`.
    #[serde(default)]
    pub params: PluginParams,
}

type SourceFactory = Box<dyn Fn() -> Box<dyn DataSourcePlugin> + Send + Sync>;
type ProcessorFactory = Box<dyn Fn() -> Box<dyn ProcessingPlugin> + Send + Sync>;

/// Registry of available plugins, keyed by name. Resolution happens at bind
/// time; an unresolvable name is a recoverable condition for the caller.
#[derive(Default)]
pub struct PluginRegistry {
    sources: BTreeMap<String, SourceFactory>,
    processors: BTreeMap<String, ProcessorFactory>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in plugins.
    pub fn with_builtins() -> Self {
        let mut reg = Self::new();
        crate::sources::register_builtins(&mut reg);
        crate::processors::register_builtins(&mut reg);
        reg
    }

    pub fn register_source<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Box<dyn DataSourcePlugin> + Send + Sync + 'static,
    {
        self.sources.insert(name.to_string(), Box::new(factory));
    }

    pub fn register_processor<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Box<dyn ProcessingPlugin> + Send + Sync + 'static,
    {
        self.processors.insert(name.to_string(), Box::new(factory));
    }

    pub fn has_sources(&self) -> bool {
        !self.sources.is_empty()
    }

    pub fn source_names(&self) -> Vec<String> {
        self.sources.keys().cloned().collect()
    }

    pub fn processor_names(&self) -> Vec<String> {
        self.processors.keys().cloned().collect()
    }

    pub fn create_source(&self, name: &str) -> Result<Box<dyn DataSourcePlugin>, ScopeError> {
        self.sources
            .get(name)
            .map(|f| f())
            .ok_or_else(|| ScopeError::PluginNotFound(name.to_string()))
    }

    pub fn create_processor(&self, name: &str) -> Result<Box<dyn ProcessingPlugin>, ScopeError> {
        self.processors
            .get(name)
            .map(|f| f())
            .ok_or_else(|| ScopeError::PluginNotFound(name.to_string()))
    }
}
