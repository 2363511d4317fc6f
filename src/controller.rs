//! Pipeline orchestration: one acquisition–render cycle per call, plus the
//! freeze/zoom/reset controls and the output frame sink.
//!
//! Cycle order follows the acquisition loop contract: poll the source, push
//! into channel buffers, run processing bindings, ask the trigger engine for
//! a frame, composite, lay out, present. Buffer writes complete before any
//! read of the cycle begins; no background threads are involved.

use std::path::PathBuf;

use tiny_skia::Pixmap;

use crate::compositor::{DisplayConfig, PersistenceCompositor};
use crate::config::{ScopeConfig, MAX_EXTENDED_CHANNELS};
use crate::data::channel::{Channel, Sample};
use crate::data::frame::DisplayFrame;
use crate::data::triggers::TriggerEngine;
use crate::error::ScopeError;
use crate::layout::LayoutManager;
use crate::plugin::{DataSourcePlugin, PluginBinding, PluginRegistry, ProcessingPlugin};

// ─────────────────────────────────────────────────────────────────────────────
// Frame sinks
// ─────────────────────────────────────────────────────────────────────────────

/// Receives the composited surface at the end of each rendered cycle.
pub trait FrameSink {
    fn present(&mut self, surface: &Pixmap) -> Result<(), ScopeError>;
}

/// Discards frames. Useful for headless runs and tests that only inspect the
/// controller's state.
#[derive(Default)]
pub struct NullSink {
    pub presented: u64,
}

impl FrameSink for NullSink {
    fn present(&mut self, _surface: &Pixmap) -> Result<(), ScopeError> {
        self.presented += 1;
        Ok(())
    }
}

/// Writes each presented surface as a PNG file into a directory, with a
/// timestamped, sequence-numbered filename.
pub struct PngSink {
    dir: PathBuf,
    stamp: String,
    index: u64,
}

impl PngSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            stamp: chrono::Local::now().format("%Y-%m-%d_%H%M%S").to_string(),
            index: 0,
        }
    }

    pub fn last_path(&self) -> Option<PathBuf> {
        if self.index == 0 {
            return None;
        }
        Some(self.path_for(self.index - 1))
    }

    fn path_for(&self, index: u64) -> PathBuf {
        self.dir
            .join(format!("livescope_{}_{:06}.png", self.stamp, index))
    }
}

impl FrameSink for PngSink {
    fn present(&mut self, surface: &Pixmap) -> Result<(), ScopeError> {
        let mut rgba = Vec::with_capacity(surface.data().len());
        for px in surface.pixels() {
            let c = px.demultiply();
            rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        let img = image::RgbaImage::from_raw(surface.width(), surface.height(), rgba).ok_or(
            ScopeError::InvalidSurface {
                width: surface.width(),
                height: surface.height(),
            },
        )?;
        let path = self.path_for(self.index);
        img.save(&path)?;
        self.index += 1;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Controller
// ─────────────────────────────────────────────────────────────────────────────

/// What one call to [`OscilloscopeController::run_cycle`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A new frame was composited and presented.
    Rendered,
    /// Armed and waiting for a qualifying edge; nothing new presented.
    Waiting,
    /// The source had no new data; the previous output was presented again.
    NoData,
    /// Display is frozen; polling suspended, previous output presented.
    Frozen,
}

struct ActiveProcessor {
    binding: PluginBinding,
    instance: Box<dyn ProcessingPlugin>,
}

/// Owns the whole pipeline: source, channel buffers, processing bindings,
/// trigger engine, compositor, and layout.
pub struct OscilloscopeController {
    source: Box<dyn DataSourcePlugin>,
    source_name: String,
    channels: Vec<Channel>,
    raw_count: usize,
    processors: Vec<ActiveProcessor>,
    trigger: TriggerEngine,
    compositor: PersistenceCompositor,
    layout: LayoutManager,
    frame_window: usize,
    zoom: f64,
    frozen: bool,
    last_frame: Option<DisplayFrame>,
}

impl OscilloscopeController {
    /// Open the configured data source and build the pipeline around it.
    ///
    /// Fatal failures: an empty source registry, or the primary source (and
    /// the fallback, when configured) failing to initialize.
    pub fn new(registry: &PluginRegistry, config: ScopeConfig) -> Result<Self, ScopeError> {
        if !registry.has_sources() {
            return Err(ScopeError::NoDataSource);
        }

        let (source, source_name) = Self::open_source(registry, &config)?;
        log::info!(
            "data source '{}' ready: {} channels at {} Hz",
            source_name,
            source.channel_count(),
            source.sampling_rate()
        );

        let raw_count = source.channel_count();
        let extended = config.extended_channels.min(MAX_EXTENDED_CHANNELS);
        let capacity = config.channel_capacity.max(config.frame_window);
        let mut channels: Vec<Channel> = (0..raw_count)
            .map(|id| Channel::raw(id, capacity))
            .collect();
        channels.extend((raw_count..raw_count + extended).map(|id| Channel::extended(id, capacity)));

        Ok(Self {
            source,
            source_name,
            channels,
            raw_count,
            processors: Vec::new(),
            trigger: TriggerEngine::new(config.trigger, config.trigger_timeout_cycles),
            compositor: PersistenceCompositor::new(
                config.surface_width,
                config.surface_height,
                config.display,
            )?,
            layout: LayoutManager::new(config.surface_width, config.surface_height),
            frame_window: config.frame_window.max(2).min(capacity),
            zoom: 1.0,
            frozen: false,
            last_frame: None,
        })
    }

    fn open_source(
        registry: &PluginRegistry,
        config: &ScopeConfig,
    ) -> Result<(Box<dyn DataSourcePlugin>, String), ScopeError> {
        let primary = &config.source.primary;
        match Self::try_source(registry, primary, config) {
            Ok(source) => return Ok((source, primary.clone())),
            Err(err) => {
                log::warn!("data source '{primary}' failed to initialize: {err}");
                if let Some(fallback) = &config.source.fallback {
                    match Self::try_source(registry, fallback, config) {
                        Ok(source) => return Ok((source, fallback.clone())),
                        Err(err) => {
                            log::warn!("fallback source '{fallback}' failed to initialize: {err}")
                        }
                    }
                }
            }
        }
        Err(ScopeError::SourceInitFailed {
            name: primary.clone(),
            reason: "no usable source (fallback included)".to_string(),
        })
    }

    fn try_source(
        registry: &PluginRegistry,
        name: &str,
        config: &ScopeConfig,
    ) -> Result<Box<dyn DataSourcePlugin>, ScopeError> {
        let mut source = registry.create_source(name)?;
        source.initialize(&config.source.params)?;
        Ok(source)
    }

    /// Resolve and install processing bindings, replacing any current ones.
    /// Unresolvable names are skipped with a warning and returned; they never
    /// abort the pipeline.
    pub fn bind_processors(
        &mut self,
        registry: &PluginRegistry,
        bindings: &[PluginBinding],
    ) -> Vec<String> {
        for mut old in self.processors.drain(..) {
            old.instance.shutdown();
        }

        let mut skipped = Vec::new();
        for binding in bindings {
            let mut instance = match registry.create_processor(&binding.plugin) {
                Ok(p) => p,
                Err(_) => {
                    log::warn!("no plugin found of that name, ignoring: '{}'", binding.plugin);
                    skipped.push(binding.plugin.clone());
                    continue;
                }
            };
            if let Err(err) = self.validate_binding(binding, instance.as_ref()) {
                log::warn!("binding for '{}' rejected: {err}", binding.plugin);
                skipped.push(binding.plugin.clone());
                continue;
            }
            if let Err(err) = instance.initialize(&binding.params) {
                log::warn!("plugin '{}' failed to initialize: {err}", binding.plugin);
                skipped.push(binding.plugin.clone());
                continue;
            }
            self.processors.push(ActiveProcessor {
                binding: binding.clone(),
                instance,
            });
        }
        skipped
    }

    fn validate_binding(
        &self,
        binding: &PluginBinding,
        instance: &dyn ProcessingPlugin,
    ) -> Result<(), ScopeError> {
        if binding.inputs.len() != instance.input_count()
            || binding.outputs.len() != instance.output_count()
        {
            return Err(ScopeError::PluginFailed {
                name: binding.plugin.clone(),
                reason: format!(
                    "expects {} inputs / {} outputs",
                    instance.input_count(),
                    instance.output_count()
                ),
            });
        }
        for &id in &binding.inputs {
            if id >= self.channels.len() {
                return Err(ScopeError::ChannelOutOfRange(id));
            }
        }
        for &id in &binding.outputs {
            // Outputs may only target extended channels.
            if id < self.raw_count || id >= self.channels.len() {
                return Err(ScopeError::ChannelOutOfRange(id));
            }
        }
        Ok(())
    }

    /// Run one acquisition–render cycle against the given sink.
    pub fn run_cycle(&mut self, sink: &mut dyn FrameSink) -> Result<CycleOutcome, ScopeError> {
        if self.frozen {
            sink.present(self.compositor.surface())?;
            return Ok(CycleOutcome::Frozen);
        }

        let batch = match self.source.poll() {
            Ok(b) => b,
            Err(err) => {
                // Poll failures never crash the render path.
                log::warn!("source '{}' poll failed: {err}", self.source_name);
                None
            }
        };
        let Some(batch) = batch else {
            sink.present(self.compositor.surface())?;
            return Ok(CycleOutcome::NoData);
        };

        let batch_len = batch.samples_per_channel();
        if batch.channels.len() != self.raw_count {
            log::warn!(
                "source '{}' sent {} channels, expected {}",
                self.source_name,
                batch.channels.len(),
                self.raw_count
            );
        }
        // Extended channels belong to the processing bindings; an over-wide
        // batch must not spill into them.
        for (channel, samples) in self
            .channels
            .iter_mut()
            .take(self.raw_count)
            .zip(&batch.channels)
        {
            channel.buffer.push(samples);
        }
        self.run_processors(batch_len);

        let window = self.effective_window();
        match self.trigger.select_frame(&self.channels, window) {
            Some(frame) => {
                self.layout.update_active(&frame.active_channels());
                self.compositor.composite(&frame, &self.layout);
                self.last_frame = Some(frame);
                sink.present(self.compositor.surface())?;
                Ok(CycleOutcome::Rendered)
            }
            None => Ok(CycleOutcome::Waiting),
        }
    }

    /// Feed every active binding with copies of its input snapshots and push
    /// the derived samples into the bound extended channels. Bindings run in
    /// declaration order, each snapshotting its inputs just before it runs:
    /// a binding reading a channel an earlier binding wrote sees that fresh
    /// output, so plugins can be chained.
    fn run_processors(&mut self, batch_len: usize) {
        if batch_len == 0 {
            return;
        }
        for proc in &mut self.processors {
            let inputs: Vec<Vec<Sample>> = proc
                .binding
                .inputs
                .iter()
                .map(|&id| self.channels[id].buffer.snapshot(batch_len))
                .collect();
            let input_refs: Vec<&[Sample]> = inputs.iter().map(|v| v.as_slice()).collect();
            let mut outputs: Vec<Vec<Sample>> = vec![Vec::new(); proc.binding.outputs.len()];
            proc.instance.process(&input_refs, &mut outputs);
            for (&slot, derived) in proc.binding.outputs.iter().zip(&outputs) {
                self.channels[slot].buffer.push(derived);
            }
        }
    }

    fn effective_window(&self) -> usize {
        let capacity = self
            .channels
            .first()
            .map(|c| c.buffer.capacity())
            .unwrap_or(self.frame_window);
        ((self.frame_window as f64 / self.zoom).round() as usize).clamp(2, capacity)
    }

    // ── Controls ─────────────────────────────────────────────────────────────

    /// Freeze suspends polling only; the render path keeps presenting the
    /// last composited output.
    pub fn set_frozen(&mut self, frozen: bool) {
        self.frozen = frozen;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Zoom scales the sample window mapped onto the display; acquisition is
    /// unaffected. Values above 1.0 show fewer samples.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(0.01, 1_000.0);
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Restore trigger defaults; effective on the next cycle.
    pub fn reset_trigger(&mut self) {
        self.trigger.reset();
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn raw_channel_count(&self) -> usize {
        self.raw_count
    }

    pub fn trigger(&self) -> &TriggerEngine {
        &self.trigger
    }

    pub fn trigger_mut(&mut self) -> &mut TriggerEngine {
        &mut self.trigger
    }

    pub fn display_config(&self) -> &DisplayConfig {
        &self.compositor.config
    }

    pub fn display_config_mut(&mut self) -> &mut DisplayConfig {
        &mut self.compositor.config
    }

    pub fn compositor(&self) -> &PersistenceCompositor {
        &self.compositor
    }

    pub fn layout(&self) -> &LayoutManager {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut LayoutManager {
        &mut self.layout
    }

    pub fn last_frame(&self) -> Option<&DisplayFrame> {
        self.last_frame.as_ref()
    }

    pub fn surface(&self) -> &Pixmap {
        self.compositor.surface()
    }
}

impl Drop for OscilloscopeController {
    /// Release plugin resources deterministically, whatever caused shutdown:
    /// consumers (processing bindings) first, then the producer.
    fn drop(&mut self) {
        for mut proc in self.processors.drain(..) {
            proc.instance.shutdown();
        }
        self.source.shutdown();
    }
}
