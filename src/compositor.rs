//! Persistence compositor: rasterizes display frames onto an accumulation
//! surface with optional phosphor-style fade-out.
//!
//! The compositor operates purely on in-memory frames and surfaces; it never
//! touches I/O. The decay law is a free function over the raw surface bytes
//! so it can be tested in isolation from rendering.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tiny_skia::{BlendMode, Color, FillRule, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::data::channel::{ChannelId, Sample};
use crate::data::frame::DisplayFrame;
use crate::error::ScopeError;
use crate::layout::LayoutManager;

/// How consecutive samples of a trace are marked on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderStyle {
    /// Connect consecutive samples with strokes.
    Line,
    /// Discrete marks, one per sample.
    Point,
}

/// Whether prior frames remain visible, and whether they fade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersistenceMode {
    /// Each frame fully overwrites the previous output.
    Off,
    /// Traces accumulate; with `fade`, existing intensities are attenuated
    /// before each new trace is added.
    Persistent { fade: bool },
}

/// Rendering configuration, all toggles independent of one another.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub style: RenderStyle,
    pub persistence: PersistenceMode,
    /// Fraction of intensity retained per frame when fading, in [0, 1).
    pub decay_factor: f32,
    pub antialias: bool,
    /// Coverage-weighted blending of overlapping traces; when off, the last
    /// drawn trace overwrites.
    pub alpha_blend: bool,
    pub line_width: f32,
    pub point_radius: f32,
    /// Sample value span mapped onto a channel region's full height.
    pub value_range: (Sample, Sample),
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            style: RenderStyle::Line,
            persistence: PersistenceMode::Off,
            decay_factor: 0.92,
            antialias: true,
            alpha_blend: true,
            line_width: 1.5,
            point_radius: 2.0,
            value_range: (-1.5, 1.5),
        }
    }
}

// Trace color allocation, shared by every surface.
static PALETTE: Lazy<Vec<Color>> = Lazy::new(|| {
    vec![
        Color::from_rgba8(31, 119, 180, 255),
        Color::from_rgba8(255, 127, 14, 255),
        Color::from_rgba8(44, 160, 44, 255),
        Color::from_rgba8(214, 39, 40, 255),
        Color::from_rgba8(148, 103, 189, 255),
        Color::from_rgba8(227, 119, 194, 255),
        Color::from_rgba8(188, 189, 34, 255),
        Color::from_rgba8(23, 190, 207, 255),
    ]
});

/// Color assigned to a channel's trace.
pub fn channel_color(id: ChannelId) -> Color {
    PALETTE[id % PALETTE.len()]
}

/// Attenuate every intensity on a premultiplied-RGBA surface by `factor`.
/// Values strictly decrease while nonzero and can never go negative; a fully
/// decayed surface stays at zero.
pub fn decay(data: &mut [u8], factor: f32) {
    let factor = factor.clamp(0.0, 1.0).min(0.999_9);
    for byte in data.iter_mut() {
        *byte = (*byte as f32 * factor) as u8;
    }
}

/// Accumulation surface plus the configuration that drives each composite
/// pass.
pub struct PersistenceCompositor {
    surface: Pixmap,
    pub config: DisplayConfig,
}

impl PersistenceCompositor {
    pub fn new(width: u32, height: u32, config: DisplayConfig) -> Result<Self, ScopeError> {
        let surface =
            Pixmap::new(width, height).ok_or(ScopeError::InvalidSurface { width, height })?;
        Ok(Self { surface, config })
    }

    pub fn surface(&self) -> &Pixmap {
        &self.surface
    }

    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    pub fn height(&self) -> u32 {
        self.surface.height()
    }

    /// Clear the accumulation surface entirely.
    pub fn reset(&mut self) {
        self.surface.fill(Color::TRANSPARENT);
    }

    /// Composite one frame: apply the persistence policy, then draw each
    /// active channel's trace into its layout region.
    pub fn composite(&mut self, frame: &DisplayFrame, layout: &LayoutManager) {
        match self.config.persistence {
            PersistenceMode::Off => self.reset(),
            PersistenceMode::Persistent { fade: false } => {}
            PersistenceMode::Persistent { fade: true } => {
                decay(self.surface.data_mut(), self.config.decay_factor);
            }
        }

        for id in frame.active_channels() {
            let Some(region) = layout.region_of(id) else {
                continue;
            };
            let Some(samples) = frame.samples(id) else {
                continue;
            };
            self.draw_trace(id, samples, region);
        }
    }

    fn draw_trace(&mut self, id: ChannelId, samples: &[Sample], region: crate::layout::Region) {
        if samples.is_empty() {
            return;
        }
        let mut paint = Paint::default();
        paint.set_color(channel_color(id));
        paint.anti_alias = self.config.antialias;
        paint.blend_mode = if self.config.alpha_blend {
            BlendMode::SourceOver
        } else {
            BlendMode::Source
        };

        let (lo, hi) = self.config.value_range;
        let span = (hi - lo).abs().max(f64::EPSILON);
        let n = samples.len();
        let to_xy = |i: usize, v: Sample| -> (f32, f32) {
            let x = region.x + (i as f32 / (n - 1).max(1) as f32) * (region.width - 1.0).max(0.0);
            let norm = ((v - lo) / span).clamp(0.0, 1.0) as f32;
            let y = region.y + (1.0 - norm) * (region.height - 1.0).max(0.0);
            (x, y)
        };

        match self.config.style {
            RenderStyle::Line => {
                // A line needs two endpoints; a lone sample draws nothing.
                if samples.len() < 2 {
                    return;
                }
                let mut pb = PathBuilder::new();
                let (x0, y0) = to_xy(0, samples[0]);
                pb.move_to(x0, y0);
                for (i, &v) in samples.iter().enumerate().skip(1) {
                    let (x, y) = to_xy(i, v);
                    pb.line_to(x, y);
                }
                if let Some(path) = pb.finish() {
                    let stroke = Stroke {
                        width: self.config.line_width,
                        ..Stroke::default()
                    };
                    self.surface
                        .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
                }
            }
            RenderStyle::Point => {
                let r = self.config.point_radius.max(0.5);
                let mut pb = PathBuilder::new();
                for (i, &v) in samples.iter().enumerate() {
                    let (x, y) = to_xy(i, v);
                    pb.push_circle(x, y, r);
                }
                if let Some(path) = pb.finish() {
                    self.surface.fill_path(
                        &path,
                        &paint,
                        FillRule::Winding,
                        Transform::identity(),
                        None,
                    );
                }
            }
        }
    }

    /// Total intensity currently on the surface. Cheap diagnostic used by the
    /// fade-out tests and by sinks that skip empty frames.
    pub fn intensity(&self) -> u64 {
        self.surface.data().iter().map(|&b| b as u64).sum()
    }
}
