//! Edge triggering: configuration, crossing detection, and the per-cycle
//! frame-selection state machine.

use serde::{Deserialize, Serialize};

use crate::data::channel::{Channel, ChannelId, Sample};
use crate::data::frame::{DisplayFrame, FrameAnchor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerMode {
    /// Free-running: every cycle yields a frame anchored at the newest data.
    None,
    /// Arm once, emit one frame on the first qualifying edge, then disarm.
    Single,
    /// Re-arm after every frame; force a frame after `timeout_cycles` without
    /// a qualifying edge so the display never stalls.
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerEdge {
    Up,
    Down,
    Both,
}

/// User-facing trigger settings, read by the engine every cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriggerConfig {
    pub mode: TriggerMode,
    pub edge: TriggerEdge,
    /// Threshold level. Equality with the level counts as "not yet crossed":
    /// a crossing needs strict inequality on both sides of the transition.
    pub level: Sample,
    pub channel: ChannelId,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            mode: TriggerMode::Auto,
            edge: TriggerEdge::Up,
            level: 0.0,
            channel: 0,
        }
    }
}

impl TriggerConfig {
    /// Restore mode/edge/level to their defaults. The selected trigger
    /// channel is kept.
    pub fn reset(&mut self) {
        let channel = self.channel;
        *self = Self {
            channel,
            ..Self::default()
        };
    }
}

/// Index of the first sample that completes an edge crossing, scanning oldest
/// to newest. A sample exactly at the level never participates in a crossing,
/// so flat signals held at the level cannot retrigger.
pub fn find_crossing(samples: &[Sample], edge: TriggerEdge, level: Sample) -> Option<usize> {
    samples
        .windows(2)
        .position(|pair| crossed(pair[0], pair[1], edge, level))
        .map(|i| i + 1)
}

fn crossed(prev: Sample, next: Sample, edge: TriggerEdge, level: Sample) -> bool {
    let up = prev < level && next > level;
    let down = prev > level && next < level;
    match edge {
        TriggerEdge::Up => up,
        TriggerEdge::Down => down,
        TriggerEdge::Both => up || down,
    }
}

/// Per-cycle frame selection. Scans the trigger channel incrementally (each
/// sample is examined once), locks on a crossing, and emits the frame once a
/// full window of post-trigger samples has arrived.
pub struct TriggerEngine {
    pub config: TriggerConfig,
    /// Auto mode: cycles without a frame before one is forced.
    pub timeout_cycles: u32,
    armed: bool,
    idle_cycles: u32,
    /// Absolute sample index up to which the trigger channel was scanned.
    scan_pos: u64,
    /// Absolute index of a locked crossing awaiting a full window.
    locked: Option<u64>,
}

impl TriggerEngine {
    pub fn new(config: TriggerConfig, timeout_cycles: u32) -> Self {
        Self {
            config,
            timeout_cycles: timeout_cycles.max(1),
            armed: true,
            idle_cycles: 0,
            scan_pos: 0,
            locked: None,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Re-arm after a Single-mode emission. Clears any locked crossing.
    pub fn arm(&mut self) {
        self.armed = true;
        self.idle_cycles = 0;
        self.locked = None;
    }

    /// Restore the documented defaults (mode Auto, edge Up, level midscale)
    /// regardless of current acquisition state. Takes effect next cycle.
    pub fn reset(&mut self) {
        self.config.reset();
        self.arm();
    }

    /// Run one selection cycle over the current channel state. Returns the
    /// frame to composite, or `None` while armed-and-waiting.
    pub fn select_frame(&mut self, channels: &[Channel], window: usize) -> Option<DisplayFrame> {
        let window = window.max(2);

        if self.config.mode == TriggerMode::None {
            self.locked = None;
            self.idle_cycles = 0;
            return Some(DisplayFrame::at_head(channels, window, FrameAnchor::Head));
        }

        if self.config.mode == TriggerMode::Single && !self.armed {
            return None;
        }

        if let Some(channel) = channels.get(self.config.channel) {
            if self.locked.is_none() {
                self.scan(channel);
            }
            if let Some(frame) = self.try_emit(channels, window) {
                return Some(frame);
            }
        }

        // No frame this cycle. Auto mode counts edgeless cycles toward the
        // forced emission; a locked crossing waiting for its window to fill
        // is exempt and must not be discarded.
        if self.config.mode == TriggerMode::Auto && self.locked.is_none() {
            self.idle_cycles += 1;
            if self.idle_cycles >= self.timeout_cycles {
                self.idle_cycles = 0;
                return Some(DisplayFrame::at_head(channels, window, FrameAnchor::Forced));
            }
        }
        None
    }

    /// Scan samples not yet examined, including the one preceding them so a
    /// crossing spanning two batches is still seen.
    fn scan(&mut self, channel: &Channel) {
        let buf = &channel.buffer;
        let written = buf.written();
        if written <= self.scan_pos {
            return;
        }
        let len = buf.len();
        let fresh = (written - self.scan_pos).min(len as u64) as usize;
        let samples = buf.snapshot(len);
        let start = len.saturating_sub(fresh + 1);
        if let Some(i) = find_crossing(&samples[start..], self.config.edge, self.config.level) {
            let abs = written - len as u64 + (start + i) as u64;
            self.locked = Some(abs);
            self.idle_cycles = 0;
        }
        self.scan_pos = written;
    }

    /// Emit the locked frame once a full window of samples exists after the
    /// crossing. Drops the lock if the crossing scrolled out of the buffer.
    fn try_emit(&mut self, channels: &[Channel], window: usize) -> Option<DisplayFrame> {
        let abs = self.locked?;
        let buf = &channels[self.config.channel].buffer;
        let offset_from_end = buf.written() - abs;
        if offset_from_end > buf.len() as u64 {
            self.locked = None;
            return None;
        }
        if offset_from_end < window as u64 {
            return None;
        }
        self.locked = None;
        self.idle_cycles = 0;
        if self.config.mode == TriggerMode::Single {
            self.armed = false;
        }
        Some(DisplayFrame::at_offset(
            channels,
            offset_from_end as usize,
            window,
            FrameAnchor::Edge {
                channel: self.config.channel,
            },
        ))
    }
}
