//! Display frames: one aligned window of samples per channel, selected for
//! rendering. Created once per cycle and consumed by the compositor.

use crate::data::channel::{Channel, ChannelId, Sample};

/// How the frame window was aligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameAnchor {
    /// Free-running: anchored at the newest data (trigger mode None).
    Head,
    /// Anchored at a detected edge crossing on the given channel.
    Edge { channel: ChannelId },
    /// Auto-mode timeout elapsed without a qualifying edge; forced at head.
    Forced,
}

/// A fixed window of samples per channel. Immutable once built.
pub struct DisplayFrame {
    channels: Vec<Vec<Sample>>,
    anchor: FrameAnchor,
}

impl DisplayFrame {
    /// Cut the newest `window` samples of every channel (fewer if a buffer
    /// holds fewer).
    pub fn at_head(channels: &[Channel], window: usize, anchor: FrameAnchor) -> Self {
        Self {
            channels: channels
                .iter()
                .map(|c| c.buffer.snapshot(window))
                .collect(),
            anchor,
        }
    }

    /// Cut `window` samples per channel starting `offset_from_end` samples
    /// before the newest one, aligning all channels to the same index range.
    pub fn at_offset(
        channels: &[Channel],
        offset_from_end: usize,
        window: usize,
        anchor: FrameAnchor,
    ) -> Self {
        Self {
            channels: channels
                .iter()
                .map(|c| c.buffer.window(offset_from_end, window))
                .collect(),
            anchor,
        }
    }

    pub fn anchor(&self) -> FrameAnchor {
        self.anchor
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn samples(&self, channel: ChannelId) -> Option<&[Sample]> {
        self.channels.get(channel).map(|v| v.as_slice())
    }

    /// Channels that actually carry samples in this frame.
    pub fn active_channels(&self) -> Vec<ChannelId> {
        self.channels
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.is_empty())
            .map(|(id, _)| id)
            .collect()
    }
}
