//! Per-channel sample storage: a fixed-capacity rolling buffer.

use std::collections::VecDeque;

/// A single scalar sample. Its timestamp is implicit in its index within the
/// channel's stream.
pub type Sample = f64;

/// Numeric identifier of a channel. Raw source channels come first, extended
/// (plugin-derived) channels follow.
pub type ChannelId = usize;

/// Fixed-capacity ring buffer of samples. Oldest samples are evicted once the
/// capacity is reached; the total write count advances monotonically.
pub struct ChannelBuffer {
    samples: VecDeque<Sample>,
    capacity: usize,
    written: u64,
}

impl ChannelBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
            written: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Total number of samples ever pushed, including evicted ones.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Append a batch, evicting the oldest samples when over capacity.
    pub fn push(&mut self, batch: &[Sample]) {
        for &sample in batch {
            if self.samples.len() == self.capacity {
                self.samples.pop_front();
            }
            self.samples.push_back(sample);
        }
        self.written += batch.len() as u64;
    }

    /// The most recent `count` samples, oldest first. Returns fewer if the
    /// buffer holds fewer.
    pub fn snapshot(&self, count: usize) -> Vec<Sample> {
        let skip = self.samples.len().saturating_sub(count);
        self.samples.iter().skip(skip).copied().collect()
    }

    /// Up to `count` samples starting `offset_from_end` samples before the
    /// newest one. Used to cut a frame window anchored at a trigger point.
    pub fn window(&self, offset_from_end: usize, count: usize) -> Vec<Sample> {
        let len = self.samples.len();
        let start = len.saturating_sub(offset_from_end);
        self.samples
            .iter()
            .skip(start)
            .take(count)
            .copied()
            .collect()
    }

    pub fn latest(&self) -> Option<Sample> {
        self.samples.back().copied()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// A channel of the oscilloscope: an id, its rolling buffer, and whether its
/// values are derived by a processing plugin rather than read from the source.
pub struct Channel {
    pub id: ChannelId,
    pub extended: bool,
    pub buffer: ChannelBuffer,
}

impl Channel {
    pub fn raw(id: ChannelId, capacity: usize) -> Self {
        Self {
            id,
            extended: false,
            buffer: ChannelBuffer::new(capacity),
        }
    }

    pub fn extended(id: ChannelId, capacity: usize) -> Self {
        Self {
            id,
            extended: true,
            buffer: ChannelBuffer::new(capacity),
        }
    }
}
