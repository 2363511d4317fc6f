//! Channel layout: assigns each active channel a non-overlapping region of
//! the display surface, either automatically (near-square grid) or manually.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::data::channel::ChannelId;

/// A rectangle on the display surface, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Region {
    pub fn overlaps(&self, other: &Region) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

/// Manual regions persist until explicitly reset to auto; the auto grid
/// reflows whenever the active channel set changes.
pub struct LayoutManager {
    width: u32,
    height: u32,
    auto: HashMap<ChannelId, Region>,
    manual: HashMap<ChannelId, Region>,
    active: Vec<ChannelId>,
}

impl LayoutManager {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            auto: HashMap::new(),
            manual: HashMap::new(),
            active: Vec::new(),
        }
    }

    pub fn active_channels(&self) -> &[ChannelId] {
        &self.active
    }

    /// Recompute the auto grid if the active channel set changed.
    pub fn update_active(&mut self, active: &[ChannelId]) {
        if self.active == active {
            return;
        }
        self.active = active.to_vec();
        self.auto_layout();
    }

    /// Partition the surface into a near-square grid, one cell per active
    /// channel, assigned row-major in channel order.
    pub fn auto_layout(&mut self) {
        self.auto.clear();
        let n = self.active.len();
        if n == 0 {
            return;
        }
        let cols = (n as f32).sqrt().ceil() as usize;
        let rows = n.div_ceil(cols);
        let cell_w = self.width as f32 / cols as f32;
        let cell_h = self.height as f32 / rows as f32;
        for (i, &id) in self.active.iter().enumerate() {
            let col = i % cols;
            let row = i / cols;
            self.auto.insert(
                id,
                Region {
                    x: col as f32 * cell_w,
                    y: row as f32 * cell_h,
                    width: cell_w,
                    height: cell_h,
                },
            );
        }
    }

    /// Pin a channel to an explicit region. Kept until `reset_to_auto`.
    pub fn set_region(&mut self, channel: ChannelId, region: Region) {
        self.manual.insert(channel, region);
    }

    /// Drop all manual regions and reflow the grid.
    pub fn reset_to_auto(&mut self) {
        self.manual.clear();
        self.auto_layout();
    }

    /// The region a channel renders into: manual assignment wins, otherwise
    /// the auto grid cell.
    pub fn region_of(&self, channel: ChannelId) -> Option<Region> {
        self.manual
            .get(&channel)
            .or_else(|| self.auto.get(&channel))
            .copied()
    }

    pub fn manual_regions(&self) -> &HashMap<ChannelId, Region> {
        &self.manual
    }
}
