use livescope::compositor::{
    channel_color, decay, DisplayConfig, PersistenceCompositor, PersistenceMode, RenderStyle,
};
use livescope::data::channel::Channel;
use livescope::data::frame::{DisplayFrame, FrameAnchor};
use livescope::layout::LayoutManager;

fn frame_of(samples: &[f64]) -> DisplayFrame {
    let mut ch = Channel::raw(0, samples.len().max(1));
    ch.buffer.push(samples);
    DisplayFrame::at_head(&[ch], samples.len(), FrameAnchor::Head)
}

fn layout_for(surface: &PersistenceCompositor) -> LayoutManager {
    let mut layout = LayoutManager::new(surface.width(), surface.height());
    layout.update_active(&[0]);
    layout
}

#[test]
fn decay_strictly_decreases_nonzero_intensities() {
    let mut data = [255u8, 128, 64, 1];
    let before = data;
    decay(&mut data, 0.92);
    for (b, a) in before.iter().zip(&data) {
        assert!(a < b, "decay must strictly decrease nonzero values");
    }
}

#[test]
fn decay_never_goes_negative_and_zero_stays_zero() {
    let mut data = [0u8, 0, 1];
    decay(&mut data, 0.5);
    assert_eq!(data, [0, 0, 0]);
    decay(&mut data, 0.5);
    assert_eq!(data, [0, 0, 0], "a fully decayed surface stays at zero");
}

#[test]
fn decay_clamps_degenerate_factors() {
    let mut data = [200u8];
    decay(&mut data, 1.5);
    assert!(data[0] < 200, "factor >= 1 still decays");
    let mut data = [200u8];
    decay(&mut data, -0.5);
    assert_eq!(data[0], 0, "negative factors clamp to zero");
}

#[test]
fn repeated_decay_converges_to_zero() {
    let mut data = [255u8; 16];
    for _ in 0..200 {
        decay(&mut data, 0.92);
    }
    assert!(data.iter().all(|&b| b == 0));
}

#[test]
fn composite_draws_line_trace() {
    let mut comp = PersistenceCompositor::new(64, 64, DisplayConfig::default()).unwrap();
    let layout = layout_for(&comp);
    assert_eq!(comp.intensity(), 0);
    comp.composite(&frame_of(&[-1.0, 1.0, -1.0, 1.0]), &layout);
    assert!(comp.intensity() > 0, "a trace must leave intensity behind");
}

#[test]
fn composite_draws_point_trace() {
    let config = DisplayConfig {
        style: RenderStyle::Point,
        ..DisplayConfig::default()
    };
    let mut comp = PersistenceCompositor::new(64, 64, config).unwrap();
    let layout = layout_for(&comp);
    comp.composite(&frame_of(&[0.0, 0.5, -0.5]), &layout);
    assert!(comp.intensity() > 0);
}

#[test]
fn point_style_draws_a_single_sample() {
    let config = DisplayConfig {
        style: RenderStyle::Point,
        ..DisplayConfig::default()
    };
    let mut comp = PersistenceCompositor::new(64, 64, config).unwrap();
    let layout = layout_for(&comp);
    comp.composite(&frame_of(&[0.0]), &layout);
    assert!(comp.intensity() > 0, "a lone sample still gets a mark");
}

#[test]
fn line_style_needs_two_samples() {
    let mut comp = PersistenceCompositor::new(64, 64, DisplayConfig::default()).unwrap();
    let layout = layout_for(&comp);
    comp.composite(&frame_of(&[0.0]), &layout);
    assert_eq!(comp.intensity(), 0, "no stroke exists for one endpoint");
}

#[test]
fn persistence_off_clears_previous_output() {
    let mut comp = PersistenceCompositor::new(64, 64, DisplayConfig::default()).unwrap();
    let layout = layout_for(&comp);
    comp.composite(&frame_of(&[-1.0, 1.0]), &layout);
    assert!(comp.intensity() > 0);
    // An empty frame clears the surface: nothing survives from the last one.
    comp.composite(&DisplayFrame::at_head(&[], 2, FrameAnchor::Head), &layout);
    assert_eq!(comp.intensity(), 0);
}

#[test]
fn persistent_without_fade_accumulates_unchanged() {
    let config = DisplayConfig {
        persistence: PersistenceMode::Persistent { fade: false },
        ..DisplayConfig::default()
    };
    let mut comp = PersistenceCompositor::new(64, 64, config).unwrap();
    let layout = layout_for(&comp);
    comp.composite(&frame_of(&[-1.0, 1.0]), &layout);
    let after_first = comp.intensity();
    comp.composite(&DisplayFrame::at_head(&[], 2, FrameAnchor::Head), &layout);
    assert_eq!(
        comp.intensity(),
        after_first,
        "without fade the accumulated trace persists verbatim"
    );
}

#[test]
fn persistent_with_fade_attenuates_old_traces() {
    let config = DisplayConfig {
        persistence: PersistenceMode::Persistent { fade: true },
        decay_factor: 0.5,
        ..DisplayConfig::default()
    };
    let mut comp = PersistenceCompositor::new(64, 64, config).unwrap();
    let layout = layout_for(&comp);
    comp.composite(&frame_of(&[-1.0, 1.0]), &layout);
    let after_first = comp.intensity();
    comp.composite(&DisplayFrame::at_head(&[], 2, FrameAnchor::Head), &layout);
    let after_fade = comp.intensity();
    assert!(
        after_fade < after_first,
        "fade must attenuate the previous trace"
    );
}

#[test]
fn reset_clears_everything() {
    let mut comp = PersistenceCompositor::new(32, 32, DisplayConfig::default()).unwrap();
    let layout = layout_for(&comp);
    comp.composite(&frame_of(&[0.0, 1.0]), &layout);
    comp.reset();
    assert_eq!(comp.intensity(), 0);
}

#[test]
fn zero_sized_surface_is_rejected() {
    assert!(PersistenceCompositor::new(0, 64, DisplayConfig::default()).is_err());
    assert!(PersistenceCompositor::new(64, 0, DisplayConfig::default()).is_err());
}

#[test]
fn channel_colors_cycle_through_palette() {
    assert_eq!(channel_color(0), channel_color(8));
    assert_ne!(channel_color(0), channel_color(1));
}
