use livescope::data::channel::{Channel, ChannelBuffer};

#[test]
fn push_evicts_oldest_at_capacity() {
    let mut buf = ChannelBuffer::new(8);
    let samples: Vec<f64> = (1..=12).map(|v| v as f64).collect();
    buf.push(&samples);
    assert_eq!(buf.len(), 8, "buffer must never exceed its capacity");
    assert_eq!(
        buf.snapshot(8),
        (5..=12).map(|v| v as f64).collect::<Vec<_>>(),
        "the oldest samples are the ones evicted"
    );
}

#[test]
fn written_counts_evicted_samples() {
    let mut buf = ChannelBuffer::new(4);
    buf.push(&[1.0, 2.0, 3.0]);
    buf.push(&[4.0, 5.0, 6.0]);
    assert_eq!(buf.written(), 6);
    assert_eq!(buf.len(), 4);
}

#[test]
fn snapshot_returns_fewer_when_short() {
    let mut buf = ChannelBuffer::new(16);
    buf.push(&[1.0, 2.0]);
    assert_eq!(buf.snapshot(8), vec![1.0, 2.0]);
}

#[test]
fn window_cuts_aligned_range() {
    let mut buf = ChannelBuffer::new(16);
    buf.push(&(0..10).map(|v| v as f64).collect::<Vec<_>>());
    // 6 samples before the end, take 3: indices 4, 5, 6
    assert_eq!(buf.window(6, 3), vec![4.0, 5.0, 6.0]);
}

#[test]
fn window_truncates_at_head() {
    let mut buf = ChannelBuffer::new(16);
    buf.push(&[1.0, 2.0, 3.0]);
    assert_eq!(
        buf.window(2, 10),
        vec![2.0, 3.0],
        "a window reaching past the newest sample is truncated"
    );
}

#[test]
fn zero_capacity_is_clamped() {
    let buf = ChannelBuffer::new(0);
    assert_eq!(buf.capacity(), 1);
}

#[test]
fn latest_and_clear() {
    let mut buf = ChannelBuffer::new(4);
    assert!(buf.latest().is_none());
    buf.push(&[7.0, 9.0]);
    assert_eq!(buf.latest(), Some(9.0));
    buf.clear();
    assert!(buf.is_empty());
}

#[test]
fn channel_constructors_mark_extended() {
    assert!(!Channel::raw(0, 8).extended);
    assert!(Channel::extended(4, 8).extended);
}
