//! Built-in processing plugins: the simplest derived-channel transforms.

use crate::data::channel::Sample;
use crate::plugin::{PluginRegistry, ProcessingPlugin};

pub const ABS_NAME: &str = "abs";
pub const NEGATE_NAME: &str = "negate";
pub const SUM_NAME: &str = "sum";

/// |x| of one input channel.
#[derive(Default)]
pub struct AbsPlugin;

impl ProcessingPlugin for AbsPlugin {
    fn process(&mut self, inputs: &[&[Sample]], outputs: &mut [Vec<Sample>]) {
        let (Some(input), Some(out)) = (inputs.first(), outputs.first_mut()) else {
            return;
        };
        out.extend(input.iter().map(|v| v.abs()));
    }

    fn input_count(&self) -> usize {
        1
    }

    fn output_count(&self) -> usize {
        1
    }
}

/// -x of one input channel.
#[derive(Default)]
pub struct NegatePlugin;

impl ProcessingPlugin for NegatePlugin {
    fn process(&mut self, inputs: &[&[Sample]], outputs: &mut [Vec<Sample>]) {
        let (Some(input), Some(out)) = (inputs.first(), outputs.first_mut()) else {
            return;
        };
        out.extend(input.iter().map(|v| -v));
    }

    fn input_count(&self) -> usize {
        1
    }

    fn output_count(&self) -> usize {
        1
    }
}

/// a + b of two input channels, sample by sample. Runs as long as the shorter
/// input.
#[derive(Default)]
pub struct SumPlugin;

impl ProcessingPlugin for SumPlugin {
    fn process(&mut self, inputs: &[&[Sample]], outputs: &mut [Vec<Sample>]) {
        let (Some(a), Some(b), Some(out)) = (inputs.first(), inputs.get(1), outputs.first_mut())
        else {
            return;
        };
        out.extend(a.iter().zip(b.iter()).map(|(x, y)| x + y));
    }

    fn input_count(&self) -> usize {
        2
    }

    fn output_count(&self) -> usize {
        1
    }
}

pub(crate) fn register_builtins(registry: &mut PluginRegistry) {
    registry.register_processor(ABS_NAME, || Box::<AbsPlugin>::default());
    registry.register_processor(NEGATE_NAME, || Box::<NegatePlugin>::default());
    registry.register_processor(SUM_NAME, || Box::<SumPlugin>::default());
}
