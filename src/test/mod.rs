mod model_graph;
mod scheduler;
mod signal;
mod sim_time;
mod simulator;

use crate::block::{Block, BlockError, InputSpec, OutputSpec};
use crate::signal::{Shape, Signals};
use std::any::Any;

/// 只有一个带声明形状输入的终端块
pub(crate) struct ShapedSink {
    name: String,
    inputs: Vec<InputSpec>,
}

impl ShapedSink {
    pub(crate) fn new(name: &str, shape: Shape) -> Self {
        Self {
            name: name.to_string(),
            inputs: vec![InputSpec::new("in").with_shape(shape)],
        }
    }
}

impl Block for ShapedSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn inputs(&self) -> &[InputSpec] {
        &self.inputs
    }

    fn outputs(&self) -> &[OutputSpec] {
        &[]
    }

    fn reset(&mut self) -> Result<(), BlockError> {
        Ok(())
    }

    fn compute(&mut self, _t: f64, _dt: f64, _inputs: &Signals) -> Result<Signals, BlockError> {
        Ok(Signals::new())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub(crate) fn assert_close(got: &[f64], want: &[f64]) {
    assert_eq!(got.len(), want.len(), "length mismatch: {got:?} vs {want:?}");
    for (i, (g, w)) in got.iter().zip(want).enumerate() {
        assert!((g - w).abs() < 1e-9, "index {i}: got {g}, want {w}");
    }
}
