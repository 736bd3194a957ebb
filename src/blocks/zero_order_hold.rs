use std::any::Any;

use super::{IN, out_port, single_output};
use crate::block::{Block, BlockError, InputSpec, OutputSpec, SamplePeriod, input};
use crate::signal::Signals;

/// Samples its input at its own period; the runtime holds the output between
/// activations.
pub struct ZeroOrderHold {
    name: String,
    inputs: Vec<InputSpec>,
    outputs: Vec<OutputSpec>,
    period: SamplePeriod,
}

impl ZeroOrderHold {
    pub fn new(name: impl Into<String>, period: SamplePeriod) -> Self {
        Self {
            name: name.into(),
            inputs: vec![InputSpec::new(IN)],
            outputs: out_port(),
            period,
        }
    }
}

impl Block for ZeroOrderHold {
    fn name(&self) -> &str {
        &self.name
    }

    fn inputs(&self) -> &[InputSpec] {
        &self.inputs
    }

    fn outputs(&self) -> &[OutputSpec] {
        &self.outputs
    }

    fn sample_period(&self) -> SamplePeriod {
        self.period
    }

    fn reset(&mut self) -> Result<(), BlockError> {
        Ok(())
    }

    fn compute(&mut self, _t: f64, _dt: f64, inputs: &Signals) -> Result<Signals, BlockError> {
        Ok(single_output(input(inputs, IN)?.clone()))
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
