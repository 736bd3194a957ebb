use std::any::Any;

use super::{numbered_inputs, out_port, single_output};
use crate::block::{Block, BlockError, InputSpec, OutputSpec, SamplePeriod, input};
use crate::signal::{Signal, Signals};

/// Stack column vectors `in1..inN` into one column vector.
pub struct Mux {
    name: String,
    inputs: Vec<InputSpec>,
    outputs: Vec<OutputSpec>,
    period: SamplePeriod,
}

impl Mux {
    pub fn new(name: impl Into<String>, num_inputs: usize) -> Self {
        Self {
            name: name.into(),
            inputs: numbered_inputs(num_inputs),
            outputs: out_port(),
            period: SamplePeriod::Inherit,
        }
    }

    pub fn with_period(mut self, period: SamplePeriod) -> Self {
        self.period = period;
        self
    }
}

impl Block for Mux {
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
        let mut stacked = Vec::new();
        for spec in &self.inputs {
            let u = input(inputs, &spec.name)?;
            if u.shape().cols != 1 {
                return Err(BlockError::compute(format!(
                    "input '{}' must be a column vector, got {}",
                    spec.name,
                    u.shape()
                )));
            }
            stacked.extend_from_slice(u.data());
        }
        Ok(single_output(Signal::column(stacked)))
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
