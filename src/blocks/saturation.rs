use std::any::Any;

use super::{IN, out_port, single_output};
use crate::block::{Block, BlockError, InputSpec, OutputSpec, SamplePeriod, input};
use crate::signal::Signals;

/// Clamp every element to `[lower, upper]`.
pub struct Saturation {
    name: String,
    inputs: Vec<InputSpec>,
    outputs: Vec<OutputSpec>,
    period: SamplePeriod,
    lower: f64,
    upper: f64,
}

impl Saturation {
    pub fn new(name: impl Into<String>, lower: f64, upper: f64) -> Result<Self, BlockError> {
        if lower > upper {
            return Err(BlockError::compute(format!(
                "lower bound {lower} exceeds upper bound {upper}"
            )));
        }
        Ok(Self {
            name: name.into(),
            inputs: vec![InputSpec::new(IN)],
            outputs: out_port(),
            period: SamplePeriod::Inherit,
            lower,
            upper,
        })
    }

    pub fn with_period(mut self, period: SamplePeriod) -> Self {
        self.period = period;
        self
    }
}

impl Block for Saturation {
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
        let u = input(inputs, IN)?;
        Ok(single_output(u.map(|v| v.clamp(self.lower, self.upper))))
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
