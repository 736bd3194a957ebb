use std::any::Any;

use super::{IN, out_port, single_output};
use crate::block::{Block, BlockError, InputSpec, OutputSpec, SamplePeriod, input};
use crate::signal::{Signal, Signals};

/// `y = K * u`.
///
/// A 1x1 gain (or a scalar input) scales element-wise; otherwise `K @ u`.
pub struct Gain {
    name: String,
    inputs: Vec<InputSpec>,
    outputs: Vec<OutputSpec>,
    period: SamplePeriod,
    gain: Signal,
}

impl Gain {
    pub fn new(name: impl Into<String>, gain: impl Into<Signal>) -> Self {
        Self {
            name: name.into(),
            inputs: vec![InputSpec::new(IN)],
            outputs: out_port(),
            period: SamplePeriod::Inherit,
            gain: gain.into(),
        }
    }

    pub fn with_period(mut self, period: SamplePeriod) -> Self {
        self.period = period;
        self
    }

    fn apply(&self, u: &Signal) -> Result<Signal, BlockError> {
        if let Some(k) = self.gain.as_scalar() {
            return Ok(u.map(|v| k * v));
        }
        if let Some(s) = u.as_scalar() {
            return Ok(self.gain.map(|k| k * s));
        }
        self.gain.matmul(u).ok_or_else(|| {
            BlockError::compute(format!(
                "incompatible dimensions: K is {} but input is {}",
                self.gain.shape(),
                u.shape()
            ))
        })
    }
}

impl Block for Gain {
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
        Ok(single_output(self.apply(u)?))
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
