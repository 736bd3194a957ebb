use std::any::Any;

use super::{IN, out_port, single_output};
use crate::block::{Block, BlockError, InputSpec, OutputSpec, SamplePeriod, input};
use crate::signal::{Signal, Signals};

/// Backward difference, `y[k] = (u[k] - u[k-1]) / dt`.
///
/// Direct feedthrough. The first activation after a reset has no previous
/// input and emits `initial_output`, or zeros shaped like the input.
pub struct DiscreteDerivator {
    name: String,
    inputs: Vec<InputSpec>,
    outputs: Vec<OutputSpec>,
    period: SamplePeriod,
    initial_output: Option<Signal>,
    prev: Option<Signal>,
}

impl DiscreteDerivator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inputs: vec![InputSpec::new(IN)],
            outputs: out_port(),
            period: SamplePeriod::Inherit,
            initial_output: None,
            prev: None,
        }
    }

    /// Output of the first activation. Also fixes the output shape.
    pub fn with_initial_output(mut self, y0: impl Into<Signal>) -> Self {
        let y0 = y0.into();
        self.outputs = vec![OutputSpec::new(super::OUT).with_shape(y0.shape())];
        self.initial_output = Some(y0);
        self
    }

    pub fn with_period(mut self, period: SamplePeriod) -> Self {
        self.period = period;
        self
    }
}

impl Block for DiscreteDerivator {
    fn name(&self) -> &str {
        &self.name
    }

    fn inputs(&self) -> &[InputSpec] {
        &self.inputs
    }

    fn outputs(&self) -> &[OutputSpec] {
        &self.outputs
    }

    fn has_state(&self) -> bool {
        true
    }

    fn sample_period(&self) -> SamplePeriod {
        self.period
    }

    fn reset(&mut self) -> Result<(), BlockError> {
        self.prev = None;
        Ok(())
    }

    fn compute(&mut self, _t: f64, dt: f64, inputs: &Signals) -> Result<Signals, BlockError> {
        let u = input(inputs, IN)?;
        let y = match &self.prev {
            None => self
                .initial_output
                .clone()
                .unwrap_or_else(|| Signal::zeros(u.shape())),
            Some(_) if dt <= 0.0 => Signal::zeros(u.shape()),
            Some(prev) => u.zip_with(prev, |u, p| (u - p) / dt).ok_or_else(|| {
                BlockError::compute(format!(
                    "input shape {} incompatible with previous input {}",
                    u.shape(),
                    prev.shape()
                ))
            })?,
        };
        Ok(single_output(y))
    }

    fn update_state(&mut self, _t: f64, _dt: f64, inputs: &Signals) -> Result<(), BlockError> {
        self.prev = Some(input(inputs, IN)?.clone());
        Ok(())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
