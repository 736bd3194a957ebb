use std::any::Any;
use std::collections::VecDeque;

use super::{IN, out_port, single_output};
use crate::block::{Block, BlockError, InputSpec, OutputSpec, SamplePeriod, input};
use crate::signal::{Signal, Signals};

/// N-sample delay, `y[k] = u[k - N]`; the buffer starts filled with `initial`.
///
/// No direct feedthrough, so it breaks algebraic loops.
pub struct Delay {
    name: String,
    inputs: Vec<InputSpec>,
    outputs: Vec<OutputSpec>,
    period: SamplePeriod,
    num_delays: usize,
    initial: Signal,
    buffer: VecDeque<Signal>,
}

impl Delay {
    pub fn new(
        name: impl Into<String>,
        num_delays: usize,
        initial: impl Into<Signal>,
    ) -> Result<Self, BlockError> {
        if num_delays < 1 {
            return Err(BlockError::compute("num_delays must be >= 1"));
        }
        let initial = initial.into();
        Ok(Self {
            name: name.into(),
            inputs: vec![InputSpec::new(IN)],
            outputs: out_port(),
            period: SamplePeriod::Inherit,
            num_delays,
            buffer: std::iter::repeat_n(initial.clone(), num_delays).collect(),
            initial,
        })
    }

    /// Single-sample unit delay.
    pub fn unit(name: impl Into<String>, initial: impl Into<Signal>) -> Self {
        let initial = initial.into();
        Self {
            name: name.into(),
            inputs: vec![InputSpec::new(IN)],
            outputs: out_port(),
            period: SamplePeriod::Inherit,
            num_delays: 1,
            buffer: VecDeque::from([initial.clone()]),
            initial,
        }
    }

    pub fn with_period(mut self, period: SamplePeriod) -> Self {
        self.period = period;
        self
    }
}

impl Block for Delay {
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

    fn direct_feedthrough(&self) -> bool {
        false
    }

    fn sample_period(&self) -> SamplePeriod {
        self.period
    }

    fn reset(&mut self) -> Result<(), BlockError> {
        self.buffer = std::iter::repeat_n(self.initial.clone(), self.num_delays).collect();
        Ok(())
    }

    fn compute(&mut self, _t: f64, _dt: f64, _inputs: &Signals) -> Result<Signals, BlockError> {
        let y = self
            .buffer
            .front()
            .cloned()
            .ok_or_else(|| BlockError::compute("delay buffer is empty"))?;
        Ok(single_output(y))
    }

    fn update_state(&mut self, _t: f64, _dt: f64, inputs: &Signals) -> Result<(), BlockError> {
        let u = input(inputs, IN)?;
        if u.shape() != self.initial.shape() {
            return Err(BlockError::compute(format!(
                "input shape {} incompatible with buffer shape {}",
                u.shape(),
                self.initial.shape()
            )));
        }
        self.buffer.pop_front();
        self.buffer.push_back(u.clone());
        Ok(())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
