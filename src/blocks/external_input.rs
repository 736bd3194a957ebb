use std::any::Any;

use super::{out_port, single_output};
use crate::block::{Block, BlockError, InputSpec, OutputSpec};
use crate::signal::{Signal, Signals};

/// Source whose value is injected from outside, once per tick, when an
/// external process owns the clock (`Simulator::step_tick`).
///
/// Until something is injected it outputs `initial`; afterwards it holds the
/// last injected value.
pub struct ExternalInput {
    name: String,
    outputs: Vec<OutputSpec>,
    initial: Signal,
    current: Signal,
}

impl ExternalInput {
    pub fn new(name: impl Into<String>, initial: impl Into<Signal>) -> Self {
        let initial = initial.into();
        Self {
            name: name.into(),
            outputs: out_port(),
            current: initial.clone(),
            initial,
        }
    }

    pub fn set(&mut self, value: Signal) {
        self.current = value;
    }

    pub fn current(&self) -> &Signal {
        &self.current
    }
}

impl Block for ExternalInput {
    fn name(&self) -> &str {
        &self.name
    }

    fn inputs(&self) -> &[InputSpec] {
        &[]
    }

    fn outputs(&self) -> &[OutputSpec] {
        &self.outputs
    }

    fn reset(&mut self) -> Result<(), BlockError> {
        self.current = self.initial.clone();
        Ok(())
    }

    fn compute(&mut self, _t: f64, _dt: f64, _inputs: &Signals) -> Result<Signals, BlockError> {
        Ok(single_output(self.current.clone()))
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
