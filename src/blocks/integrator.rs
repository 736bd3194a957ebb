use std::any::Any;

use super::{IN, out_port, single_output};
use crate::block::{Block, BlockError, InputSpec, OutputSpec, SamplePeriod, input};
use crate::signal::{Signal, Signals};

/// Discretization used by [`DiscreteIntegrator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegrationMethod {
    /// `y[k] = x[k]`; no direct feedthrough, breaks algebraic loops.
    #[default]
    EulerForward,
    /// `y[k] = x[k] + dt * u[k]`; direct feedthrough.
    EulerBackward,
}

impl IntegrationMethod {
    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_lowercase().replace(['_', '-'], " ").as_str() {
            "euler forward" | "forward" => Ok(Self::EulerForward),
            "euler backward" | "backward" => Ok(Self::EulerBackward),
            _ => Err(format!("unknown integration method: {raw}")),
        }
    }
}

/// Discrete-time integrator, `x[k+1] = x[k] + dt * u[k]`.
///
/// The state shape is fixed by `initial_state`; an input of another shape is
/// rejected.
pub struct DiscreteIntegrator {
    name: String,
    inputs: Vec<InputSpec>,
    outputs: Vec<OutputSpec>,
    period: SamplePeriod,
    method: IntegrationMethod,
    initial: Signal,
    x: Signal,
}

impl DiscreteIntegrator {
    pub fn new(name: impl Into<String>, initial_state: impl Into<Signal>) -> Self {
        let initial = initial_state.into();
        Self {
            name: name.into(),
            inputs: vec![InputSpec::new(IN)],
            outputs: out_port(),
            period: SamplePeriod::Inherit,
            method: IntegrationMethod::EulerForward,
            x: initial.clone(),
            initial,
        }
    }

    pub fn with_method(mut self, method: IntegrationMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_period(mut self, period: SamplePeriod) -> Self {
        self.period = period;
        self
    }

    pub fn state(&self) -> &Signal {
        &self.x
    }

    fn step(&self, dt: f64, u: &Signal) -> Result<Signal, BlockError> {
        self.x.zip_with(u, |x, u| x + dt * u).ok_or_else(|| {
            BlockError::compute(format!(
                "input shape {} incompatible with state shape {}",
                u.shape(),
                self.x.shape()
            ))
        })
    }
}

impl Block for DiscreteIntegrator {
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
        self.method == IntegrationMethod::EulerBackward
    }

    fn sample_period(&self) -> SamplePeriod {
        self.period
    }

    fn reset(&mut self) -> Result<(), BlockError> {
        self.x = self.initial.clone();
        Ok(())
    }

    fn compute(&mut self, _t: f64, dt: f64, inputs: &Signals) -> Result<Signals, BlockError> {
        let y = match self.method {
            IntegrationMethod::EulerForward => self.x.clone(),
            IntegrationMethod::EulerBackward => self.step(dt, input(inputs, IN)?)?,
        };
        Ok(single_output(y))
    }

    fn update_state(&mut self, _t: f64, dt: f64, inputs: &Signals) -> Result<(), BlockError> {
        self.x = self.step(dt, input(inputs, IN)?)?;
        Ok(())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
