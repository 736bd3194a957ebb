use std::any::Any;

use crate::block::{Block, BlockError, InputSpec, OutputSpec, SamplePeriod, input};
use crate::signal::{Signal, Signals};

const ERROR: &str = "e";
const COMMAND: &str = "u";

/// Discrete PID controller on the error input `e`, command output `u`.
///
/// ```text
/// u[k]     = Kp e[k] + Ki x_i[k] + Kd (e[k] - e[k-1]) / dt
/// x_i[k+1] = x_i[k] + dt e[k]
/// ```
///
/// Gains apply element-wise, so `e` may be any shape; the integral takes the
/// shape of the first error. The derivative term is zero on the first
/// activation after a reset. With limits set, both the command and the
/// integral are clamped to `[u_min, u_max]` (anti-windup).
pub struct Pid {
    name: String,
    inputs: Vec<InputSpec>,
    outputs: Vec<OutputSpec>,
    period: SamplePeriod,
    kp: f64,
    ki: f64,
    kd: f64,
    limits: Option<(f64, f64)>,
    integral: Option<Signal>,
    prev_error: Option<Signal>,
}

impl Pid {
    pub fn new(name: impl Into<String>, kp: f64, ki: f64, kd: f64) -> Self {
        Self {
            name: name.into(),
            inputs: vec![InputSpec::new(ERROR)],
            outputs: vec![OutputSpec::new(COMMAND)],
            period: SamplePeriod::Inherit,
            kp,
            ki,
            kd,
            limits: None,
            integral: None,
            prev_error: None,
        }
    }

    pub fn with_limits(mut self, u_min: f64, u_max: f64) -> Result<Self, BlockError> {
        if u_min > u_max {
            return Err(BlockError::compute(format!(
                "u_min {u_min} exceeds u_max {u_max}"
            )));
        }
        self.limits = Some((u_min, u_max));
        Ok(self)
    }

    pub fn with_period(mut self, period: SamplePeriod) -> Self {
        self.period = period;
        self
    }

    /// Current integral state, `None` before the first activation.
    pub fn integral(&self) -> Option<&Signal> {
        self.integral.as_ref()
    }

    fn clamp(&self, s: Signal) -> Signal {
        match self.limits {
            Some((lo, hi)) => s.map(|v| v.clamp(lo, hi)),
            None => s,
        }
    }

    fn integral_for(&self, e: &Signal) -> Result<Signal, BlockError> {
        match &self.integral {
            Some(x) if x.shape() != e.shape() => Err(BlockError::compute(format!(
                "error shape {} incompatible with integral shape {}",
                e.shape(),
                x.shape()
            ))),
            Some(x) => Ok(x.clone()),
            None => Ok(Signal::zeros(e.shape())),
        }
    }
}

impl Block for Pid {
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
        self.integral = None;
        self.prev_error = None;
        Ok(())
    }

    fn compute(&mut self, _t: f64, dt: f64, inputs: &Signals) -> Result<Signals, BlockError> {
        let e = input(inputs, ERROR)?;
        let x = self.integral_for(e)?;

        let derivative = match &self.prev_error {
            Some(prev) if dt > 0.0 => e
                .zip_with(prev, |e, p| (e - p) / dt)
                .ok_or_else(|| BlockError::compute("error shape changed between activations"))?,
            _ => Signal::zeros(e.shape()),
        };
        let (kp, ki, kd) = (self.kp, self.ki, self.kd);
        let u = e
            .zip_with(&x, |e, x| kp * e + ki * x)
            .and_then(|pi| pi.zip_with(&derivative, |pi, d| pi + kd * d))
            .ok_or_else(|| BlockError::compute("pid term shapes disagree"))?;

        let mut out = Signals::new();
        out.insert(COMMAND.to_string(), self.clamp(u));
        Ok(out)
    }

    fn update_state(&mut self, _t: f64, dt: f64, inputs: &Signals) -> Result<(), BlockError> {
        let e = input(inputs, ERROR)?;
        let x = self.integral_for(e)?;
        let next = x
            .zip_with(e, |x, e| x + dt * e)
            .ok_or_else(|| BlockError::compute("pid integral shape mismatch"))?;
        self.integral = Some(self.clamp(next));
        self.prev_error = Some(e.clone());
        Ok(())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
