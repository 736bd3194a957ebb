//! Signal generators with no inputs: `y = f(t)`.

use std::any::Any;
use std::f64::consts::PI;

use super::{out_port, single_output};
use crate::block::{Block, BlockError, InputSpec, OutputSpec, SamplePeriod};
use crate::signal::{Signal, Signals};

const TIME_EPS: f64 = 1e-12;

macro_rules! source_boilerplate {
    () => {
        fn name(&self) -> &str {
            &self.name
        }

        fn inputs(&self) -> &[InputSpec] {
            &[]
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

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    };
}

/// Constant output.
pub struct Constant {
    name: String,
    outputs: Vec<OutputSpec>,
    period: SamplePeriod,
    value: Signal,
}

impl Constant {
    pub fn new(name: impl Into<String>, value: impl Into<Signal>) -> Self {
        let value = value.into();
        Self {
            name: name.into(),
            outputs: vec![OutputSpec::new(super::OUT).with_shape(value.shape())],
            period: SamplePeriod::Inherit,
            value,
        }
    }

    pub fn with_period(mut self, period: SamplePeriod) -> Self {
        self.period = period;
        self
    }
}

impl Block for Constant {
    source_boilerplate!();

    fn compute(&mut self, _t: f64, _dt: f64, _inputs: &Signals) -> Result<Signals, BlockError> {
        Ok(single_output(self.value.clone()))
    }
}

/// Step from `before` to `after` at `step_time`.
pub struct Step {
    name: String,
    outputs: Vec<OutputSpec>,
    period: SamplePeriod,
    step_time: f64,
    before: Signal,
    after: Signal,
}

impl Step {
    pub fn new(
        name: impl Into<String>,
        step_time: f64,
        before: impl Into<Signal>,
        after: impl Into<Signal>,
    ) -> Result<Self, BlockError> {
        let (before, after) = (before.into(), after.into());
        if before.shape() != after.shape() {
            return Err(BlockError::compute(format!(
                "step values must share a shape, got {} and {}",
                before.shape(),
                after.shape()
            )));
        }
        Ok(Self {
            name: name.into(),
            outputs: out_port(),
            period: SamplePeriod::Inherit,
            step_time,
            before,
            after,
        })
    }

    pub fn with_period(mut self, period: SamplePeriod) -> Self {
        self.period = period;
        self
    }
}

impl Block for Step {
    source_boilerplate!();

    fn compute(&mut self, t: f64, _dt: f64, _inputs: &Signals) -> Result<Signals, BlockError> {
        let y = if t + TIME_EPS < self.step_time {
            &self.before
        } else {
            &self.after
        };
        Ok(single_output(y.clone()))
    }
}

/// `y = offset + slope * max(0, t - start_time)`.
pub struct Ramp {
    name: String,
    outputs: Vec<OutputSpec>,
    period: SamplePeriod,
    slope: Signal,
    start_time: f64,
    offset: Signal,
}

impl Ramp {
    pub fn new(
        name: impl Into<String>,
        slope: impl Into<Signal>,
        start_time: f64,
        offset: impl Into<Signal>,
    ) -> Result<Self, BlockError> {
        let (slope, offset) = (slope.into(), offset.into());
        if slope.shape() != offset.shape() {
            return Err(BlockError::compute(format!(
                "ramp slope {} and offset {} must share a shape",
                slope.shape(),
                offset.shape()
            )));
        }
        Ok(Self {
            name: name.into(),
            outputs: out_port(),
            period: SamplePeriod::Inherit,
            slope,
            start_time,
            offset,
        })
    }

    pub fn with_period(mut self, period: SamplePeriod) -> Self {
        self.period = period;
        self
    }
}

impl Block for Ramp {
    source_boilerplate!();

    fn compute(&mut self, t: f64, _dt: f64, _inputs: &Signals) -> Result<Signals, BlockError> {
        let elapsed = (t - self.start_time).max(0.0);
        let y = self
            .offset
            .zip_with(&self.slope, |o, s| o + s * elapsed)
            .ok_or_else(|| BlockError::compute("ramp shape mismatch"))?;
        Ok(single_output(y))
    }
}

/// `y = offset + amplitude * sin(2*pi*frequency*t + phase)`, scalar.
pub struct Sinusoidal {
    name: String,
    outputs: Vec<OutputSpec>,
    period: SamplePeriod,
    amplitude: f64,
    frequency: f64,
    phase: f64,
    offset: f64,
}

impl Sinusoidal {
    pub fn new(name: impl Into<String>, amplitude: f64, frequency: f64) -> Self {
        Self {
            name: name.into(),
            outputs: vec![OutputSpec::new(super::OUT).with_shape(crate::signal::Shape::SCALAR)],
            period: SamplePeriod::Inherit,
            amplitude,
            frequency,
            phase: 0.0,
            offset: 0.0,
        }
    }

    pub fn with_phase(mut self, phase: f64) -> Self {
        self.phase = phase;
        self
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_period(mut self, period: SamplePeriod) -> Self {
        self.period = period;
        self
    }
}

impl Block for Sinusoidal {
    source_boilerplate!();

    fn compute(&mut self, t: f64, _dt: f64, _inputs: &Signals) -> Result<Signals, BlockError> {
        let y = self.offset + self.amplitude * (2.0 * PI * self.frequency * t + self.phase).sin();
        Ok(single_output(Signal::scalar(y)))
    }
}
