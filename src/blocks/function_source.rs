use std::any::Any;

use super::{out_port, single_output};
use crate::block::{Block, BlockError, InputSpec, OutputSpec, SamplePeriod};
use crate::signal::{Shape, Signal, Signals};

type SourceFn = dyn Fn(f64, f64) -> Result<Signal, String> + Send;

/// User-supplied source `y = f(t, dt)`.
///
/// The function gets time explicitly and carries no state of its own, so the
/// block is stateless and repeated calls with the same `(t, dt)` give the same
/// output. Unless declared with [`FunctionSource::with_shape`], its output
/// shape is frozen by the runtime on the first call.
pub struct FunctionSource {
    name: String,
    outputs: Vec<OutputSpec>,
    period: SamplePeriod,
    func: Box<SourceFn>,
}

impl FunctionSource {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(f64, f64) -> Result<Signal, String> + Send + 'static,
    {
        Self {
            name: name.into(),
            outputs: out_port(),
            period: SamplePeriod::Inherit,
            func: Box::new(func),
        }
    }

    /// Convenience for infallible scalar functions.
    pub fn scalar<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(f64, f64) -> f64 + Send + 'static,
    {
        Self::new(name, move |t, dt| Ok(Signal::scalar(func(t, dt))))
    }

    pub fn with_period(mut self, period: SamplePeriod) -> Self {
        self.period = period;
        self
    }

    /// Declare the output shape. A value of any other shape is a `ShapeDrift`.
    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.outputs = vec![OutputSpec::new(super::OUT).with_shape(shape)];
        self
    }
}

impl Block for FunctionSource {
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

    fn compute(&mut self, t: f64, dt: f64, _inputs: &Signals) -> Result<Signals, BlockError> {
        let y = (self.func)(t, dt)
            .map_err(|e| BlockError::compute(format!("function call error: {e}")))?;
        Ok(single_output(y))
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
