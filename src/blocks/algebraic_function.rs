use std::any::Any;

use crate::block::{Block, BlockError, InputSpec, OutputSpec, SamplePeriod};
use crate::signal::Signals;

type AlgebraicFn = dyn Fn(f64, f64, &Signals) -> Result<Signals, String> + Send;

/// User-supplied stateless map `y = g(t, dt, u1, ..., un)`.
///
/// Direct feedthrough. The function receives every input by port name and
/// must return exactly the declared outputs; the runtime rejects missing or
/// extra keys and freezes each port's shape on first use.
pub struct AlgebraicFunction {
    name: String,
    inputs: Vec<InputSpec>,
    outputs: Vec<OutputSpec>,
    period: SamplePeriod,
    func: Box<AlgebraicFn>,
}

impl AlgebraicFunction {
    pub fn new<S, F>(
        name: impl Into<String>,
        inputs: &[S],
        outputs: &[S],
        func: F,
    ) -> Result<Self, BlockError>
    where
        S: AsRef<str>,
        F: Fn(f64, f64, &Signals) -> Result<Signals, String> + Send + 'static,
    {
        if inputs.is_empty() {
            return Err(BlockError::compute("algebraic function needs at least one input"));
        }
        if outputs.is_empty() {
            return Err(BlockError::compute("algebraic function needs at least one output"));
        }
        Ok(Self {
            name: name.into(),
            inputs: inputs.iter().map(|p| InputSpec::new(p.as_ref())).collect(),
            outputs: outputs.iter().map(|p| OutputSpec::new(p.as_ref())).collect(),
            period: SamplePeriod::Inherit,
            func: Box::new(func),
        })
    }

    pub fn with_period(mut self, period: SamplePeriod) -> Self {
        self.period = period;
        self
    }
}

impl Block for AlgebraicFunction {
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

    fn compute(&mut self, t: f64, dt: f64, inputs: &Signals) -> Result<Signals, BlockError> {
        if let Some(spec) = self.inputs.iter().find(|s| !inputs.contains_key(&s.name)) {
            return Err(BlockError::MissingInput(spec.name.clone()));
        }
        (self.func)(t, dt, inputs)
            .map_err(|e| BlockError::compute(format!("function call error: {e}")))
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
