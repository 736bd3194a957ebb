use std::any::Any;

use super::{numbered_inputs, out_port, single_output};
use crate::block::{Block, BlockError, InputSpec, OutputSpec, SamplePeriod, input};
use crate::signal::{Signal, Signals};

/// Weighted sum `y = sum(s_i * in_i)` over ports `in1..inN`.
pub struct Sum {
    name: String,
    inputs: Vec<InputSpec>,
    outputs: Vec<OutputSpec>,
    period: SamplePeriod,
    signs: Vec<f64>,
}

impl Sum {
    pub fn new(name: impl Into<String>, signs: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            inputs: numbered_inputs(signs.len()),
            outputs: out_port(),
            period: SamplePeriod::Inherit,
            signs,
        }
    }

    /// Parse a sign string such as `"+-"`, one character per input.
    pub fn from_signs(name: impl Into<String>, signs: &str) -> Result<Self, BlockError> {
        let parsed = signs
            .chars()
            .map(|c| match c {
                '+' => Ok(1.0),
                '-' => Ok(-1.0),
                other => Err(BlockError::compute(format!("invalid sign '{other}' in '{signs}'"))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        if parsed.is_empty() {
            return Err(BlockError::compute("sum needs at least one input"));
        }
        Ok(Self::new(name, parsed))
    }

    pub fn with_period(mut self, period: SamplePeriod) -> Self {
        self.period = period;
        self
    }
}

impl Block for Sum {
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
        let mut total: Option<Signal> = None;
        for (spec, &s) in self.inputs.iter().zip(&self.signs) {
            let u = input(inputs, &spec.name)?;
            total = Some(match total {
                None => u.map(|v| s * v),
                Some(acc) => acc.zip_with(u, |a, b| a + s * b).ok_or_else(|| {
                    BlockError::compute(format!("input '{}' shape {} does not match", spec.name, u.shape()))
                })?,
            });
        }
        let total = total.ok_or_else(|| BlockError::compute("sum has no inputs"))?;
        Ok(single_output(total))
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
