use std::any::Any;

use super::{numbered_inputs, out_port, single_output};
use crate::block::{Block, BlockError, InputSpec, OutputSpec, SamplePeriod, input};
use crate::signal::{Signal, Signals};

/// Element-wise product/quotient over `in1..inN`; `ops` holds `*` or `/` per input.
pub struct Product {
    name: String,
    inputs: Vec<InputSpec>,
    outputs: Vec<OutputSpec>,
    period: SamplePeriod,
    divide: Vec<bool>,
}

impl Product {
    pub fn new(name: impl Into<String>, ops: &str) -> Result<Self, BlockError> {
        let divide = ops
            .chars()
            .map(|c| match c {
                '*' => Ok(false),
                '/' => Ok(true),
                other => Err(BlockError::compute(format!("invalid operator '{other}' in '{ops}'"))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        if divide.is_empty() {
            return Err(BlockError::compute("product needs at least one input"));
        }
        Ok(Self {
            name: name.into(),
            inputs: numbered_inputs(divide.len()),
            outputs: out_port(),
            period: SamplePeriod::Inherit,
            divide,
        })
    }

    pub fn with_period(mut self, period: SamplePeriod) -> Self {
        self.period = period;
        self
    }
}

impl Block for Product {
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
        let mut acc: Option<Signal> = None;
        for (spec, &div) in self.inputs.iter().zip(&self.divide) {
            let u = input(inputs, &spec.name)?;
            let term = if div { u.map(|v| 1.0 / v) } else { u.clone() };
            acc = Some(match acc {
                None => term,
                Some(prev) => prev.zip_with(&term, |a, b| a * b).ok_or_else(|| {
                    BlockError::compute(format!("input '{}' shape {} does not match", spec.name, u.shape()))
                })?,
            });
        }
        let y = acc.ok_or_else(|| BlockError::compute("product has no inputs"))?;
        Ok(single_output(y))
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
