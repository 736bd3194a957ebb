//! 联合仿真块
//!
//! 引擎为主模式下的外部步进器代理。每次激活恰好请求一步。

use std::any::Any;

use super::transport::PlantTransport;
use crate::block::{Block, BlockError, InputSpec, OutputSpec, SamplePeriod};
use crate::signal::Signals;
use tracing::debug;

/// 把外部步进器包装成块
///
/// - 直通（默认）：`compute` 把本 tick 输入发出去，返回的输出即本 tick 输出；
/// - 非直通：`compute` 返回上一步拿到的输出（首次为初始输出），
///   `update_state` 再用本 tick 输入推进外部一步。可用来打断经过外部系统的环。
pub struct CosimBlock {
    name: String,
    inputs: Vec<InputSpec>,
    outputs: Vec<OutputSpec>,
    period: SamplePeriod,
    feedthrough: bool,
    initial_outputs: Signals,
    held: Signals,
    transport: Box<dyn PlantTransport>,
}

impl CosimBlock {
    pub fn new<S: AsRef<str>>(
        name: impl Into<String>,
        inputs: &[S],
        outputs: &[S],
        transport: impl PlantTransport + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            inputs: inputs.iter().map(|p| InputSpec::new(p.as_ref())).collect(),
            outputs: outputs.iter().map(|p| OutputSpec::new(p.as_ref())).collect(),
            period: SamplePeriod::Inherit,
            feedthrough: true,
            initial_outputs: Signals::new(),
            held: Signals::new(),
            transport: Box::new(transport),
        }
    }

    /// 非直通模式，`initial_outputs` 作为第一步之前的输出
    pub fn delayed(mut self, initial_outputs: Signals) -> Self {
        self.feedthrough = false;
        self.initial_outputs = initial_outputs;
        self
    }

    pub fn with_period(mut self, period: SamplePeriod) -> Self {
        self.period = period;
        self
    }

    fn exchange(&mut self, inputs: &Signals) -> Result<Signals, BlockError> {
        debug!(block = %self.name, "请求外部步进");
        Ok(self.transport.step(inputs)?)
    }
}

impl Block for CosimBlock {
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
        self.feedthrough
    }

    fn sample_period(&self) -> SamplePeriod {
        self.period
    }

    fn reset(&mut self) -> Result<(), BlockError> {
        self.held = self.initial_outputs.clone();
        if !self.transport.is_open() {
            self.transport.open()?;
        }
        debug!(block = %self.name, "复位外部步进器");
        self.transport.reset()?;
        Ok(())
    }

    fn compute(&mut self, _t: f64, _dt: f64, inputs: &Signals) -> Result<Signals, BlockError> {
        if self.feedthrough {
            self.exchange(inputs)
        } else {
            Ok(self.held.clone())
        }
    }

    fn update_state(&mut self, _t: f64, _dt: f64, inputs: &Signals) -> Result<(), BlockError> {
        if !self.feedthrough {
            self.held = self.exchange(inputs)?;
        }
        Ok(())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
