//! 块 trait
//!
//! 调度器只通过这个接口与具体块交互；新增块类型只需实现它，不需要改动调度器。

use std::any::Any;

use super::error::BlockError;
use super::period::SamplePeriod;
use super::port::{InputSpec, OutputSpec};
use crate::signal::{Signal, Signals};

/// 块接口
///
/// 一次激活分两阶段：
/// 1. `compute`：输出阶段，按计划顺序逐块调用，返回本 tick 的输出；
/// 2. `update_state`：状态阶段，本 tick 所有到期块都产出输出之后再调用，
///    此时输入已全部解析，用于形成下一步状态 `x[k+1]`。
///
/// `direct_feedthrough() == false` 的块在 `compute` 中只能依赖先前状态。
/// 时间与步长总是显式传入，块不得读取墙钟或全局时间。
pub trait Block: Any + Send {
    /// 块的唯一名称
    fn name(&self) -> &str;

    fn inputs(&self) -> &[InputSpec];

    fn outputs(&self) -> &[OutputSpec];

    fn has_state(&self) -> bool {
        false
    }

    fn direct_feedthrough(&self) -> bool {
        true
    }

    fn sample_period(&self) -> SamplePeriod {
        SamplePeriod::Inherit
    }

    /// 初始化/复位内部状态；必须幂等，运行开始前调用一次。
    fn reset(&mut self) -> Result<(), BlockError>;

    /// 输出阶段：`(t, dt, inputs, 先前状态)` 的纯函数。
    fn compute(&mut self, t: f64, dt: f64, inputs: &Signals) -> Result<Signals, BlockError>;

    /// 状态阶段：默认无状态，什么也不做。
    fn update_state(&mut self, _t: f64, _dt: f64, _inputs: &Signals) -> Result<(), BlockError> {
        Ok(())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// 从输入集合中取出某个端口的值
pub fn input<'a>(inputs: &'a Signals, port: &str) -> Result<&'a Signal, BlockError> {
    inputs
        .get(port)
        .ok_or_else(|| BlockError::MissingInput(port.to_string()))
}
