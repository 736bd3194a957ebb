//! 激活日历
//!
//! 把每个块的采样周期换算成基本 tick 的整数倍，判断某个 tick 是否到期，
//! 并记录上一次激活时间以给出 `dt`。

use super::plan::ExecutionPlan;
use crate::block::SamplePeriod;
use crate::model::{BlockId, ModelError};

/// 周期必须是基本步长整数倍时允许的相对误差
pub const DEFAULT_PERIOD_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone)]
struct Activation {
    period: f64,
    period_ticks: u64,
    offset_ticks: u64,
    last_time: Option<f64>,
}

/// 单次运行的激活日历
#[derive(Debug, Clone)]
pub struct ActivationCalendar {
    base_step: f64,
    entries: Vec<Activation>,
}

impl ActivationCalendar {
    pub fn new(plan: &ExecutionPlan, base_step: f64) -> Result<Self, ModelError> {
        if !(base_step.is_finite() && base_step > 0.0) {
            return Err(ModelError::InvalidConfig(format!(
                "base step must be > 0, got {base_step}"
            )));
        }

        let mut entries = Vec::with_capacity(plan.len());
        for i in 0..plan.len() {
            let id = BlockId(i);
            let (period, offset) = match plan.period(id) {
                SamplePeriod::Inherit => (base_step, 0.0),
                SamplePeriod::Every { period, offset } => (period, offset),
            };
            let invalid = || ModelError::InvalidSamplePeriod {
                block: plan.name(id).to_string(),
                period,
                offset,
                base_step,
            };
            let period_ticks = to_ticks(period, base_step).filter(|&t| t > 0).ok_or_else(invalid)?;
            let offset_ticks = to_ticks(offset, base_step).ok_or_else(invalid)?;
            entries.push(Activation {
                period,
                period_ticks,
                offset_ticks,
                last_time: None,
            });
        }

        Ok(Self { base_step, entries })
    }

    pub fn base_step(&self) -> f64 {
        self.base_step
    }

    /// 第 `tick` 个基本 tick 的仿真时间
    pub fn time_of(&self, tick: u64) -> f64 {
        tick as f64 * self.base_step
    }

    pub fn period_ticks(&self, id: BlockId) -> u64 {
        self.entries[id.0].period_ticks
    }

    pub fn is_due(&self, id: BlockId, tick: u64) -> bool {
        let a = &self.entries[id.0];
        tick >= a.offset_ticks && (tick - a.offset_ticks) % a.period_ticks == 0
    }

    /// 不早于 `tick` 的下一个到期 tick
    pub fn next_due_tick(&self, id: BlockId, tick: u64) -> u64 {
        let a = &self.entries[id.0];
        if tick <= a.offset_ticks {
            return a.offset_ticks;
        }
        let since = tick - a.offset_ticks;
        let k = since.div_ceil(a.period_ticks);
        a.offset_ticks.saturating_add(k.saturating_mul(a.period_ticks))
    }

    pub fn next_due_time(&self, id: BlockId, tick: u64) -> f64 {
        self.time_of(self.next_due_tick(id, tick))
    }

    /// 距上一次激活的时间；首次激活取块自身周期
    pub fn dt(&self, id: BlockId, t: f64) -> f64 {
        let a = &self.entries[id.0];
        match a.last_time {
            Some(last) => t - last,
            None => a.period,
        }
    }

    pub fn mark_activated(&mut self, id: BlockId, t: f64) {
        self.entries[id.0].last_time = Some(t);
    }

    pub fn reset(&mut self) {
        for a in &mut self.entries {
            a.last_time = None;
        }
    }
}

/// `value / base` 在容差内为非负整数时返回该整数
fn to_ticks(value: f64, base: f64) -> Option<u64> {
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    let ratio = value / base;
    let rounded = ratio.round();
    if (ratio - rounded).abs() > DEFAULT_PERIOD_TOLERANCE * rounded.max(1.0) {
        return None;
    }
    Some(rounded as u64)
}

#[cfg(test)]
mod tests {
    use super::to_ticks;

    #[test]
    fn to_ticks_accepts_float_noise() {
        assert_eq!(to_ticks(0.3, 0.1), Some(3));
        assert_eq!(to_ticks(0.0, 0.1), Some(0));
        assert_eq!(to_ticks(0.15, 0.1), None);
        assert_eq!(to_ticks(-0.1, 0.1), None);
    }
}
