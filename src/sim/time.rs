//! 仿真时钟
//!
//! 单调的仿真时间：基本步长 + 当前 tick 序号。时间总是由 `tick * base_step`
//! 计算得到，不做累加，避免浮点漂移。

/// 仿真时钟
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationClock {
    base_step: f64,
    tick: u64,
}

impl SimulationClock {
    pub fn new(base_step: f64) -> SimulationClock {
        SimulationClock { base_step, tick: 0 }
    }

    pub fn base_step(&self) -> f64 {
        self.base_step
    }

    /// 下一个要执行的 tick 序号
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// 当前 tick 的仿真时间
    pub fn now(&self) -> f64 {
        self.tick as f64 * self.base_step
    }

    pub fn advance(&mut self) {
        self.tick = self.tick.saturating_add(1);
    }

    /// `[0, duration)` 内的 tick 数，至少为 1。
    pub fn ticks_for(duration: f64, base_step: f64) -> u64 {
        ((duration / base_step).round() as u64).max(1)
    }
}
