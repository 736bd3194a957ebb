//! 运行配置
//!
//! 只包含执行相关参数（步长、时长、记录的信号、时钟模式），不包含任何块参数。

use serde::{Deserialize, Serialize};

use crate::model::ModelError;
use crate::signal::SignalPath;

/// 时钟归属
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockMode {
    /// 引擎自己推进时间（`Simulator::run`）
    #[default]
    Internal,
    /// 外部进程持有时钟，每步调用一次 `step_tick`
    External,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// 基本步长（秒）
    pub dt: f64,
    /// 仿真时长（秒）
    #[serde(rename = "T")]
    pub duration: f64,
    #[serde(default)]
    pub logging: Vec<String>,
    #[serde(default)]
    pub clock: ClockMode,
}

impl SimulationConfig {
    pub fn new(dt: f64, duration: f64) -> SimulationConfig {
        SimulationConfig {
            dt,
            duration,
            logging: Vec::new(),
            clock: ClockMode::Internal,
        }
    }

    pub fn with_logging<S: Into<String>>(mut self, paths: impl IntoIterator<Item = S>) -> Self {
        self.logging = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_clock(mut self, clock: ClockMode) -> Self {
        self.clock = clock;
        self
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(ModelError::InvalidConfig(format!(
                "dt must be > 0, got {}",
                self.dt
            )));
        }
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(ModelError::InvalidConfig(format!(
                "T must be > 0, got {}",
                self.duration
            )));
        }
        for raw in &self.logging {
            SignalPath::parse(raw).map_err(|_| ModelError::UnknownSignalPath(raw.clone()))?;
        }
        Ok(())
    }
}
