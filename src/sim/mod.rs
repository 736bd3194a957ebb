//! 仿真核心模块
//!
//! 此模块包含离散时间步进运行时：仿真时钟、运行配置、信号记录与仿真器。

// 子模块声明
mod config;
mod error;
mod log;
mod ports;
mod simulator;
mod time;

// 重新导出公共接口
pub use config::{ClockMode, SimulationConfig};
pub use error::SimError;
pub use log::{LogRecord, LogSample, SignalLog, TickObserver};
pub use simulator::{Simulator, TickOutputs};
pub use time::SimulationClock;
