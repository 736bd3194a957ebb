//! 调度模块
//!
//! 把校验过的模型编译成执行计划（拓扑顺序 + 输入绑定），并按基本步长生成激活日历。

// 子模块声明
mod calendar;
mod plan;
mod topo;

// 重新导出公共接口
pub use calendar::{ActivationCalendar, DEFAULT_PERIOD_TOLERANCE};
pub use plan::{ExecutionPlan, InputBinding, Scheduler};
