//! 信号模块
//!
//! 端口之间流动的数值矩阵信号、形状以及信号路径。

// 子模块声明
mod path;
mod value;

// 重新导出公共接口
pub use path::SignalPath;
pub use value::{Shape, Signal, Signals};
