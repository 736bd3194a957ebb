//! 块接口模块
//!
//! 所有计算单元（块）都实现的能力接口：复位、计算、元信息查询，以及端口声明。

// 子模块声明
mod error;
mod period;
mod port;
mod traits;

// 重新导出公共接口
pub use error::BlockError;
pub use period::SamplePeriod;
pub use port::{InputSpec, OutputSpec, PortDirection};
pub use traits::{Block, input};
