//! 模型图模块
//!
//! 积累块与端口到端口的连线，并在编译前做结构校验。

// 子模块声明
mod connection;
mod error;
mod graph;
mod id;

// 重新导出公共接口
pub use connection::{Connection, Endpoint};
pub use error::ModelError;
pub use graph::Model;
pub use id::BlockId;
