//! 块级错误
//!
//! 在 `compute`/`update_state` 内部出现的运行期失败。

use thiserror::Error;

use crate::cosim::TransportError;
use crate::signal::Shape;

/// 块在激活期间的失败；由仿真器附加块名与仿真时间后上报。
#[derive(Debug, Error)]
pub enum BlockError {
    /// 端口形状在首次冻结后发生变化
    #[error("shape drift on port '{port}': frozen as {expected}, got {got}")]
    ShapeDrift {
        port: String,
        expected: Shape,
        got: Shape,
    },
    #[error("input '{0}' has no value")]
    MissingInput(String),
    #[error("declared output '{0}' was not produced")]
    MissingOutput(String),
    #[error("undeclared output '{0}' was produced")]
    UnexpectedOutput(String),
    #[error("plant communication failed: {0}")]
    PlantCommunication(#[from] TransportError),
    #[error("{0}")]
    Compute(String),
}

impl BlockError {
    pub fn compute(msg: impl Into<String>) -> BlockError {
        BlockError::Compute(msg.into())
    }
}
