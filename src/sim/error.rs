//! 运行期错误
//!
//! 运行期失败会在当前 tick 中止运行，并带上出错块的名字和仿真时间。

use thiserror::Error;

use crate::block::BlockError;
use crate::model::ModelError;

#[derive(Debug, Error)]
pub enum SimError {
    /// 编译期错误（在任何 tick 之前）
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("block '{block}' failed at t={time}: {source}")]
    Block {
        block: String,
        time: f64,
        #[source]
        source: BlockError,
    },
    #[error("'{0}' is not an external input block")]
    UnknownExternalInput(String),
    #[error("simulation has not been started")]
    NotStarted,
    #[error("simulation aborted by an earlier failure")]
    Faulted,
}

impl SimError {
    /// 出错块名与仿真时间（仅运行期块错误）
    pub fn failure_site(&self) -> Option<(&str, f64)> {
        match self {
            SimError::Block { block, time, .. } => Some((block.as_str(), *time)),
            _ => None,
        }
    }

    pub fn block_error(&self) -> Option<&BlockError> {
        match self {
            SimError::Block { source, .. } => Some(source),
            _ => None,
        }
    }
}
