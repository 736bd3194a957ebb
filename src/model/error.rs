//! 编译期错误
//!
//! 图校验与执行计划编译时产生的错误；任何一个都会阻止运行开始。

use thiserror::Error;

use super::connection::Endpoint;
use crate::block::PortDirection;
use crate::signal::Shape;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("block name '{0}' already exists")]
    DuplicateName(String),
    #[error("unknown port '{0}'")]
    UnknownPort(Endpoint),
    #[error("port '{endpoint}' is not an {expected} port")]
    PortDirection {
        endpoint: Endpoint,
        expected: PortDirection,
    },
    #[error("input '{dst}' is already connected to '{existing}'")]
    PortAlreadyConnected { dst: Endpoint, existing: Endpoint },
    #[error("input '{0}' has neither a connection nor a default value")]
    UnboundInput(Endpoint),
    #[error("shape mismatch between '{src}' {src_shape} and '{dst}' {dst_shape}")]
    ShapeMismatch {
        src: Endpoint,
        src_shape: Shape,
        dst: Endpoint,
        dst_shape: Shape,
    },
    /// 全部由直通块组成的环，没有有状态块打断
    #[error("algebraic loop detected through blocks [{}]", .blocks.join(" -> "))]
    AlgebraicLoop { blocks: Vec<String> },
    #[error("block '{block}': sample period {period} (offset {offset}) is not a multiple of base step {base_step}")]
    InvalidSamplePeriod {
        block: String,
        period: f64,
        offset: f64,
        base_step: f64,
    },
    #[error("unknown signal path '{0}'")]
    UnknownSignalPath(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
