//! 步进协议消息
//!
//! 进程传输按行发送 JSON；线程传输直接在通道上传递同样的消息。

use serde::{Deserialize, Serialize};

use super::transport::TransportError;
use crate::signal::Signals;

/// 引擎 → 外部步进器
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlantRequest {
    /// 用这些输入推进恰好一步
    Step { inputs: Signals },
    /// 回到初始状态，应答 `Ack`
    Reset,
    Close,
}

/// 外部步进器 → 引擎
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlantResponse {
    Outputs { outputs: Signals },
    Ack,
    Error { message: String },
}

impl PlantResponse {
    pub(crate) fn into_outputs(self) -> Result<Signals, TransportError> {
        match self {
            PlantResponse::Outputs { outputs } => Ok(outputs),
            PlantResponse::Ack => Err(TransportError::Protocol(
                "expected outputs, got ack".to_string(),
            )),
            PlantResponse::Error { message } => Err(TransportError::Remote(message)),
        }
    }

    pub(crate) fn into_ack(self) -> Result<(), TransportError> {
        match self {
            PlantResponse::Ack => Ok(()),
            PlantResponse::Outputs { .. } => Err(TransportError::Protocol(
                "expected ack, got outputs".to_string(),
            )),
            PlantResponse::Error { message } => Err(TransportError::Remote(message)),
        }
    }
}
