//! 传输接口
//!
//! 外部步进器的同步调用边界：`open`/`reset`/`step`/`close`。

use std::time::Duration;

use thiserror::Error;

use crate::signal::Signals;

/// 与外部步进器通信失败；对当前运行是致命的，不做自动重试。
///
/// `Timeout` 与 `Closed` 之后传输会丢弃 worker（`is_open()` 为 false），
/// 迟到的应答不会被下一次请求读到。
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport is not open")]
    NotOpen,
    #[error("failed to start plant worker: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("plant worker did not answer within {0:?}")]
    Timeout(Duration),
    #[error("plant worker closed the connection")]
    Closed,
    #[error("malformed message from plant worker: {0}")]
    Protocol(String),
    #[error("plant worker reported an error: {0}")]
    Remote(String),
}

/// 外部步进器传输
pub trait PlantTransport: Send {
    fn open(&mut self) -> Result<(), TransportError>;

    fn is_open(&self) -> bool;

    /// 发送输入、请求恰好一步外部步进，并阻塞等待输出
    fn step(&mut self, inputs: &Signals) -> Result<Signals, TransportError>;

    /// 让外部步进器回到初始状态；每次运行开始前调用
    fn reset(&mut self) -> Result<(), TransportError>;

    fn close(&mut self) -> Result<(), TransportError>;
}
