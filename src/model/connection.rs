//! 连线
//!
//! 源输出端口 → 目的输入端口。

use std::fmt;

/// 连线的一个端点（块名 + 端口名）
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Endpoint {
    pub block: String,
    pub port: String,
}

impl Endpoint {
    pub fn new(block: impl Into<String>, port: impl Into<String>) -> Endpoint {
        Endpoint {
            block: block.into(),
            port: port.into(),
        }
    }

    /// 解析 `block.port`
    pub fn parse(raw: &str) -> Option<Endpoint> {
        let (block, port) = raw.trim().split_once('.')?;
        if block.is_empty() || port.is_empty() || port.contains('.') {
            return None;
        }
        Some(Endpoint::new(block, port))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.block, self.port)
    }
}

/// 一条连线
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub src: Endpoint,
    pub dst: Endpoint,
}
