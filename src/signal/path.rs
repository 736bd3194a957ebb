//! 信号路径
//!
//! 记录/导出时用来引用某个块的输出端口：`<block>.outputs.<port>`。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 输出信号路径
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SignalPath {
    pub block: String,
    pub port: String,
}

impl SignalPath {
    pub fn new(block: impl Into<String>, port: impl Into<String>) -> SignalPath {
        SignalPath {
            block: block.into(),
            port: port.into(),
        }
    }

    /// 解析 `a.outputs.out`，也接受简写 `a.out`。
    pub fn parse(raw: &str) -> Result<SignalPath, String> {
        let parts: Vec<&str> = raw.trim().split('.').collect();
        let (block, port) = match parts.as_slice() {
            [block, "outputs", port] => (*block, *port),
            [block, port] => (*block, *port),
            _ => return Err(format!("malformed signal path: {raw}")),
        };
        if block.is_empty() || port.is_empty() {
            return Err(format!("malformed signal path: {raw}"));
        }
        Ok(SignalPath::new(block, port))
    }
}

impl fmt::Display for SignalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.outputs.{}", self.block, self.port)
    }
}

impl FromStr for SignalPath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SignalPath::parse(s)
    }
}

impl TryFrom<String> for SignalPath {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        SignalPath::parse(&s)
    }
}

impl From<SignalPath> for String {
    fn from(p: SignalPath) -> Self {
        p.to_string()
    }
}
