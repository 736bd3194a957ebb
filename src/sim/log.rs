//! 信号记录
//!
//! 每条被请求的输出路径对应一条 `LogRecord`，生产块每次到期激活追加一个样本。
//! 记录只由仿真器追加；一个 tick 成功结束后才写入。

use serde::{Deserialize, Serialize};

use crate::signal::{Signal, SignalPath};

/// 单个样本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSample {
    pub t: f64,
    pub value: Signal,
}

/// 某条信号路径的样本序列（只追加）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub path: SignalPath,
    pub samples: Vec<LogSample>,
}

impl LogRecord {
    pub fn new(path: SignalPath) -> LogRecord {
        LogRecord {
            path,
            samples: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn times(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.t).collect()
    }

    /// 只适用于标量信号；非标量样本被跳过
    pub fn scalars(&self) -> Vec<f64> {
        self.samples
            .iter()
            .filter_map(|s| s.value.as_scalar())
            .collect()
    }

    pub fn last(&self) -> Option<&LogSample> {
        self.samples.last()
    }
}

/// 一次运行的全部记录，顺序与请求顺序一致
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalLog {
    records: Vec<LogRecord>,
}

impl SignalLog {
    pub(crate) fn with_paths(paths: impl IntoIterator<Item = SignalPath>) -> SignalLog {
        SignalLog {
            records: paths.into_iter().map(LogRecord::new).collect(),
        }
    }

    pub(crate) fn append(&mut self, idx: usize, t: f64, value: Signal) {
        self.records[idx].samples.push(LogSample { t, value });
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    /// 按路径查找；接受 `a.outputs.out` 或 `a.out`
    pub fn get(&self, path: &str) -> Option<&LogRecord> {
        let path = SignalPath::parse(path).ok()?;
        self.records.iter().find(|r| r.path == path)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// 运行中逐 tick 推送记录（流式导出）
pub trait TickObserver {
    fn on_tick(&mut self, _t: f64, _tick: u64, _records: &[(SignalPath, Signal)]) {}
}

impl TickObserver for () {}
