//! 采样周期
//!
//! 块自身的执行节拍：继承基本步长，或者显式周期（可带起始偏移）。

use serde::{Deserialize, Serialize};

/// 采样周期（秒）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplePeriod {
    /// 每个基本 tick 都执行
    #[default]
    Inherit,
    /// 在 `offset + k*period` 时刻执行
    Every { period: f64, offset: f64 },
}

impl SamplePeriod {
    pub fn every(period: f64) -> SamplePeriod {
        SamplePeriod::Every {
            period,
            offset: 0.0,
        }
    }

    pub fn with_offset(period: f64, offset: f64) -> SamplePeriod {
        SamplePeriod::Every { period, offset }
    }

    /// 配置里常见的写法：`None` 表示继承基本步长。
    pub fn from_option(period: Option<f64>) -> SamplePeriod {
        match period {
            Some(p) => SamplePeriod::every(p),
            None => SamplePeriod::Inherit,
        }
    }
}
