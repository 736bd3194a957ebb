//! 信号值
//!
//! 定义二维（行优先）数值矩阵信号及其形状。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 按端口名索引的一组信号。使用有序 map，保证遍历顺序确定。
pub type Signals = BTreeMap<String, Signal>;

/// 信号形状（行 × 列）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    pub rows: usize,
    pub cols: usize,
}

impl Shape {
    pub const SCALAR: Shape = Shape { rows: 1, cols: 1 };

    pub fn new(rows: usize, cols: usize) -> Shape {
        Shape { rows, cols }
    }

    /// 列向量 (n,1)
    pub fn column(n: usize) -> Shape {
        Shape { rows: n, cols: 1 }
    }

    pub fn len(&self) -> usize {
        self.rows.saturating_mul(self.cols)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.rows, self.cols)
    }
}

/// 数值信号：行优先存储的 `f64` 矩阵，标量即 1×1。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSignal", into = "RawSignal")]
pub struct Signal {
    shape: Shape,
    data: Vec<f64>,
}

#[derive(Serialize, Deserialize)]
struct RawSignal {
    shape: [usize; 2],
    data: Vec<f64>,
}

impl TryFrom<RawSignal> for Signal {
    type Error = String;

    fn try_from(raw: RawSignal) -> Result<Self, Self::Error> {
        Signal::from_rows_cols(raw.shape[0], raw.shape[1], raw.data)
    }
}

impl From<Signal> for RawSignal {
    fn from(sig: Signal) -> Self {
        RawSignal {
            shape: [sig.shape.rows, sig.shape.cols],
            data: sig.data,
        }
    }
}

impl Signal {
    pub fn scalar(v: f64) -> Signal {
        Signal {
            shape: Shape::SCALAR,
            data: vec![v],
        }
    }

    pub fn zeros(shape: Shape) -> Signal {
        Signal {
            shape,
            data: vec![0.0; shape.len()],
        }
    }

    pub fn filled(shape: Shape, v: f64) -> Signal {
        Signal {
            shape,
            data: vec![v; shape.len()],
        }
    }

    /// 列向量 (n,1)
    pub fn column(values: impl Into<Vec<f64>>) -> Signal {
        let data = values.into();
        Signal {
            shape: Shape::column(data.len()),
            data,
        }
    }

    /// 行向量 (1,n)
    pub fn row(values: impl Into<Vec<f64>>) -> Signal {
        let data = values.into();
        Signal {
            shape: Shape::new(1, data.len()),
            data,
        }
    }

    /// 由行优先数据构造；数据长度必须等于 rows*cols。
    pub fn from_rows_cols(rows: usize, cols: usize, data: Vec<f64>) -> Result<Signal, String> {
        let shape = Shape::new(rows, cols);
        if data.len() != shape.len() {
            return Err(format!(
                "signal data has {} elements but shape {shape} needs {}",
                data.len(),
                shape.len()
            ));
        }
        Ok(Signal { shape, data })
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn is_scalar(&self) -> bool {
        self.shape == Shape::SCALAR
    }

    /// 若为 1×1 则返回其值
    pub fn as_scalar(&self) -> Option<f64> {
        self.is_scalar().then(|| self.data[0])
    }

    /// 行优先取元素
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.shape.rows || col >= self.shape.cols {
            return None;
        }
        self.data.get(row * self.shape.cols + col).copied()
    }

    /// 逐元素映射，形状不变
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Signal {
        Signal {
            shape: self.shape,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// 逐元素二元运算；形状不一致返回 `None`。
    pub fn zip_with(&self, other: &Signal, f: impl Fn(f64, f64) -> f64) -> Option<Signal> {
        if self.shape != other.shape {
            return None;
        }
        Some(Signal {
            shape: self.shape,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        })
    }

    /// 矩阵乘法 `self @ rhs`；内维不匹配返回 `None`。
    pub fn matmul(&self, rhs: &Signal) -> Option<Signal> {
        if self.shape.cols != rhs.shape.rows {
            return None;
        }
        let (m, k, n) = (self.shape.rows, self.shape.cols, rhs.shape.cols);
        let mut out = vec![0.0; m * n];
        for i in 0..m {
            for j in 0..n {
                let mut acc = 0.0;
                for p in 0..k {
                    acc += self.data[i * k + p] * rhs.data[p * n + j];
                }
                out[i * n + j] = acc;
            }
        }
        Some(Signal {
            shape: Shape::new(m, n),
            data: out,
        })
    }
}

impl From<f64> for Signal {
    fn from(v: f64) -> Self {
        Signal::scalar(v)
    }
}
