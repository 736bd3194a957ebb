//! 端口声明
//!
//! 块对外声明的输入/输出端口，包括可选的默认值和静态形状。

use std::fmt;

use crate::signal::{Shape, Signal};

/// 端口方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortDirection {
    Input,
    Output,
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortDirection::Input => f.write_str("input"),
            PortDirection::Output => f.write_str("output"),
        }
    }
}

/// 输入端口声明
#[derive(Debug, Clone, PartialEq)]
pub struct InputSpec {
    pub name: String,
    /// 未连线时使用的值；没有连线也没有默认值会在 validate 阶段报错
    pub default: Option<Signal>,
    /// 静态期望形状（`None` 表示运行时首次取值时冻结）
    pub shape: Option<Shape>,
}

impl InputSpec {
    pub fn new(name: impl Into<String>) -> InputSpec {
        InputSpec {
            name: name.into(),
            default: None,
            shape: None,
        }
    }

    pub fn with_default(mut self, value: Signal) -> InputSpec {
        self.default = Some(value);
        self
    }

    pub fn with_shape(mut self, shape: Shape) -> InputSpec {
        self.shape = Some(shape);
        self
    }
}

/// 输出端口声明
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSpec {
    pub name: String,
    pub shape: Option<Shape>,
}

impl OutputSpec {
    pub fn new(name: impl Into<String>) -> OutputSpec {
        OutputSpec {
            name: name.into(),
            shape: None,
        }
    }

    pub fn with_shape(mut self, shape: Shape) -> OutputSpec {
        self.shape = Some(shape);
        self
    }
}
