//! 运行期端口槽位
//!
//! 保存每个端口的当前值和冻结后的形状；值在端口之间按拷贝传递。

use crate::block::BlockError;
use crate::signal::{Shape, Signal};

#[derive(Debug, Clone, Default)]
pub(crate) struct PortSlot {
    shape: Option<Shape>,
    value: Option<Signal>,
}

impl PortSlot {
    /// 带声明形状的槽位；`None` 时由首次取值冻结
    pub(crate) fn declared(shape: Option<Shape>) -> PortSlot {
        PortSlot { shape, value: None }
    }

    pub(crate) fn value(&self) -> Option<&Signal> {
        self.value.as_ref()
    }

    /// 形状已声明或已冻结时必须一致，否则 `ShapeDrift`；未声明时首次取值冻结形状
    pub(crate) fn check_shape(&mut self, port: &str, value: &Signal) -> Result<(), BlockError> {
        match self.shape {
            None => {
                self.shape = Some(value.shape());
                Ok(())
            }
            Some(expected) if expected == value.shape() => Ok(()),
            Some(expected) => Err(BlockError::ShapeDrift {
                port: port.to_string(),
                expected,
                got: value.shape(),
            }),
        }
    }

    pub(crate) fn set(&mut self, value: Signal) {
        self.value = Some(value);
    }
}

/// 全部块的输入/输出槽位，按 `BlockId` 与端口序号索引
#[derive(Debug, Clone, Default)]
pub(crate) struct PortTable {
    pub(crate) inputs: Vec<Vec<PortSlot>>,
    pub(crate) outputs: Vec<Vec<PortSlot>>,
}

/// 一个块各端口的声明形状：`(输入, 输出)`
pub(crate) type DeclaredShapes = (Vec<Option<Shape>>, Vec<Option<Shape>>);

impl PortTable {
    pub(crate) fn new(declared: impl Iterator<Item = DeclaredShapes>) -> PortTable {
        let mut table = PortTable::default();
        for (inputs, outputs) in declared {
            table
                .inputs
                .push(inputs.into_iter().map(PortSlot::declared).collect());
            table
                .outputs
                .push(outputs.into_iter().map(PortSlot::declared).collect());
        }
        table
    }
}
