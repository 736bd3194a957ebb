//! 模型图
//!
//! 保存块与连线，负责扇入/扇出规则和编译前校验。图一旦编译进执行计划就不再修改。

use std::collections::HashMap;

use super::connection::{Connection, Endpoint};
use super::error::ModelError;
use super::id::BlockId;
use crate::block::{Block, PortDirection};
use tracing::{debug, trace};

/// 块图模型
#[derive(Default)]
pub struct Model {
    name: String,
    blocks: Vec<Box<dyn Block>>,
    by_name: HashMap<String, BlockId>,
    connections: Vec<Connection>,
    /// (目的块, 输入序号) -> (源块, 输出序号)
    incoming: HashMap<(BlockId, usize), (BlockId, usize)>,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 添加块；同名块已存在时失败
    pub fn add_block<B: Block>(&mut self, block: B) -> Result<BlockId, ModelError> {
        self.add_boxed(Box::new(block))
    }

    pub fn add_boxed(&mut self, block: Box<dyn Block>) -> Result<BlockId, ModelError> {
        let name = block.name().to_string();
        if self.by_name.contains_key(&name) {
            return Err(ModelError::DuplicateName(name));
        }
        let id = BlockId(self.blocks.len());
        debug!(block = %name, id = id.0, "添加块");
        self.by_name.insert(name, id);
        self.blocks.push(block);
        Ok(id)
    }

    /// 连接 `src_block.src_port`（输出）到 `dst_block.dst_port`（输入）
    pub fn connect(
        &mut self,
        src_block: &str,
        src_port: &str,
        dst_block: &str,
        dst_port: &str,
    ) -> Result<(), ModelError> {
        let src = Endpoint::new(src_block, src_port);
        let dst = Endpoint::new(dst_block, dst_port);

        let (src_id, src_idx) = self.resolve(&src, PortDirection::Output)?;
        let (dst_id, dst_idx) = self.resolve(&dst, PortDirection::Input)?;

        if let Some(&(prev_id, prev_idx)) = self.incoming.get(&(dst_id, dst_idx)) {
            let existing = Endpoint::new(
                self.blocks[prev_id.0].name(),
                self.blocks[prev_id.0].outputs()[prev_idx].name.clone(),
            );
            return Err(ModelError::PortAlreadyConnected { dst, existing });
        }

        trace!(src = %src, dst = %dst, "添加连线");
        self.incoming.insert((dst_id, dst_idx), (src_id, src_idx));
        self.connections.push(Connection { src, dst });
        Ok(())
    }

    /// `connect` 的简写：`"a.out" -> "b.in"`
    pub fn connect_paths(&mut self, src: &str, dst: &str) -> Result<(), ModelError> {
        let parse = |raw: &str| {
            Endpoint::parse(raw).ok_or_else(|| {
                ModelError::UnknownPort(Endpoint::new(raw, ""))
            })
        };
        let (s, d) = (parse(src)?, parse(dst)?);
        self.connect(&s.block, &s.port, &d.block, &d.port)
    }

    /// 编译前校验：所有输入都有来源；连线两端的静态形状兼容。
    pub fn validate(&self) -> Result<(), ModelError> {
        for (i, block) in self.blocks.iter().enumerate() {
            let id = BlockId(i);
            for (idx, spec) in block.inputs().iter().enumerate() {
                let dst = Endpoint::new(block.name(), spec.name.clone());
                let source = self.incoming.get(&(id, idx));

                if source.is_none() && spec.default.is_none() {
                    return Err(ModelError::UnboundInput(dst));
                }

                // 默认值与声明形状
                if let (Some(default), Some(expected)) = (&spec.default, spec.shape) {
                    if default.shape() != expected {
                        return Err(ModelError::ShapeMismatch {
                            src: dst.clone(),
                            src_shape: default.shape(),
                            dst,
                            dst_shape: expected,
                        });
                    }
                }

                if let Some(&(src_id, src_idx)) = source {
                    let producer = &self.blocks[src_id.0];
                    let out = &producer.outputs()[src_idx];
                    if let (Some(src_shape), Some(dst_shape)) = (out.shape, spec.shape) {
                        if src_shape != dst_shape {
                            return Err(ModelError::ShapeMismatch {
                                src: Endpoint::new(producer.name(), out.name.clone()),
                                src_shape,
                                dst,
                                dst_shape,
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn block_id(&self, name: &str) -> Option<BlockId> {
        self.by_name.get(name).copied()
    }

    pub fn block(&self, id: BlockId) -> &dyn Block {
        self.blocks[id.0].as_ref()
    }

    pub fn block_mut(&mut self, id: BlockId) -> &mut dyn Block {
        self.blocks[id.0].as_mut()
    }

    /// 按插入顺序遍历块
    pub fn blocks(&self) -> impl Iterator<Item = (BlockId, &dyn Block)> {
        self.blocks
            .iter()
            .enumerate()
            .map(|(i, b)| (BlockId(i), b.as_ref()))
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// 某个输入端口的上游 (块, 输出序号)
    pub fn source_of(&self, id: BlockId, input_idx: usize) -> Option<(BlockId, usize)> {
        self.incoming.get(&(id, input_idx)).copied()
    }

    /// 输出端口序号
    pub fn output_index(&self, id: BlockId, port: &str) -> Option<usize> {
        self.blocks[id.0].outputs().iter().position(|o| o.name == port)
    }

    fn resolve(
        &self,
        ep: &Endpoint,
        expected: PortDirection,
    ) -> Result<(BlockId, usize), ModelError> {
        let id = self
            .block_id(&ep.block)
            .ok_or_else(|| ModelError::UnknownPort(ep.clone()))?;
        let block = &self.blocks[id.0];
        let in_idx = block.inputs().iter().position(|p| p.name == ep.port);
        let out_idx = block.outputs().iter().position(|p| p.name == ep.port);

        match (expected, in_idx, out_idx) {
            (PortDirection::Output, _, Some(idx)) | (PortDirection::Input, Some(idx), _) => {
                Ok((id, idx))
            }
            (_, None, None) => Err(ModelError::UnknownPort(ep.clone())),
            _ => Err(ModelError::PortDirection {
                endpoint: ep.clone(),
                expected,
            }),
        }
    }
}
