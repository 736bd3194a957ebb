//! 标识符类型
//!
//! 块在模型中的序号（即加入顺序）。

/// 块标识符，等于 `add_block` 的插入序号
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(pub usize);
