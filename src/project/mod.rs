//! 项目文件
//!
//! 用 JSON 描述的块图 + 运行配置，读入后通过 `Model::add_block`/`connect`
//! 组装，因此任何编译期错误都原样返回。

// 子模块声明
mod error;
mod spec;

// 重新导出公共接口
pub use error::ProjectError;
pub use spec::{BlockKind, BlockSpec, ProjectSpec, ValueSpec, load_project};
