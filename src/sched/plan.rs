//! 执行计划
//!
//! 只有"直通"边参与排序：若 B 直通某个连到 A 输出的输入，则 A 必须先于 B。
//! 非直通的消费者可以直接使用生产者上一步保持的输出，因此不进入依赖图。
//! 依赖图中出现环即为代数环，编译期直接拒绝。

use super::topo::stable_toposort;
use crate::block::SamplePeriod;
use crate::model::{BlockId, Model, ModelError};
use tracing::{debug, info};

/// 输入端口的取值来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputBinding {
    /// 来自某个块的某个输出（按序号）
    Connected { block: BlockId, port: usize },
    /// 未连线，使用声明的默认值
    Default,
}

/// 编译后的只读执行计划
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    order: Vec<BlockId>,
    names: Vec<String>,
    periods: Vec<SamplePeriod>,
    bindings: Vec<Vec<InputBinding>>,
}

impl ExecutionPlan {
    /// 单个基本 tick 内的执行顺序
    pub fn order(&self) -> &[BlockId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn name(&self, id: BlockId) -> &str {
        &self.names[id.0]
    }

    pub fn period(&self, id: BlockId) -> SamplePeriod {
        self.periods[id.0]
    }

    pub fn bindings(&self, id: BlockId) -> &[InputBinding] {
        &self.bindings[id.0]
    }

    /// 块在执行顺序中的位置
    pub fn position(&self, id: BlockId) -> Option<usize> {
        self.order.iter().position(|&b| b == id)
    }

    /// 按名称给出的执行顺序（便于测试与日志）
    pub fn order_names(&self) -> Vec<&str> {
        self.order.iter().map(|&id| self.name(id)).collect()
    }
}

/// 调度器：模型 → 执行计划
#[derive(Debug, Default, Clone, Copy)]
pub struct Scheduler;

impl Scheduler {
    #[tracing::instrument(skip(model), fields(model = %model.name(), blocks = model.len()))]
    pub fn compile(model: &Model) -> Result<ExecutionPlan, ModelError> {
        model.validate()?;

        let n = model.len();
        let mut names = Vec::with_capacity(n);
        let mut periods = Vec::with_capacity(n);
        let mut bindings = Vec::with_capacity(n);
        let mut edges = Vec::new();

        for (id, block) in model.blocks() {
            names.push(block.name().to_string());
            periods.push(block.sample_period());

            let feedthrough = block.direct_feedthrough();
            let mut per_input = Vec::with_capacity(block.inputs().len());
            for idx in 0..block.inputs().len() {
                match model.source_of(id, idx) {
                    Some((src, port)) => {
                        if feedthrough {
                            edges.push((src.0, id.0));
                        }
                        per_input.push(InputBinding::Connected { block: src, port });
                    }
                    None => per_input.push(InputBinding::Default),
                }
            }
            bindings.push(per_input);
        }

        debug!(feedthrough_edges = edges.len(), "直通依赖图构建完成");

        let order = stable_toposort(n, &edges).map_err(|cycle| ModelError::AlgebraicLoop {
            blocks: cycle.iter().map(|&i| names[i].clone()).collect(),
        })?;

        let plan = ExecutionPlan {
            order: order.into_iter().map(BlockId).collect(),
            names,
            periods,
            bindings,
        };
        info!(order = ?plan.order_names(), "执行计划已编译");
        Ok(plan)
    }
}
