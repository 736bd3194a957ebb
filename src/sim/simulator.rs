//! 仿真器
//!
//! 持有模型与执行计划，推进仿真时钟。每个 tick：
//! 1. 按计划顺序筛出到期块；
//! 2. 输出阶段：逐块收集输入、调用 `compute`、写回输出端口；
//! 3. 状态阶段：所有到期块产出输出后，再逐块调用 `update_state`；
//! 4. tick 成功后追加记录。未到期的块保持上一次输出（采样保持）。

use std::collections::BTreeMap;

use super::config::{ClockMode, SimulationConfig};
use super::error::SimError;
use super::log::{SignalLog, TickObserver};
use super::ports::PortTable;
use super::time::SimulationClock;
use crate::block::BlockError;
use crate::blocks::ExternalInput;
use crate::model::{BlockId, Model, ModelError};
use crate::sched::{ActivationCalendar, ExecutionPlan, InputBinding, Scheduler};
use crate::signal::{Signal, SignalPath, Signals};
use tracing::{debug, info, trace, warn};

/// 单个 tick 的结果：tick 结束后所有输出端口的保持值
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutputs {
    pub tick: u64,
    pub time: f64,
    /// 本 tick 到期执行的块
    pub activated: Vec<String>,
    pub values: BTreeMap<SignalPath, Signal>,
}

impl TickOutputs {
    pub fn get(&self, path: &str) -> Option<&Signal> {
        let path = SignalPath::parse(path).ok()?;
        self.values.get(&path)
    }
}

struct LoggedSignal {
    block: BlockId,
    port: usize,
}

struct RunState {
    clock: SimulationClock,
    calendar: ActivationCalendar,
    ports: PortTable,
    logged: Vec<LoggedSignal>,
    log: SignalLog,
    faulted: bool,
}

/// 离散时间步进运行时
pub struct Simulator {
    model: Model,
    plan: ExecutionPlan,
    run: Option<RunState>,
}

impl Simulator {
    /// 校验并编译模型；编译期错误在这里返回，任何 tick 都不会执行。
    pub fn new(model: Model) -> Result<Self, ModelError> {
        let plan = Scheduler::compile(&model)?;
        Ok(Self {
            model,
            plan,
            run: None,
        })
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn plan(&self) -> &ExecutionPlan {
        &self.plan
    }

    /// 下一个 tick 的仿真时间（未开始时为 0）
    pub fn now(&self) -> f64 {
        self.run.as_ref().map(|r| r.clock.now()).unwrap_or(0.0)
    }

    /// 已执行的 tick 数
    pub fn ticks(&self) -> u64 {
        self.run.as_ref().map(|r| r.clock.tick()).unwrap_or(0)
    }

    /// 当前的记录（外部时钟模式下逐步增长）
    pub fn log(&self) -> Option<&SignalLog> {
        self.run.as_ref().map(|r| &r.log)
    }

    /// 某个输出端口当前保持的值
    pub fn output(&self, path: &str) -> Option<&Signal> {
        let run = self.run.as_ref()?;
        let (id, port) = self.locate(path).ok()?;
        run.ports.outputs[id.0][port].value()
    }

    /// 按配置运行；外部时钟的配置要交给 `ExternalMaster::from_config`
    pub fn run_config(&mut self, cfg: &SimulationConfig) -> Result<SignalLog, SimError> {
        cfg.validate()?;
        if cfg.clock == ClockMode::External {
            return Err(ModelError::InvalidConfig(
                "clock is external; drive the model through ExternalMaster".to_string(),
            )
            .into());
        }
        self.run(cfg.duration, cfg.dt, &cfg.logging)
    }

    /// 从 0 推进到 `duration`，每步 `base_step`，记录 `logged` 中的输出路径。
    pub fn run<S: AsRef<str>>(
        &mut self,
        duration: f64,
        base_step: f64,
        logged: &[S],
    ) -> Result<SignalLog, SimError> {
        self.run_observed(duration, base_step, logged, &mut ())
    }

    /// 同 `run`，并在每个 tick 结束后把新记录推给 `observer`。
    #[tracing::instrument(skip(self, logged, observer), fields(model = %self.model.name()))]
    pub fn run_observed<S: AsRef<str>>(
        &mut self,
        duration: f64,
        base_step: f64,
        logged: &[S],
        observer: &mut dyn TickObserver,
    ) -> Result<SignalLog, SimError> {
        if !(duration.is_finite() && duration > 0.0) {
            return Err(ModelError::InvalidConfig(format!(
                "duration must be > 0, got {duration}"
            ))
            .into());
        }
        self.start(base_step, logged)?;
        let total = SimulationClock::ticks_for(duration, base_step);

        info!("▶️  开始运行仿真");
        debug!(total_ticks = total, base_step, duration, "初始状态");

        for _ in 0..total {
            self.execute_tick(None, observer)?;
        }

        let run = self.run.as_mut().ok_or(SimError::NotStarted)?;
        info!(
            total_ticks = run.clock.tick(),
            final_time = run.clock.now(),
            "✅ 仿真完成"
        );
        Ok(std::mem::take(&mut run.log))
    }

    /// 外部时钟模式：复位所有块并准备逐 tick 调用 `step_tick`。
    #[tracing::instrument(skip(self, logged), fields(model = %self.model.name()))]
    pub fn start_external<S: AsRef<str>>(
        &mut self,
        base_step: f64,
        logged: &[S],
    ) -> Result<(), SimError> {
        self.start(base_step, logged)?;
        info!("🔌 外部时钟模式就绪");
        Ok(())
    }

    /// 只执行一个基本 tick；`inputs` 按 `ExternalInput` 块名注入外部信号。
    /// 名字无效时返回 `UnknownExternalInput`，不执行 tick，运行也不进入失败状态。
    #[tracing::instrument(skip(self, inputs), fields(tick = self.ticks()))]
    pub fn step_tick(&mut self, inputs: &Signals) -> Result<TickOutputs, SimError> {
        self.execute_tick(Some(inputs), &mut ())
    }

    /// 复位所有块、清空端口与记录，建立本次运行的激活日历。
    fn start<S: AsRef<str>>(&mut self, base_step: f64, logged: &[S]) -> Result<(), SimError> {
        let calendar = ActivationCalendar::new(&self.plan, base_step)?;

        let mut paths = Vec::with_capacity(logged.len());
        let mut targets = Vec::with_capacity(logged.len());
        for raw in logged {
            let raw = raw.as_ref();
            let (block, port) = self.locate(raw)?;
            let path = SignalPath::parse(raw).map_err(|_| ModelError::UnknownSignalPath(raw.to_string()))?;
            paths.push(path);
            targets.push(LoggedSignal { block, port });
        }

        for i in 0..self.model.len() {
            let block = self.model.block_mut(BlockId(i));
            block.reset().map_err(|source| SimError::Block {
                block: block.name().to_string(),
                time: 0.0,
                source,
            })?;
        }

        let ports = PortTable::new(self.model.blocks().map(|(_, b)| {
            (
                b.inputs().iter().map(|s| s.shape).collect(),
                b.outputs().iter().map(|s| s.shape).collect(),
            )
        }));

        self.run = Some(RunState {
            clock: SimulationClock::new(base_step),
            calendar,
            ports,
            logged: targets,
            log: SignalLog::with_paths(paths),
            faulted: false,
        });
        Ok(())
    }

    fn locate(&self, raw: &str) -> Result<(BlockId, usize), ModelError> {
        let unknown = || ModelError::UnknownSignalPath(raw.to_string());
        let path = SignalPath::parse(raw).map_err(|_| unknown())?;
        let id = self.model.block_id(&path.block).ok_or_else(unknown)?;
        let port = self.model.output_index(id, &path.port).ok_or_else(unknown)?;
        Ok((id, port))
    }

    fn execute_tick(
        &mut self,
        external: Option<&Signals>,
        observer: &mut dyn TickObserver,
    ) -> Result<TickOutputs, SimError> {
        let Simulator { model, plan, run } = self;
        let run = run.as_mut().ok_or(SimError::NotStarted)?;
        if run.faulted {
            return Err(SimError::Faulted);
        }
        // 名字全部解析成功之前不注入任何值，也不执行 tick
        let injected = match external {
            Some(ext) => resolve_external(model, ext)?,
            None => Vec::new(),
        };

        let result = Self::tick_inner(model, plan, run, injected, observer);
        if let Err(err) = &result {
            warn!(error = %err, tick = run.clock.tick(), "❌ 仿真在当前 tick 中止");
            run.faulted = true;
        }
        result
    }

    /// 端口写入先落在 `ports` 副本上，整个 tick 成功后才提交；
    /// 失败时 `output()` 与记录仍停留在上一个 tick。块的内部状态不回滚。
    fn tick_inner(
        model: &mut Model,
        plan: &ExecutionPlan,
        run: &mut RunState,
        injected: Vec<(BlockId, Signal)>,
        observer: &mut dyn TickObserver,
    ) -> Result<TickOutputs, SimError> {
        let tick = run.clock.tick();
        let t = run.clock.now();

        for (id, value) in injected {
            let block = model.block_mut(id).as_any_mut();
            if let Some(target) = block.downcast_mut::<ExternalInput>() {
                target.set(value);
            }
        }

        let due: Vec<BlockId> = plan
            .order()
            .iter()
            .copied()
            .filter(|&id| run.calendar.is_due(id, tick))
            .collect();
        trace!(tick, t, due = due.len(), "到期块");

        let fail = |id: BlockId, source: BlockError| SimError::Block {
            block: plan.name(id).to_string(),
            time: t,
            source,
        };

        let mut ports = run.ports.clone();

        // 输出阶段
        for &id in &due {
            let dt = run.calendar.dt(id, t);
            let inputs = gather_inputs(model, plan, &mut ports, id).map_err(|e| fail(id, e))?;
            let block = model.block_mut(id);
            debug!(block = %block.name(), t, dt, "计算输出");
            let produced = block.compute(t, dt, &inputs).map_err(|e| fail(id, e))?;
            store_outputs(model, &mut ports, id, produced).map_err(|e| fail(id, e))?;
        }

        // 状态阶段：此时本 tick 的输入全部可用
        for &id in &due {
            let dt = run.calendar.dt(id, t);
            let inputs = gather_inputs(model, plan, &mut ports, id).map_err(|e| fail(id, e))?;
            model
                .block_mut(id)
                .update_state(t, dt, &inputs)
                .map_err(|e| fail(id, e))?;
        }

        run.ports = ports;
        for &id in &due {
            run.calendar.mark_activated(id, t);
        }

        let mut records = Vec::new();
        for (idx, target) in run.logged.iter().enumerate() {
            if !run.calendar.is_due(target.block, tick) {
                continue;
            }
            if let Some(value) = run.ports.outputs[target.block.0][target.port].value() {
                records.push((idx, value.clone()));
            }
        }
        let mut streamed = Vec::with_capacity(records.len());
        for (idx, value) in records {
            streamed.push((run.log.records()[idx].path.clone(), value.clone()));
            run.log.append(idx, t, value);
        }
        observer.on_tick(t, tick, &streamed);

        let mut values = BTreeMap::new();
        for (id, block) in model.blocks() {
            for (port, spec) in block.outputs().iter().enumerate() {
                if let Some(v) = run.ports.outputs[id.0][port].value() {
                    values.insert(SignalPath::new(block.name(), spec.name.clone()), v.clone());
                }
            }
        }

        run.clock.advance();
        Ok(TickOutputs {
            tick,
            time: t,
            activated: due.iter().map(|&id| plan.name(id).to_string()).collect(),
            values,
        })
    }
}

/// 把外部输入名解析为 `ExternalInput` 块；任一名字无效则整体拒绝。
fn resolve_external(
    model: &mut Model,
    ext: &Signals,
) -> Result<Vec<(BlockId, Signal)>, SimError> {
    let mut resolved = Vec::with_capacity(ext.len());
    for (name, value) in ext {
        let id = model
            .block_id(name)
            .filter(|&id| model.block_mut(id).as_any_mut().is::<ExternalInput>())
            .ok_or_else(|| SimError::UnknownExternalInput(name.clone()))?;
        resolved.push((id, value.clone()));
    }
    Ok(resolved)
}

/// 收集块的当前输入：上游最近一次输出，或声明的默认值。
/// 尚无任何值的端口不放入结果，由块自己决定是否需要它。
fn gather_inputs(
    model: &Model,
    plan: &ExecutionPlan,
    ports: &mut PortTable,
    id: BlockId,
) -> Result<Signals, BlockError> {
    let block = model.block(id);
    let mut inputs = Signals::new();

    for (idx, (spec, binding)) in block.inputs().iter().zip(plan.bindings(id)).enumerate() {
        let value = match *binding {
            InputBinding::Connected { block: src, port } => ports.outputs[src.0][port]
                .value()
                .cloned()
                .or_else(|| spec.default.clone()),
            InputBinding::Default => spec.default.clone(),
        };
        let Some(value) = value else {
            trace!(block = %block.name(), port = %spec.name, "输入尚无值");
            continue;
        };
        let slot = &mut ports.inputs[id.0][idx];
        slot.check_shape(&spec.name, &value)?;
        slot.set(value.clone());
        inputs.insert(spec.name.clone(), value);
    }
    Ok(inputs)
}

/// 校验并写回输出：必须恰好覆盖声明的输出端口，形状冻结后不可变化。
fn store_outputs(
    model: &Model,
    ports: &mut PortTable,
    id: BlockId,
    produced: Signals,
) -> Result<(), BlockError> {
    let specs = model.block(id).outputs();
    if let Some(extra) = produced
        .keys()
        .find(|name| !specs.iter().any(|s| &s.name == *name))
    {
        return Err(BlockError::UnexpectedOutput(extra.clone()));
    }

    let mut staged = Vec::with_capacity(specs.len());
    for (idx, spec) in specs.iter().enumerate() {
        let value = produced
            .get(&spec.name)
            .ok_or_else(|| BlockError::MissingOutput(spec.name.clone()))?;
        ports.outputs[id.0][idx].check_shape(&spec.name, value)?;
        staged.push(value.clone());
    }
    for (idx, value) in staged.into_iter().enumerate() {
        ports.outputs[id.0][idx].set(value);
    }
    Ok(())
}
