//! 外部为主模式
//!
//! 外部进程持有时钟：每调用一次 `step` 推进恰好一个基本 tick。

use crate::sim::{ClockMode, SignalLog, SimError, SimulationConfig, Simulator};
use crate::model::ModelError;
use crate::signal::{SignalPath, Signals};

/// 由外部驱动的仿真器包装
pub struct ExternalMaster {
    sim: Simulator,
    exposed: Vec<(String, SignalPath)>,
}

impl ExternalMaster {
    /// 复位模型并准备逐 tick 驱动；`exposed` 中的输出路径同时被记录。
    pub fn new<S: AsRef<str>>(
        mut sim: Simulator,
        base_step: f64,
        exposed: &[S],
    ) -> Result<Self, SimError> {
        let mut paths = Vec::with_capacity(exposed.len());
        for raw in exposed {
            let raw = raw.as_ref();
            let path = SignalPath::parse(raw)
                .map_err(|_| ModelError::UnknownSignalPath(raw.to_string()))?;
            paths.push((raw.to_string(), path));
        }
        sim.start_external(base_step, exposed)?;
        Ok(Self {
            sim,
            exposed: paths,
        })
    }

    /// 按配置构造：要求 `clock: external`，步长取 `dt`，暴露并记录 `logging` 中的路径。
    /// `T` 不限制外部驱动的步数。
    pub fn from_config(sim: Simulator, cfg: &SimulationConfig) -> Result<Self, SimError> {
        cfg.validate()?;
        if cfg.clock != ClockMode::External {
            return Err(ModelError::InvalidConfig(
                "ExternalMaster needs an external clock (clock: external)".to_string(),
            )
            .into());
        }
        Self::new(sim, cfg.dt, &cfg.logging)
    }

    /// 注入外部输入（按 `ExternalInput` 块名），推进一个 tick，返回暴露的输出。
    /// 尚无值的输出不出现在结果中。
    pub fn step(&mut self, inputs: &Signals) -> Result<Signals, SimError> {
        let tick = self.sim.step_tick(inputs)?;
        let mut out = Signals::new();
        for (raw, path) in &self.exposed {
            if let Some(v) = tick.values.get(path) {
                out.insert(raw.clone(), v.clone());
            }
        }
        Ok(out)
    }

    /// 下一次 `step` 对应的仿真时间
    pub fn now(&self) -> f64 {
        self.sim.now()
    }

    pub fn simulator(&self) -> &Simulator {
        &self.sim
    }

    pub fn log(&self) -> Option<&SignalLog> {
        self.sim.log()
    }

    pub fn into_simulator(self) -> Simulator {
        self.sim
    }
}
