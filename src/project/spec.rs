use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::ProjectError;
use crate::block::{Block, BlockError, SamplePeriod};
use crate::blocks::{
    Constant, Delay, DiscreteDerivator, DiscreteIntegrator, ExternalInput, FileSource, Gain,
    IntegrationMethod, Mux, Pid, Playback, Product, Ramp, Saturation, Sinusoidal, Step, Sum,
    ZeroOrderHold,
};
use crate::model::Model;
use crate::signal::Signal;
use crate::sim::SimulationConfig;
use tracing::info;

pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSpec {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub name: Option<String>,
    pub simulation: SimulationConfig,
    pub blocks: Vec<BlockSpec>,
    /// `["src.out", "dst.in"]` 对
    #[serde(default)]
    pub connections: Vec<(String, String)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockSpec {
    pub name: String,
    /// 缺省为继承基本步长
    #[serde(default)]
    pub sample_time: Option<f64>,
    #[serde(flatten)]
    pub kind: BlockKind,
}

/// 数值参数：标量、矩阵（按行）或 `{"shape", "data"}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueSpec {
    Scalar(f64),
    Rows(Vec<Vec<f64>>),
    Signal(Signal),
}

impl ValueSpec {
    pub fn to_signal(&self) -> Result<Signal, String> {
        match self {
            ValueSpec::Scalar(v) => Ok(Signal::scalar(*v)),
            ValueSpec::Rows(rows) => {
                let r = rows.len();
                let c = rows.first().map(Vec::len).unwrap_or(0);
                if rows.iter().any(|row| row.len() != c) {
                    return Err("matrix rows have different lengths".to_string());
                }
                Signal::from_rows_cols(r, c, rows.concat())
            }
            ValueSpec::Signal(s) => Ok(s.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockKind {
    Constant {
        value: ValueSpec,
    },
    Step {
        #[serde(default)]
        step_time: f64,
        #[serde(default = "zero")]
        value_before: ValueSpec,
        #[serde(default = "one")]
        value_after: ValueSpec,
    },
    Ramp {
        slope: ValueSpec,
        #[serde(default)]
        start_time: f64,
        #[serde(default = "zero")]
        offset: ValueSpec,
    },
    Sinusoidal {
        amplitude: f64,
        frequency: f64,
        #[serde(default)]
        phase: f64,
        #[serde(default)]
        offset: f64,
    },
    Gain {
        gain: ValueSpec,
    },
    Sum {
        signs: String,
    },
    Product {
        #[serde(default = "default_product_ops")]
        operations: String,
    },
    Saturation {
        lower: f64,
        upper: f64,
    },
    Mux {
        num_inputs: usize,
    },
    Integrator {
        #[serde(default = "zero")]
        initial_state: ValueSpec,
        #[serde(default)]
        method: Option<String>,
    },
    Delay {
        #[serde(default = "one_delay")]
        num_delays: usize,
        #[serde(default = "zero")]
        initial_output: ValueSpec,
    },
    ZeroOrderHold {},
    ExternalInput {
        #[serde(default = "zero")]
        initial: ValueSpec,
    },
    Pid {
        #[serde(default)]
        kp: f64,
        #[serde(default)]
        ki: f64,
        #[serde(default)]
        kd: f64,
        #[serde(default)]
        u_min: Option<f64>,
        #[serde(default)]
        u_max: Option<f64>,
    },
    DiscreteDerivator {
        #[serde(default)]
        initial_output: Option<ValueSpec>,
    },
    /// 相对路径以项目文件所在目录为基准
    FileSource {
        file_path: PathBuf,
        columns: Vec<String>,
        #[serde(default)]
        repeat: bool,
        #[serde(default)]
        use_time: bool,
    },
}

fn zero() -> ValueSpec {
    ValueSpec::Scalar(0.0)
}

fn one() -> ValueSpec {
    ValueSpec::Scalar(1.0)
}

fn one_delay() -> usize {
    1
}

fn default_product_ops() -> String {
    "**".to_string()
}

/// 读取并校验项目文件
pub fn load_project(path: impl AsRef<Path>) -> Result<ProjectSpec, ProjectError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let mut spec: ProjectSpec = serde_json::from_str(&text)?;
    if let Some(dir) = path.parent() {
        spec.resolve_paths(dir);
    }
    if spec.schema_version != SCHEMA_VERSION {
        return Err(ProjectError::SchemaVersion(spec.schema_version));
    }
    spec.simulation.validate()?;
    info!(
        path = %path.display(),
        blocks = spec.blocks.len(),
        connections = spec.connections.len(),
        "📄 项目文件已加载"
    );
    Ok(spec)
}

impl ProjectSpec {
    pub fn from_json(text: &str) -> Result<Self, ProjectError> {
        Ok(serde_json::from_str(text)?)
    }

    /// 把块参数里的相对文件路径改为相对 `base`
    pub fn resolve_paths(&mut self, base: &Path) {
        for spec in &mut self.blocks {
            if let BlockKind::FileSource { file_path, .. } = &mut spec.kind {
                if file_path.is_relative() {
                    *file_path = base.join(&*file_path);
                }
            }
        }
    }

    /// 按声明顺序添加块、再按声明顺序连线
    pub fn build_model(&self) -> Result<Model, ProjectError> {
        let mut model = Model::new(self.name.clone().unwrap_or_else(|| "project".to_string()));
        for spec in &self.blocks {
            model.add_boxed(spec.build()?)?;
        }
        for (src, dst) in &self.connections {
            model.connect_paths(src, dst)?;
        }
        Ok(model)
    }
}

impl BlockSpec {
    pub fn build(&self) -> Result<Box<dyn Block>, ProjectError> {
        let name = self.name.clone();
        let period = SamplePeriod::from_option(self.sample_time);
        let value = |field: &'static str, v: &ValueSpec| {
            v.to_signal().map_err(|reason| ProjectError::InvalidValue {
                block: self.name.clone(),
                field,
                reason,
            })
        };
        let block_err = |source: BlockError| ProjectError::Block {
            block: self.name.clone(),
            source,
        };

        let block: Box<dyn Block> = match &self.kind {
            BlockKind::Constant { value: v } => {
                Box::new(Constant::new(name, value("value", v)?).with_period(period))
            }
            BlockKind::Step {
                step_time,
                value_before,
                value_after,
            } => Box::new(
                Step::new(
                    name,
                    *step_time,
                    value("value_before", value_before)?,
                    value("value_after", value_after)?,
                )
                .map_err(block_err)?
                .with_period(period),
            ),
            BlockKind::Ramp {
                slope,
                start_time,
                offset,
            } => Box::new(
                Ramp::new(
                    name,
                    value("slope", slope)?,
                    *start_time,
                    value("offset", offset)?,
                )
                .map_err(block_err)?
                .with_period(period),
            ),
            BlockKind::Sinusoidal {
                amplitude,
                frequency,
                phase,
                offset,
            } => Box::new(
                Sinusoidal::new(name, *amplitude, *frequency)
                    .with_phase(*phase)
                    .with_offset(*offset)
                    .with_period(period),
            ),
            BlockKind::Gain { gain } => {
                Box::new(Gain::new(name, value("gain", gain)?).with_period(period))
            }
            BlockKind::Sum { signs } => Box::new(
                Sum::from_signs(name, signs)
                    .map_err(block_err)?
                    .with_period(period),
            ),
            BlockKind::Product { operations } => Box::new(
                Product::new(name, operations)
                    .map_err(block_err)?
                    .with_period(period),
            ),
            BlockKind::Saturation { lower, upper } => Box::new(
                Saturation::new(name, *lower, *upper)
                    .map_err(block_err)?
                    .with_period(period),
            ),
            BlockKind::Mux { num_inputs } => {
                Box::new(Mux::new(name, *num_inputs).with_period(period))
            }
            BlockKind::Integrator {
                initial_state,
                method,
            } => {
                let method = match method {
                    Some(raw) => {
                        IntegrationMethod::parse(raw).map_err(|reason| {
                            ProjectError::InvalidValue {
                                block: self.name.clone(),
                                field: "method",
                                reason,
                            }
                        })?
                    }
                    None => IntegrationMethod::default(),
                };
                Box::new(
                    DiscreteIntegrator::new(name, value("initial_state", initial_state)?)
                        .with_method(method)
                        .with_period(period),
                )
            }
            BlockKind::Delay {
                num_delays,
                initial_output,
            } => Box::new(
                Delay::new(name, *num_delays, value("initial_output", initial_output)?)
                    .map_err(block_err)?
                    .with_period(period),
            ),
            BlockKind::ZeroOrderHold {} => Box::new(ZeroOrderHold::new(name, period)),
            BlockKind::ExternalInput { initial } => {
                Box::new(ExternalInput::new(name, value("initial", initial)?))
            }
            BlockKind::Pid {
                kp,
                ki,
                kd,
                u_min,
                u_max,
            } => {
                let pid = Pid::new(name, *kp, *ki, *kd).with_period(period);
                let pid = match (*u_min, *u_max) {
                    (None, None) => pid,
                    (lo, hi) => pid
                        .with_limits(lo.unwrap_or(f64::NEG_INFINITY), hi.unwrap_or(f64::INFINITY))
                        .map_err(block_err)?,
                };
                Box::new(pid)
            }
            BlockKind::DiscreteDerivator { initial_output } => {
                let block = DiscreteDerivator::new(name).with_period(period);
                Box::new(match initial_output {
                    Some(v) => block.with_initial_output(value("initial_output", v)?),
                    None => block,
                })
            }
            BlockKind::FileSource {
                file_path,
                columns,
                repeat,
                use_time,
            } => {
                let playback = match (*repeat, *use_time) {
                    (false, false) => Playback::Once,
                    (true, false) => Playback::Repeat,
                    (false, true) => Playback::Timed,
                    (true, true) => {
                        return Err(ProjectError::InvalidValue {
                            block: self.name.clone(),
                            field: "repeat",
                            reason: "repeat cannot be combined with use_time".to_string(),
                        });
                    }
                };
                Box::new(
                    FileSource::from_csv(name, file_path, columns.as_slice(), playback)
                        .map_err(block_err)?
                        .with_period(period),
                )
            }
        };
        Ok(block)
    }
}
