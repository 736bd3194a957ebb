//! 演示模型
//!
//! 阻尼振子 `x'' = -c x' - k x`，由两个离散积分器、两个增益和一个求和块组成：
//!
//! ```text
//! sum ──► v ──► x
//!  ▲      │     │
//!  │   damping  stiffness
//!  └──────┴─────┘
//! ```
//!
//! 两个积分器都是前向欧拉（非直通），因此反馈环里没有代数环。

use crate::blocks::{DiscreteIntegrator, Gain, IntegrationMethod, Sum};
use crate::model::{Model, ModelError};

/// 阻尼振子参数
#[derive(Debug, Clone)]
pub struct DampedOscillatorOpts {
    pub initial_position: f64,
    pub initial_velocity: f64,
    /// 阻尼系数 c
    pub damping: f64,
    /// 刚度 k
    pub stiffness: f64,
    pub method: IntegrationMethod,
    pub dt: f64,
    pub duration: f64,
}

impl Default for DampedOscillatorOpts {
    fn default() -> Self {
        Self {
            initial_position: 2.0,
            initial_velocity: 5.0,
            damping: 0.5,
            stiffness: 2.0,
            method: IntegrationMethod::EulerForward,
            dt: 0.05,
            duration: 30.0,
        }
    }
}

/// 记录的信号路径：位置与速度
pub const OSCILLATOR_LOGGED: [&str; 2] = ["x.outputs.out", "v.outputs.out"];

/// 构建阻尼振子模型
pub fn build_damped_oscillator(opts: &DampedOscillatorOpts) -> Result<Model, ModelError> {
    let mut model = Model::new("damped_oscillator");

    model.add_block(
        DiscreteIntegrator::new("v", opts.initial_velocity).with_method(opts.method),
    )?;
    model.add_block(
        DiscreteIntegrator::new("x", opts.initial_position).with_method(opts.method),
    )?;
    model.add_block(Gain::new("damping", opts.damping))?;
    model.add_block(Gain::new("stiffness", opts.stiffness))?;
    model.add_block(Sum::new("sum", vec![-1.0, -1.0]))?;

    model.connect("v", "out", "x", "in")?;
    model.connect("v", "out", "damping", "in")?;
    model.connect("x", "out", "stiffness", "in")?;
    model.connect("damping", "out", "sum", "in1")?;
    model.connect("stiffness", "out", "sum", "in2")?;
    model.connect("sum", "out", "v", "in")?;

    Ok(model)
}
