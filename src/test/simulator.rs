use super::{ShapedSink, assert_close};
use crate::block::BlockError;
use crate::blocks::{
    Constant, DiscreteIntegrator, ExternalInput, FunctionSource, Gain, IntegrationMethod, Sum,
};
use crate::demo::{DampedOscillatorOpts, OSCILLATOR_LOGGED, build_damped_oscillator};
use crate::model::{Model, ModelError};
use crate::signal::{Shape, Signal, SignalPath, Signals};
use crate::sim::{SimError, SimulationConfig, Simulator, TickObserver};

fn oscillator() -> Simulator {
    let model = build_damped_oscillator(&DampedOscillatorOpts::default()).expect("build");
    Simulator::new(model).expect("compile")
}

#[test]
fn damped_oscillator_runs_600_ticks() {
    let mut sim = oscillator();
    let log = sim.run(30.0, 0.05, &OSCILLATOR_LOGGED).expect("run");

    let x = log.get("x.outputs.out").expect("x logged");
    let v = log.get("v.outputs.out").expect("v logged");
    assert_eq!(x.len(), 600);
    assert_eq!(v.len(), 600);
    assert_eq!(sim.ticks(), 600);

    assert_close(&x.scalars()[..2], &[2.0, 2.25]);
    assert_close(&v.scalars()[..2], &[5.0, 4.675]);
    assert_close(&x.times()[..3], &[0.0, 0.05, 0.1]);
    assert!((x.last().expect("last").t - 29.95).abs() < 1e-9);
}

#[test]
fn oscillator_decays() {
    let mut sim = oscillator();
    let log = sim.run(30.0, 0.05, &OSCILLATOR_LOGGED).expect("run");
    let x = log.get("x.out").expect("x").scalars();
    let early = x[..100].iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    let late = x[500..].iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    assert!(late < early, "late amplitude {late} should be below {early}");
}

#[test]
fn identical_runs_give_identical_logs() {
    let a = oscillator()
        .run(5.0, 0.05, &OSCILLATOR_LOGGED)
        .expect("run a")
        .to_json()
        .expect("json a");
    let b = oscillator()
        .run(5.0, 0.05, &OSCILLATOR_LOGGED)
        .expect("run b")
        .to_json()
        .expect("json b");
    assert_eq!(a, b);
}

#[test]
fn rerunning_the_same_simulator_resets_state() {
    let mut sim = oscillator();
    let first = sim.run(2.0, 0.05, &OSCILLATOR_LOGGED).expect("first");
    let second = sim.run(2.0, 0.05, &OSCILLATOR_LOGGED).expect("second");
    assert_eq!(first, second);
}

#[test]
fn backward_euler_integrator_uses_current_input() {
    let mut m = Model::new("backward");
    m.add_block(Constant::new("u", 1.0)).expect("u");
    m.add_block(
        DiscreteIntegrator::new("i", 0.0).with_method(IntegrationMethod::EulerBackward),
    )
    .expect("i");
    m.connect("u", "out", "i", "in").expect("u->i");

    let mut sim = Simulator::new(m).expect("compile");
    let log = sim.run(0.2, 0.1, &["i.outputs.out"]).expect("run");
    assert_close(&log.get("i.out").expect("i").scalars(), &[0.1, 0.2]);
}

#[test]
fn forward_euler_integrator_lags_one_step() {
    let mut m = Model::new("forward");
    m.add_block(Constant::new("u", 1.0)).expect("u");
    m.add_block(DiscreteIntegrator::new("i", 0.0)).expect("i");
    m.connect("u", "out", "i", "in").expect("u->i");

    let mut sim = Simulator::new(m).expect("compile");
    let log = sim.run(0.3, 0.1, &["i.out"]).expect("run");
    assert_close(&log.get("i.out").expect("i").scalars(), &[0.0, 0.1, 0.2]);
}

fn drifting_source() -> Model {
    let mut m = Model::new("drift");
    m.add_block(FunctionSource::new("src", |t, _dt| {
        if t < 0.05 {
            Ok(Signal::row(vec![1.0, 2.0, 3.0]))
        } else {
            Ok(Signal::row(vec![1.0, 2.0]))
        }
    }))
    .expect("src");
    m
}

#[test]
fn output_shape_change_aborts_at_second_activation() {
    let mut sim = Simulator::new(drifting_source()).expect("compile");
    let err = sim.run(0.5, 0.1, &["src.out"]).expect_err("shape drift");

    let (block, t) = err.failure_site().expect("runtime failure");
    assert_eq!(block, "src");
    assert!((t - 0.1).abs() < 1e-12);
    assert!(matches!(
        err.block_error(),
        Some(BlockError::ShapeDrift { port, .. }) if port == "out"
    ));

    // 失败 tick 不写入任何记录
    let log = sim.log().expect("run state kept");
    assert_eq!(log.get("src.out").expect("src").len(), 1);
    assert_eq!(sim.ticks(), 1);
}

#[test]
fn a_failed_run_refuses_further_steps() {
    let mut sim = Simulator::new(drifting_source()).expect("compile");
    sim.start_external(0.1, &["src.out"]).expect("start");
    sim.step_tick(&Signals::new()).expect("first tick");
    assert!(sim.step_tick(&Signals::new()).is_err());
    assert!(matches!(sim.step_tick(&Signals::new()), Err(SimError::Faulted)));
}

#[test]
fn step_tick_requires_start() {
    let mut sim = oscillator();
    assert!(matches!(sim.step_tick(&Signals::new()), Err(SimError::NotStarted)));
}

#[test]
fn step_tick_reports_all_held_outputs() {
    let mut sim = oscillator();
    sim.start_external(0.05, &OSCILLATOR_LOGGED).expect("start");
    let tick = sim.step_tick(&Signals::new()).expect("tick 0");
    assert_eq!(tick.tick, 0);
    assert_eq!(tick.time, 0.0);
    assert_eq!(tick.activated.len(), 5);
    assert_eq!(tick.get("sum.out").and_then(Signal::as_scalar), Some(-6.5));
    assert_eq!(sim.output("x.out").and_then(Signal::as_scalar), Some(2.0));
    assert!((sim.now() - 0.05).abs() < 1e-12);
}

#[test]
fn unknown_logged_path_is_rejected_before_running() {
    let mut sim = oscillator();
    let err = sim.run(1.0, 0.05, &["nope.out"]).expect_err("unknown path");
    assert!(matches!(
        err,
        SimError::Model(ModelError::UnknownSignalPath(ref p)) if p == "nope.out"
    ));
    assert_eq!(sim.ticks(), 0);
}

#[test]
fn invalid_duration_and_step_are_rejected() {
    let mut sim = oscillator();
    assert!(sim.run(0.0, 0.05, &OSCILLATOR_LOGGED).is_err());
    assert!(sim.run(1.0, 0.0, &OSCILLATOR_LOGGED).is_err());
}

#[test]
fn run_config_uses_logging_list() {
    let cfg = SimulationConfig::new(0.1, 1.0).with_logging(["x.outputs.out"]);
    let mut sim = oscillator();
    let log = sim.run_config(&cfg).expect("run");
    assert_eq!(log.records().len(), 1);
    assert_eq!(log.get("x.out").expect("x").len(), 10);
}

#[test]
fn block_errors_carry_block_name_and_time() {
    let mut m = Model::new("bad-gain");
    m.add_block(Constant::new("c", Signal::row(vec![1.0, 2.0, 3.0]))).expect("c");
    m.add_block(Gain::new(
        "k",
        Signal::from_rows_cols(2, 2, vec![1.0, 0.0, 0.0, 1.0]).expect("2x2"),
    ))
    .expect("k");
    m.connect("c", "out", "k", "in").expect("c->k");

    let mut sim = Simulator::new(m).expect("compile");
    let err = sim.run(1.0, 0.1, &["k.out"]).expect_err("dimension mismatch");
    assert_eq!(err.failure_site(), Some(("k", 0.0)));
    assert!(matches!(err.block_error(), Some(BlockError::Compute(_))));
    assert!(err.to_string().contains("block 'k' failed at t=0"));
}

#[derive(Default)]
struct Collect {
    ticks: Vec<u64>,
    paths: Vec<SignalPath>,
}

impl TickObserver for Collect {
    fn on_tick(&mut self, _t: f64, tick: u64, records: &[(SignalPath, Signal)]) {
        self.ticks.push(tick);
        self.paths.extend(records.iter().map(|(p, _)| p.clone()));
    }
}

#[test]
fn observer_sees_every_tick_in_order() {
    let mut m = Model::new("observe");
    m.add_block(Constant::new("c", 1.0)).expect("c");
    m.add_block(Sum::from_signs("s", "+").expect("signs")).expect("s");
    m.connect("c", "out", "s", "in1").expect("c->s");

    let mut obs = Collect::default();
    let mut sim = Simulator::new(m).expect("compile");
    sim.run_observed(0.4, 0.1, &["s.out"], &mut obs).expect("run");
    assert_eq!(obs.ticks, vec![0, 1, 2, 3]);
    assert_eq!(obs.paths.len(), 4);
    assert!(obs.paths.iter().all(|p| p.to_string() == "s.outputs.out"));
}

#[test]
fn declared_output_shape_is_enforced_from_the_first_tick() {
    let mut m = Model::new("declared");
    m.add_block(
        FunctionSource::new("src", |_t, _dt| Ok(Signal::row(vec![1.0, 2.0, 3.0])))
            .with_shape(Shape::SCALAR),
    )
    .expect("src");

    let mut sim = Simulator::new(m).expect("compile");
    let err = sim.run(0.3, 0.1, &["src.out"]).expect_err("shape drift");
    assert_eq!(err.failure_site(), Some(("src", 0.0)));
    match err.block_error() {
        Some(BlockError::ShapeDrift { port, expected, got }) => {
            assert_eq!(port, "out");
            assert_eq!(*expected, Shape::SCALAR);
            assert_eq!(*got, Shape::new(1, 3));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn declared_input_shape_rejects_an_undeclared_producer() {
    let mut m = Model::new("declared-input");
    m.add_block(ExternalInput::new("u", 0.0)).expect("u");
    m.add_block(ShapedSink::new("sink", Shape::SCALAR)).expect("sink");
    m.connect("u", "out", "sink", "in").expect("u->sink");

    let mut sim = Simulator::new(m).expect("compile");
    sim.start_external(0.1, &["u.out"]).expect("start");
    let mut wide = Signals::new();
    wide.insert("u".into(), Signal::column(vec![1.0, 2.0, 3.0]));
    let err = sim.step_tick(&wide).expect_err("shape drift");
    assert_eq!(err.failure_site(), Some(("sink", 0.0)));
    assert!(matches!(
        err.block_error(),
        Some(BlockError::ShapeDrift { port, .. }) if port == "in"
    ));
}

#[test]
fn failed_tick_leaves_previous_outputs_visible() {
    let mut m = Model::new("partial");
    m.add_block(FunctionSource::scalar("clock", |t, _dt| t)).expect("clock");
    m.add_block(FunctionSource::new("src", |t, _dt| {
        if t < 0.05 {
            Ok(Signal::scalar(1.0))
        } else {
            Err("sensor lost".to_string())
        }
    }))
    .expect("src");

    let mut sim = Simulator::new(m).expect("compile");
    sim.start_external(0.1, &["clock.out"]).expect("start");
    sim.step_tick(&Signals::new()).expect("tick 0");
    let err = sim.step_tick(&Signals::new()).expect_err("tick 1");
    assert_eq!(err.failure_site(), Some(("src", 0.1)));

    // clock 在失败 tick 中已算出 0.1，但没有提交
    assert_eq!(sim.output("clock.out").and_then(Signal::as_scalar), Some(0.0));
    assert_eq!(sim.output("src.out").and_then(Signal::as_scalar), Some(1.0));
    assert_eq!(sim.log().and_then(|l| l.get("clock.out")).map(|r| r.len()), Some(1));
}

#[test]
fn unknown_external_name_injects_nothing() {
    let mut m = Model::new("inject");
    m.add_block(ExternalInput::new("u", 0.0)).expect("u");
    m.add_block(Gain::new("g", 2.0)).expect("g");
    m.connect("u", "out", "g", "in").expect("u->g");

    let mut sim = Simulator::new(m).expect("compile");
    sim.start_external(0.1, &["g.out"]).expect("start");

    let mut inputs = Signals::new();
    inputs.insert("u".into(), 5.0.into());
    inputs.insert("zz".into(), 1.0.into());
    assert!(matches!(
        sim.step_tick(&inputs),
        Err(SimError::UnknownExternalInput(ref n)) if n == "zz"
    ));
    assert_eq!(sim.ticks(), 0);

    // 运行没有失败，u 也没有被注入
    let tick = sim.step_tick(&Signals::new()).expect("tick 0");
    assert_eq!(tick.get("g.out").and_then(Signal::as_scalar), Some(0.0));
}
