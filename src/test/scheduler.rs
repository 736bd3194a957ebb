use crate::blocks::{Constant, Delay, DiscreteIntegrator, Gain, IntegrationMethod, Sum};
use crate::demo::{DampedOscillatorOpts, build_damped_oscillator};
use crate::model::{Model, ModelError};
use crate::sched::Scheduler;

#[test]
fn independent_blocks_keep_insertion_order() {
    let mut m = Model::new("ties");
    for name in ["c3", "c1", "c2"] {
        m.add_block(Constant::new(name, 1.0)).expect("add");
    }
    let plan = Scheduler::compile(&m).expect("compile");
    assert_eq!(plan.order_names(), vec!["c3", "c1", "c2"]);
}

#[test]
fn producers_run_before_feedthrough_consumers() {
    let mut m = Model::new("chain");
    m.add_block(Gain::new("g2", 2.0)).expect("g2");
    m.add_block(Gain::new("g1", 1.0)).expect("g1");
    m.add_block(Constant::new("c", 1.0)).expect("c");
    m.connect("c", "out", "g1", "in").expect("c->g1");
    m.connect("g1", "out", "g2", "in").expect("g1->g2");

    let plan = Scheduler::compile(&m).expect("compile");
    assert_eq!(plan.order_names(), vec!["c", "g1", "g2"]);
}

#[test]
fn oscillator_plan_puts_integrators_first() {
    let m = build_damped_oscillator(&DampedOscillatorOpts::default()).expect("build");
    let plan = Scheduler::compile(&m).expect("no algebraic loop");
    assert_eq!(
        plan.order_names(),
        vec!["v", "x", "damping", "stiffness", "sum"]
    );
}

#[test]
fn feedthrough_cycle_is_an_algebraic_loop() {
    let mut m = Model::new("loop");
    m.add_block(Constant::new("c", 1.0)).expect("c");
    m.add_block(Sum::new("s", vec![1.0, 1.0])).expect("s");
    m.add_block(Gain::new("g", 0.5)).expect("g");
    m.connect("c", "out", "s", "in1").expect("c->s");
    m.connect("s", "out", "g", "in").expect("s->g");
    m.connect("g", "out", "s", "in2").expect("g->s");

    let err = Scheduler::compile(&m).expect_err("loop");
    match err {
        ModelError::AlgebraicLoop { blocks } => {
            assert!(blocks.contains(&"s".to_string()));
            assert!(blocks.contains(&"g".to_string()));
            assert!(!blocks.contains(&"c".to_string()));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn a_delay_in_the_loop_breaks_it() {
    let mut m = Model::new("broken-loop");
    m.add_block(Constant::new("c", 1.0)).expect("c");
    m.add_block(Sum::new("s", vec![1.0, 1.0])).expect("s");
    m.add_block(Delay::unit("d", 0.0)).expect("d");
    m.connect("c", "out", "s", "in1").expect("c->s");
    m.connect("s", "out", "d", "in").expect("s->d");
    m.connect("d", "out", "s", "in2").expect("d->s");

    let plan = Scheduler::compile(&m).expect("delay breaks the loop");
    assert_eq!(plan.order_names(), vec!["c", "d", "s"]);
}

#[test]
fn backward_euler_integrator_does_not_break_a_loop() {
    let mut m = Model::new("backward-loop");
    m.add_block(DiscreteIntegrator::new("i", 0.0).with_method(IntegrationMethod::EulerBackward))
        .expect("i");
    m.add_block(Gain::new("g", -1.0)).expect("g");
    m.connect("i", "out", "g", "in").expect("i->g");
    m.connect("g", "out", "i", "in").expect("g->i");

    let err = Scheduler::compile(&m).expect_err("feedthrough integrator loop");
    assert!(matches!(err, ModelError::AlgebraicLoop { .. }));
}

#[test]
fn loop_error_message_lists_the_blocks() {
    let err = ModelError::AlgebraicLoop {
        blocks: vec!["a".into(), "b".into()],
    };
    assert_eq!(err.to_string(), "algebraic loop detected through blocks [a -> b]");
}
