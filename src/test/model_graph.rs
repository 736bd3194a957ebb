use super::ShapedSink;
use crate::block::PortDirection;
use crate::blocks::{Constant, Gain, Sum};
use crate::model::{Endpoint, Model, ModelError};
use crate::signal::{Shape, Signal};
use crate::sim::Simulator;

#[test]
fn duplicate_block_names_are_rejected() {
    let mut m = Model::new("dup");
    m.add_block(Constant::new("c", 1.0)).expect("first");
    let err = m.add_block(Gain::new("c", 2.0)).expect_err("duplicate");
    assert!(matches!(err, ModelError::DuplicateName(ref n) if n == "c"));
    assert_eq!(m.len(), 1);
}

#[test]
fn connect_resolves_ports_and_direction() {
    let mut m = Model::new("ports");
    m.add_block(Constant::new("c", 1.0)).expect("c");
    m.add_block(Gain::new("g", 2.0)).expect("g");

    let err = m.connect("c", "nope", "g", "in").expect_err("unknown port");
    assert!(matches!(err, ModelError::UnknownPort(ref e) if e == &Endpoint::new("c", "nope")));

    let err = m.connect("missing", "out", "g", "in").expect_err("unknown block");
    assert!(matches!(err, ModelError::UnknownPort(_)));

    let err = m.connect("g", "in", "c", "out").expect_err("wrong direction");
    assert!(matches!(
        err,
        ModelError::PortDirection {
            expected: PortDirection::Output,
            ..
        }
    ));

    m.connect_paths("c.out", "g.in").expect("valid connection");
    assert_eq!(m.connections().len(), 1);
}

#[test]
fn an_input_accepts_only_one_source() {
    let mut m = Model::new("fan-in");
    m.add_block(Constant::new("a", 1.0)).expect("a");
    m.add_block(Constant::new("b", 2.0)).expect("b");
    m.add_block(Gain::new("g", 1.0)).expect("g");
    m.connect("a", "out", "g", "in").expect("first source");

    let err = m.connect("b", "out", "g", "in").expect_err("second source");
    match err {
        ModelError::PortAlreadyConnected { dst, existing } => {
            assert_eq!(dst, Endpoint::new("g", "in"));
            assert_eq!(existing, Endpoint::new("a", "out"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn fan_out_is_allowed() {
    let mut m = Model::new("fan-out");
    m.add_block(Constant::new("a", 3.0)).expect("a");
    m.add_block(Gain::new("g1", 1.0)).expect("g1");
    m.add_block(Gain::new("g2", 2.0)).expect("g2");
    m.connect("a", "out", "g1", "in").expect("g1");
    m.connect("a", "out", "g2", "in").expect("g2");

    let mut sim = Simulator::new(m).expect("compile");
    let log = sim.run(0.1, 0.1, &["g1.out", "g2.out"]).expect("run");
    assert_eq!(log.get("g1.out").expect("g1").scalars(), vec![3.0]);
    assert_eq!(log.get("g2.out").expect("g2").scalars(), vec![6.0]);
}

#[test]
fn unconnected_input_without_default_fails_compilation() {
    let mut m = Model::new("unbound");
    m.add_block(Gain::new("g", 2.0)).expect("g");
    let err = Simulator::new(m).err().expect("compile must fail");
    assert!(matches!(err, ModelError::UnboundInput(ref e) if e == &Endpoint::new("g", "in")));
}

#[test]
fn partially_connected_sum_reports_the_missing_input() {
    let mut m = Model::new("partial");
    m.add_block(Constant::new("c", 1.0)).expect("c");
    m.add_block(Sum::new("s", vec![1.0, 1.0])).expect("s");
    m.connect("c", "out", "s", "in1").expect("in1");
    let err = m.validate().expect_err("in2 unbound");
    assert!(matches!(err, ModelError::UnboundInput(ref e) if e.port == "in2"));
}

#[test]
fn declared_shapes_must_agree_across_a_connection() {
    let mut m = Model::new("shapes");
    m.add_block(Constant::new("c", Signal::scalar(1.0))).expect("c");
    m.add_block(ShapedSink::new("sink", Shape::column(2))).expect("sink");
    m.connect("c", "out", "sink", "in").expect("connect");

    let err = Simulator::new(m).err().expect("shape mismatch");
    match err {
        ModelError::ShapeMismatch {
            src_shape,
            dst_shape,
            ..
        } => {
            assert_eq!(src_shape, Shape::SCALAR);
            assert_eq!(dst_shape, Shape::column(2));
        }
        other => panic!("unexpected error: {other}"),
    }
}
