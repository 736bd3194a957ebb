use blocksim_rs::blocks::Constant;
use blocksim_rs::cosim::{CosimBlock, PlantTransport, ProcessTransport, TransportError};
use blocksim_rs::model::Model;
use blocksim_rs::signal::{Signal, Signals};
use blocksim_rs::sim::Simulator;
use std::time::Duration;

fn worker(gain: f64, dt: f64) -> ProcessTransport {
    ProcessTransport::new(env!("CARGO_BIN_EXE_plant_worker"))
        .with_args(["--gain".to_string(), gain.to_string(), "--dt".to_string(), dt.to_string()])
        .with_timeout(Duration::from_secs(10))
}

#[test]
fn plant_worker_steps_once_per_request() {
    let mut t = worker(2.0, 0.5);
    t.open().expect("spawn worker");

    let mut u = Signals::new();
    u.insert("u".into(), Signal::scalar(1.0));
    let y1 = t.step(&u).expect("step 1");
    let y2 = t.step(&u).expect("step 2");
    assert_eq!(y1.get("y").and_then(Signal::as_scalar), Some(1.0));
    assert_eq!(y2.get("y").and_then(Signal::as_scalar), Some(2.0));

    let err = t.step(&Signals::new()).expect_err("missing input");
    assert!(matches!(err, TransportError::Remote(_)));

    t.close().expect("close");
    assert!(!t.is_open());
}

#[test]
fn simulator_drives_plant_worker_process() {
    let mut m = Model::new("process-cosim");
    m.add_block(Constant::new("u", 1.0)).expect("u");
    m.add_block(CosimBlock::new("plant", &["u"], &["y"], worker(1.0, 0.1)))
        .expect("plant");
    m.connect("u", "out", "plant", "u").expect("u->plant");

    let mut sim = Simulator::new(m).expect("compile");
    let log = sim.run(0.5, 0.1, &["plant.y"]).expect("run");
    let y = log.get("plant.y").expect("y").scalars();
    assert_eq!(y.len(), 5);
    assert!((y[4] - 0.5).abs() < 1e-9, "y={y:?}");
}

#[test]
fn rerun_resets_the_worker_process() {
    let mut m = Model::new("process-rerun");
    m.add_block(Constant::new("u", 1.0)).expect("u");
    m.add_block(CosimBlock::new("plant", &["u"], &["y"], worker(1.0, 0.1)))
        .expect("plant");
    m.connect("u", "out", "plant", "u").expect("u->plant");

    let mut sim = Simulator::new(m).expect("compile");
    let first = sim.run(0.3, 0.1, &["plant.y"]).expect("first run");
    let second = sim.run(0.3, 0.1, &["plant.y"]).expect("second run");
    assert_eq!(first, second);
}

#[test]
fn silent_worker_is_killed_after_timeout() {
    let mut t = ProcessTransport::new("sleep")
        .with_args(["30"])
        .with_timeout(Duration::from_millis(50));
    t.open().expect("spawn sleep");

    let err = t.step(&Signals::new()).expect_err("no reply");
    assert!(matches!(err, TransportError::Timeout(_)));
    assert!(!t.is_open());
    assert!(matches!(t.step(&Signals::new()), Err(TransportError::NotOpen)));
}

#[test]
fn missing_worker_binary_fails_to_open() {
    let mut t = ProcessTransport::new("/nonexistent/plant_worker");
    assert!(matches!(t.open(), Err(TransportError::Spawn(_))));
}
