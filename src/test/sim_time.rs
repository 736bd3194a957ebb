use crate::sim::{ClockMode, SimulationClock, SimulationConfig};

#[test]
fn clock_time_is_tick_times_step() {
    let mut clock = SimulationClock::new(0.1);
    for _ in 0..7 {
        clock.advance();
    }
    assert_eq!(clock.tick(), 7);
    assert_eq!(clock.now(), 7.0 * 0.1);
}

#[test]
fn tick_count_rounds_and_never_drops_to_zero() {
    assert_eq!(SimulationClock::ticks_for(30.0, 0.05), 600);
    assert_eq!(SimulationClock::ticks_for(0.3, 0.1), 3);
    assert_eq!(SimulationClock::ticks_for(0.01, 0.1), 1);
}

#[test]
fn config_parses_with_defaults() {
    let cfg: SimulationConfig =
        serde_json::from_str(r#"{ "dt": 0.05, "T": 30 }"#).expect("parse");
    assert_eq!(cfg.dt, 0.05);
    assert_eq!(cfg.duration, 30.0);
    assert!(cfg.logging.is_empty());
    assert_eq!(cfg.clock, ClockMode::Internal);
    cfg.validate().expect("valid");
}

#[test]
fn config_validation() {
    assert!(SimulationConfig::new(0.0, 1.0).validate().is_err());
    assert!(SimulationConfig::new(0.1, -1.0).validate().is_err());
    assert!(
        SimulationConfig::new(0.1, 1.0)
            .with_logging(["broken"])
            .validate()
            .is_err()
    );

    let bad_clock = serde_json::from_str::<SimulationConfig>(
        r#"{ "dt": 0.1, "T": 1, "clock": "wall" }"#,
    );
    assert!(bad_clock.is_err());
    let external: SimulationConfig =
        serde_json::from_str(r#"{ "dt": 0.1, "T": 1, "clock": "external" }"#).expect("parse");
    assert_eq!(external.clock, ClockMode::External);
}
