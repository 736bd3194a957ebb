use blocksim_rs::blocks::IntegrationMethod;
use blocksim_rs::demo::{DampedOscillatorOpts, OSCILLATOR_LOGGED, build_damped_oscillator};
use blocksim_rs::sim::Simulator;
use clap::Parser;
use std::error::Error;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "oscillator", about = "Damped oscillator x'' = -c x' - k x")]
struct Args {
    #[arg(long, default_value_t = 2.0)]
    x0: f64,

    #[arg(long, default_value_t = 5.0)]
    v0: f64,

    /// Damping coefficient c
    #[arg(long, default_value_t = 0.5)]
    damping: f64,

    /// Stiffness k
    #[arg(long, default_value_t = 2.0)]
    stiffness: f64,

    /// euler_forward or euler_backward
    #[arg(long, default_value = "euler_forward")]
    method: String,

    #[arg(long, default_value_t = 0.05)]
    dt: f64,

    /// Simulation duration (seconds)
    #[arg(long, default_value_t = 30.0)]
    duration: f64,

    /// Write the x/v log as JSON
    #[arg(long)]
    log_json: Option<PathBuf>,
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let opts = DampedOscillatorOpts {
        initial_position: args.x0,
        initial_velocity: args.v0,
        damping: args.damping,
        stiffness: args.stiffness,
        method: IntegrationMethod::parse(&args.method)?,
        dt: args.dt,
        duration: args.duration,
    };

    let mut sim = Simulator::new(build_damped_oscillator(&opts)?)?;
    let log = sim.run(opts.duration, opts.dt, &OSCILLATOR_LOGGED)?;

    if let Some(out) = args.log_json {
        fs::write(&out, log.to_json_pretty()?)?;
    }

    let last = |path: &str| {
        log.get(path)
            .and_then(|r| r.last())
            .and_then(|s| s.value.as_scalar())
            .unwrap_or(f64::NAN)
    };
    println!(
        "done @ t={}, ticks={}, x={:.6}, v={:.6}",
        sim.now(),
        sim.ticks(),
        last(OSCILLATOR_LOGGED[0]),
        last(OSCILLATOR_LOGGED[1])
    );
    Ok(())
}

fn main() {
    // 初始化 tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
