use blocksim_rs::project::load_project;
use blocksim_rs::signal::{Signal, SignalPath};
use blocksim_rs::sim::{ClockMode, Simulator, TickObserver};
use clap::Parser;
use std::error::Error;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "blocksim", about = "Run a block-diagram project file")]
struct Args {
    /// Path to project.json
    #[arg(long)]
    project: PathBuf,

    /// Override simulation duration T (seconds)
    #[arg(long)]
    duration: Option<f64>,

    /// Override base step dt (seconds)
    #[arg(long)]
    dt: Option<f64>,

    /// Extra signal path to log (e.g. x.outputs.out); repeatable
    #[arg(long = "log")]
    log: Vec<String>,

    /// Write the full signal log as JSON
    #[arg(long)]
    log_json: Option<PathBuf>,

    /// Print logged samples as one JSON line per tick while running
    #[arg(long)]
    stream: bool,
}

/// 每个 tick 输出一行 JSON
struct JsonLinesObserver;

impl TickObserver for JsonLinesObserver {
    fn on_tick(&mut self, t: f64, tick: u64, records: &[(SignalPath, Signal)]) {
        if records.is_empty() {
            return;
        }
        let values: serde_json::Map<String, serde_json::Value> = records
            .iter()
            .map(|(path, value)| {
                (
                    path.to_string(),
                    serde_json::to_value(value).unwrap_or(serde_json::Value::Null),
                )
            })
            .collect();
        println!("{}", serde_json::json!({ "tick": tick, "t": t, "values": values }));
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let project = load_project(&args.project)?;

    let mut cfg = project.simulation.clone();
    if let Some(d) = args.duration {
        cfg.duration = d;
    }
    if let Some(dt) = args.dt {
        cfg.dt = dt;
    }
    for path in args.log {
        if !cfg.logging.contains(&path) {
            cfg.logging.push(path);
        }
    }
    cfg.validate()?;
    if cfg.clock == ClockMode::External {
        return Err("project uses an external clock; drive it through ExternalMaster".into());
    }

    let model = project.build_model()?;
    let mut sim = Simulator::new(model)?;
    let log = if args.stream {
        sim.run_observed(cfg.duration, cfg.dt, &cfg.logging, &mut JsonLinesObserver)?
    } else {
        sim.run_config(&cfg)?
    };

    if let Some(out) = args.log_json {
        fs::write(&out, log.to_json_pretty()?)?;
    }

    println!(
        "done @ t={}, ticks={}, records={}",
        sim.now(),
        sim.ticks(),
        log.records().len()
    );
    for record in log.records() {
        if let Some(last) = record.last() {
            println!(
                "  {} samples={} last={:?}",
                record.path,
                record.len(),
                last.value.data()
            );
        }
    }
    Ok(())
}

fn main() {
    // 初始化 tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
