use blocksim_rs::cosim::{IntegratorPlant, serve};
use clap::Parser;
use std::io::{self, BufWriter};

/// 联合仿真 worker：stdin/stdout 上的 JSON 行协议，日志走 stderr。
#[derive(Debug, Parser)]
#[command(name = "plant_worker", about = "Externally stepped integrator plant")]
struct Args {
    #[arg(long, default_value_t = 1.0)]
    gain: f64,

    #[arg(long, default_value_t = 0.1)]
    dt: f64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();
    let mut plant = IntegratorPlant::new(args.gain, args.dt);

    let stdin = io::stdin();
    let stdout = io::stdout();
    match serve(&mut plant, stdin.lock(), BufWriter::new(stdout.lock())) {
        Ok(steps) => tracing::info!(steps, "plant worker 退出"),
        Err(e) => {
            tracing::error!(error = %e, "plant worker i/o 失败");
            std::process::exit(1);
        }
    }
}
