//! Arbor - headless sketch driver
//!
//! Usage:
//!     arbor [--config <PATH>] [--preset <blossom|grove>] [--seed <SEED>] [--port <PORT>] [--no-debug]
//!
//! Grows the configured tree, then ticks at the configured rate until Ctrl-C.
//! Parameter changes arrive over the debug server.

use std::path::PathBuf;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Instant;

use arbor::core::{logging, Result};
use arbor::procgen::TreeParams;
use arbor::sketch::{Sketch, SketchConfig, SketchDebugHandler};

/// Seconds between periodic stats lines
const STATS_INTERVAL: f32 = 10.0;

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    preset: Option<String>,
    seed: Option<u64>,
    port: Option<u16>,
    no_debug: bool,
}

fn parse_args() -> std::result::Result<Args, String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut out = Args::default();

    let mut i = 0;
    while i < args.len() {
        let value = |i: usize| args.get(i + 1).ok_or_else(|| format!("Missing value for {}", args[i]));
        match args[i].as_str() {
            "-c" | "--config" => {
                out.config = Some(PathBuf::from(value(i)?));
                i += 1;
            }
            "--preset" => {
                out.preset = Some(value(i)?.clone());
                i += 1;
            }
            "--seed" => {
                let v = value(i)?;
                out.seed = Some(v.parse().map_err(|_| format!("Invalid seed: {}", v))?);
                i += 1;
            }
            "--port" => {
                let v = value(i)?;
                out.port = Some(v.parse().map_err(|_| format!("Invalid port: {}", v))?);
                i += 1;
            }
            "--no-debug" => out.no_debug = true,
            other => return Err(format!("Unknown option: {}", other)),
        }
        i += 1;
    }
    Ok(out)
}

fn build_config(args: &Args) -> Result<SketchConfig> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading config from: {}", path.display());
            SketchConfig::load(path)?
        }
        None => SketchConfig::default(),
    };

    if let Some(name) = &args.preset {
        config = match name.to_ascii_lowercase().as_str() {
            "grove" => SketchConfig { seed: config.seed, ..SketchConfig::grove() },
            _ => {
                config.params = TreeParams::preset(name)
                    .ok_or_else(|| arbor::core::Error::Config(format!("Unknown preset: {}", name)))?;
                config
            }
        };
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(port) = args.port {
        config.debug_port = Some(port);
    }
    if args.no_debug {
        config.debug_port = None;
    }
    config.validate()?;
    Ok(config)
}

async fn run(config: SketchConfig) -> Result<()> {
    let period = config.tick_period()?;
    let sketch = Arc::new(StdMutex::new(Sketch::from_config(&config)));

    let server = config.debug_port.map(|port| {
        let handler = Arc::new(tokio::sync::Mutex::new(SketchDebugHandler::new(sketch.clone())));
        arbor_debug::DebugServer::start(handler, port)
    });

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let start = Instant::now();
    let mut next_report = STATS_INTERVAL;
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let elapsed = start.elapsed().as_secs_f32();
                let mut sketch = sketch.lock().unwrap_or_else(|p| p.into_inner());
                let frame = sketch.tick(elapsed);
                if elapsed >= next_report {
                    next_report += STATS_INTERVAL;
                    log::info!(
                        "frame {} | {} render items | generation {}",
                        frame.frame,
                        frame.render_items,
                        frame.generation
                    );
                }
            }
            _ = &mut shutdown => {
                log::info!("Shutting down");
                break;
            }
        }
    }

    if let Some(server) = server {
        server.shutdown();
    }
    Ok(())
}

fn main() {
    logging::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };
    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    log::info!(
        "Arbor sketch: seed {}, {} root(s), tick rate {} Hz",
        config.seed,
        config.placement.root_positions().len(),
        config.tick_rate
    );

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            log::error!("Failed to create tokio runtime: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = runtime.block_on(run(config)) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
