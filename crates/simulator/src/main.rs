//! SensorGraph simulator CLI
//!
//! Compiles a SensorGraph source file and drives it with simulated ticks,
//! printing the readings the device would export.
//!
//! # Example
//!
//! ```bash
//! # Two accelerated minutes, tracing the streamer selectors
//! sensorgraph-sim sensors.sg -d 120
//!
//! # Real-time run with explicit stop condition and trace selector
//! sensorgraph-sim sensors.sg --realtime --stop "run_time 2 minutes" --trace "all outputs"
//! ```

use clap::Parser;
use sensorgraph_compiler::compile;
use sensorgraph_lang::parse;
use sensorgraph_simulation::{SensorGraphSimulator, StopCondition};
use sensorgraph_types::{DataStreamSelector, DeviceModel};
use std::path::PathBuf;
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// SensorGraph simulator
///
/// Deterministic and single-threaded: the same source file and inputs
/// produce the same trace every run.
#[derive(Parser, Debug)]
#[command(name = "sensorgraph-sim")]
#[command(version, about, long_about = None)]
struct Args {
    /// SensorGraph source file
    file: PathBuf,

    /// Simulation duration in seconds, used when no --stop is given
    #[arg(short = 'd', long, default_value = "60")]
    duration: u32,

    /// Stop condition, e.g. "run_time 2 minutes" or "tick_count 500".
    /// May be repeated; the first condition to hold stops the run.
    #[arg(long)]
    stop: Vec<String>,

    /// Trace selector, e.g. "all outputs" or "counter 1". May be repeated.
    /// Defaults to the selectors of the file's streamer declarations.
    #[arg(long)]
    trace: Vec<String>,

    /// Device model description (JSON). Defaults to a 32-node, 8-slot device.
    #[arg(long)]
    model: Option<PathBuf>,

    /// Pace the run at one tick per wall-clock second instead of running
    /// as fast as possible
    #[arg(long)]
    realtime: bool,

    /// Push a system reset reading before the first tick
    #[arg(long)]
    reset: bool,

    /// Print the recorded trace as JSON
    #[arg(long)]
    json: bool,

    /// Print the compiled nodes and exit without simulating
    #[arg(long)]
    dump_nodes: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,sensorgraph_simulation=info")),
        )
        .init();

    let args = Args::parse();

    let source = std::fs::read_to_string(&args.file).unwrap_or_else(|err| {
        eprintln!("error: cannot read {}: {err}", args.file.display());
        process::exit(1);
    });

    let model = match &args.model {
        Some(path) => {
            let text = std::fs::read_to_string(path).unwrap_or_else(|err| {
                eprintln!("error: cannot read {}: {err}", path.display());
                process::exit(1);
            });
            serde_json::from_str::<DeviceModel>(&text).unwrap_or_else(|err| {
                eprintln!("error: invalid device model: {err}");
                process::exit(1);
            })
        }
        None => DeviceModel::default(),
    };

    let statements = parse(&source).unwrap_or_else(|err| {
        eprintln!("error: {err}");
        process::exit(1);
    });
    let graph = compile(&statements, &model).unwrap_or_else(|err| {
        eprintln!("error: {err}");
        process::exit(1);
    });

    if args.dump_nodes {
        println!("{}", graph.dump_nodes());
        return;
    }

    let selectors = if args.trace.is_empty() {
        None
    } else {
        Some(
            args.trace
                .iter()
                .map(|text| {
                    text.parse::<DataStreamSelector>().unwrap_or_else(|err| {
                        eprintln!("error: invalid trace selector '{text}': {err}");
                        process::exit(1);
                    })
                })
                .collect(),
        )
    };

    let mut sim = SensorGraphSimulator::new(graph);
    sim.record_trace(selectors);

    if args.stop.is_empty() {
        sim.add_stop_condition(StopCondition::RunTime {
            ticks: args.duration,
        });
    }
    for text in &args.stop {
        sim.stop_condition(text).unwrap_or_else(|err| {
            eprintln!("error: {err}");
            process::exit(1);
        });
    }

    info!(
        file = %args.file.display(),
        realtime = args.realtime,
        "starting simulation"
    );
    sim.run(!args.realtime, args.reset);

    let trace = sim.trace();
    if args.json {
        match serde_json::to_string_pretty(&trace) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("error: cannot serialize trace: {err}");
                process::exit(1);
            }
        }
    } else {
        for reading in &trace.readings {
            println!("{reading}");
        }
    }

    info!(
        ticks = sim.tick(),
        readings = trace.len(),
        "simulation complete"
    );
}
