use std::io::Write;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use env_logger::{Builder, Env};
use log::info;

use vmplace::config::ExperimentConfig;
use vmplace::error::PlacementError;
use vmplace::experiment::Experiment;
use vmplace::report::{print_experiment_report, write_csv, write_json};

#[derive(Parser, Debug)]
#[command(about, long_about = None)]
/// Compares ACO, PSO and hybrid VM placement on generated scenarios
struct Args {
    /// Path to YAML file with experiment configuration
    #[arg(short, long)]
    config: PathBuf,

    /// Path to produced CSV file with experiment results
    #[arg(long, default_value = "results.csv")]
    csv: PathBuf,

    /// Path to produced JSON file with experiment results
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of threads to use (default - use all available cores)
    #[arg(short, long)]
    threads: Option<usize>,
}

fn init_logger() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();
}

fn run(args: Args) -> Result<(), PlacementError> {
    let config = ExperimentConfig::from_file(&args.config)?;
    let threads = args
        .threads
        .or_else(|| std::thread::available_parallelism().ok().map(|n| n.get()))
        .unwrap_or(1);

    let results = Experiment::new(config).run(threads)?;
    print_experiment_report(&results);

    write_csv(&args.csv, &results)?;
    info!("Results saved to {}", args.csv.display());

    if let Some(output) = args.output {
        write_json(&output, &results)?;
        info!("Results saved to {}", output.display());
    }
    Ok(())
}

fn main() {
    init_logger();
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
