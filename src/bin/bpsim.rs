//! Evaluate a branch predictor against a text trace.

use anyhow::{ Context, Result };
use bpsim::*;
use clap::Parser;
use log::{ debug, info };
use std::io::{ self, BufRead };

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to trace file ('-' reads from stdin)
    #[arg(default_value = "-")]
    trace: String,

    /// Predictor: static, gshare:<ghist>, tournament:<ghist>:<lhist>:<pcindex>,
    /// custom[:<index>:<history>], or a numeric selector
    #[arg(short, long, default_value = "static")]
    predictor: PredictorConfig,

    /// Log every prediction (at debug level)
    #[arg(short, long)]
    verbose: bool,

    /// Report the branches with the most mispredictions
    #[arg(long, default_value = "0")]
    top: usize,

    /// Print statistics as JSON
    #[arg(long)]
    json: bool,
}

/// Default log filter when `RUST_LOG` is unset.
fn log_filter(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "warn" }
}

fn run<R: BufRead>(cli: &Cli, reader: &mut TraceReader<R>) -> Result<BranchStats> {
    let mut predictor = Predictor::build(&cli.predictor)
        .context("failed to initialize predictor")?;
    info!("predictor: {}", predictor.name());

    let mut stat = BranchStats::new(predictor.name());
    for record in reader.by_ref() {
        let record = record.context("failed to read trace")?;
        let prediction = step(&mut predictor, &mut stat, &record);
        if cli.verbose {
            debug!("{:08x} {:?} {:?}", record.pc, record.outcome, prediction);
        }
    }
    info!("read {} trace lines", reader.lines_read());
    Ok(stat)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_filter(cli.verbose))
    ).init();

    let stat = if cli.trace == "-" {
        run(&cli, &mut TraceReader::new(io::stdin().lock()))?
    } else {
        let mut reader = TraceReader::open(&cli.trace)
            .with_context(|| format!("failed to open {}", cli.trace))?;
        run(&cli, &mut reader)?
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&stat)?);
        return Ok(());
    }

    println!("Branches:        {:10}", stat.global_brns());
    println!("Incorrect:       {:10}", stat.global_miss());
    println!("Misprediction Rate: {:7.3}", stat.miss_rate_percent());
    println!("Unique branches: {:10}", stat.num_unique_branches());

    if cli.top > 0 {
        println!();
        println!("Most mispredicted branches:");
        for (pc, data) in stat.get_worst_branches(cli.top) {
            println!("  {:08x} {:8}/{:8} misses, taken {:.2}%",
                pc, data.misses(), data.occ, data.taken_rate() * 100.0
            );
        }
    }
    Ok(())
}
