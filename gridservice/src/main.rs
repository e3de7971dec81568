use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use basketatlas::prelude::{
    codec_for, BasketSimulator, NormalSource, PayloadFormat, StandardNormalSource,
};
use clap::{Args, Parser, Subcommand};
use gridservice::config::ServiceConfig;
use gridservice::driver::Driver;
use gridservice::errors::Result;
use gridservice::logging::init_tracing;
use gridservice::platform::local::LocalPlatform;
use gridservice::worker::BasketWorker;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "gridservice", version, about = "Monte Carlo basket valuation on a task grid")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct Common {
    /// JSON configuration file; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the number of simulated paths.
    #[arg(long)]
    paths: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    /// Splits the valuation into chunks and runs them on the in-process grid.
    Run {
        #[command(flatten)]
        common: Common,
        #[arg(long)]
        chunk_size: Option<usize>,
        #[arg(long)]
        partition: Option<String>,
        #[arg(long)]
        threads: Option<usize>,
        /// Payload format tag, `lines/v1` or `json/v1`.
        #[arg(long)]
        format: Option<PayloadFormat>,
    },
    /// Prices the configured basket in a single in-process run.
    Simulate {
        #[command(flatten)]
        common: Common,
        /// Seed for a reproducible run; OS entropy otherwise.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Prints the payload that would be sent for the configured request.
    Encode {
        #[command(flatten)]
        common: Common,
        #[arg(long)]
        format: Option<PayloadFormat>,
    },
}

fn load(common: &Common) -> Result<ServiceConfig> {
    let mut config = ServiceConfig::load(common.config.as_deref())?;
    if let Some(paths) = common.paths {
        config.request = config.request.with_num_simulations(paths);
    }
    Ok(config)
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run {
            common,
            chunk_size,
            partition,
            threads,
            format,
        } => {
            let mut config = load(&common)?;
            if let Some(chunk_size) = chunk_size {
                config.chunk_size = chunk_size;
            }
            if let Some(partition) = partition {
                config.task_options = config.task_options.with_partition(partition);
            }
            if let Some(threads) = threads {
                config.worker_threads = threads;
            }
            if let Some(format) = format {
                config.payload_format = format;
            }

            let platform = LocalPlatform::new(Arc::new(BasketWorker::new()), config.worker_threads)?;
            info!(threads = platform.num_threads(), "in-process grid ready");
            let report = Driver::new(&platform, config.task_options.clone())
                .with_chunk_size(config.chunk_size)
                .with_format(config.payload_format)
                .run(&config.request)?;
            println!("Simulated basket value: {}", report.aggregate());
        }
        Command::Simulate { common, seed } => {
            let config = load(&common)?;
            let mut source: Box<dyn NormalSource> = match seed {
                Some(seed) => Box::new(StandardNormalSource::seeded(seed)),
                None => Box::new(StandardNormalSource::from_entropy()),
            };
            let result = BasketSimulator::new().simulate_request(&config.request, &mut source)?;
            println!("Simulated basket value: {}", result.value());
        }
        Command::Encode { common, format } => {
            let config = load(&common)?;
            let codec = codec_for(format.unwrap_or(config.payload_format));
            println!("{}", String::from_utf8_lossy(&codec.encode(&config.request)));
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "basket valuation failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
