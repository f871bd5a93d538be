use anyhow::{Result, ensure};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use simlog_reducer::{
    exporter::{ReductionSummary, render_summaries},
    ingestor::types::PairKey,
    reduce::{
        QueueSource, ReduceContext, UtilizationSource, reduce_flow_rate, reduce_link_queue,
        reduce_link_utilization, reduce_ping, reduce_udp_burst,
    },
    settings::Settings,
};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "simlog-reducer",
    about = "Reduce discrete-event simulation telemetry logs into step-plottable series",
    version,
    after_help = r#"Configuration:
    Configuration can be provided via:
    1. Environment variables with SIMLOG__ prefix (e.g., SIMLOG__LOGS_DIR)
    2. Config file with -c option (TOML)
    3. Command-line overrides below

Examples:
    # Rate series for TCP flows 0 and 1 in 100 ms windows
    simlog-reducer --logs-dir run1/logs_ns3 --out-dir run1/data flow-rate --flow-id 0 1 --interval-ns 100000000

    # Queue occupancy for links 0->1 and 1->2
    simlog-reducer link-queue --pair 0:1 --pair 1:2

    # Qdisc occupancy and net-device busy fractions for the same links
    simlog-reducer link-queue --pair 0:1 --source interface-tc-qdisc
    simlog-reducer link-utilization --pair 0:1 --source net-device

    # Ping RTT and out-of-order counts for pair 3->5
    simlog-reducer ping --pair 3:5 --interval-ns 1000000000"#
)]
struct Cli {
    /// Path to the configuration file (TOML format)
    ///
    /// If not provided, will attempt to load from environment variables
    #[clap(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory containing the simulator log CSVs (overrides settings)
    #[clap(long, value_name = "DIR")]
    logs_dir: Option<PathBuf>,

    /// Directory the derived CSVs are written to (overrides settings)
    #[clap(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Difference cumulative TCP flow progress into a rate step series
    FlowRate {
        /// Flow identifiers to reduce
        #[clap(long = "flow-id", required = true, num_args = 1..)]
        flow_ids: Vec<u64>,
        /// Window width in nanoseconds (defaults to settings)
        #[clap(long)]
        interval_ns: Option<u64>,
    },
    /// Validate and re-emit per-link queue occupancy as step series
    LinkQueue {
        /// Link endpoints as <from>:<to>, repeatable
        #[clap(long = "pair", required = true)]
        pairs: Vec<PairKey>,
        /// Which queue log to reduce
        #[clap(long, value_enum, default_value = "link")]
        source: QueueSource,
    },
    /// Convert per-link busy time into utilization fraction step series
    LinkUtilization {
        /// Link endpoints as <from>:<to>, repeatable
        #[clap(long = "pair", required = true)]
        pairs: Vec<PairKey>,
        /// Which utilization log to reduce
        #[clap(long, value_enum, default_value = "link")]
        source: UtilizationSource,
    },
    /// Check ping replies for causal-order violations and emit RTT plus
    /// per-window violation counts
    Ping {
        /// Ping pairs as <from>:<to>, repeatable
        #[clap(long = "pair", required = true)]
        pairs: Vec<PairKey>,
        /// Window width in nanoseconds for violation counting
        #[clap(long)]
        interval_ns: Option<u64>,
    },
    /// Reduce UDP burst packet logs into amounts, rates and latencies
    UdpBurst {
        /// Burst identifiers to reduce
        #[clap(long = "burst-id", required = true, num_args = 1..)]
        burst_ids: Vec<u64>,
        /// Window width in nanoseconds for rate computation
        #[clap(long)]
        interval_ns: Option<u64>,
    },
}

impl Cli {
    fn run(self) -> Result<()> {
        let mut settings = if let Some(config_path) = &self.config {
            Settings::from_path(config_path)?
        } else {
            Settings::from_env()?
        };
        if let Some(logs_dir) = self.logs_dir {
            settings.logs_dir = logs_dir;
        }
        if let Some(out_dir) = self.out_dir {
            settings.data_out_dir = out_dir;
        }
        init_logging(&settings.log_level)?;

        let ctx = ReduceContext::new(&settings.logs_dir, &settings.data_out_dir)?;

        // Entity keys are independent series; reduce them in parallel.
        let summaries: Vec<ReductionSummary> = match self.command {
            Commands::FlowRate {
                flow_ids,
                interval_ns,
            } => {
                let interval_ns = effective_interval(interval_ns, &settings)?;
                flow_ids
                    .par_iter()
                    .map(|&flow_id| reduce_flow_rate(&ctx, flow_id, interval_ns))
                    .collect::<Result<_, _>>()?
            }
            Commands::LinkQueue { pairs, source } => pairs
                .par_iter()
                .map(|&pair| reduce_link_queue(&ctx, pair, source))
                .collect::<Result<_, _>>()?,
            Commands::LinkUtilization { pairs, source } => pairs
                .par_iter()
                .map(|&pair| reduce_link_utilization(&ctx, pair, source))
                .collect::<Result<_, _>>()?,
            Commands::Ping { pairs, interval_ns } => {
                let interval_ns = effective_interval(interval_ns, &settings)?;
                pairs
                    .par_iter()
                    .map(|&pair| reduce_ping(&ctx, pair, interval_ns))
                    .collect::<Result<_, _>>()?
            }
            Commands::UdpBurst {
                burst_ids,
                interval_ns,
            } => {
                let interval_ns = effective_interval(interval_ns, &settings)?;
                burst_ids
                    .par_iter()
                    .map(|&burst_id| reduce_udp_burst(&ctx, burst_id, interval_ns))
                    .collect::<Result<_, _>>()?
            }
        };

        println!("{}", render_summaries(&summaries));
        Ok(())
    }
}

fn effective_interval(override_ns: Option<u64>, settings: &Settings) -> Result<u64> {
    let interval_ns = override_ns.unwrap_or(settings.interval_ns);
    ensure!(interval_ns > 0, "interval-ns must be positive");
    Ok(interval_ns)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run()
}

fn init_logging(log_level: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}
