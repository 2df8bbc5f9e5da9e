use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vmsim::{trace, PolicyKind, Report, SimulationConfig, Simulator, TableKind, TraceEvent};

#[derive(Parser)]
#[command(name = "vmsim")]
#[command(about = "Simulate demand paging over a memory access trace")]
#[command(version)]
struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one simulation and print its report
    Run {
        /// Replacement policy: fifo, lru, random or 2a
        policy: PolicyKind,

        /// Trace file, one `<hex address> <R|W>` per line
        trace: PathBuf,

        /// Page size in KB (2 to 64)
        page_kb: u64,

        /// Physical memory size in KB (128 to 16384)
        memory_kb: u64,

        /// Page table: dense, doisNiveis, tresNiveis or inverted
        #[arg(short, long, default_value = "dense")]
        table: TableKind,

        /// Seed for the random policy
        #[arg(long)]
        seed: Option<u64>,

        /// Print one line per access
        #[arg(short, long)]
        verbose: bool,

        /// Print the frame table after the run
        #[arg(long)]
        dump_frames: bool,
    },

    /// Run every combination of the given parameters and print one row per run
    Sweep {
        /// Trace files
        #[arg(required = true)]
        traces: Vec<PathBuf>,

        #[arg(long, value_delimiter = ',', default_values_t = [PolicyKind::Lru, PolicyKind::Clock, PolicyKind::Fifo, PolicyKind::Random])]
        policies: Vec<PolicyKind>,

        /// Page sizes in KB
        #[arg(long, value_delimiter = ',', default_values_t = [2, 16, 64])]
        page_sizes: Vec<u64>,

        /// Memory sizes in KB
        #[arg(long, value_delimiter = ',', default_values_t = [256, 2048, 16384])]
        memory_sizes: Vec<u64>,

        #[arg(long, value_delimiter = ',', default_values_t = TableKind::ALL)]
        tables: Vec<TableKind>,

        /// Seed for the random policy
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_trace(path: &Path) -> anyhow::Result<Vec<TraceEvent>> {
    let events = trace::from_file(path)
        .with_context(|| format!("Unable to read trace file {}", path.display()))?;
    tracing::debug!(path = %path.display(), accesses = events.len(), "trace loaded");
    Ok(events)
}

fn build_config(
    page_kb: u64,
    memory_kb: u64,
    policy: PolicyKind,
    table: TableKind,
    seed: Option<u64>,
) -> anyhow::Result<SimulationConfig> {
    let config = SimulationConfig::from_kb(page_kb, memory_kb, policy, table)
        .context("Unable to build simulation config")?;
    Ok(match seed {
        Some(seed) => config.with_seed(seed),
        None => config,
    })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Commands::Run { policy, trace, page_kb, memory_kb, table, seed, verbose, dump_frames } => {
            let config = build_config(page_kb, memory_kb, policy, table, seed)?;
            let events = load_trace(&trace)?;

            let mut sim = Simulator::new(config).context("Unable to start simulator")?;
            if verbose {
                for event in events {
                    println!("{}", sim.access(event));
                }
            } else {
                sim.run(events);
            }

            let trace_name = trace.display().to_string();
            println!("{}", Report::new(&trace_name, &sim));
            if dump_frames {
                println!("{}", sim.frames());
            }
        }

        Commands::Sweep { traces, policies, page_sizes, memory_sizes, tables, seed } => {
            let loaded = traces
                .iter()
                .map(|path| -> anyhow::Result<_> { Ok((path.display().to_string(), load_trace(path)?)) })
                .collect::<anyhow::Result<Vec<_>>>()?;

            // tables, then traces, then policies, memory sizes and page sizes
            println!("{}", Report::ROW_HEADER);
            for &table in &tables {
                for (trace_name, events) in &loaded {
                    for &policy in &policies {
                        for &memory_kb in &memory_sizes {
                            for &page_kb in &page_sizes {
                                let config = build_config(page_kb, memory_kb, policy, table, seed)?;
                                let mut sim = Simulator::new(config).context("Unable to start simulator")?;
                                sim.run(events.iter().copied());
                                println!("{}", Report::new(trace_name, &sim).row());
                            }
                        }
                    }
                }
            }
        }
    }

    Ok(())
}
