//! SlotLog CLI
//!
//! Command-line interface for inspecting and editing a SlotLog dataset.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use slotlog::config::DEFAULT_PARTITION_CAPACITY;
use slotlog::{Config, PartitionManager, Result, SlotStore};
use tracing_subscriber::{fmt, EnvFilter};

/// SlotLog CLI
#[derive(Parser, Debug)]
#[command(name = "slotlog-cli")]
#[command(about = "CLI for SlotLog partitioned slot arrays")]
#[command(version)]
struct Args {
    /// Dataset directory
    #[arg(short, long, default_value = "./slotlog_data")]
    data_dir: PathBuf,

    /// Dataset name (partition file prefix)
    #[arg(short, long, default_value = "log")]
    name: String,

    /// Slots per partition file
    #[arg(short = 'c', long, default_value_t = DEFAULT_PARTITION_CAPACITY)]
    partition_capacity: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Append each argument as one record
    Append {
        /// Records to append
        #[arg(required = true)]
        records: Vec<String>,
    },

    /// Print the record at a logical index
    Get {
        /// Logical index
        index: u64,
    },

    /// Print the number of records
    Len,

    /// Drop every record at and after an index
    Truncate {
        /// First logical index to drop
        index: u64,
    },

    /// List partitions with their start index and slot count
    Inspect,

    /// Measure write throughput of a single slot store
    Bench {
        /// Records to write
        #[arg(short, long, default_value = "200000")]
        records: u64,

        /// Concurrent writer threads, each owning disjoint indices
        #[arg(short, long, default_value = "3")]
        threads: u64,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,slotlog=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = Config::builder()
        .data_dir(&args.data_dir)
        .name(&args.name)
        .partition_capacity(args.partition_capacity)
        .build();

    let mut log = PartitionManager::new(config);
    log.open()?;
    execute(&mut log, args.command)?;
    log.close()
}

fn execute(log: &mut PartitionManager, command: Commands) -> Result<()> {
    match command {
        Commands::Append { records } => {
            for record in records {
                let index = log.append(record.as_bytes())?;
                println!("{}", index);
            }
        }
        Commands::Get { index } => {
            let payload = log.get(index)?;
            println!("{}", String::from_utf8_lossy(&payload));
        }
        Commands::Len => {
            println!("{}", log.length()?);
        }
        Commands::Truncate { index } => {
            log.truncate(index)?;
            println!("{}", log.length()?);
        }
        Commands::Inspect => {
            for partition in log.partitions()? {
                println!(
                    "{:>12}  {:>8}  {}",
                    partition.start,
                    partition.slots,
                    partition.path.display()
                );
            }
        }
        Commands::Bench { records, threads } => {
            bench(log.data_dir(), log.name(), records, threads)?;
        }
    }
    Ok(())
}

/// Write `records` small JSON records into a scratch store from `threads`
/// threads, then report records per second.
///
/// The scratch file lives in a fresh temporary subdirectory, which dataset
/// discovery ignores and which is removed afterwards.
fn bench(data_dir: &Path, name: &str, records: u64, threads: u64) -> Result<()> {
    let threads = threads.max(1);
    // Private scratch directory on the dataset's disk, removed on drop
    let scratch = tempfile::Builder::new()
        .prefix("bench-")
        .tempdir_in(data_dir)?;
    let path = scratch.path().join(format!("{}-0.bin", name));

    let payloads: [&[u8]; 3] = [
        br#"{"hello":"world"}"#,
        br#"{"foo":"bar"}"#,
        br#"{"james":"smith"}"#,
    ];

    let store = SlotStore::new(&path);
    store.open()?;

    let started = Instant::now();
    let results: Vec<Result<()>> = crossbeam::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let store = &store;
                s.spawn(move |_| -> Result<()> {
                    let mut index = t;
                    while index < records {
                        store.set(index, payloads[(index % 3) as usize])?;
                        index += threads;
                    }
                    Ok(())
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
            .collect()
    })
    .unwrap_or_else(|e| std::panic::resume_unwind(e));

    results.into_iter().collect::<Result<()>>()?;
    store.close()?;

    let seconds = started.elapsed().as_secs_f64();
    tracing::info!(
        "Wrote {} records with {} threads in {:.3}s",
        records,
        threads,
        seconds
    );
    println!("{:.0} records/s", records as f64 / seconds);

    scratch.close()?;
    Ok(())
}
