use anyhow::Result;
use clap::Parser;
use log::info;
use std::time::Instant;

use fadedup::args::{Args, effective_threads};
use fadedup::engine::Deduplicator;
use fadedup::io::{read_records, write_records};
use fadedup::logging::init_logging;
use fadedup::utils::{format_duration, percent};

#[cfg(not(windows))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let threads = effective_threads(&args);
    let total_start = Instant::now();
    info!(
        "fadedup: {} mode, {} threads{}",
        args.mode,
        threads,
        if args.single_threaded { " (single-threaded mode)" } else { "" }
    );

    let read_start = Instant::now();
    let records = read_records(&args.input);
    info!(
        "read {} records from {} in {}",
        records.len(),
        args.input.display(),
        format_duration(read_start.elapsed())
    );

    let dedup_start = Instant::now();
    let engine = Deduplicator::new(args.mode, threads)?;
    let result = engine.run(records)?;
    let stats = result.stats;
    info!(
        "kept {} of {} records, removed {} ({:.2}%) in {} round(s), {}",
        stats.survivors,
        stats.candidates,
        stats.removed(),
        percent(stats.removed(), stats.candidates),
        stats.rounds,
        format_duration(dedup_start.elapsed())
    );

    write_records(&args.output, &result.records)?;
    info!("wrote {}", args.output.display());

    info!("done in {}", format_duration(total_start.elapsed()));
    Ok(())
}
