// Command-line argument parsing
use clap::Parser;
use log::warn;
use std::path::PathBuf;

use crate::engine::Mode;

#[derive(Parser, Debug)]
#[command(
    name = "fadedup",
    about = "Remove duplicate and contained sequences from a FASTA file"
)]
pub struct Args {
    /// Input FASTA, optionally gzip-compressed
    #[arg(short, long)]
    pub input: PathBuf,
    /// Output FASTA; gzip-compressed when the name ends in .gz
    #[arg(short, long)]
    pub output: PathBuf,
    /// Worker threads, clamped to [1, available CPUs]
    #[arg(short = 't', long, default_value_t = 4, allow_negative_numbers = true)]
    pub threads: i64,
    /// Deduplication strategy
    #[arg(short = 'm', long, value_enum, default_value_t = Mode::Exact)]
    pub mode: Mode,
    /// Force a single worker thread
    #[arg(long)]
    pub single_threaded: bool,
    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

pub fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Clamp a requested worker count into `[1, max]`, warning when it changes
pub fn clamp_threads(requested: i64, max: usize) -> usize {
    let max = max.max(1);
    let threads = usize::try_from(requested).unwrap_or(0).clamp(1, max);
    if i64::try_from(threads).ok() != Some(requested) {
        warn!(
            "Adjusting thread count from {} to {} (must be between 1 and {})",
            requested, threads, max
        );
    }
    threads
}

/// Get effective thread count based on args and host CPUs
#[inline]
pub fn effective_threads(args: &Args) -> usize {
    if args.single_threaded {
        1
    } else {
        clamp_threads(args.threads, num_cpus())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_args_defaults() {
        let args = parse(&["fadedup", "-i", "in.fa", "-o", "out.fa"]);
        assert_eq!(args.input, PathBuf::from("in.fa"));
        assert_eq!(args.output, PathBuf::from("out.fa"));
        assert_eq!(args.threads, 4);
        assert_eq!(args.mode, Mode::Exact);
        assert!(!args.single_threaded);
        assert_eq!(args.verbose, 0);
    }

    #[test]
    fn test_args_mode_and_verbosity() {
        let args = parse(&[
            "fadedup", "-i", "in.fa.gz", "-o", "out.fa", "-m", "concurrent", "-t", "2", "-vv",
        ]);
        assert_eq!(args.mode, Mode::Concurrent);
        assert_eq!(args.threads, 2);
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_args_require_input_and_output() {
        assert!(Args::try_parse_from(["fadedup", "-i", "in.fa"]).is_err());
        assert!(Args::try_parse_from(["fadedup", "-o", "out.fa"]).is_err());
    }

    #[test]
    fn test_args_quiet_conflicts_with_verbose() {
        assert!(Args::try_parse_from(["fadedup", "-i", "a", "-o", "b", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_args_rejects_unknown_mode() {
        assert!(Args::try_parse_from(["fadedup", "-i", "a", "-o", "b", "-m", "fuzzy"]).is_err());
    }

    #[test]
    fn test_clamp_threads() {
        assert_eq!(clamp_threads(0, 8), 1);
        assert_eq!(clamp_threads(4, 8), 4);
        assert_eq!(clamp_threads(64, 8), 8);
        assert_eq!(clamp_threads(3, 0), 1);
        assert_eq!(clamp_threads(-5, 8), 1);
        assert_eq!(clamp_threads(i64::MAX, 8), 8);
    }

    #[test]
    fn test_negative_threads_clamped_to_one() {
        let args = parse(&["fadedup", "-i", "a", "-o", "b", "-t", "-2"]);
        assert_eq!(args.threads, -2);
        assert_eq!(effective_threads(&args), 1);
    }

    #[test]
    fn test_single_threaded_flag() {
        let args = parse(&["fadedup", "-i", "a", "-o", "b", "-t", "8", "--single-threaded"]);
        assert_eq!(effective_threads(&args), 1);
    }

    #[test]
    fn test_effective_threads_within_host_limit() {
        let args = parse(&["fadedup", "-i", "a", "-o", "b", "-t", "100000"]);
        let threads = effective_threads(&args);
        assert!(threads >= 1 && threads <= num_cpus());
    }
}
