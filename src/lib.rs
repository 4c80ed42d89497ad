//! fadedup - remove duplicate and contained sequences from FASTA files
//!
//! A record is dropped when its sequence is byte-identical to, or a
//! substring of, a longer record that is kept. Two strategies are provided,
//! see [`engine::Mode`].
//!
//! # Example
//!
//! ```
//! use fadedup::{Mode, SeqRecord, deduplicate};
//!
//! let records = vec![
//!     SeqRecord::new("a", "ACGTACGT"),
//!     SeqRecord::new("b", "ACGT"),
//!     SeqRecord::new("c", "TTTT"),
//!     SeqRecord::new("d", "ACGT"),
//! ];
//! let out = deduplicate(records, Mode::Exact, 2)?;
//! assert_eq!(out.records.len(), 2);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod admission;
pub mod algorithm;
pub mod args;
pub mod engine;
pub mod io;
pub mod logging;
pub mod record;
pub mod utils;

// Re-export commonly used items
pub use algorithm::{Digest, content_digest, contains, partition};
pub use args::Args;
pub use engine::{DedupStats, Deduplicated, Deduplicator, Mode, deduplicate};
pub use io::{read_records, write_records};
pub use record::SeqRecord;
