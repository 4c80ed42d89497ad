//! FASTA I/O
//!
//! Reading accepts plain or gzip-compressed input (detected from the magic
//! bytes, so `.fa.gz`, `.fasta.bgz` or an unsuffixed gzip file all work).
//! Writing emits one unwrapped sequence line per record and compresses when
//! the output path ends in `.gz`.

use anyhow::{Context, Result};
use bstr::io::BufReadExt;
use bstr::{BString, ByteSlice};
use flate2::Compression;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use log::{debug, error};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Cursor, ErrorKind, Read, Write};
use std::path::Path;

use crate::record::SeqRecord;

/// Leading bytes of every gzip member
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Record-start marker
pub const RECORD_MARKER: u8 = b'>';

/// Open `path` for reading, transparently decompressing gzip
pub fn open_input(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    sniff_compression(file).with_context(|| format!("failed to read {}", path.display()))
}

/// Wrap `inner` in a gzip decoder if it starts with the gzip magic
///
/// Pipes may hand out a single byte per read, so the magic is collected
/// across reads before deciding.
pub fn sniff_compression<R: Read + 'static>(mut inner: R) -> std::io::Result<Box<dyn BufRead>> {
    let mut head = [0u8; GZIP_MAGIC.len()];
    let mut filled = 0;
    while filled < head.len() {
        match inner.read(&mut head[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    let stream = Cursor::new(head).take(filled as u64).chain(inner);
    if head[..filled] == GZIP_MAGIC {
        debug!("input is gzip-compressed");
        Ok(Box::new(BufReader::with_capacity(1 << 18, MultiGzDecoder::new(stream))))
    } else {
        Ok(Box::new(BufReader::with_capacity(1 << 18, stream)))
    }
}

/// Parse FASTA records from `reader`
///
/// Every line is trimmed of surrounding whitespace. Sequence lines before the
/// first header are ignored, and records with an empty identifier or an
/// empty sequence are dropped.
pub fn parse_records<R: BufRead>(mut reader: R) -> Result<Vec<SeqRecord>> {
    let mut records = Vec::new();
    let mut id: Option<BString> = None;
    let mut sequence = BString::default();

    reader.for_byte_line(|line| {
        let line = line.trim();
        if let Some(header) = line.strip_prefix(&[RECORD_MARKER]) {
            flush_record(&mut records, id.take(), std::mem::take(&mut sequence));
            id = Some(BString::from(header));
        } else {
            sequence.extend_from_slice(line);
        }
        Ok(true)
    })?;
    flush_record(&mut records, id, sequence);

    Ok(records)
}

fn flush_record(records: &mut Vec<SeqRecord>, id: Option<BString>, sequence: BString) {
    match id {
        Some(id) if !id.is_empty() && !sequence.is_empty() => {
            records.push(SeqRecord { id, sequence });
        }
        _ => {}
    }
}

/// Read every record from `path`
pub fn try_read_records(path: &Path) -> Result<Vec<SeqRecord>> {
    let reader = open_input(path)?;
    parse_records(reader).with_context(|| format!("failed to parse {}", path.display()))
}

/// Read every record from `path`, logging and returning nothing if the
/// source cannot be read or decoded
pub fn read_records(path: &Path) -> Vec<SeqRecord> {
    match try_read_records(path) {
        Ok(records) => records,
        Err(e) => {
            error!("An error occurred while reading the input: {e:#}");
            Vec::new()
        }
    }
}

/// Write `records` to `path` as FASTA, gzip-compressed for a `.gz` path
pub fn write_records(path: &Path, records: &[SeqRecord]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let out = BufWriter::with_capacity(1 << 20, file);

    let compressed = path.extension().is_some_and(|ext| ext == "gz");
    if compressed {
        let mut enc = GzEncoder::new(out, Compression::default());
        write_all_records(&mut enc, records)?;
        enc.finish()?.flush()?;
    } else {
        let mut out = out;
        write_all_records(&mut out, records)?;
        out.flush()?;
    }
    debug!("wrote {} records to {}", records.len(), path.display());
    Ok(())
}

fn write_all_records<W: Write>(w: &mut W, records: &[SeqRecord]) -> Result<()> {
    for record in records {
        record.write_to(w)?;
    }
    Ok(())
}
