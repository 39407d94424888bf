//! Reader for per-gene FASTA alignments, plain or gzip-compressed.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;

use crate::error::Error;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Reads an alignment file and yields (voucher, sequence) pairs in file order.
///
/// Gzip input is detected from the magic bytes rather than the file name.
pub fn read_alignment(path: &Path) -> Result<Vec<(String, String)>, Error> {
    let mut file = File::open(path)?;
    let mut magic = [0u8; 2];
    let n = file.read(&mut magic)?;
    let file = File::open(path)?;
    if n == 2 && magic == GZIP_MAGIC {
        parse_fasta(BufReader::new(GzDecoder::new(file)))
    } else {
        parse_fasta(BufReader::new(file))
    }
}

/// Reads FASTA from a buffered reader and yields (voucher, sequence) pairs.
///
/// The voucher is the first whitespace-delimited token after `>`. Sequence lines are
/// concatenated and uppercased; gap and placeholder characters are kept as they are.
pub fn parse_fasta<R: BufRead>(reader: R) -> Result<Vec<(String, String)>, Error> {
    let mut results: Vec<(String, String)> = Vec::new();
    let mut current_voucher: Option<String> = None;
    let mut current_sequence = String::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        if let Some(header) = line.strip_prefix('>') {
            if let Some(voucher) = current_voucher.take() {
                results.push((voucher, std::mem::take(&mut current_sequence)));
            }
            let voucher = header.split_whitespace().next().ok_or_else(|| {
                Error::Parse(format!("empty FASTA header (line {})", line_num + 1))
            })?;
            current_voucher = Some(voucher.to_string());
        } else if current_voucher.is_some() {
            current_sequence.push_str(&line.trim().to_ascii_uppercase());
        } else if !line.trim().is_empty() {
            return Err(Error::Parse(format!(
                "sequence data before first FASTA header (line {})",
                line_num + 1
            )));
        }
    }

    if let Some(voucher) = current_voucher {
        results.push((voucher, current_sequence));
    }

    Ok(results)
}
