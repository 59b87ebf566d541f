//! Input formats: genotype matrices, raw vector files and shared decompression

pub mod genotypes;

use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read};
use std::path::Path;

use ancient_core::error::AncientResult;

pub use genotypes::{
    load_matrix, load_matrix_bytes, load_vector, load_vector_bytes,
    GenotypeMatrix, GenotypeVector, LoadStats, MatrixLoader,
};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Whether a buffer starts with the gzip magic bytes
pub fn is_gzip(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes[..2] == GZIP_MAGIC
}

fn has_gz_extension(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("gz")
}

/// Open a file for buffered line reading, gunzipping it when it carries the
/// `.gz` extension or starts with the gzip magic bytes
pub fn open_input<P: AsRef<Path>>(path: P) -> AncientResult<Box<dyn BufRead + Send>> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path)?);

    let compressed = has_gz_extension(path) || is_gzip(reader.fill_buf()?);
    if compressed {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(reader))))
    } else {
        Ok(Box::new(reader))
    }
}

/// Wrap an in-memory buffer for line reading, gunzipping on magic bytes
pub fn reader_from_bytes(bytes: &[u8]) -> Box<dyn BufRead + Send + '_> {
    if is_gzip(bytes) {
        Box::new(BufReader::new(MultiGzDecoder::new(bytes)))
    } else {
        Box::new(Cursor::new(bytes))
    }
}

/// Read the next line into `buf` without its line terminator.
/// Returns `false` at end of input.
pub(crate) fn next_line<R: BufRead + ?Sized>(
    reader: &mut R,
    buf: &mut String,
) -> AncientResult<bool> {
    buf.clear();
    if reader.read_line(buf)? == 0 {
        return Ok(false);
    }
    while buf.ends_with('\n') || buf.ends_with('\r') {
        buf.pop();
    }
    Ok(true)
}

/// Read a whole input (file or gzip) into memory
pub fn read_all<P: AsRef<Path>>(path: P) -> AncientResult<Vec<u8>> {
    let mut reader = open_input(path)?;
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;
    Ok(buffer)
}
