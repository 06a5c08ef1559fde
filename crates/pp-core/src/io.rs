//! Input helpers shared by the file loaders.
//!
//! Simulation outputs are usually written gzip-compressed (`*.xml.gz`) but
//! not always; compression is detected from the first two bytes rather than
//! the file extension.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use flate2::bufread::MultiGzDecoder;

use crate::{CoreError, CoreResult};

/// gzip member header (RFC 1952).
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Read buffer size for event logs and network files.
const BUF_CAPACITY: usize = 64 * 1024;

/// A boxed buffered reader, decompressed if the source was gzip.
pub type InputReader = Box<dyn BufRead + Send>;

/// Open `path` for buffered reading, transparently decompressing gzip.
pub fn open_input(path: &Path) -> CoreResult<InputReader> {
    let file = File::open(path).map_err(|e| CoreError::io(path, e))?;
    maybe_gunzip(BufReader::with_capacity(BUF_CAPACITY, file)).map_err(|e| CoreError::io(path, e))
}

/// Wrap `reader` in a gzip decoder if its first bytes are the gzip magic.
///
/// Useful for in-memory sources (`std::io::Cursor`) in tests.
pub fn maybe_gunzip<R: BufRead + Send + 'static>(mut reader: R) -> io::Result<InputReader> {
    let is_gzip = {
        let head = reader.fill_buf()?;
        head.len() >= 2 && head[..2] == GZIP_MAGIC
    };
    if is_gzip {
        log::debug!("gzip input detected");
        Ok(Box::new(BufReader::with_capacity(BUF_CAPACITY, MultiGzDecoder::new(reader))))
    } else {
        Ok(Box::new(reader))
    }
}
