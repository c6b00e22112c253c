//! Bounded file reading for binary images.

use crate::config::IoLimits;
use crate::error::{Result, SmbchkError};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;

/// A bounded reader that limits the amount of data read.
pub struct BoundedReader<R> {
    inner: R,
    bytes_read: u64,
    limit: u64,
}

impl<R: Read> BoundedReader<R> {
    pub fn new(reader: R, limit: u64) -> Self {
        Self {
            inner: reader,
            bytes_read: 0,
            limit,
        }
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}

impl<R: Read> Read for BoundedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.bytes_read >= self.limit {
            return Ok(0); // EOF
        }
        let remaining = self.limit - self.bytes_read;
        let max_to_read = std::cmp::min(buf.len() as u64, remaining) as usize;
        let n = self.inner.read(&mut buf[..max_to_read])?;
        self.bytes_read += n as u64;
        Ok(n)
    }
}

/// Read a whole file, refusing files larger than `limits.max_read_bytes`.
///
/// Symbol tables can sit anywhere in an image, so a truncated read is never
/// useful here; oversize files are an error instead.
pub fn read_file_bounded<P: AsRef<Path>>(path: P, limits: &IoLimits) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let size = file.metadata()?.len();
    if size > limits.max_read_bytes {
        return Err(SmbchkError::FileTooLarge {
            path: path.to_path_buf(),
            size,
            limit: limits.max_read_bytes,
        });
    }
    let data = read_all_within(file, limits.max_read_bytes, path, size)?;
    debug!(path = %path.display(), bytes = data.len(), "read binary");
    Ok(data)
}

/// Drain `reader`, failing if it yields more than `limit` bytes.
///
/// Reads up to one byte past the limit, which catches a file that grew after
/// its size was checked.
fn read_all_within<R: Read>(reader: R, limit: u64, path: &Path, hint: u64) -> Result<Vec<u8>> {
    let mut data = Vec::with_capacity(hint.min(limit) as usize);
    let mut reader = BoundedReader::new(reader, limit.saturating_add(1));
    reader.read_to_end(&mut data)?;
    if reader.bytes_read() > limit {
        return Err(SmbchkError::FileTooLarge {
            path: path.to_path_buf(),
            size: reader.bytes_read(),
            limit,
        });
    }
    Ok(data)
}

/// Check if a path exists and is a regular file.
pub fn is_regular_file<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .metadata()
        .map(|m| m.is_file())
        .unwrap_or(false)
}
