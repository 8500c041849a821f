//! File reading.

use std::fs;
use std::io;
use std::path::Path;

use crate::diagnostic::{AssetError, Result};

/// Decode bytes as UTF-8, stripping BOM if present.
pub fn decode_utf8(buf: &[u8]) -> Option<&str> {
    let buf = buf.strip_prefix(b"\xef\xbb\xbf").unwrap_or(buf);
    std::str::from_utf8(buf).ok()
}

/// Read `path` as text.
pub fn read_text(path: &Path) -> Result<String> {
    let bytes = read_disk(path)?;
    decode_utf8(&bytes)
        .map(str::to_owned)
        .ok_or_else(|| AssetError::InvalidUtf8 {
            path: path.to_path_buf(),
        })
}

/// Read file from disk.
fn read_disk(path: &Path) -> Result<Vec<u8>> {
    let map_err = |e| AssetError::io(path, e);
    fs::metadata(path).map_err(map_err).and_then(|m| {
        if m.is_dir() {
            Err(AssetError::io(path, io::Error::from(io::ErrorKind::IsADirectory)))
        } else {
            fs::read(path).map_err(map_err)
        }
    })
}
