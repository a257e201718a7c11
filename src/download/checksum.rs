//! MD5 digests for manifest-declared asset checksums.

use std::path::Path;

use md5::{Digest, Md5};
use tokio::io::AsyncReadExt;

const READ_CHUNK_BYTES: usize = 64 * 1024;

/// Returns the lowercase hex MD5 digest of `bytes`.
#[must_use]
pub fn md5_hex(bytes: &[u8]) -> String {
    hex_encode(&Md5::digest(bytes))
}

/// Computes the lowercase hex MD5 digest of a file without loading it whole.
///
/// # Errors
///
/// Returns the underlying IO error when the file cannot be opened or read.
pub async fn file_md5(path: &Path) -> std::io::Result<String> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Md5::new();
    let mut buffer = vec![0_u8; READ_CHUNK_BYTES];
    loop {
        let read = file.read(&mut buffer).await?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hex_encode(&hasher.finalize()))
}

/// Compares two hex digests, ignoring case and surrounding whitespace.
#[must_use]
pub fn digests_match(actual: &str, expected: &str) -> bool {
    actual.trim().eq_ignore_ascii_case(expected.trim())
}

pub(crate) fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(char::from(HEX[usize::from(byte >> 4)]));
        out.push(char::from(HEX[usize::from(byte & 0x0f)]));
    }
    out
}
