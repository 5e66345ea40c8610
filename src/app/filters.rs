use crate::app::models::SkipReason;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

/// Bytes inspected when sniffing for binary content.
pub const BINARY_SNIFF_LEN: u64 = 1024;

/// Size and binary checks applied to a classified file before it is
/// accepted. Returns the reason when the file should be left out.
pub fn check_file(path: &Path, max_size: u64) -> Result<(), SkipReason> {
    let meta = fs::metadata(path).map_err(SkipReason::StatError)?;
    // Opening a FIFO or device for the sniff can block indefinitely.
    if !meta.is_file() {
        return Err(SkipReason::NotRegular);
    }
    let size = meta.len();
    if size > max_size {
        return Err(SkipReason::TooLarge {
            size,
            limit: max_size,
        });
    }

    if is_binary(path).map_err(SkipReason::ReadError)? {
        return Err(SkipReason::Binary);
    }
    Ok(())
}

/// A null byte anywhere in the leading `BINARY_SNIFF_LEN` bytes marks the
/// file as binary.
pub fn is_binary(path: &Path) -> std::io::Result<bool> {
    let mut prefix = Vec::with_capacity(BINARY_SNIFF_LEN as usize);
    File::open(path)?
        .take(BINARY_SNIFF_LEN)
        .read_to_end(&mut prefix)?;
    Ok(prefix.contains(&0))
}
