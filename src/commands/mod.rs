//! CLI command implementations
//!
//! Every command works on whole images held in memory. The image
//! manipulation itself lives in `mfgimg_core::meta`; these modules only load
//! inputs, call into it and report.

pub mod areas;
pub mod embed;
pub mod show;

use thiserror::Error;

/// Errors raised by the commands themselves
#[derive(Debug, Error)]
pub enum CommandError {
    /// The image is already larger than the requested padded size
    #[error("image is {len} bytes, larger than --pad-to size {size}")]
    ImageLargerThanPad { len: usize, size: usize },

    /// The stored meta hash does not match the image
    #[error("meta hash mismatch: stored {stored}, computed {computed}")]
    HashMismatch { stored: String, computed: String },
}

/// Format a size as human-readable string
fn format_size(bytes: u32) -> String {
    if bytes >= 1024 * 1024 && bytes.is_multiple_of(1024 * 1024) {
        format!("{} MiB", bytes / (1024 * 1024))
    } else if bytes >= 1024 && bytes.is_multiple_of(1024) {
        format!("{} KiB", bytes / 1024)
    } else {
        format!("{} B", bytes)
    }
}
