//! Error types for mfgimg-core
//!
//! Every error is fatal to the image build step. None of them is raised
//! after the image has been partially modified.

#[cfg(feature = "std")]
use thiserror::Error;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(Error))]
pub enum Error {
    // Insertion errors
    /// A flash area the meta region depends on is not in the flash map
    #[cfg_attr(feature = "std", error("required flash area missing: {0}"))]
    MissingRequiredArea(&'static str),

    /// The encoded meta region does not fit in the boot loader area
    #[cfg_attr(
        feature = "std",
        error(
            "boot loader flash area too small to accommodate meta region; \
             boot={area_size} meta={region_size}"
        )
    )]
    RegionTooLarge {
        /// Size of the boot loader flash area
        area_size: u32,
        /// Length of the encoded meta region
        region_size: usize,
    },

    /// The destination window holds non-erased bytes
    #[cfg_attr(
        feature = "std",
        error(
            "boot loader extends into meta region; \
             meta region starts at offset {meta_offset} (0x{meta_offset:08X})"
        )
    )]
    RegionSpaceOccupied {
        /// Absolute image offset where the meta region would start
        meta_offset: usize,
    },

    /// The boot loader area reaches past the end of the image
    #[cfg_attr(
        feature = "std",
        error("flash area ends at 0x{area_end:08X} but image is only {image_len} bytes")
    )]
    AreaOutsideImage {
        /// End offset (exclusive) of the flash area
        area_end: usize,
        /// Length of the image buffer
        image_len: usize,
    },

    // Encoding errors
    /// A value does not fit in its fixed-width field
    #[cfg_attr(
        feature = "std",
        error("cannot encode {field}: value {value} does not fit its field")
    )]
    EncodingFailure {
        /// Name of the field being encoded
        field: &'static str,
        /// The value that overflowed
        value: u64,
    },

    // Hash errors
    /// The hash field lies (partly) outside the image
    #[cfg_attr(
        feature = "std",
        error("hash offset {offset} out of range for {image_len} byte image")
    )]
    HashOffsetOutOfRange {
        /// Requested hash field offset
        offset: usize,
        /// Length of the image buffer
        image_len: usize,
    },

    // Decoding errors
    /// No meta region found in the image
    #[cfg_attr(feature = "std", error("no meta region found"))]
    NoMetaRegion,

    /// A meta region was found but could not be decoded
    #[cfg_attr(feature = "std", error("malformed meta region: {0}"))]
    MalformedRegion(&'static str),
}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
