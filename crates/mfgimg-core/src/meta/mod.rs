//! Manufacturing meta region
//!
//! The meta region is a small block placed at the very end of the boot
//! loader flash area of a manufacturing image:
//!
//! ```text
//! +--------------------+  region start
//! | header (4)         |  version=1, 0xFF, 0xFFFF
//! | TLV flash area (14)|  one per flash map area
//! | ...                |
//! | TLV hash (34)      |  SHA-256, patched last
//! | footer (8)         |  size, 0xFFFF, magic 0x3BB2A269
//! +--------------------+  boot loader area end
//! ```
//!
//! All multi-byte fields are little endian. Building an image is three
//! steps, which [`embed_meta`] runs in order:
//!
//! 1. [`encode_region`] serializes the region with a zeroed hash.
//! 2. [`insert_region`] copies it into the erased tail of the boot loader area.
//! 3. [`fill_meta_hash`] hashes the whole image, hash field zeroed, and
//!    stores the digest in the field.

mod encode;
mod hash;
mod insert;
mod parse;
mod records;

pub use encode::{encode_region, EncodedRegion};
pub use hash::{calc_meta_hash, fill_meta_hash};
pub use insert::insert_region;
pub use parse::{find_meta, parse_region, read_meta, verify_meta_hash, MetaRegion};
pub use records::{MetaFooter, MetaHeader, MetaTlvFlashArea, MetaTlvHash, MetaTlvHeader};

use crate::error::Result;
use crate::flash::FlashMap;

/// Footer magic identifying a meta region
pub const META_MAGIC: u32 = 0x3BB2_A269;
/// Current layout version
pub const META_VERSION: u8 = 1;

/// TLV code of the hash record
pub const META_TLV_CODE_HASH: u8 = 0x01;
/// TLV code of a flash area record
pub const META_TLV_CODE_FLASH_AREA: u8 = 0x02;

/// SHA-256 digest length
pub const META_HASH_SZ: usize = 32;
/// Footer length
pub const META_FOOTER_SZ: usize = 8;
/// Hash TLV payload length
pub const META_TLV_HASH_SZ: usize = META_HASH_SZ;
/// Flash area TLV payload length
pub const META_TLV_FLASH_AREA_SZ: usize = 12;

/// Smallest possible region: header, hash TLV and footer
pub const META_MIN_REGION_SZ: usize =
    MetaHeader::SIZE + MetaTlvHeader::SIZE + META_TLV_HASH_SZ + META_FOOTER_SZ;

/// Value of erased flash
pub const ERASED_VAL: u8 = 0xFF;

/// Where a meta region ended up in an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaPlacement {
    /// Absolute offset of the region's first byte
    pub region_offset: usize,
    /// Region length in bytes
    pub region_len: usize,
    /// Absolute offset of the hash field
    pub hash_offset: usize,
    /// The hash written into the field
    pub hash: [u8; META_HASH_SZ],
}

/// Encode, insert and hash the meta region for `map` into `image`.
///
/// On error the image is left unmodified.
pub fn embed_meta(image: &mut [u8], map: &FlashMap) -> Result<MetaPlacement> {
    let region = encode_region(map.sorted_areas())?;
    let hash_offset = insert_region(&region, image, map)?;
    let hash = fill_meta_hash(image, hash_offset)?;

    let placement = MetaPlacement {
        region_offset: hash_offset - region.hash_offset(),
        region_len: region.len(),
        hash_offset,
        hash,
    };

    log::info!(
        "Meta region: {} areas, {} bytes at 0x{:08X}",
        map.len(),
        placement.region_len,
        placement.region_offset
    );

    Ok(placement)
}
