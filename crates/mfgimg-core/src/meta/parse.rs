//! Meta region decoding
//!
//! Reads a meta region back out of a finished image, either at the tail of
//! the boot loader area or by searching the image for the footer magic.

use alloc::vec::Vec;

use super::hash::calc_meta_hash;
use super::insert::area_end_in_image;
use super::records::{MetaFooter, MetaHeader, MetaTlvFlashArea, MetaTlvHeader};
use super::{
    META_HASH_SZ, META_MAGIC, META_MIN_REGION_SZ, META_TLV_CODE_FLASH_AREA, META_TLV_CODE_HASH,
    META_TLV_FLASH_AREA_SZ, META_TLV_HASH_SZ, META_VERSION,
};
use crate::error::{Error, Result};
use crate::flash::{FlashMap, FLASH_AREA_NAME_BOOTLOADER};

/// A decoded meta region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaRegion {
    /// Offset of the region's first byte
    pub offset: usize,
    /// Region header
    pub header: MetaHeader,
    /// Flash area TLVs, in emission order
    pub areas: Vec<MetaTlvFlashArea>,
    /// Stored hash
    pub hash: [u8; META_HASH_SZ],
    /// Offset of the hash field
    pub hash_offset: usize,
    /// Region footer
    pub footer: MetaFooter,
}

impl MetaRegion {
    /// Region length in bytes, footer included
    pub fn len(&self) -> usize {
        usize::from(self.footer.size)
    }

    /// Always false for a decoded region
    pub fn is_empty(&self) -> bool {
        self.footer.size == 0
    }

    /// Offset one past the region's last byte
    pub fn end(&self) -> usize {
        self.offset + self.len()
    }
}

fn take<const N: usize>(data: &[u8], at: usize) -> Result<&[u8; N]> {
    data.get(at..at + N)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(Error::MalformedRegion("truncated region"))
}

/// Decode the meta region whose footer ends at the end of `data`.
///
/// Offsets in the result are relative to the start of `data`.
pub fn parse_region(data: &[u8]) -> Result<MetaRegion> {
    if data.len() < MetaFooter::SIZE {
        return Err(Error::NoMetaRegion);
    }
    let footer_offset = data.len() - MetaFooter::SIZE;
    let footer = MetaFooter::from_bytes(take(data, footer_offset)?);
    if footer.magic != META_MAGIC {
        return Err(Error::NoMetaRegion);
    }

    let size = usize::from(footer.size);
    if size < META_MIN_REGION_SZ || size > data.len() {
        return Err(Error::MalformedRegion("bad region size"));
    }
    let offset = data.len() - size;

    let header = MetaHeader::from_bytes(take(data, offset)?);
    if header.version != META_VERSION {
        return Err(Error::MalformedRegion("unsupported version"));
    }

    let mut areas = Vec::new();
    let mut hash = None;
    let mut pos = offset + MetaHeader::SIZE;

    while pos < footer_offset {
        let tlv = MetaTlvHeader::from_bytes(take(data, pos)?);
        let payload = pos + MetaTlvHeader::SIZE;
        let next = payload + usize::from(tlv.size);
        if next > footer_offset {
            return Err(Error::MalformedRegion("TLV overruns footer"));
        }

        match tlv.code {
            META_TLV_CODE_FLASH_AREA => {
                if usize::from(tlv.size) != META_TLV_FLASH_AREA_SZ {
                    return Err(Error::MalformedRegion("bad flash area TLV size"));
                }
                if hash.is_some() {
                    return Err(Error::MalformedRegion("flash area TLV after hash"));
                }
                areas.push(MetaTlvFlashArea::from_payload(tlv, take(data, payload)?));
            }
            META_TLV_CODE_HASH => {
                if usize::from(tlv.size) != META_TLV_HASH_SZ {
                    return Err(Error::MalformedRegion("bad hash TLV size"));
                }
                if hash.is_some() {
                    return Err(Error::MalformedRegion("duplicate hash TLV"));
                }
                hash = Some((payload, *take::<META_HASH_SZ>(data, payload)?));
            }
            _ => return Err(Error::MalformedRegion("unknown TLV code")),
        }

        pos = next;
    }

    let (hash_offset, hash) = hash.ok_or(Error::MalformedRegion("missing hash TLV"))?;

    Ok(MetaRegion {
        offset,
        header,
        areas,
        hash,
        hash_offset,
        footer,
    })
}

/// Decode the meta region at the tail of the boot loader area of `image`
pub fn read_meta(image: &[u8], map: &FlashMap) -> Result<MetaRegion> {
    let boot = map
        .bootloader()
        .ok_or(Error::MissingRequiredArea(FLASH_AREA_NAME_BOOTLOADER))?;
    let area_end = area_end_in_image(boot, image.len())?;

    let region = parse_region(&image[..area_end])?;
    if region.offset < boot.offset as usize {
        return Err(Error::MalformedRegion("region extends outside boot loader area"));
    }
    Ok(region)
}

/// Search `image` for a meta region, last match first.
///
/// Used when no flash map is at hand. A magic value whose region does not
/// decode is skipped.
pub fn find_meta(image: &[u8]) -> Result<MetaRegion> {
    let magic = META_MAGIC.to_le_bytes();
    if image.len() < META_MIN_REGION_SZ {
        return Err(Error::NoMetaRegion);
    }

    for end in (META_MIN_REGION_SZ..=image.len()).rev() {
        if image[end - magic.len()..end] != magic {
            continue;
        }
        match parse_region(&image[..end]) {
            Ok(region) => return Ok(region),
            Err(e) => log::trace!("Skipping meta magic ending at 0x{:08X}: {:?}", end, e),
        }
    }

    Err(Error::NoMetaRegion)
}

/// Check the stored hash of `region` against a fresh hash of `image`
pub fn verify_meta_hash(image: &mut [u8], region: &MetaRegion) -> Result<bool> {
    let computed = calc_meta_hash(image, region.hash_offset)?;
    Ok(computed == region.hash)
}
