//! Meta region encoder

use alloc::vec::Vec;

use super::records::{MetaFooter, MetaHeader, MetaTlvFlashArea, MetaTlvHash};
use super::META_HASH_SZ;
use crate::error::Result;
use crate::flash::FlashArea;

/// An encoded meta region, ready for insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedRegion {
    bytes: Vec<u8>,
    hash_offset: usize,
}

impl EncodedRegion {
    /// The encoded bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Region length in bytes, footer included
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false: a region has at least a header, hash TLV and footer
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Offset of the 32-byte hash payload within the region
    pub fn hash_offset(&self) -> usize {
        self.hash_offset
    }

    /// Consume the region, returning its bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Encode a meta region describing `areas`, in the order given.
///
/// The hash TLV is written with an all-zero digest; see
/// [`fill_meta_hash`](super::fill_meta_hash). Nothing is returned if any
/// area does not fit its TLV.
pub fn encode_region<'a, I>(areas: I) -> Result<EncodedRegion>
where
    I: IntoIterator<Item = &'a FlashArea>,
{
    let mut buf = Vec::new();

    MetaHeader::new().write_to(&mut buf);

    for area in areas {
        MetaTlvFlashArea::from_area(area)?.write_to(&mut buf);
    }

    MetaTlvHash::zeroed().write_to(&mut buf);
    let hash_offset = buf.len() - META_HASH_SZ;

    MetaFooter::for_len(buf.len())?.write_to(&mut buf);

    log::debug!(
        "Encoded meta region: {} bytes, hash at +0x{:X}",
        buf.len(),
        hash_offset
    );

    Ok(EncodedRegion {
        bytes: buf,
        hash_offset,
    })
}
