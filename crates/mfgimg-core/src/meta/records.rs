//! Fixed-layout records of the meta region
//!
//! Every record is serialized field by field in little-endian order. Native
//! struct layout is never used for the wire format.

use alloc::vec::Vec;

use super::{
    META_FOOTER_SZ, META_HASH_SZ, META_MAGIC, META_TLV_CODE_FLASH_AREA, META_TLV_CODE_HASH,
    META_TLV_FLASH_AREA_SZ, META_TLV_HASH_SZ, META_VERSION,
};
use crate::error::{Error, Result};
use crate::flash::FlashArea;

/// Value of every reserved byte
const PAD8: u8 = 0xFF;
const PAD16: u16 = 0xFFFF;

/// Narrow a value into a fixed-width field or report which field overflowed
fn narrow<T: TryFrom<u64>>(field: &'static str, value: u64) -> Result<T> {
    T::try_from(value).map_err(|_| Error::EncodingFailure { field, value })
}

/// Region header: version plus reserved bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaHeader {
    /// Layout version
    pub version: u8,
    /// Reserved, always 0xFF
    pub pad8: u8,
    /// Reserved, always 0xFFFF
    pub pad16: u16,
}

impl MetaHeader {
    /// Encoded size in bytes
    pub const SIZE: usize = 4;

    /// Header for the current layout version
    pub fn new() -> Self {
        Self {
            version: META_VERSION,
            pad8: PAD8,
            pad16: PAD16,
        }
    }

    /// Append the encoded header to `buf`
    pub fn write_to(&self, buf: &mut Vec<u8>) {
        buf.push(self.version);
        buf.push(self.pad8);
        buf.extend_from_slice(&self.pad16.to_le_bytes());
    }

    /// Decode a header
    pub fn from_bytes(bytes: &[u8; Self::SIZE]) -> Self {
        Self {
            version: bytes[0],
            pad8: bytes[1],
            pad16: u16::from_le_bytes([bytes[2], bytes[3]]),
        }
    }
}

impl Default for MetaHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// TLV header: type code and payload length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaTlvHeader {
    /// TLV type code
    pub code: u8,
    /// Payload length, not counting this header
    pub size: u8,
}

impl MetaTlvHeader {
    /// Encoded size in bytes
    pub const SIZE: usize = 2;

    /// Append the encoded TLV header to `buf`
    pub fn write_to(&self, buf: &mut Vec<u8>) {
        buf.push(self.code);
        buf.push(self.size);
    }

    /// Decode a TLV header
    pub fn from_bytes(bytes: &[u8; Self::SIZE]) -> Self {
        Self {
            code: bytes[0],
            size: bytes[1],
        }
    }
}

/// Flash area TLV: one per area of the flash map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaTlvFlashArea {
    /// TLV header (code 0x02, size 12)
    pub header: MetaTlvHeader,
    /// Area id
    pub area_id: u8,
    /// Flash device id
    pub device_id: u8,
    /// Reserved, always 0xFFFF
    pub pad16: u16,
    /// Byte offset of the area within its device
    pub offset: u32,
    /// Area length in bytes
    pub size: u32,
}

impl MetaTlvFlashArea {
    /// Encoded payload size in bytes
    pub const PAYLOAD_SIZE: usize = META_TLV_FLASH_AREA_SZ;

    /// Build the TLV describing `area`
    pub fn from_area(area: &FlashArea) -> Result<Self> {
        Ok(Self {
            header: MetaTlvHeader {
                code: META_TLV_CODE_FLASH_AREA,
                size: META_TLV_FLASH_AREA_SZ as u8,
            },
            area_id: narrow("flash area id", u64::from(area.id))?,
            device_id: narrow("flash device id", u64::from(area.device))?,
            pad16: PAD16,
            offset: area.offset,
            size: area.size,
        })
    }

    /// Append the encoded TLV (header included) to `buf`
    pub fn write_to(&self, buf: &mut Vec<u8>) {
        self.header.write_to(buf);
        buf.push(self.area_id);
        buf.push(self.device_id);
        buf.extend_from_slice(&self.pad16.to_le_bytes());
        buf.extend_from_slice(&self.offset.to_le_bytes());
        buf.extend_from_slice(&self.size.to_le_bytes());
    }

    /// Decode the TLV from its header and payload
    pub fn from_payload(header: MetaTlvHeader, payload: &[u8; Self::PAYLOAD_SIZE]) -> Self {
        Self {
            header,
            area_id: payload[0],
            device_id: payload[1],
            pad16: u16::from_le_bytes([payload[2], payload[3]]),
            offset: u32::from_le_bytes([payload[4], payload[5], payload[6], payload[7]]),
            size: u32::from_le_bytes([payload[8], payload[9], payload[10], payload[11]]),
        }
    }
}

/// Hash TLV: SHA-256 of the whole image with this field zeroed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaTlvHash {
    /// TLV header (code 0x01, size 32)
    pub header: MetaTlvHeader,
    /// The digest
    pub hash: [u8; META_HASH_SZ],
}

impl MetaTlvHash {
    /// Hash TLV with an all-zero placeholder digest
    pub fn zeroed() -> Self {
        Self {
            header: MetaTlvHeader {
                code: META_TLV_CODE_HASH,
                size: META_TLV_HASH_SZ as u8,
            },
            hash: [0; META_HASH_SZ],
        }
    }

    /// Append the encoded TLV (header included) to `buf`
    pub fn write_to(&self, buf: &mut Vec<u8>) {
        self.header.write_to(buf);
        buf.extend_from_slice(&self.hash);
    }
}

/// Region footer: total length and magic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaFooter {
    /// Region length, header, TLVs and footer included
    pub size: u16,
    /// Reserved, always 0xFFFF
    pub pad16: u16,
    /// Always [`META_MAGIC`]
    pub magic: u32,
}

impl MetaFooter {
    /// Encoded size in bytes
    pub const SIZE: usize = META_FOOTER_SZ;

    /// Footer for a region whose bytes before the footer number `len`
    pub fn for_len(len: usize) -> Result<Self> {
        let total = len as u64 + META_FOOTER_SZ as u64;
        Ok(Self {
            size: narrow("meta region size", total)?,
            pad16: PAD16,
            magic: META_MAGIC,
        })
    }

    /// Append the encoded footer to `buf`
    pub fn write_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.size.to_le_bytes());
        buf.extend_from_slice(&self.pad16.to_le_bytes());
        buf.extend_from_slice(&self.magic.to_le_bytes());
    }

    /// Decode a footer
    pub fn from_bytes(bytes: &[u8; Self::SIZE]) -> Self {
        Self {
            size: u16::from_le_bytes([bytes[0], bytes[1]]),
            pad16: u16::from_le_bytes([bytes[2], bytes[3]]),
            magic: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_header_bytes() {
        let mut buf = Vec::new();
        MetaHeader::new().write_to(&mut buf);
        assert_eq!(buf, [0x01, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_flash_area_bytes() {
        let area = FlashArea::new("FLASH_AREA_IMAGE_0", 1, 0, 0x0000_8000, 0x0003_a000);
        let mut buf = Vec::new();
        MetaTlvFlashArea::from_area(&area).unwrap().write_to(&mut buf);
        assert_eq!(
            buf,
            vec![
                0x02, 0x0c, // TLV header
                0x01, 0x00, 0xFF, 0xFF, // id, device, pad
                0x00, 0x80, 0x00, 0x00, // offset
                0x00, 0xa0, 0x03, 0x00, // size
            ]
        );
    }

    #[test]
    fn test_flash_area_id_overflow() {
        let area = FlashArea::new("BIG", 256, 0, 0, 0x1000);
        assert_eq!(
            MetaTlvFlashArea::from_area(&area),
            Err(Error::EncodingFailure {
                field: "flash area id",
                value: 256
            })
        );

        let area = FlashArea::new("FAR", 1, 300, 0, 0x1000);
        assert!(matches!(
            MetaTlvFlashArea::from_area(&area),
            Err(Error::EncodingFailure {
                field: "flash device id",
                ..
            })
        ));
    }

    #[test]
    fn test_footer_bytes() {
        let footer = MetaFooter::for_len(0x40).unwrap();
        assert_eq!(footer.size, 0x48);

        let mut buf = Vec::new();
        footer.write_to(&mut buf);
        assert_eq!(buf, [0x48, 0x00, 0xFF, 0xFF, 0x69, 0xa2, 0xb2, 0x3b]);

        let bytes: [u8; MetaFooter::SIZE] = buf.as_slice().try_into().unwrap();
        assert_eq!(MetaFooter::from_bytes(&bytes), footer);
    }

    #[test]
    fn test_footer_size_overflow() {
        assert!(MetaFooter::for_len(usize::from(u16::MAX) - META_FOOTER_SZ).is_ok());
        assert!(matches!(
            MetaFooter::for_len(usize::from(u16::MAX)),
            Err(Error::EncodingFailure { .. })
        ));
    }
}
