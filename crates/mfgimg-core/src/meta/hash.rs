//! Meta region hash
//!
//! The hash covers the entire image, meta region included, with the 32-byte
//! hash field itself read as zeroes.

use core::ops::Range;

use sha2::{Digest, Sha256};

use super::META_HASH_SZ;
use crate::error::{Error, Result};

fn hash_field(image_len: usize, hash_offset: usize) -> Result<Range<usize>> {
    match hash_offset.checked_add(META_HASH_SZ) {
        Some(end) if end <= image_len => Ok(hash_offset..end),
        _ => Err(Error::HashOffsetOutOfRange {
            offset: hash_offset,
            image_len,
        }),
    }
}

/// Compute the meta hash of `image` without changing it.
///
/// The field at `hash_offset` is zeroed while hashing and restored
/// afterwards, whatever it held.
pub fn calc_meta_hash(image: &mut [u8], hash_offset: usize) -> Result<[u8; META_HASH_SZ]> {
    let field = hash_field(image.len(), hash_offset)?;

    let mut old = [0u8; META_HASH_SZ];
    old.copy_from_slice(&image[field.clone()]);
    image[field.clone()].fill(0);

    let hash: [u8; META_HASH_SZ] = Sha256::digest(&*image).into();

    image[field].copy_from_slice(&old);

    Ok(hash)
}

/// Compute the meta hash of `image` and write it into the hash field.
///
/// Returns the digest written.
pub fn fill_meta_hash(image: &mut [u8], hash_offset: usize) -> Result<[u8; META_HASH_SZ]> {
    let hash = calc_meta_hash(image, hash_offset)?;
    image[hash_offset..hash_offset + META_HASH_SZ].copy_from_slice(&hash);

    log::debug!("Meta hash at 0x{:08X}: {:02x?}", hash_offset, hash);

    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn test_image() -> Vec<u8> {
        (0..0x2000u32).map(|i| (i * 7 + 3) as u8).collect()
    }

    #[test]
    fn test_hash_ignores_field_contents() {
        let mut image = test_image();
        let a = calc_meta_hash(&mut image, 0x100).unwrap();

        image[0x100..0x120].fill(0x5A);
        let b = calc_meta_hash(&mut image, 0x100).unwrap();
        assert_eq!(a, b);

        // Bytes outside the field do count
        image[0x120] ^= 1;
        assert_ne!(calc_meta_hash(&mut image, 0x100).unwrap(), a);
    }

    #[test]
    fn test_calc_restores_field() {
        let mut image = test_image();
        let before = image.clone();

        calc_meta_hash(&mut image, 0x1000).unwrap();
        assert_eq!(image, before);
    }

    #[test]
    fn test_idempotent() {
        let mut image = test_image();
        let a = calc_meta_hash(&mut image, 0x40).unwrap();
        let b = calc_meta_hash(&mut image, 0x40).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_fill_round_trip() {
        let mut image = test_image();
        let hash = fill_meta_hash(&mut image, 0x800).unwrap();
        assert_eq!(&image[0x800..0x820], &hash);

        let mut zeroed = image.clone();
        zeroed[0x800..0x820].fill(0);
        let expected: [u8; 32] = Sha256::digest(&zeroed).into();
        assert_eq!(hash, expected);

        // Re-hashing the patched image reproduces the stored digest
        assert_eq!(calc_meta_hash(&mut image, 0x800).unwrap(), hash);
    }

    #[test]
    fn test_field_at_image_end() {
        let mut image = test_image();
        let off = image.len() - META_HASH_SZ;
        assert!(fill_meta_hash(&mut image, off).is_ok());
    }

    #[test]
    fn test_out_of_range() {
        let mut image = test_image();
        let len = image.len();
        let before = image.clone();

        assert_eq!(
            fill_meta_hash(&mut image, len - META_HASH_SZ + 1),
            Err(Error::HashOffsetOutOfRange {
                offset: len - META_HASH_SZ + 1,
                image_len: len,
            })
        );
        assert!(calc_meta_hash(&mut image, usize::MAX).is_err());
        assert_eq!(image, before);
    }
}
