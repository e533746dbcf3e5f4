//! Meta region placement
//!
//! The meta region is placed flush against the end of the boot loader flash
//! area. The destination must still be erased: anything else means the boot
//! loader image has grown into the space reserved for the region.

use super::encode::EncodedRegion;
use super::ERASED_VAL;
use crate::error::{Error, Result};
use crate::flash::{FlashArea, FlashMap, FLASH_AREA_NAME_BOOTLOADER};

/// End offset (exclusive) of `area` within an image of `image_len` bytes
pub(crate) fn area_end_in_image(area: &FlashArea, image_len: usize) -> Result<usize> {
    let end = usize::try_from(area.end()).unwrap_or(usize::MAX);
    if end > image_len {
        return Err(Error::AreaOutsideImage {
            area_end: end,
            image_len,
        });
    }
    Ok(end)
}

/// Copy `region` into the tail of the boot loader area of `image`.
///
/// Returns the absolute image offset of the region's hash field. The image
/// is only modified on success, and then only over the region's own bytes.
pub fn insert_region(region: &EncodedRegion, image: &mut [u8], map: &FlashMap) -> Result<usize> {
    let boot = map
        .bootloader()
        .ok_or(Error::MissingRequiredArea(FLASH_AREA_NAME_BOOTLOADER))?;

    if region.len() > boot.size as usize {
        return Err(Error::RegionTooLarge {
            area_size: boot.size,
            region_size: region.len(),
        });
    }

    let area_end = area_end_in_image(boot, image.len())?;
    let meta_offset = area_end - region.len();

    let window = &image[meta_offset..area_end];
    if let Some(pos) = window.iter().position(|&b| b != ERASED_VAL) {
        log::debug!(
            "Non-erased byte 0x{:02X} at 0x{:08X} in meta region window",
            window[pos],
            meta_offset + pos
        );
        return Err(Error::RegionSpaceOccupied { meta_offset });
    }

    image[meta_offset..area_end].copy_from_slice(region.as_bytes());

    log::debug!(
        "Inserted {} byte meta region at 0x{:08X}",
        region.len(),
        meta_offset
    );

    Ok(meta_offset + region.hash_offset())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::encode_region;
    use alloc::vec;
    use alloc::vec::Vec;

    const BOOT_OFFSET: u32 = 0x2_0000;
    const BOOT_SIZE: u32 = 0x1000;
    const IMAGE_SIZE: usize = 0x4_0000;

    fn map_with_boot(offset: u32, size: u32) -> FlashMap {
        let mut map = FlashMap::new();
        map.insert(FlashArea::new(FLASH_AREA_NAME_BOOTLOADER, 1, 0, offset, size))
            .unwrap();
        map
    }

    fn region_for(map: &FlashMap) -> EncodedRegion {
        encode_region(map.sorted_areas()).unwrap()
    }

    #[test]
    fn test_insert_at_area_end() {
        let map = map_with_boot(BOOT_OFFSET, BOOT_SIZE);
        let region = region_for(&map);
        let mut image = vec![0xFF; IMAGE_SIZE];

        let hash_offset = insert_region(&region, &mut image, &map).unwrap();

        let meta_offset = (BOOT_OFFSET + BOOT_SIZE) as usize - region.len();
        assert_eq!(hash_offset, meta_offset + region.hash_offset());
        assert_eq!(&image[meta_offset..meta_offset + region.len()], region.as_bytes());

        // Nothing outside the region was touched
        assert!(image[..meta_offset].iter().all(|&b| b == 0xFF));
        assert!(image[meta_offset + region.len()..].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_missing_bootloader() {
        let mut map = FlashMap::new();
        map.insert(FlashArea::new("FLASH_AREA_IMAGE_0", 1, 0, 0, 0x1000))
            .unwrap();
        let region = region_for(&map);
        let mut image = vec![0xFF; IMAGE_SIZE];

        assert_eq!(
            insert_region(&region, &mut image, &map),
            Err(Error::MissingRequiredArea(FLASH_AREA_NAME_BOOTLOADER))
        );
    }

    #[test]
    fn test_exact_fit() {
        let len = region_for(&map_with_boot(BOOT_OFFSET, BOOT_SIZE)).len() as u32;
        let map = map_with_boot(BOOT_OFFSET, len);
        let region = region_for(&map);
        let mut image = vec![0xFF; IMAGE_SIZE];

        let hash_offset = insert_region(&region, &mut image, &map).unwrap();
        assert_eq!(hash_offset - region.hash_offset(), BOOT_OFFSET as usize);
    }

    #[test]
    fn test_one_byte_too_small() {
        let len = region_for(&map_with_boot(BOOT_OFFSET, BOOT_SIZE)).len() as u32;
        let map = map_with_boot(BOOT_OFFSET, len - 1);
        let region = region_for(&map);
        let mut image = vec![0xFF; IMAGE_SIZE];

        assert_eq!(
            insert_region(&region, &mut image, &map),
            Err(Error::RegionTooLarge {
                area_size: len - 1,
                region_size: len as usize,
            })
        );
        assert!(image.iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_occupied_anywhere_in_window() {
        let map = map_with_boot(BOOT_OFFSET, BOOT_SIZE);
        let region = region_for(&map);
        let area_end = (BOOT_OFFSET + BOOT_SIZE) as usize;
        let meta_offset = area_end - region.len();

        for pos in [meta_offset, meta_offset + region.len() / 2, area_end - 1] {
            let mut image = vec![0xFF; IMAGE_SIZE];
            image[pos] = 0x00;
            let before: Vec<u8> = image.clone();

            assert_eq!(
                insert_region(&region, &mut image, &map),
                Err(Error::RegionSpaceOccupied { meta_offset })
            );
            assert_eq!(image, before);
        }
    }

    #[test]
    fn test_bootloader_code_before_window() {
        let map = map_with_boot(BOOT_OFFSET, BOOT_SIZE);
        let region = region_for(&map);
        let meta_offset = (BOOT_OFFSET + BOOT_SIZE) as usize - region.len();

        let mut image = vec![0xFF; IMAGE_SIZE];
        image[BOOT_OFFSET as usize..meta_offset].fill(0xA5);

        assert!(insert_region(&region, &mut image, &map).is_ok());
    }

    #[test]
    fn test_area_outside_image() {
        let map = map_with_boot(BOOT_OFFSET, BOOT_SIZE);
        let region = region_for(&map);
        let mut image = vec![0xFF; BOOT_OFFSET as usize + 0x10];

        assert_eq!(
            insert_region(&region, &mut image, &map),
            Err(Error::AreaOutsideImage {
                area_end: (BOOT_OFFSET + BOOT_SIZE) as usize,
                image_len: BOOT_OFFSET as usize + 0x10,
            })
        );
    }
}
