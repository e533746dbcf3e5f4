//! Flash map types
//!
//! Core types for flash maps that work in no_std environments.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

#[cfg(feature = "std")]
use thiserror::Error;

/// Name of the boot loader area; the meta region lives at its tail
pub const FLASH_AREA_NAME_BOOTLOADER: &str = "FLASH_AREA_BOOTLOADER";
/// Name of the primary image slot
pub const FLASH_AREA_NAME_IMAGE_0: &str = "FLASH_AREA_IMAGE_0";
/// Name of the secondary image slot
pub const FLASH_AREA_NAME_IMAGE_1: &str = "FLASH_AREA_IMAGE_1";
/// Name of the image swap scratch area
pub const FLASH_AREA_NAME_IMAGE_SCRATCH: &str = "FLASH_AREA_IMAGE_SCRATCH";

/// Well-known system areas and their fixed ids
const SYSTEM_AREA_IDS: [(&str, u32); 4] = [
    (FLASH_AREA_NAME_BOOTLOADER, 0),
    (FLASH_AREA_NAME_IMAGE_0, 1),
    (FLASH_AREA_NAME_IMAGE_1, 2),
    (FLASH_AREA_NAME_IMAGE_SCRATCH, 3),
];

/// Look up the fixed id of a well-known system area
pub fn system_area_id(name: &str) -> Option<u32> {
    SYSTEM_AREA_IDS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|&(_, id)| id)
}

/// A named area of physical flash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashArea {
    /// Name of the area
    pub name: String,
    /// Area identity
    pub id: u32,
    /// Physical flash device the area lives on
    pub device: u32,
    /// Byte offset within the device
    pub offset: u32,
    /// Length of the area in bytes
    pub size: u32,
}

impl FlashArea {
    /// Create a new flash area
    pub fn new(name: impl Into<String>, id: u32, device: u32, offset: u32, size: u32) -> Self {
        Self {
            name: name.into(),
            id,
            device,
            offset,
            size,
        }
    }

    /// End offset (exclusive), widened so it cannot overflow
    pub fn end(&self) -> u64 {
        u64::from(self.offset) + u64::from(self.size)
    }

    /// Check if an offset on the same device is within this area
    pub fn contains(&self, offset: u32) -> bool {
        offset >= self.offset && u64::from(offset) < self.end()
    }

    /// Check if this area overlaps with another on the same device
    pub fn overlaps(&self, other: &FlashArea) -> bool {
        self.device == other.device
            && u64::from(self.offset) < other.end()
            && u64::from(other.offset) < self.end()
    }
}

/// A flash map: flash areas keyed by unique name
#[derive(Debug, Clone, Default)]
pub struct FlashMap {
    /// Optional name for this flash map (usually the BSP name)
    pub name: Option<String>,
    areas: BTreeMap<String, FlashArea>,
}

impl FlashMap {
    /// Create a new empty flash map
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an area to the map
    pub fn insert(&mut self, area: FlashArea) -> Result<(), FlashMapError> {
        if self.areas.contains_key(&area.name) {
            return Err(FlashMapError::DuplicateAreaName(area.name));
        }
        self.areas.insert(area.name.clone(), area);
        Ok(())
    }

    /// Find an area by name (exact match)
    pub fn get(&self, name: &str) -> Option<&FlashArea> {
        self.areas.get(name)
    }

    /// The boot loader area, if present
    pub fn bootloader(&self) -> Option<&FlashArea> {
        self.get(FLASH_AREA_NAME_BOOTLOADER)
    }

    /// Get the number of areas
    pub fn len(&self) -> usize {
        self.areas.len()
    }

    /// Check if the map is empty
    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    /// Areas in emission order: by id, then device, offset and name.
    ///
    /// The order is total, so the meta region built from it is byte-for-byte
    /// reproducible.
    pub fn sorted_areas(&self) -> Vec<&FlashArea> {
        let mut areas: Vec<&FlashArea> = self.areas.values().collect();
        areas.sort_by(|a, b| {
            (a.id, a.device, a.offset, &a.name).cmp(&(b.id, b.device, b.offset, &b.name))
        });
        areas
    }

    /// Validate the flash map
    pub fn validate(&self) -> Result<(), FlashMapError> {
        for area in self.areas.values() {
            if area.size == 0 {
                return Err(FlashMapError::EmptyArea(area.name.clone()));
            }
            if area.end() > u64::from(u32::MAX) + 1 {
                return Err(FlashMapError::AreaOverflow(area.name.clone()));
            }
        }

        let areas = self.sorted_areas();
        for (i, a1) in areas.iter().enumerate() {
            for a2 in areas.iter().skip(i + 1) {
                if a1.id == a2.id {
                    return Err(FlashMapError::DuplicateAreaId {
                        id: a1.id,
                        first: a1.name.clone(),
                        second: a2.name.clone(),
                    });
                }
                if a1.overlaps(a2) {
                    return Err(FlashMapError::OverlappingAreas {
                        first: a1.name.clone(),
                        second: a2.name.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Errors that can occur when building or loading a flash map
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(Error))]
pub enum FlashMapError {
    /// Two areas share a name
    #[cfg_attr(feature = "std", error("duplicate flash area name: {0}"))]
    DuplicateAreaName(String),

    /// Two areas share an id
    #[cfg_attr(
        feature = "std",
        error("flash areas {first} and {second} share id {id}")
    )]
    DuplicateAreaId {
        /// The shared id
        id: u32,
        /// First area using it
        first: String,
        /// Second area using it
        second: String,
    },

    /// Area has zero size
    #[cfg_attr(feature = "std", error("flash area {0} is empty"))]
    EmptyArea(String),

    /// Area extends past the 32-bit address space
    #[cfg_attr(feature = "std", error("flash area {0} extends past 4 GiB"))]
    AreaOverflow(String),

    /// Two areas on the same device overlap
    #[cfg_attr(feature = "std", error("flash areas {first} and {second} overlap"))]
    OverlappingAreas {
        /// First overlapping area
        first: String,
        /// Second overlapping area
        second: String,
    },

    /// Area has no id and is not a well-known system area
    #[cfg_attr(feature = "std", error("flash area {0} needs an explicit id"))]
    MissingAreaId(String),

    /// Failed to parse flash map file
    #[cfg_attr(feature = "std", error("failed to parse flash map: {0}"))]
    ParseError(String),

    /// I/O error
    #[cfg_attr(feature = "std", error("I/O error: {0}"))]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_map() -> FlashMap {
        let mut map = FlashMap::new();
        map.insert(FlashArea::new("FLASH_AREA_IMAGE_0", 1, 0, 0x8000, 0x3a000))
            .unwrap();
        map.insert(FlashArea::new(FLASH_AREA_NAME_BOOTLOADER, 0, 0, 0, 0x4000))
            .unwrap();
        map.insert(FlashArea::new("FLASH_AREA_NFFS", 17, 0, 0x7d000, 0x3000))
            .unwrap();
        map.insert(FlashArea::new("FLASH_AREA_REBOOT_LOG", 16, 0, 0x4000, 0x4000))
            .unwrap();
        map
    }

    #[test]
    fn test_sorted_by_id() {
        let map = sample_map();
        let ids: Vec<u32> = map.sorted_areas().iter().map(|a| a.id).collect();
        assert_eq!(ids, [0, 1, 16, 17]);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut map = sample_map();
        let err = map
            .insert(FlashArea::new("FLASH_AREA_NFFS", 18, 0, 0x80000, 0x1000))
            .unwrap_err();
        assert_eq!(err, FlashMapError::DuplicateAreaName("FLASH_AREA_NFFS".into()));
    }

    #[test]
    fn test_bootloader_lookup() {
        let map = sample_map();
        assert_eq!(map.bootloader().unwrap().size, 0x4000);
        assert!(FlashMap::new().bootloader().is_none());
    }

    #[test]
    fn test_validate() {
        assert!(sample_map().validate().is_ok());

        let mut map = sample_map();
        map.insert(FlashArea::new("OVERLAP", 20, 0, 0x3fff, 0x10))
            .unwrap();
        assert!(matches!(
            map.validate(),
            Err(FlashMapError::OverlappingAreas { .. })
        ));

        // Same range on another device is fine
        let mut map = sample_map();
        map.insert(FlashArea::new("EXTERNAL", 20, 1, 0, 0x10000))
            .unwrap();
        assert!(map.validate().is_ok());

        let mut map = sample_map();
        map.insert(FlashArea::new("SAME_ID", 16, 1, 0, 0x1000))
            .unwrap();
        assert!(matches!(
            map.validate(),
            Err(FlashMapError::DuplicateAreaId { id: 16, .. })
        ));

        let mut map = sample_map();
        map.insert(FlashArea::new("EMPTY", 30, 1, 0, 0)).unwrap();
        assert_eq!(map.validate(), Err(FlashMapError::EmptyArea("EMPTY".into())));
    }

    #[test]
    fn test_overflowing_area_rejected() {
        let mut map = FlashMap::new();
        map.insert(FlashArea::new("TOP", 1, 0, 0xFFFF_F000, 0x2000))
            .unwrap();
        assert_eq!(map.validate(), Err(FlashMapError::AreaOverflow("TOP".into())));
    }

    #[test]
    fn test_system_area_id() {
        assert_eq!(system_area_id(FLASH_AREA_NAME_BOOTLOADER), Some(0));
        assert_eq!(system_area_id(FLASH_AREA_NAME_IMAGE_SCRATCH), Some(3));
        assert_eq!(system_area_id("FLASH_AREA_NFFS"), None);
    }
}
