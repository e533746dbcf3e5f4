//! Flash map listing

use mfgimg_core::flash::{FlashMap, FLASH_AREA_NAME_BOOTLOADER};
use std::path::Path;

use super::format_size;

/// Show a flash map file in meta region order
pub fn run_areas(map_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let map = FlashMap::from_toml_file(map_path)?;
    print_flash_map(&map);
    Ok(())
}

/// Print flash map information
pub fn print_flash_map(map: &FlashMap) {
    println!("Flash Map");
    println!("=========");

    if let Some(name) = &map.name {
        println!("Name:   {}", name);
    }

    println!("\nAreas ({}):", map.len());
    println!(
        "{:<28} {:>4} {:>6} {:>12} {:>10}",
        "Name", "Id", "Device", "Offset", "Size"
    );
    println!("{:-<64}", "");

    for area in map.sorted_areas() {
        println!(
            "{:<28} {:>4} {:>6} {:#012X} {:>10}",
            area.name,
            area.id,
            area.device,
            area.offset,
            format_size(area.size)
        );
    }

    if map.bootloader().is_none() {
        println!("\nwarning: no {} area; a meta region cannot be embedded", FLASH_AREA_NAME_BOOTLOADER);
    }
}
