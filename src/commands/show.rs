//! Show and verify command implementations

use mfgimg_core::flash::FlashMap;
use mfgimg_core::meta::{self, MetaRegion};
use std::fs;
use std::path::Path;

use super::{format_size, CommandError};

/// Locate the meta region, via the flash map when one is given
fn locate(image: &[u8], map_path: Option<&Path>) -> Result<MetaRegion, Box<dyn std::error::Error>> {
    let region = match map_path {
        Some(path) => {
            let map = FlashMap::from_toml_file(path)?;
            log::info!("Loaded flash map from {:?}", path);
            meta::read_meta(image, &map)?
        }
        None => {
            log::info!("No flash map given, searching image for meta region...");
            meta::find_meta(image)?
        }
    };
    Ok(region)
}

/// Decode and print the meta region of an image
pub fn run_show(input: &Path, map_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let mut image = fs::read(input)?;
    let region = locate(&image, map_path)?;

    print_region(&region);

    let valid = meta::verify_meta_hash(&mut image, &region)?;
    println!("\nHash:   {}", if valid { "valid" } else { "INVALID" });

    Ok(())
}

/// Check the meta hash of an image
pub fn run_verify(input: &Path, map_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let mut image = fs::read(input)?;
    let region = locate(&image, map_path)?;

    let computed = meta::calc_meta_hash(&mut image, region.hash_offset)?;
    if computed != region.hash {
        return Err(CommandError::HashMismatch {
            stored: hex::encode(region.hash),
            computed: hex::encode(computed),
        }
        .into());
    }

    println!("Meta hash OK: {}", hex::encode(computed));
    Ok(())
}

/// Print a decoded meta region
pub fn print_region(region: &MetaRegion) {
    println!("Meta Region");
    println!("===========");
    println!("Version: {}", region.header.version);
    println!(
        "Offset:  0x{:08X} - 0x{:08X} ({} bytes)",
        region.offset,
        region.end(),
        region.len()
    );
    println!(
        "Hash:    {} (at 0x{:08X})",
        hex::encode(region.hash),
        region.hash_offset
    );

    println!("\nFlash areas ({}):", region.areas.len());
    println!(
        "{:>4} {:>6} {:>12} {:>12}",
        "Id", "Device", "Offset", "Size"
    );
    println!("{:-<37}", "");

    for area in &region.areas {
        println!(
            "{:>4} {:>6} {:#012X} {:>12}",
            area.area_id,
            area.device_id,
            area.offset,
            format_size(area.size)
        );
    }
}
