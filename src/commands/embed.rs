//! Embed command implementation

use mfgimg_core::flash::FlashMap;
use mfgimg_core::meta;
use std::fs;
use std::path::Path;

use super::CommandError;

/// Run the embed command
pub fn run_embed(
    map_path: &Path,
    input: &Path,
    output: &Path,
    pad_to: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let map = FlashMap::from_toml_file(map_path)?;
    log::info!("Loaded flash map from {:?} ({} areas)", map_path, map.len());

    let mut image = fs::read(input)?;
    println!("Read {} bytes from {:?}", image.len(), input);

    if let Some(size) = pad_to {
        pad_image(&mut image, size)?;
    }

    let placement = meta::embed_meta(&mut image, &map)?;

    fs::write(output, &image)?;

    println!(
        "Meta region: {} bytes at 0x{:08X}",
        placement.region_len, placement.region_offset
    );
    println!("Meta hash:   {}", hex::encode(placement.hash));
    println!("  at 0x{:08X}", placement.hash_offset);
    println!("Wrote {} bytes to {:?}", image.len(), output);

    Ok(())
}

/// Pad `image` with erased-flash bytes up to `size`
fn pad_image(image: &mut Vec<u8>, size: usize) -> Result<(), CommandError> {
    if image.len() > size {
        return Err(CommandError::ImageLargerThanPad {
            len: image.len(),
            size,
        });
    }
    if image.len() < size {
        println!(
            "Padding image from {} to {} bytes with 0xFF",
            image.len(),
            size
        );
        image.resize(size, meta::ERASED_VAL);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_image() {
        let mut image = vec![0x00; 16];
        pad_image(&mut image, 32).unwrap();
        assert_eq!(image.len(), 32);
        assert!(image[16..].iter().all(|&b| b == 0xFF));

        pad_image(&mut image, 32).unwrap();
        assert_eq!(image.len(), 32);

        assert!(matches!(
            pad_image(&mut image, 8),
            Err(CommandError::ImageLargerThanPad { len: 32, size: 8 })
        ));
    }
}
