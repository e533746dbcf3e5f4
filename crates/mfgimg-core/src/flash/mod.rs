//! Flash map support
//!
//! A flash map names the areas of physical flash a manufacturing image
//! covers. The meta region records every area of the map and is itself
//! placed at the tail of the boot loader area. Flash maps can be:
//!
//! - Built programmatically with [`FlashMap::insert`]
//! - Loaded from TOML files (`std` feature)
//!
//! ```ignore
//! let map = FlashMap::from_toml_file("flash_map.toml")?;
//! map.validate()?;
//! for area in map.sorted_areas() {
//!     println!("{} @ 0x{:08X}", area.name, area.offset);
//! }
//! ```

mod types;

#[cfg(feature = "std")]
mod toml;

pub use types::*;
