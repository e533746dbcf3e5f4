//! mfgimg-core - Core library for manufacturing image meta regions
//!
//! This crate builds the manufacturing meta region (a small TLV block
//! describing the flash layout and carrying an image hash), embeds it at the
//! tail of the boot loader flash area of a raw flash image, and patches the
//! SHA-256 hash of the finished image into it. It is `no_std` compatible
//! (it needs `alloc`); the `std` feature adds TOML flash map loading.
//!
//! # Features
//!
//! - `std` - Enable standard library support (TOML flash maps, `std::error::Error`)
//!
//! # Example
//!
//! ```ignore
//! use mfgimg_core::{flash::FlashMap, meta};
//!
//! let map = FlashMap::from_toml_file("flash_map.toml")?;
//! let mut image = std::fs::read("section0.bin")?;
//! let placement = meta::embed_meta(&mut image, &map)?;
//! println!("meta region at 0x{:08X}", placement.region_offset);
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod error;
pub mod flash;
pub mod meta;

pub use error::{Error, Result};
