//! TOML flash map file parsing
//!
//! Parses flash map files in TOML format:
//!
//! ```toml
//! [flash_map]
//! name = "nrf52dk"
//!
//! [[area]]
//! name = "FLASH_AREA_BOOTLOADER"
//! device = 0
//! offset = 0x00000000
//! size = "16 KiB"
//!
//! [[area]]
//! name = "FLASH_AREA_REBOOT_LOG"
//! id = 16
//! device = 0
//! offset = 0x00004000
//! size = "16 KiB"
//! ```
//!
//! `id` may be omitted for the well-known system areas.

use std::format;
use std::fs;
use std::path::Path;
use std::string::{String, ToString};
use std::vec::Vec;

use super::{system_area_id, FlashArea, FlashMap, FlashMapError};

/// TOML flash map file structure
#[derive(Debug, serde::Deserialize)]
struct TomlFlashMapFile {
    flash_map: Option<TomlFlashMapMeta>,
    #[serde(default)]
    area: Vec<TomlArea>,
}

/// Flash map metadata
#[derive(Debug, serde::Deserialize)]
struct TomlFlashMapMeta {
    name: Option<String>,
}

/// Area definition in TOML
#[derive(Debug, serde::Deserialize)]
struct TomlArea {
    name: String,
    #[serde(default)]
    id: Option<TomlNumber>,
    #[serde(default)]
    device: Option<TomlNumber>,
    offset: TomlNumber,
    size: TomlNumber,
}

/// A number that can be an integer or a hex/decimal/size string
#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
enum TomlNumber {
    Int(u32),
    Str(String),
}

impl TomlNumber {
    fn number(&self) -> Result<u32, String> {
        match self {
            Self::Int(n) => Ok(*n),
            Self::Str(s) => parse_number(s),
        }
    }

    fn size(&self) -> Result<u32, String> {
        match self {
            Self::Int(n) => Ok(*n),
            Self::Str(s) => parse_size(s),
        }
    }
}

/// Parse a number that can be hex (0x...) or decimal
fn parse_number(s: &str) -> Result<u32, String> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("invalid hex: {}", e))
    } else {
        s.parse().map_err(|e| format!("invalid number: {}", e))
    }
}

/// Parse a size string like "16 KiB", "16kB" or "4096"
pub(crate) fn parse_size(s: &str) -> Result<u32, String> {
    let s = s.trim();

    if let Ok(n) = parse_number(s) {
        return Ok(n);
    }

    // newt writes "kB" for 1024 bytes, so KB and KiB mean the same here
    let s_lower = s.to_lowercase();
    let (num_str, multiplier) = if let Some(n) = s_lower.strip_suffix("mib") {
        (n.trim(), 1024 * 1024)
    } else if let Some(n) = s_lower.strip_suffix("mb") {
        (n.trim(), 1024 * 1024)
    } else if let Some(n) = s_lower.strip_suffix("kib") {
        (n.trim(), 1024)
    } else if let Some(n) = s_lower.strip_suffix("kb") {
        (n.trim(), 1024)
    } else if let Some(n) = s_lower.strip_suffix('b') {
        (n.trim(), 1)
    } else {
        return Err(format!("invalid size: {}", s));
    };

    let num: u32 = num_str
        .parse()
        .map_err(|_| format!("invalid size: {}", s))?;
    num.checked_mul(multiplier)
        .ok_or_else(|| format!("size too large: {}", s))
}

impl FlashMap {
    /// Load a flash map from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, FlashMapError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| FlashMapError::IoError(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Parse a flash map from a TOML string
    ///
    /// The returned map has already been validated.
    pub fn from_toml_str(content: &str) -> Result<Self, FlashMapError> {
        let file: TomlFlashMapFile =
            toml::from_str(content).map_err(|e| FlashMapError::ParseError(e.to_string()))?;

        let mut map = FlashMap::new();
        map.name = file.flash_map.and_then(|meta| meta.name);

        for toml_area in file.area {
            let field_err = |field: &str, e: String| {
                FlashMapError::ParseError(format!("{}.{}: {}", toml_area.name, field, e))
            };

            let id = match &toml_area.id {
                Some(id) => id.number().map_err(|e| field_err("id", e))?,
                None => system_area_id(&toml_area.name)
                    .ok_or_else(|| FlashMapError::MissingAreaId(toml_area.name.clone()))?,
            };
            let device = match &toml_area.device {
                Some(device) => device.number().map_err(|e| field_err("device", e))?,
                None => 0,
            };
            let offset = toml_area.offset.number().map_err(|e| field_err("offset", e))?;
            let size = toml_area.size.size().map_err(|e| field_err("size", e))?;

            log::trace!(
                "flash area {}: id={} device={} offset=0x{:08X} size=0x{:X}",
                toml_area.name,
                id,
                device,
                offset,
                size
            );
            map.insert(FlashArea::new(toml_area.name.clone(), id, device, offset, size))?;
        }

        map.validate()?;
        Ok(map)
    }
}
