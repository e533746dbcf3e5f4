//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse a size as hex, decimal, or with a KiB/MiB suffix
fn parse_size_arg(s: &str) -> Result<usize, String> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return usize::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e));
    }

    let lower = s.to_lowercase();
    let (num, multiplier) = if let Some(n) = lower.strip_suffix("mib") {
        (n.trim(), 1024 * 1024)
    } else if let Some(n) = lower.strip_suffix("kib") {
        (n.trim(), 1024)
    } else {
        (lower.as_str(), 1)
    };

    let n: usize = num.parse().map_err(|e| format!("Invalid number: {}", e))?;
    n.checked_mul(multiplier)
        .ok_or_else(|| format!("Size too large: {}", s))
}

#[derive(Parser)]
#[command(name = "mfgimg")]
#[command(author, version, about = "Manufacturing image meta region tool", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Embed the meta region into a flash image and patch its hash
    Embed {
        /// Flash map file (TOML format)
        #[arg(short = 'm', long)]
        flash_map: PathBuf,

        /// Input flash image
        #[arg(short, long)]
        input: PathBuf,

        /// Output flash image
        #[arg(short, long)]
        output: PathBuf,

        /// Pad the image with 0xFF to this size first (e.g. "512 KiB", 0x80000)
        #[arg(long, value_parser = parse_size_arg)]
        pad_to: Option<usize>,
    },

    /// Decode and print the meta region of a flash image
    Show {
        /// Flash image
        #[arg(short, long)]
        input: PathBuf,

        /// Flash map file; without it the image is searched for the region
        #[arg(short = 'm', long)]
        flash_map: Option<PathBuf>,
    },

    /// Check the meta hash of a flash image
    Verify {
        /// Flash image
        #[arg(short, long)]
        input: PathBuf,

        /// Flash map file; without it the image is searched for the region
        #[arg(short = 'm', long)]
        flash_map: Option<PathBuf>,
    },

    /// Show a flash map in meta region order
    Areas {
        /// Flash map file (TOML format)
        #[arg(short = 'm', long)]
        flash_map: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size_arg() {
        assert_eq!(parse_size_arg("0x80000"), Ok(0x80000));
        assert_eq!(parse_size_arg("4096"), Ok(4096));
        assert_eq!(parse_size_arg("512 KiB"), Ok(512 * 1024));
        assert_eq!(parse_size_arg("1MiB"), Ok(1024 * 1024));
        assert!(parse_size_arg("big").is_err());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "mfgimg", "-v", "embed", "-m", "map.toml", "-i", "in.bin", "-o", "out.bin",
            "--pad-to", "0x1000",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Embed { pad_to, .. } => assert_eq!(pad_to, Some(0x1000)),
            _ => panic!("expected embed"),
        }
    }
}
