//! mfgimg - Manufacturing image meta region tool
//!
//! Embeds the manufacturing meta region into a raw flash image: a TLV block
//! at the end of the boot loader area describing every flash area, sealed
//! with a SHA-256 hash of the whole image.
//!
//! # Architecture
//!
//! All image manipulation lives in `mfgimg-core`:
//! - **flash** - flash maps, loaded from TOML files
//! - **meta** - region encoding, insertion, hashing and decoding
//!
//! This binary only handles argument parsing, file I/O and reporting.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logger; RUST_LOG still wins over -v
    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match cli.command {
        Commands::Embed {
            flash_map,
            input,
            output,
            pad_to,
        } => commands::embed::run_embed(&flash_map, &input, &output, pad_to),
        Commands::Show { input, flash_map } => {
            commands::show::run_show(&input, flash_map.as_deref())
        }
        Commands::Verify { input, flash_map } => {
            commands::show::run_verify(&input, flash_map.as_deref())
        }
        Commands::Areas { flash_map } => commands::areas::run_areas(&flash_map),
    }
}
