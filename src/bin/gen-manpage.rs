//! Writes troff man pages for mfgimg: `mfgimg.1` plus one
//! `mfgimg-<subcommand>.1` page per subcommand.
//!
//! Usage: cargo run --bin gen-manpage -- [output-dir]

use clap::{Command, CommandFactory};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[path = "../cli.rs"]
mod cli;

/// Render one page for `cmd` into memory
fn render_page(cmd: Command) -> io::Result<Vec<u8>> {
    let mut page = Vec::new();
    clap_mangen::Man::new(cmd).render(&mut page)?;
    Ok(page)
}

/// Pages to generate as `(file name, command)`, top-level page first
fn pages(root: &Command) -> Vec<(String, Command)> {
    let bin = root.get_name().to_string();
    let mut pages = vec![(format!("{}.1", bin), root.clone())];
    for sub in root.get_subcommands().filter(|s| s.get_name() != "help") {
        let name = format!("{}-{}", bin, sub.get_name());
        pages.push((format!("{}.1", name), sub.clone().name(name)));
    }
    pages
}

fn write_pages(root: &Command, dir: &Path) -> io::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();
    for (file, cmd) in pages(root) {
        let path = dir.join(file);
        fs::write(&path, render_page(cmd)?)?;
        written.push(path);
    }
    Ok(written)
}

fn main() -> io::Result<()> {
    let output_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man"));

    let written = write_pages(&cli::Cli::command(), &output_dir)?;
    for path in &written {
        println!("wrote {}", path.display());
    }
    if let Some(main_page) = written.first() {
        println!("\nview with: man -l {}", main_page.display());
    }
    Ok(())
}
