use crate::config::BootstrapPolicy;
use clap::{Parser, Subcommand};
use std::ops::Range;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "vmt",
    about = "Hack VM translator",
    long_about = "vmt - Hack VM Translator\n\nTranslates stack VM code into Hack assembly and runs the result on a built-in simulator.",
    version
)]
pub struct Cli {
    /// Log translation progress (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Translate a .vm file, or every .vm file in a directory, into one .asm file
    Translate {
        /// Input .vm file or directory
        input: PathBuf,

        /// Output .asm file (defaults to Dir/Dir.asm or File.asm)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Precede each command's code with its VM source as a comment
        #[arg(long)]
        comments: bool,

        /// Translate push/pop pairs separately instead of as direct moves
        #[arg(long)]
        no_fuse: bool,

        /// Whether to start with SP=256 and a call to the entry function
        #[arg(long, value_enum)]
        bootstrap: Option<BootstrapPolicy>,

        /// Config file (defaults to vmt.json next to the input)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Assemble a .asm file and run it on the simulator
    Run {
        /// Input .asm file
        input: PathBuf,

        /// Stop after this many instructions
        #[arg(long, default_value = "1000000")]
        cycles: u64,

        /// RAM cells to print afterwards, as START..END
        #[arg(long, default_value = "0..16", value_parser = parse_range)]
        dump: Range<u16>,

        /// Preset a RAM cell before running, as ADDRESS=VALUE
        #[arg(long = "set", value_name = "ADDRESS=VALUE", value_parser = parse_assignment)]
        presets: Vec<(u16, i16)>,
    },
}

fn parse_range(text: &str) -> Result<Range<u16>, String> {
    let (start, end) = text
        .split_once("..")
        .ok_or_else(|| format!("expected START..END, found '{}'", text))?;
    let start: u16 = start.trim().parse().map_err(|_| format!("invalid start '{}'", start))?;
    let end: u16 = end.trim().parse().map_err(|_| format!("invalid end '{}'", end))?;
    if start > end {
        return Err(format!("range {} is backwards", text));
    }
    Ok(start..end)
}

fn parse_assignment(text: &str) -> Result<(u16, i16), String> {
    let (address, value) = text
        .split_once('=')
        .ok_or_else(|| format!("expected ADDRESS=VALUE, found '{}'", text))?;
    let address = address
        .trim()
        .parse()
        .map_err(|_| format!("invalid address '{}'", address))?;
    let value = value.trim().parse().map_err(|_| format!("invalid value '{}'", value))?;
    Ok((address, value))
}
