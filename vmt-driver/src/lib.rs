//! Hack VM Translator - Driver
//!
//! Turns paths into a translation run: discovers modules, decides on the
//! bootstrap, feeds every module through one `Translator` and writes the
//! artifact. Also runs assembled programs on the simulator.

pub mod cli;
pub mod config;
pub mod discover;

use anyhow::{anyhow, Context, Result};
use log::info;
use std::fs;
use std::io::{BufWriter, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};
use vmt_backend::{translate_modules, EntryPoint, TranslationOutput, TranslatorOptions};
use vmt_frontend::CommandReader;
use vmt_sim::RunOutcome;

pub use config::{BootstrapPolicy, DriverConfig};
pub use discover::{default_output, discover_modules, ModuleFile};

/// Result of translating a path
#[derive(Debug)]
pub struct TranslationReport {
    pub output_path: PathBuf,
    pub modules: Vec<String>,
    pub bootstrap: bool,
    pub output: TranslationOutput,
}

/// Translate in-memory `(module, source)` pairs, in order, as one run
pub fn translate_sources(
    sources: &[(String, String)],
    options: TranslatorOptions,
    bootstrap: Option<&EntryPoint>,
) -> TranslationOutput {
    translate_modules(
        sources
            .iter()
            .map(|(name, text)| (name.clone(), CommandReader::new(name, text))),
        options,
        bootstrap,
    )
}

/// Translate a `.vm` file or directory and write the artifact
///
/// The artifact is written even when some commands were rejected; the
/// caller decides what the diagnostics mean for the exit status.
pub fn translate_path(input: &Path, output_path: Option<&Path>, config: &DriverConfig) -> Result<TranslationReport> {
    let files = discover_modules(input)?;

    let mut sources = Vec::with_capacity(files.len());
    for file in &files {
        let text = fs::read_to_string(&file.path)
            .with_context(|| format!("failed to read {}", file.path.display()))?;
        sources.push((file.name.clone(), text));
    }

    let modules: Vec<String> = files.into_iter().map(|file| file.name).collect();
    let bootstrap = config.wants_bootstrap(&modules);
    let entry = config.entry_point();
    info!(
        "translating {} modules{}",
        modules.len(),
        if bootstrap { " with bootstrap" } else { "" }
    );

    let output = translate_sources(&sources, config.translator_options(), bootstrap.then_some(&entry));

    let output_path = output_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(input));
    write_atomically(&output_path, &output.text())?;
    info!("wrote {}", output_path.display());

    Ok(TranslationReport {
        output_path,
        modules,
        bootstrap,
        output,
    })
}

/// Write `text` to `<path>.tmp`, flush it, then rename it over `path`
pub fn write_atomically(path: &Path, text: &str) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let file = fs::File::create(&tmp).with_context(|| format!("failed to create {}", tmp.display()))?;
    let mut writer = BufWriter::new(file);
    writer.write_all(text.as_bytes())?;
    writer
        .into_inner()
        .map_err(|err| anyhow!("failed to flush {}: {}", tmp.display(), err.error()))?
        .sync_all()?;

    fs::rename(&tmp, path)
        .with_context(|| format!("failed to move {} to {}", tmp.display(), path.display()))?;
    Ok(())
}

/// What a simulator run left behind
#[derive(Debug)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub cycles: u64,
    pub cells: Vec<(u16, i16)>,
}

/// Assemble `source`, preset RAM, run, and read back `dump`
pub fn run_source(source: &str, cycles: u64, presets: &[(u16, i16)], dump: Range<u16>) -> Result<RunReport> {
    let mut machine = vmt_sim::load(source).map_err(|errors| {
        let lines: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        anyhow!("assembly failed:\n{}", lines.join("\n"))
    })?;

    for &(address, value) in presets {
        machine.poke(address, value as u16);
    }

    let outcome = machine.run(cycles)?;
    let cells = dump.map(|address| (address, machine.peek_signed(address))).collect();
    Ok(RunReport {
        outcome,
        cycles: machine.cycles,
        cells,
    })
}

/// `run_source` on a file
pub fn run_file(path: &Path, cycles: u64, presets: &[(u16, i16)], dump: Range<u16>) -> Result<RunReport> {
    let source = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    run_source(&source, cycles, presets, dump)
}
