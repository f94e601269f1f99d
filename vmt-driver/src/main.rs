use anyhow::Result;
use clap::Parser;
use colored::*;
use std::process;
use vmt_common::{Diagnostic, Severity};
use vmt_driver::cli::{Cli, Command};
use vmt_driver::config::DriverConfig;
use vmt_driver::{run_file, translate_path};
use vmt_sim::RunOutcome;

fn main() {
    match run() {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "error" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    match cli.command {
        Command::Translate {
            input,
            output,
            comments,
            no_fuse,
            bootstrap,
            config,
        } => {
            let mut settings = match config {
                Some(path) => DriverConfig::load(&path)?,
                None => DriverConfig::discover(&input)?,
            };
            settings.apply_overrides(comments, no_fuse, bootstrap);

            let report = translate_path(&input, output.as_deref(), &settings)?;
            let diagnostics = &report.output.diagnostics;
            for diagnostic in diagnostics.diagnostics() {
                print_diagnostic(diagnostic);
            }

            println!(
                "{} {} module{} -> {} ({} instructions{})",
                "Translated".green().bold(),
                report.modules.len(),
                if report.modules.len() == 1 { "" } else { "s" },
                report.output_path.display(),
                report.output.instruction_count(),
                if report.bootstrap { ", bootstrapped" } else { "" }
            );

            if diagnostics.has_errors() {
                eprintln!("{}", diagnostics.summary().red());
                return Ok(1);
            }
            Ok(0)
        }

        Command::Run {
            input,
            cycles,
            dump,
            presets,
        } => {
            let report = run_file(&input, cycles, &presets, dump)?;
            let outcome = match report.outcome {
                RunOutcome::Halted => "halted".green(),
                RunOutcome::FellThrough => "ran off the end of the program".yellow(),
                RunOutcome::CycleLimit => "hit the cycle limit".yellow(),
            };
            println!("{} after {} cycles", outcome, report.cycles);
            for (address, value) in report.cells {
                println!("RAM[{:>5}] = {:>6}", address, value);
            }
            Ok(if report.outcome == RunOutcome::CycleLimit { 2 } else { 0 })
        }
    }
}

fn print_diagnostic(diagnostic: &Diagnostic) {
    let text = diagnostic.to_string();
    match diagnostic.severity {
        Severity::Error => eprintln!("{}", text.red()),
        Severity::Warning => eprintln!("{}", text.yellow()),
    }
}
