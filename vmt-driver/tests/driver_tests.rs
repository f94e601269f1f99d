use indoc::indoc;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use vmt_backend::{EntryPoint, TranslatorOptions};
use vmt_driver::{
    discover_modules, run_file, run_source, translate_path, translate_sources, BootstrapPolicy, DriverConfig,
};
use vmt_sim::RunOutcome;

const MAIN: &str = indoc! {"
    // Main.double(x) = x + x
    function Main.double 0
    push argument 0
    push argument 0
    add
    return
"};

const SYS: &str = indoc! {"
    function Sys.init 0
    push constant 21
    call Main.double 1
    pop static 0
    label HALT
    goto HALT
"};

/// A fresh scratch directory per test
fn scratch_dir(name: &str) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!("vmt-driver-{}-{}-{}", std::process::id(), name, id));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn sources(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(name, text)| (name.to_string(), text.to_string()))
        .collect()
}

// ========================================================================
// IN-MEMORY TRANSLATION
// ========================================================================

#[test]
fn test_translate_sources_shares_one_run() {
    let output = translate_sources(
        &sources(&[("Main", MAIN), ("Sys", SYS)]),
        TranslatorOptions::default(),
        Some(&EntryPoint::default()),
    );
    assert!(!output.has_errors());

    let text = output.text();
    assert!(text.starts_with("@256\nD=A\n@SP\nM=D\n"));
    assert!(text.contains("(Boot.Sys.init$ret.0)"));
    assert!(text.contains("(Sys.Main.double$ret.1)"));

    let report = run_source(&text, 100_000, &[], 16..17).unwrap();
    assert_eq!(report.outcome, RunOutcome::Halted);
    assert_eq!(report.cells, vec![(16, 42)]);
}

#[test]
fn test_run_source_presets_and_reports_errors() {
    let report = run_source("@0\nD=M\n@1\nM=D+M\n(END)\n@END\n0;JMP\n", 100, &[(0, 5), (1, -2)], 0..2).unwrap();
    assert_eq!(report.outcome, RunOutcome::Halted);
    assert_eq!(report.cells, vec![(0, 5), (1, 3)]);

    let err = run_source("D=Q\n", 100, &[], 0..1).unwrap_err();
    assert!(err.to_string().contains("assembly failed"));
}

// ========================================================================
// FILESYSTEM
// ========================================================================

#[test]
fn test_directory_translation_with_auto_bootstrap() {
    let dir = scratch_dir("auto");
    fs::write(dir.join("Sys.vm"), SYS).unwrap();
    fs::write(dir.join("Main.vm"), MAIN).unwrap();
    fs::write(dir.join("notes.txt"), "not a module").unwrap();

    let modules = discover_modules(&dir).unwrap();
    let names: Vec<_> = modules.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Main", "Sys"]);

    let report = translate_path(&dir, None, &DriverConfig::default()).unwrap();
    assert!(report.bootstrap);
    assert_eq!(report.modules, vec!["Main".to_string(), "Sys".to_string()]);

    let dir_name = dir.file_name().unwrap().to_string_lossy().to_string();
    assert_eq!(report.output_path, dir.join(format!("{}.asm", dir_name)));
    assert!(!dir.join(format!("{}.asm.tmp", dir_name)).exists());

    let report = run_file(&report.output_path, 100_000, &[], 16..17).unwrap();
    assert_eq!(report.cells, vec![(16, 42)]);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_single_file_without_entry_module_halts() {
    let dir = scratch_dir("single");
    let input = dir.join("Simple.vm");
    fs::write(&input, "push constant 7\npush constant 8\nadd\n").unwrap();

    let report = translate_path(&input, None, &DriverConfig::default()).unwrap();
    assert!(!report.bootstrap);
    assert_eq!(report.output_path, dir.join("Simple.asm"));

    let text = fs::read_to_string(&report.output_path).unwrap();
    assert!(text.ends_with("(_END)\n@_END\n0;JMP\n"));

    let run = run_file(&report.output_path, 1_000, &[(0, 256)], 0..1).unwrap();
    assert_eq!(run.outcome, RunOutcome::Halted);
    assert_eq!(run.cells, vec![(0, 257)]);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_config_file_is_picked_up() {
    let dir = scratch_dir("config");
    fs::write(dir.join("Sys.vm"), SYS).unwrap();
    fs::write(dir.join("Main.vm"), MAIN).unwrap();
    fs::write(dir.join("vmt.json"), r#"{ "comments": true, "bootstrap": "never" }"#).unwrap();

    let config = DriverConfig::discover(&dir).unwrap();
    assert_eq!(config.bootstrap, BootstrapPolicy::Never);

    let output = dir.join("out.asm");
    let report = translate_path(&dir, Some(&output), &config).unwrap();
    assert!(!report.bootstrap);

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.starts_with("// function Main.double 0\n"));
    assert!(text.contains("// halt\n(_END)\n"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_errors_are_reported_but_artifact_is_written() {
    let dir = scratch_dir("errors");
    let input = dir.join("Broken.vm");
    fs::write(&input, "push constant 1\npop nowhere 0\nfrobnicate\npush constant 2\n").unwrap();

    let report = translate_path(&input, None, &DriverConfig::default()).unwrap();
    let diagnostics: Vec<_> = report
        .output
        .diagnostics
        .diagnostics()
        .iter()
        .map(|d| d.to_string())
        .collect();
    assert_eq!(
        diagnostics,
        vec![
            "Broken:2: error: invalid segment 'nowhere' (pop nowhere 0)",
            "Broken:3: error: unrecognized arithmetic command 'frobnicate' (frobnicate)",
        ]
    );
    assert!(report.output_path.exists());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_empty_directory_is_an_error() {
    let dir = scratch_dir("empty");
    assert!(translate_path(&dir, None, &DriverConfig::default()).is_err());
    let _ = fs::remove_dir_all(&dir);
}
