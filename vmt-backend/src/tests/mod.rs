//! Behavioural tests for the backend
//!
//! These translate real VM source with the reader, assemble the output
//! with the simulator and assert on machine memory.


use crate::{translate_modules, EntryPoint, TranslationOutput, TranslatorOptions};
use vmt_frontend::CommandReader;
use vmt_sim::{load, Machine, RunOutcome};

pub(crate) const SP_START: u16 = 256;
pub(crate) const LCL_START: u16 = 300;
pub(crate) const ARG_START: u16 = 400;
pub(crate) const THIS_START: u16 = 3000;
pub(crate) const THAT_START: u16 = 3010;

const CYCLE_BUDGET: u64 = 1_000_000;

pub(crate) fn translate(modules: &[(&str, &str)], options: TranslatorOptions, bootstrap: bool) -> TranslationOutput {
    let entry = EntryPoint::default();
    translate_modules(
        modules
            .iter()
            .map(|(name, source)| (name.to_string(), CommandReader::new(name, source))),
        options,
        bootstrap.then_some(&entry),
    )
}

/// Translate a single `Main` module with default options
pub(crate) fn translate_main(source: &str) -> TranslationOutput {
    translate(&[("Main", source)], TranslatorOptions::default(), false)
}

/// Load translated code with the segment pointers set up the way a
/// caller would have left them, without going through a bootstrap
pub(crate) fn machine_for(output: &TranslationOutput) -> Machine {
    let mut machine = load(&output.text()).expect("translated code assembles");
    machine.poke(0, SP_START);
    machine.poke(1, LCL_START);
    machine.poke(2, ARG_START);
    machine.poke(3, THIS_START);
    machine.poke(4, THAT_START);
    machine
}

/// Run to the halt loop and hand back the machine
pub(crate) fn run_to_halt(mut machine: Machine) -> Machine {
    assert_eq!(machine.run(CYCLE_BUDGET), Ok(RunOutcome::Halted));
    machine
}

/// Translate, run and return the machine for a `Main` module
pub(crate) fn execute(source: &str) -> Machine {
    let output = translate_main(source);
    assert!(!output.has_errors(), "{}", output.diagnostics.summary());
    run_to_halt(machine_for(&output))
}

/// Snapshot of the pointer cells SP..THAT
pub(crate) fn pointers(machine: &Machine) -> [u16; 5] {
    [
        machine.peek(0),
        machine.peek(1),
        machine.peek(2),
        machine.peek(3),
        machine.peek(4),
    ]
}
