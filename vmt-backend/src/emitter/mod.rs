//! Instruction Emitter
//!
//! The stateful heart of the translator. Each VM command (or fused
//! push/pop pair) is lowered into a complete instruction sequence before
//! anything is appended to the output, so a command that fails part way
//! leaves no trace in the artifact.
//!
//! Lowering is split by command family:
//! - `arithmetic`: add, sub, neg, eq, gt, lt, and, or, not
//! - `memory`: push, pop and the fused push/pop move
//! - `flow`: label, goto, if-goto
//! - `function`: function, call, return, bootstrap and halt

pub mod arithmetic;
pub mod flow;
pub mod function;
pub(crate) mod helpers;
pub mod memory;

pub use arithmetic::{lower_arithmetic, ArithmeticOp};
pub use flow::{lower_goto, lower_if_goto, lower_label};
pub use function::{lower_bootstrap, lower_call, lower_function, lower_halt, lower_return};
pub use memory::{lower_pop, lower_push, lower_push_pop};

use crate::state::{TranslatorState, BOOT_MODULE};
use crate::{EntryPoint, TranslatorOptions};
use log::{debug, trace, warn};
use vmt_codegen::AsmInst;
use vmt_common::{Command, Diagnostic, ErrorReporter, Opcode, SourceLocation, VmError};

pub struct InstructionEmitter {
    state: TranslatorState,
    options: TranslatorOptions,
    output: Vec<AsmInst>,
    reporter: ErrorReporter,
}

impl InstructionEmitter {
    pub fn new(options: TranslatorOptions) -> Self {
        Self {
            state: TranslatorState::new(),
            options,
            output: Vec::new(),
            reporter: ErrorReporter::new(),
        }
    }

    pub fn state(&self) -> &TranslatorState {
        &self.state
    }

    pub fn options(&self) -> &TranslatorOptions {
        &self.options
    }

    /// Instructions emitted so far
    pub fn output(&self) -> &[AsmInst] {
        &self.output
    }

    pub fn reporter(&self) -> &ErrorReporter {
        &self.reporter
    }

    pub fn set_module(&mut self, module: &str) {
        self.state.set_module(module);
    }

    /// Translate one command, recording a diagnostic if it cannot be
    /// lowered
    pub fn translate(&mut self, command: &Command) {
        debug!("{}: {}", command.location, command.opcode);
        match self.lower(command) {
            Ok(insts) => {
                self.comment(&command.source_text);
                self.output.extend(insts);
            }
            Err(error) => self.record_error(error, Some(command)),
        }
    }

    /// Translate a push immediately followed by a pop as one move
    ///
    /// Falls back to translating the two commands separately when either
    /// side cannot be resolved, so the diagnostics match the unfused
    /// path exactly.
    pub fn translate_push_pop(&mut self, push: &Command, pop: &Command) {
        match self.lower_fused(push, pop) {
            Some(insts) => {
                trace!("fused '{}' with '{}'", push.source_text, pop.source_text);
                self.comment(&push.source_text);
                self.comment(&pop.source_text);
                self.output.extend(insts);
            }
            None => {
                self.translate(push);
                self.translate(pop);
            }
        }
    }

    /// Set SP and call the entry function from the `Boot` pseudo-module
    pub fn emit_bootstrap(&mut self, entry: &EntryPoint) {
        if self.state.bootstrap_emitted() {
            warn!("bootstrap already emitted, ignoring second request");
            return;
        }

        self.set_module(BOOT_MODULE);
        let insts = lower_bootstrap(&mut self.state.naming, BOOT_MODULE, &entry.function);
        self.comment(&format!("bootstrap: call {}", entry.function));
        self.output.extend(insts);
        self.state.mark_bootstrap_emitted();
    }

    /// Record an error for `command`, or for the reader position carried
    /// by a parse error
    pub fn record_error(&mut self, error: VmError, command: Option<&Command>) {
        let diagnostic = match (error, command) {
            (VmError::Parse { location, message }, _) => Diagnostic::error(message, location),
            (error, Some(command)) => Diagnostic::error(error.to_string(), command.location.clone())
                .with_source_text(&command.source_text),
            (error, None) => Diagnostic::error(error.to_string(), SourceLocation::dummy()),
        };
        warn!("{}", diagnostic);
        self.reporter.report(diagnostic);
    }

    /// Close the artifact. Without a bootstrap the program ends in a
    /// halt loop.
    pub fn finish(mut self) -> (Vec<AsmInst>, ErrorReporter) {
        if !self.state.bootstrap_emitted() {
            self.comment("halt");
            self.output.extend(lower_halt());
        }
        (self.output, self.reporter)
    }

    fn comment(&mut self, text: &str) {
        if self.options.emit_comments {
            self.output.push(AsmInst::Comment(text.to_string()));
        }
    }

    fn lower(&mut self, command: &Command) -> Result<Vec<AsmInst>, VmError> {
        let insts = match &command.opcode {
            Opcode::Arithmetic(op) => {
                let op: ArithmeticOp = op.parse()?;
                lower_arithmetic(&mut self.state.naming, op)
            }
            Opcode::Push { segment, index } => {
                let source = self.state.resolver.resolve(segment, *index)?;
                lower_push(&source)
            }
            Opcode::Pop { segment, index } => {
                let target = self.state.resolver.resolve(segment, *index)?;
                lower_pop(&target)?
            }
            Opcode::Label(name) => lower_label(name),
            Opcode::Goto(target) => lower_goto(target),
            Opcode::IfGoto(target) => lower_if_goto(target),
            Opcode::Function { name, locals } => lower_function(name, *locals),
            Opcode::Call { name, args } => {
                let module = self.state.current_module().to_string();
                lower_call(&mut self.state.naming, &module, name, *args)?
            }
            Opcode::Return => lower_return(),
        };
        Ok(insts)
    }

    fn lower_fused(&mut self, push: &Command, pop: &Command) -> Option<Vec<AsmInst>> {
        let (Opcode::Push { segment: src, index: src_index }, Opcode::Pop { segment: dst, index: dst_index }) =
            (&push.opcode, &pop.opcode)
        else {
            return None;
        };

        let source = self.state.resolver.resolve(src, *src_index).ok()?;
        let target = self.state.resolver.resolve(dst, *dst_index).ok()?;
        lower_push_pop(&source, &target).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vmt_codegen::emit_program;

    fn command(opcode: Opcode, text: &str, line: u32) -> Command {
        Command::new(opcode, text, SourceLocation::new("Main", line))
    }

    fn push(segment: &str, index: u16) -> Command {
        command(
            Opcode::Push {
                segment: segment.to_string(),
                index,
            },
            &format!("push {} {}", segment, index),
            1,
        )
    }

    fn pop(segment: &str, index: u16) -> Command {
        command(
            Opcode::Pop {
                segment: segment.to_string(),
                index,
            },
            &format!("pop {} {}", segment, index),
            2,
        )
    }

    #[test]
    fn test_failed_command_emits_nothing() {
        let mut emitter = InstructionEmitter::new(TranslatorOptions {
            emit_comments: true,
            ..Default::default()
        });
        emitter.set_module("Main");
        emitter.translate(&push("heap", 0));

        assert!(emitter.output().is_empty());
        let diagnostic = &emitter.reporter().diagnostics()[0];
        assert_eq!(diagnostic.message, "invalid segment 'heap'");
        assert_eq!(diagnostic.source_text.as_deref(), Some("push heap 0"));
        assert_eq!(diagnostic.location, SourceLocation::new("Main", 1));
    }

    #[test]
    fn test_unknown_arithmetic_is_reported() {
        let mut emitter = InstructionEmitter::new(TranslatorOptions::default());
        emitter.translate(&command(Opcode::Arithmetic("mul".to_string()), "mul", 4));

        assert!(emitter.output().is_empty());
        assert_eq!(emitter.reporter().error_count(), 1);
        assert_eq!(emitter.state().naming.compare_count(), 0);
    }

    #[test]
    fn test_comments_precede_code() {
        let mut emitter = InstructionEmitter::new(TranslatorOptions {
            emit_comments: true,
            ..Default::default()
        });
        emitter.translate(&push("constant", 3));
        assert_eq!(emitter.output()[0], AsmInst::Comment("push constant 3".to_string()));
        assert_eq!(emitter.output()[1], AsmInst::at_const(3));
    }

    #[test]
    fn test_fused_pair_gets_two_comments() {
        let mut emitter = InstructionEmitter::new(TranslatorOptions {
            emit_comments: true,
            ..Default::default()
        });
        emitter.translate_push_pop(&push("local", 0), &pop("temp", 2));
        assert_eq!(
            emit_program(emitter.output()),
            "// push local 0\n// pop temp 2\n@LCL\nA=M\nD=M\n@7\nM=D\n"
        );
    }

    #[test]
    fn test_fusion_falls_back_on_bad_target() {
        let mut emitter = InstructionEmitter::new(TranslatorOptions::default());
        emitter.translate_push_pop(&push("constant", 5), &pop("constant", 0));

        // The push still happens; only the pop is rejected
        assert_eq!(emit_program(emitter.output()), "@5\nD=A\n@SP\nAM=M+1\nA=A-1\nM=D\n");
        assert_eq!(
            emitter.reporter().diagnostics()[0].message,
            "cannot pop into segment 'constant'"
        );
    }

    #[test]
    fn test_finish_appends_halt_without_bootstrap() {
        let emitter = InstructionEmitter::new(TranslatorOptions::default());
        let (insts, reporter) = emitter.finish();
        assert_eq!(emit_program(&insts), "(_END)\n@_END\n0;JMP\n");
        assert!(!reporter.has_errors());
    }

    #[test]
    fn test_bootstrap_suppresses_halt_and_is_emitted_once() {
        let mut emitter = InstructionEmitter::new(TranslatorOptions::default());
        emitter.emit_bootstrap(&EntryPoint::default());
        let length = emitter.output().len();
        emitter.emit_bootstrap(&EntryPoint::default());
        assert_eq!(emitter.output().len(), length);
        assert_eq!(emitter.state().current_module(), "Boot");

        let (insts, _) = emitter.finish();
        assert!(!insts.contains(&AsmInst::label("_END")));
    }

    #[test]
    fn test_parse_error_keeps_reader_location() {
        let mut emitter = InstructionEmitter::new(TranslatorOptions::default());
        emitter.record_error(
            VmError::parse_error("unknown command 'jump'".to_string(), SourceLocation::new("Main", 9)),
            None,
        );
        assert_eq!(
            emitter.reporter().diagnostics()[0].to_string(),
            "Main:9: error: unknown command 'jump'"
        );
    }
}
