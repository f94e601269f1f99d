//! Whole-run translation facade
//!
//! A `Translator` is created once per output artifact. Every module fed
//! to it shares the same label counters and static allocation, which is
//! what keeps names and addresses consistent across the artifact.

use crate::emitter::InstructionEmitter;
use crate::lookahead::{LookaheadBuffer, Step};
use crate::{EntryPoint, TranslatorOptions};
use log::{debug, info};
use vmt_codegen::{emit_program, instruction_count, AsmInst};
use vmt_common::{Command, ErrorReporter, VmError};

/// The finished artifact plus everything reported while producing it
#[derive(Debug)]
pub struct TranslationOutput {
    pub instructions: Vec<AsmInst>,
    pub diagnostics: ErrorReporter,
}

impl TranslationOutput {
    /// Assembly text, one line per instruction
    pub fn text(&self) -> String {
        emit_program(&self.instructions)
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }

    /// Machine instructions only, ignoring labels and comments
    pub fn instruction_count(&self) -> usize {
        instruction_count(&self.instructions)
    }
}

pub struct Translator {
    emitter: InstructionEmitter,
    modules: usize,
}

impl Translator {
    pub fn new(options: TranslatorOptions) -> Self {
        Self {
            emitter: InstructionEmitter::new(options),
            modules: 0,
        }
    }

    pub fn emitter(&self) -> &InstructionEmitter {
        &self.emitter
    }

    /// Emit the startup sequence. Call before any module is translated.
    pub fn emit_bootstrap(&mut self, entry: &EntryPoint) {
        info!("emitting bootstrap for {}", entry.function);
        self.emitter.emit_bootstrap(entry);
    }

    /// Translate every command of one module, in order
    pub fn translate_module<I>(&mut self, module: &str, commands: I)
    where
        I: IntoIterator<Item = Result<Command, VmError>>,
    {
        info!("translating module '{}'", module);
        self.emitter.set_module(module);
        self.modules += 1;

        let fuse = self.emitter.options().fuse_push_pop;
        let mut commands_seen = 0usize;
        let mut fused = 0usize;

        for step in LookaheadBuffer::new(commands.into_iter(), fuse) {
            match step {
                Step::Single(command) => {
                    commands_seen += 1;
                    self.emitter.translate(&command);
                }
                Step::Fused(push, pop) => {
                    commands_seen += 2;
                    fused += 1;
                    self.emitter.translate_push_pop(&push, &pop);
                }
                Step::Error(error) => self.emitter.record_error(error, None),
            }
        }

        debug!(
            "module '{}': {} commands, {} fused pairs",
            module, commands_seen, fused
        );
    }

    /// Close the artifact
    pub fn finish(self) -> TranslationOutput {
        let (instructions, diagnostics) = self.emitter.finish();
        info!(
            "translated {} modules into {} instructions ({})",
            self.modules,
            instruction_count(&instructions),
            diagnostics.summary()
        );
        TranslationOutput {
            instructions,
            diagnostics,
        }
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::new(TranslatorOptions::default())
    }
}
