//! Hack VM Translator - Backend
//!
//! This crate lowers VM commands to Hack assembly. It owns:
//!
//! - The segment table and static allocation (`segment`)
//! - Run-scoped label counters (`naming`, `state`)
//! - Per-command lowering and the calling convention (`emitter`)
//! - Push/pop fusion over a one-command lookahead (`lookahead`)
//! - The whole-run `Translator` facade (`translator`)

pub mod emitter;
pub mod lookahead;
pub mod naming;
pub mod segment;
pub mod state;
pub mod translator;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};

pub use emitter::{ArithmeticOp, InstructionEmitter};
pub use lookahead::{LookaheadBuffer, Step};
pub use naming::NameGenerator;
pub use segment::{lookup, Operand, Resolved, SegmentDescriptor, SegmentResolver, SEGMENTS};
pub use state::{TranslatorState, BOOT_MODULE};
pub use translator::{TranslationOutput, Translator};

/// Options for translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorOptions {
    /// Precede each command's code with `// <source text>`
    pub emit_comments: bool,
    /// Lower `push x` directly followed by `pop y` as a single move
    pub fuse_push_pop: bool,
}

impl Default for TranslatorOptions {
    fn default() -> Self {
        Self {
            emit_comments: false,
            fuse_push_pop: true,
        }
    }
}

/// The function the bootstrap calls, and the module whose presence
/// makes a run need one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryPoint {
    pub module: String,
    pub function: String,
}

impl Default for EntryPoint {
    fn default() -> Self {
        Self {
            module: "Sys".to_string(),
            function: "Sys.init".to_string(),
        }
    }
}

/// Translate a sequence of modules in one run
///
/// Convenience wrapper for callers that already hold parsed commands.
pub fn translate_modules<M, I>(
    modules: M,
    options: TranslatorOptions,
    bootstrap: Option<&EntryPoint>,
) -> TranslationOutput
where
    M: IntoIterator<Item = (String, I)>,
    I: IntoIterator<Item = Result<vmt_common::Command, vmt_common::VmError>>,
{
    let mut translator = Translator::new(options);
    if let Some(entry) = bootstrap {
        translator.emit_bootstrap(entry);
    }
    for (name, commands) in modules {
        translator.translate_module(&name, commands);
    }
    translator.finish()
}
