//! Run-scoped translator state
//!
//! Owned by exactly one emitter for the lifetime of one output artifact.
//! Nothing in here is global: two translators never share counters or
//! static offsets.

use crate::naming::NameGenerator;
use crate::segment::SegmentResolver;
use log::debug;

/// Pseudo-module the bootstrap call is attributed to
pub const BOOT_MODULE: &str = "Boot";

#[derive(Debug, Default)]
pub struct TranslatorState {
    current_module: Option<String>,
    pub naming: NameGenerator,
    pub resolver: SegmentResolver,
    bootstrap_emitted: bool,
}

impl TranslatorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `module` current. Switching to a different module retires
    /// the previous module's static cells.
    pub fn set_module(&mut self, module: &str) {
        if self.current_module.as_deref() == Some(module) {
            return;
        }
        self.resolver.switch_module();
        debug!(
            "switched to module '{}' (static offset {})",
            module,
            self.resolver.statics().offset()
        );
        self.current_module = Some(module.to_string());
    }

    pub fn current_module(&self) -> &str {
        self.current_module.as_deref().unwrap_or("")
    }

    pub fn bootstrap_emitted(&self) -> bool {
        self.bootstrap_emitted
    }

    pub fn mark_bootstrap_emitted(&mut self) {
        self.bootstrap_emitted = true;
    }
}
