//! Label naming
//!
//! Every generated label comes from here. The counters are run-scoped:
//! one `NameGenerator` lives as long as the output artifact, so labels
//! stay unique across all modules translated into it.

/// Label of the halt loop appended when no bootstrap was emitted
pub const END_LABEL: &str = "_END";

const COMPARE_TRUE_PREFIX: &str = "_COMPARE_TRUE";
const COMPARE_FINISHED_PREFIX: &str = "_COMPARE_FINISHED";

/// Labels for one comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareLabels {
    pub on_true: String,
    pub finished: String,
}

#[derive(Debug, Default)]
pub struct NameGenerator {
    next_compare_id: u32,
    next_call_id: u32,
}

impl NameGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh labels for a comparison; consumes one compare id
    pub fn compare_labels(&mut self) -> CompareLabels {
        let id = self.next_compare_id;
        self.next_compare_id += 1;
        CompareLabels {
            on_true: format!("{}{}", COMPARE_TRUE_PREFIX, id),
            finished: format!("{}{}", COMPARE_FINISHED_PREFIX, id),
        }
    }

    /// Fresh resumption label for a call site; consumes one call id
    pub fn return_label(&mut self, module: &str, callee: &str) -> String {
        let id = self.next_call_id;
        self.next_call_id += 1;
        format!("{}.{}$ret.{}", module, callee, id)
    }

    pub fn compare_count(&self) -> u32 {
        self.next_compare_id
    }

    pub fn call_count(&self) -> u32 {
        self.next_call_id
    }
}
