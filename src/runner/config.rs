//! Engine configuration.

use crate::parser::input::SCRIPT_INC;

/// Default ceiling on nested parser frames.
pub const MAX_RECURSE: usize = 100;

/// Configuration applied to every session an [`Engines`](crate::runner::api::Engines)
/// instance opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum number of live parser frames before evaluation fails.
    pub max_depth: usize,
    /// Initial capacity of the script queue.
    pub script_capacity: usize,
}

impl EngineConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_script_capacity(mut self, script_capacity: usize) -> Self {
        self.script_capacity = script_capacity;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_depth: MAX_RECURSE,
            script_capacity: SCRIPT_INC,
        }
    }
}
