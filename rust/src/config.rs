//! Configuration for graph construction.

use crate::logging::VERBOSITY_SILENT;

/// Options controlling how a `ScheduleGraph` is built.
///
/// Both validations are off by default: input is trusted and inconsistent
/// input surfaces later (as a `CycleError` or a zero-duration task) instead
/// of at construction. Use [`GraphConfig::strict`] to reject it up front.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphConfig {
    /// Reject dependency keys, prerequisites or duration keys that are not
    /// declared tasks, and duplicate task declarations.
    pub validate_dependencies: bool,
    /// Reject declared tasks without a duration, or with a negative or
    /// non-finite one.
    pub validate_durations: bool,
    /// Verbosity level: 0=silent, 1=summary, 2=steps, 3=debug.
    pub verbosity: u8,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            validate_dependencies: false,
            validate_durations: false,
            verbosity: VERBOSITY_SILENT,
        }
    }
}

impl GraphConfig {
    /// Configuration with every validation enabled.
    pub fn strict() -> Self {
        Self {
            validate_dependencies: true,
            validate_durations: true,
            ..Self::default()
        }
    }

    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }
}
