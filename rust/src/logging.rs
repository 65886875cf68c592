//! Verbosity-gated logging macros for graph construction and traversal.
//!
//! Nothing is formatted when the level is not reached, so a silent graph
//! pays only for an integer comparison. Levels:
//! - 0: SILENT (nothing, errors are returned rather than logged)
//! - 1: SUMMARY (graph built, makespan found)
//! - 2: STEPS (each task taken off the ready queue)
//! - 3: DEBUG (each edge relaxation)

pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_SUMMARY: u8 = 1;
pub const VERBOSITY_STEPS: u8 = 2;
pub const VERBOSITY_DEBUG: u8 = 3;

/// Log at SUMMARY level (verbosity >= 1).
#[macro_export]
macro_rules! log_summary {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_SUMMARY {
            eprintln!("[makespan] {}", format_args!($($arg)*));
        }
    };
}

/// Log at STEPS level (verbosity >= 2).
#[macro_export]
macro_rules! log_steps {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_STEPS {
            eprintln!("[makespan]   {}", format_args!($($arg)*));
        }
    };
}

/// Log at DEBUG level (verbosity >= 3).
#[macro_export]
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_DEBUG {
            eprintln!("[makespan]     {}", format_args!($($arg)*));
        }
    };
}
