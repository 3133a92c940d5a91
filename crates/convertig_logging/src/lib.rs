#![deny(missing_docs)]
//! Shared logging utilities for the convertig workspace.
//!
//! This crate provides the `cv_*` logging macros used across the codebase,
//! a verbosity helper for the binary and a minimal test initializer for the
//! global logger. Every macro logs under [`LOG_TARGET`] so the binary can
//! raise or lower our own output independently of dependency noise.

use log::LevelFilter;

#[doc(hidden)]
pub use log;

/// Log target shared by every `cv_*` macro.
pub const LOG_TARGET: &str = "convertig";

/// Logs a trace-level message under the convertig target.
#[macro_export]
macro_rules! cv_trace {
    ($($arg:tt)*) => {{
        $crate::log::trace!(target: $crate::LOG_TARGET, $($arg)*);
    }};
}

/// Logs a debug-level message under the convertig target.
#[macro_export]
macro_rules! cv_debug {
    ($($arg:tt)*) => {{
        $crate::log::debug!(target: $crate::LOG_TARGET, $($arg)*);
    }};
}

/// Logs an info-level message under the convertig target.
#[macro_export]
macro_rules! cv_info {
    ($($arg:tt)*) => {{
        $crate::log::info!(target: $crate::LOG_TARGET, $($arg)*);
    }};
}

/// Logs a warn-level message under the convertig target.
#[macro_export]
macro_rules! cv_warn {
    ($($arg:tt)*) => {{
        $crate::log::warn!(target: $crate::LOG_TARGET, $($arg)*);
    }};
}

/// Logs an error-level message under the convertig target.
#[macro_export]
macro_rules! cv_error {
    ($($arg:tt)*) => {{
        $crate::log::error!(target: $crate::LOG_TARGET, $($arg)*);
    }};
}

/// Maps a `-v` repeat count onto a level filter.
///
/// Zero keeps the configured default, one enables debug, two or more trace.
pub fn level_for_verbosity(default: LevelFilter, verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => default,
        1 => default.max(LevelFilter::Debug),
        _ => LevelFilter::Trace,
    }
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_only_ever_raises_the_level() {
        assert_eq!(level_for_verbosity(LevelFilter::Info, 0), LevelFilter::Info);
        assert_eq!(level_for_verbosity(LevelFilter::Info, 1), LevelFilter::Debug);
        assert_eq!(level_for_verbosity(LevelFilter::Trace, 1), LevelFilter::Trace);
        assert_eq!(level_for_verbosity(LevelFilter::Warn, 3), LevelFilter::Trace);
    }

    #[test]
    fn macros_expand_without_a_logger() {
        initialize_for_tests();
        cv_trace!("trace {}", 1);
        cv_debug!("debug {}", 2);
        cv_info!("info {}", 3);
        cv_warn!("warn {}", 4);
        cv_error!("error {}", 5);
    }
}
