// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Alarm Logging and Diagnostics
//!
//! Thin level macros over the `log` facade plus a runtime debug mask that
//! selects which classes of alarm events are reported.
//!
//! # Usage
//!
//! ```rust,ignore
//! // Simple logging
//! log_warn!("no rtc device bound for wake alarms");
//!
//! // Masked logging, only printed when SUSPEND is in the debug mask
//! pr_alarm!(SUSPEND, "next alarm in {} ms", min.to_ms());
//! ```
//!
//! Without the `log` feature every macro compiles to nothing but still
//! type-checks its arguments.

use core::sync::atomic::{AtomicU32, Ordering};

bitflags::bitflags! {
    /// Classes of alarm events that can be logged
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AlarmDebug: u32 {
        /// Failures (hardware refusals, RTC errors)
        const ERROR = 1 << 0;
        /// Device binding and driver setup
        const INIT_STATUS = 1 << 1;
        /// Alarm start, restart and cancel
        const TSET = 1 << 2;
        /// Alarm callbacks
        const CALL = 1 << 3;
        /// Suspend and resume decisions
        const SUSPEND = 1 << 4;
        /// RTC interrupts
        const INT = 1 << 5;
        /// Queue and hardware reprogramming flow
        const FLOW = 1 << 6;
    }
}

impl AlarmDebug {
    /// Mask enabled at boot
    pub const DEFAULT: Self = Self::ERROR.union(Self::INIT_STATUS);

    /// Level that events of this class are logged at
    pub fn level(self) -> LogLevel {
        if self.contains(Self::ERROR) {
            LogLevel::Error
        } else {
            LogLevel::Info
        }
    }
}

impl Default for AlarmDebug {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Active debug mask
static DEBUG_MASK: AtomicU32 = AtomicU32::new(AlarmDebug::DEFAULT.bits());

/// Replace the active debug mask
pub fn set_debug_mask(mask: AlarmDebug) {
    DEBUG_MASK.store(mask.bits(), Ordering::Relaxed);
}

/// Get the active debug mask
pub fn debug_mask() -> AlarmDebug {
    AlarmDebug::from_bits_truncate(DEBUG_MASK.load(Ordering::Relaxed))
}

/// Log levels
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Trace-level logging (very verbose)
    Trace = 0,

    /// Debug-level logging (verbose)
    Debug = 1,

    /// Informational logging
    Info = 2,

    /// Warning-level logging
    Warning = 3,

    /// Error-level logging
    Error = 4,
}

#[cfg(feature = "log")]
impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => log::Level::Trace,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Info => log::Level::Info,
            LogLevel::Warning => log::Level::Warn,
            LogLevel::Error => log::Level::Error,
        }
    }
}

/// Print a formatted message at a specific log level
///
/// # Arguments
///
/// * `level` - Log level for this message
/// * `args` - Format arguments
#[inline]
pub fn log_print(level: LogLevel, args: core::fmt::Arguments<'_>) {
    #[cfg(feature = "log")]
    log::log!(target: "alarmtimer", log::Level::from(level), "{}", args);

    #[cfg(not(feature = "log"))]
    let _ = (level, args);
}

/// Log a trace message
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {
        $crate::debug::log_print($crate::debug::LogLevel::Trace, format_args!($($arg)*))
    };
}

/// Log a debug message
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::debug::log_print($crate::debug::LogLevel::Debug, format_args!($($arg)*))
    };
}

/// Log an info message
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::debug::log_print($crate::debug::LogLevel::Info, format_args!($($arg)*))
    };
}

/// Log a warning message
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::debug::log_print($crate::debug::LogLevel::Warning, format_args!($($arg)*))
    };
}

/// Log an error message
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::debug::log_print($crate::debug::LogLevel::Error, format_args!($($arg)*))
    };
}

/// Log an alarm event if its class is enabled in the debug mask
///
/// ```rust,ignore
/// pr_alarm!(TSET, "alarm {} start {}", id, expires);
/// ```
#[macro_export]
macro_rules! pr_alarm {
    ($class:ident, $($arg:tt)*) => {
        if $crate::debug::debug_mask().contains($crate::debug::AlarmDebug::$class) {
            $crate::debug::log_print(
                $crate::debug::AlarmDebug::$class.level(),
                format_args!($($arg)*),
            );
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mask() {
        let mask = AlarmDebug::default();
        assert!(mask.contains(AlarmDebug::ERROR));
        assert!(mask.contains(AlarmDebug::INIT_STATUS));
        assert!(!mask.contains(AlarmDebug::FLOW));
        assert_eq!(mask.bits(), 0x3);
    }

    #[test]
    fn test_class_levels() {
        assert_eq!(AlarmDebug::ERROR.level(), LogLevel::Error);
        assert_eq!(AlarmDebug::SUSPEND.level(), LogLevel::Info);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_macros_expand() {
        let id = 7;
        pr_alarm!(FLOW, "alarm {} queued", id);
        log_debug!("alarm {} done", id);
    }
}
