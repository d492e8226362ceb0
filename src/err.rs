// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Alarm timer error types
//!
//! Every fallible operation returns [`Result`]. Errors are local and
//! retryable: the worst outcome is a refused suspend or a missed wake
//! alarm. Callers that report into a C-style power-management core can
//! convert with [`Error::to_status`].

use core::fmt;

use crate::rtc::RtcError;

/// Negative errno-style status code
pub type Status = i32;

/// I/O error status code
pub const ALARM_ERR_IO: Status = -5;

/// Device or resource busy status code
pub const ALARM_ERR_BUSY: Status = -16;

/// Invalid arguments status code
pub const ALARM_ERR_INVALID_ARGS: Status = -22;

/// Operation not supported status code
pub const ALARM_ERR_NOT_SUPPORTED: Status = -95;

/// Result type for alarm timer operations
pub type Result<T = ()> = core::result::Result<T, Error>;

/// Alarm timer errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The alarm callback is running, the next alarm is too close to
    /// suspend, or a wake device is already bound. Retry later.
    Busy,

    /// The hardware timer refused the requested deadline
    HardwareFault,

    /// Malformed argument or configuration value
    InvalidArgs,

    /// The RTC wake-alarm device failed
    Rtc(RtcError),
}

impl Error {
    /// Convert error to status code
    pub fn to_status(self) -> Status {
        match self {
            Error::Busy => ALARM_ERR_BUSY,
            Error::HardwareFault => ALARM_ERR_IO,
            Error::InvalidArgs => ALARM_ERR_INVALID_ARGS,
            Error::Rtc(err) => err.to_status(),
        }
    }

    /// Whether retrying the same operation later can succeed
    pub fn is_retryable(self) -> bool {
        matches!(self, Error::Busy | Error::Rtc(_))
    }
}

impl From<RtcError> for Error {
    fn from(err: RtcError) -> Self {
        Error::Rtc(err)
    }
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        err.to_status()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Busy => f.write_str("device or resource busy"),
            Error::HardwareFault => f.write_str("hardware timer rejected deadline"),
            Error::InvalidArgs => f.write_str("invalid argument"),
            Error::Rtc(err) => write!(f, "rtc: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::Busy.to_status(), ALARM_ERR_BUSY);
        assert_eq!(Error::HardwareFault.to_status(), ALARM_ERR_IO);
        assert_eq!(Status::from(Error::InvalidArgs), ALARM_ERR_INVALID_ARGS);
        assert_eq!(Error::from(RtcError::Io).to_status(), ALARM_ERR_IO);
    }

    #[test]
    fn test_retryable() {
        assert!(Error::Busy.is_retryable());
        assert!(Error::Rtc(RtcError::InvalidTime).is_retryable());
        assert!(!Error::InvalidArgs.is_retryable());
    }
}
