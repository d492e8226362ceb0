// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! RTC wake-alarm device
//!
//! The real-time clock keeps running while the system is suspended and can
//! hold one alarm that resumes the system. The alarm timers bind at most
//! one RTC device; it is only used around suspend.
//!
//! Device time is an opaque seconds count on the device's own scale. No
//! calendar conversion happens here.

use alloc::sync::Arc;
use core::fmt;
use core::ops::Add;

use spin::Mutex;

use crate::err::{
    Error, Result, Status, ALARM_ERR_INVALID_ARGS, ALARM_ERR_IO, ALARM_ERR_NOT_SUPPORTED,
};
use crate::{log_warn, pr_alarm};

/// Time on the RTC device, in whole seconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RtcTime(pub u64);

impl RtcTime {
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    pub const fn as_secs(self) -> u64 {
        self.0
    }
}

impl Add<u64> for RtcTime {
    type Output = RtcTime;

    fn add(self, secs: u64) -> RtcTime {
        RtcTime(self.0.saturating_add(secs))
    }
}

/// Wake alarm as programmed into the device
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RtcWkAlrm {
    pub enabled: bool,
    pub time: RtcTime,
}

impl RtcWkAlrm {
    /// An enabled alarm at `time`
    pub const fn at(time: RtcTime) -> Self {
        Self { enabled: true, time }
    }

    /// A cleared, disabled alarm
    pub const fn disabled() -> Self {
        Self { enabled: false, time: RtcTime(0) }
    }
}

/// RTC operation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtcError {
    /// RTC hardware error
    Io,
    /// The device rejected the alarm time (for example, in the past)
    InvalidTime,
    /// The device has no alarm support
    NotSupported,
}

impl RtcError {
    pub fn to_status(self) -> Status {
        match self {
            RtcError::Io => ALARM_ERR_IO,
            RtcError::InvalidTime => ALARM_ERR_INVALID_ARGS,
            RtcError::NotSupported => ALARM_ERR_NOT_SUPPORTED,
        }
    }
}

impl fmt::Display for RtcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RtcError::Io => f.write_str("i/o error"),
            RtcError::InvalidTime => f.write_str("invalid alarm time"),
            RtcError::NotSupported => f.write_str("alarm not supported"),
        }
    }
}

bitflags::bitflags! {
    /// RTC interrupt status bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RtcIrqFlags: u32 {
        /// Any interrupt is pending
        const IRQF = 0x80;
        /// Periodic interrupt
        const PF = 0x40;
        /// Alarm interrupt
        const AF = 0x20;
        /// Update interrupt
        const UF = 0x10;
    }
}

/// A real-time clock that can hold one wake alarm
pub trait RtcDevice: Send + Sync {
    /// Device name, for diagnostics
    fn name(&self) -> &str;

    /// Read the current device time
    fn read_time(&self) -> core::result::Result<RtcTime, RtcError>;

    /// Program (or, with `enabled == false`, clear) the wake alarm
    fn set_alarm(&self, alarm: &RtcWkAlrm) -> core::result::Result<(), RtcError>;
}

/// Binding between the alarm timers and at most one RTC device
pub struct RtcBinding {
    dev: Mutex<Option<Arc<dyn RtcDevice>>>,
}

impl RtcBinding {
    pub const fn new() -> Self {
        Self { dev: Mutex::new(None) }
    }

    /// Bind `dev` as the wake-alarm device
    ///
    /// Returns [`Error::Busy`] if another device is already bound.
    pub fn add_device(&self, dev: Arc<dyn RtcDevice>) -> Result {
        let mut bound = self.dev.lock();
        if bound.is_some() {
            log_warn!("rtc {} ignored, alarm device already bound", dev.name());
            return Err(Error::Busy);
        }
        pr_alarm!(INIT_STATUS, "using rtc device, {}, for alarms", dev.name());
        *bound = Some(dev);
        Ok(())
    }

    /// Unbind `dev` if it is the bound device
    ///
    /// Returns whether the device was unbound.
    pub fn remove_device(&self, dev: &Arc<dyn RtcDevice>) -> bool {
        let mut bound = self.dev.lock();
        match bound.as_ref() {
            Some(current) if same_device(current, dev) => {
                pr_alarm!(INIT_STATUS, "lost rtc device {} for alarms", dev.name());
                *bound = None;
                true
            }
            _ => false,
        }
    }

    /// The bound device, if any
    pub fn device(&self) -> Option<Arc<dyn RtcDevice>> {
        self.dev.lock().clone()
    }

    pub fn is_bound(&self) -> bool {
        self.dev.lock().is_some()
    }
}

impl Default for RtcBinding {
    fn default() -> Self {
        Self::new()
    }
}

// Compare data pointers only; vtable pointers for one type may differ
// between codegen units.
fn same_device(a: &Arc<dyn RtcDevice>, b: &Arc<dyn RtcDevice>) -> bool {
    core::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NamedRtc(&'static str);

    impl RtcDevice for NamedRtc {
        fn name(&self) -> &str {
            self.0
        }

        fn read_time(&self) -> core::result::Result<RtcTime, RtcError> {
            Ok(RtcTime(0))
        }

        fn set_alarm(&self, _alarm: &RtcWkAlrm) -> core::result::Result<(), RtcError> {
            Ok(())
        }
    }

    #[test]
    fn test_add_device_once() {
        let binding = RtcBinding::new();
        let rtc0: Arc<dyn RtcDevice> = Arc::new(NamedRtc("rtc0"));
        let rtc1: Arc<dyn RtcDevice> = Arc::new(NamedRtc("rtc1"));

        assert_eq!(binding.add_device(rtc0.clone()), Ok(()));
        assert_eq!(binding.add_device(rtc1), Err(Error::Busy));
        assert_eq!(binding.device().map(|d| d.name().len()), Some(4));
        assert_eq!(binding.device().unwrap().name(), "rtc0");
    }

    #[test]
    fn test_remove_only_bound_device() {
        let binding = RtcBinding::new();
        let rtc0: Arc<dyn RtcDevice> = Arc::new(NamedRtc("rtc0"));
        let rtc1: Arc<dyn RtcDevice> = Arc::new(NamedRtc("rtc1"));

        binding.add_device(rtc0.clone()).unwrap();
        assert!(!binding.remove_device(&rtc1));
        assert!(binding.is_bound());
        assert!(binding.remove_device(&rtc0));
        assert!(!binding.is_bound());

        // A new device can be bound once the old one is gone.
        assert_eq!(binding.add_device(rtc1), Ok(()));
    }

    #[test]
    fn test_wake_alarm_time() {
        let alarm = RtcWkAlrm::at(RtcTime::from_secs(1000) + 10);
        assert!(alarm.enabled);
        assert_eq!(alarm.time.as_secs(), 1010);
        assert!(!RtcWkAlrm::disabled().enabled);
        assert_eq!(RtcTime(u64::MAX) + 1, RtcTime(u64::MAX));
    }
}
