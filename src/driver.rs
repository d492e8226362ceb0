// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Alarm Timer Driver
//!
//! Owns the alarm bases, the wake-alarm RTC binding and the configuration.
//! A kernel installs one instance with [`init`] during boot and reaches it
//! through [`get`] afterwards; the instance lives until shutdown.
//!
//! # Platform Hooks
//!
//! - each base's hardware timer expiry calls [`AlarmTimers::base`]'s
//!   [`HrTimerHandler::run`](crate::hrtimer::HrTimerHandler::run)
//! - the power-management core calls [`AlarmTimers::suspend`] and
//!   [`AlarmTimers::resume`]
//! - the RTC class calls [`AlarmTimers::add_rtc_device`],
//!   [`AlarmTimers::remove_rtc_device`] and [`AlarmTimers::rtc_interrupt`]

use alloc::boxed::Box;
use alloc::sync::Arc;

use spin::Once;

use crate::alarm::{Alarm, AlarmFunction};
use crate::base::AlarmBase;
use crate::clock::{AlarmType, ClockSource, ALARM_NUMTYPE};
use crate::config::AlarmConfig;
use crate::debug::set_debug_mask;
use crate::err::Result;
use crate::hrtimer::HrTimer;
use crate::rtc::{RtcBinding, RtcDevice, RtcIrqFlags};
use crate::wakeup::WakeupSource;
use crate::{log_warn, pr_alarm};

/// Clock and hardware timer backing one base
pub struct BaseResources {
    pub clock: Box<dyn ClockSource>,
    pub timer: Box<dyn HrTimer>,
}

/// Alarm timer driver state
pub struct AlarmTimers {
    pub(crate) bases: [Arc<AlarmBase>; ALARM_NUMTYPE],
    pub(crate) rtc: RtcBinding,
    pub(crate) wakeup: Arc<dyn WakeupSource>,
    pub(crate) config: AlarmConfig,
}

impl AlarmTimers {
    /// Build the driver state
    ///
    /// # Arguments
    ///
    /// * `realtime` - Wall clock and its hardware timer
    /// * `boottime` - Boot clock and its hardware timer
    /// * `wakeup` - Wakeup source for alarm and RTC events
    /// * `config` - Tunables
    pub fn new(
        realtime: BaseResources,
        boottime: BaseResources,
        wakeup: Arc<dyn WakeupSource>,
        config: AlarmConfig,
    ) -> Self {
        let base = |kind: AlarmType, res: BaseResources| {
            Arc::new(AlarmBase::new(
                kind,
                res.clock,
                res.timer,
                wakeup.clone(),
                config.wakeup_hold_ms,
            ))
        };

        Self {
            bases: [
                base(AlarmType::Realtime, realtime),
                base(AlarmType::Boottime, boottime),
            ],
            rtc: RtcBinding::new(),
            wakeup: wakeup.clone(),
            config,
        }
    }

    /// Base serving alarms of `kind`
    pub fn base(&self, kind: AlarmType) -> &Arc<AlarmBase> {
        &self.bases[kind.index()]
    }

    pub fn bases(&self) -> &[Arc<AlarmBase>; ALARM_NUMTYPE] {
        &self.bases
    }

    /// Create an inactive alarm of `kind`
    pub fn alarm<F: AlarmFunction>(&self, kind: AlarmType, function: F) -> Alarm<F> {
        Alarm::new(self.base(kind), function)
    }

    pub fn config(&self) -> &AlarmConfig {
        &self.config
    }

    /// Bind `dev` as the wake-alarm RTC
    ///
    /// Fails with [`Error::Busy`](crate::err::Error::Busy) if a device is
    /// already bound.
    pub fn add_rtc_device(&self, dev: Arc<dyn RtcDevice>) -> Result {
        self.rtc.add_device(dev)
    }

    /// Unbind `dev` if it is the wake-alarm RTC
    pub fn remove_rtc_device(&self, dev: &Arc<dyn RtcDevice>) -> bool {
        self.rtc.remove_device(dev)
    }

    /// The bound wake-alarm RTC, if any
    pub fn rtc(&self) -> Option<Arc<dyn RtcDevice>> {
        self.rtc.device()
    }

    /// RTC interrupt notification
    ///
    /// An alarm interrupt keeps the system awake long enough for the alarm
    /// bases to catch up after resume. Other interrupt sources are ignored.
    pub fn rtc_interrupt(&self, flags: RtcIrqFlags) {
        if !flags.contains(RtcIrqFlags::AF) {
            return;
        }
        self.wakeup.pm_wakeup_event(self.config.wakeup_hold_ms);
        pr_alarm!(INT, "rtc alarm interrupt, flags {:#x}", flags.bits());
    }
}

/// The driver instance
static ALARM_TIMERS: Once<AlarmTimers> = Once::new();

/// Install the driver instance
///
/// Applies the configured debug mask. Only the first call installs
/// `timers`; later calls are logged and return the existing instance.
pub fn init(timers: AlarmTimers) -> &'static AlarmTimers {
    let mut installed = false;
    let instance = ALARM_TIMERS.call_once(|| {
        installed = true;
        set_debug_mask(timers.config.debug_mask);
        timers
    });

    if installed {
        pr_alarm!(INIT_STATUS, "alarm timers initialised");
    } else {
        log_warn!("alarm timers already initialised");
    }
    instance
}

/// The installed driver instance, if [`init`] has run
pub fn get() -> Option<&'static AlarmTimers> {
    ALARM_TIMERS.get()
}
