// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Alarm Timers
//!
//! Alarm timers are similar to high-resolution timers, but keep working
//! across system suspend: before the system goes to sleep, the earliest
//! pending alarm is handed to the real-time clock as a wake alarm so the
//! deadline is not missed.
//!
//! # Design
//!
//! - **Per-clock bases**: one [`AlarmBase`] per [`AlarmType`] (REALTIME,
//!   BOOTTIME), each with an ordered queue of alarms
//! - **One hardware timer per base**: the base keeps its [`HrTimer`] armed
//!   for the earliest queued deadline
//! - **Callbacks outside the lock**: expired alarms are dequeued under the
//!   base lock, run unlocked, and re-queued if they ask to restart
//! - **Suspend coordination**: [`AlarmTimers::suspend`] refuses suspend when
//!   an alarm is about to fire and otherwise programs the RTC wake alarm
//!
//! # Usage
//!
//! ```rust,ignore
//! let timers = alarmtimer::init(AlarmTimers::new(realtime, boottime, wakeup, config));
//!
//! let alarm = timers.alarm(AlarmType::Boottime, |alarm: &AlarmEntry, now: Ktime| {
//!     alarm.forward(now, Ktime::from_secs(60));
//!     AlarmRestart::Restart
//! });
//! alarm.start_relative(Ktime::from_secs(60))?;
//! ```

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod debug;
pub mod err;

pub mod alarm;
pub mod base;
pub mod clock;
pub mod config;
pub mod driver;
pub mod hrtimer;
pub mod ktime;
pub mod rtc;
pub mod suspend;
pub mod timerqueue;
pub mod wakeup;

#[cfg(test)]
mod tests;

pub use alarm::{Alarm, AlarmEntry, AlarmFunction, AlarmRestart, AlarmState};
pub use base::AlarmBase;
pub use clock::{AlarmType, ClockId, ClockSource, ALARM_NUMTYPE};
pub use config::AlarmConfig;
pub use driver::{get, init, AlarmTimers, BaseResources};
pub use err::{Error, Result};
pub use hrtimer::{HrTimer, HrTimerCancel, HrTimerHandler, HrTimerRestart};
pub use ktime::Ktime;
pub use rtc::{RtcDevice, RtcError, RtcIrqFlags, RtcTime, RtcWkAlrm};
pub use suspend::SuspendSnapshot;
pub use wakeup::WakeupSource;
