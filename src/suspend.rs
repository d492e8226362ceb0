// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Suspend Coordination
//!
//! Alarm bases are driven by high-resolution timers that stop while the
//! system sleeps. Before suspend the coordinator finds the earliest pending
//! alarm across all bases and either:
//!
//! - allows suspend untouched when no alarm is pending
//! - refuses suspend with [`Error::Busy`] when the alarm is too close
//! - programs the RTC wake alarm to resume the system in time
//!
//! On resume the wake alarm is cleared; the bases' own timers take over
//! again.

use alloc::sync::Arc;

use crate::base::AlarmBase;
use crate::clock::ALARM_NUMTYPE;
use crate::driver::AlarmTimers;
use crate::err::{Error, Result};
use crate::ktime::Ktime;
use crate::rtc::RtcWkAlrm;
use crate::{log_warn, pr_alarm};

/// Remaining time to the earliest alarm on every base
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuspendSnapshot {
    /// Per base, indexed by alarm type
    pub remaining: [Option<Ktime>; ALARM_NUMTYPE],

    /// Minimum over all bases
    pub min: Option<Ktime>,
}

impl SuspendSnapshot {
    /// Scan `bases`, taking one base lock at a time
    pub fn scan(bases: &[Arc<AlarmBase>; ALARM_NUMTYPE]) -> Self {
        let mut remaining = [None; ALARM_NUMTYPE];
        let mut min: Option<Ktime> = None;

        for (slot, base) in remaining.iter_mut().zip(bases.iter()) {
            let Some(delta) = base.next_remaining() else {
                continue;
            };
            *slot = Some(delta);
            if min.map_or(true, |m| delta < m) {
                min = Some(delta);
            }
        }

        Self { remaining, min }
    }
}

impl AlarmTimers {
    /// Prepare the alarm timers for system suspend
    ///
    /// Returns [`Error::Busy`] if an alarm is due within the suspend
    /// threshold, or the RTC error if the wake alarm cannot be programmed.
    /// In both cases a wakeup event is reported so the suspend attempt is
    /// not immediately retried.
    pub fn suspend(&self) -> Result {
        let snapshot = SuspendSnapshot::scan(&self.bases);
        let Some(min) = snapshot.min else {
            pr_alarm!(SUSPEND, "suspend: no pending alarms");
            return Ok(());
        };

        if min < self.config.suspend_threshold {
            pr_alarm!(SUSPEND, "suspend: next alarm in {}, too soon", min);
            self.wakeup.pm_wakeup_event(self.config.suspend_busy_hold_ms);
            return Err(Error::Busy);
        }

        let Some(rtc) = self.rtc.device() else {
            log_warn!("suspend: no rtc device, alarm in {} will be late", min);
            return Ok(());
        };

        let wake = rtc
            .read_time()
            .map(|now| RtcWkAlrm::at(now + min.to_secs().max(0) as u64))
            .and_then(|alarm| rtc.set_alarm(&alarm).map(|()| alarm));

        match wake {
            Ok(alarm) => {
                pr_alarm!(
                    SUSPEND,
                    "suspend: {} wake alarm at {}s, next alarm in {}",
                    rtc.name(),
                    alarm.time.as_secs(),
                    min
                );
                Ok(())
            }
            Err(err) => {
                pr_alarm!(ERROR, "suspend: {} wake alarm failed: {}", rtc.name(), err);
                self.wakeup.pm_wakeup_event(self.config.wakeup_hold_ms);
                Err(Error::Rtc(err))
            }
        }
    }

    /// Clear the RTC wake alarm after resume
    ///
    /// Idempotent; a failure to clear is logged and otherwise ignored.
    pub fn resume(&self) -> Result {
        let Some(rtc) = self.rtc.device() else {
            return Ok(());
        };

        match rtc.set_alarm(&RtcWkAlrm::disabled()) {
            Ok(()) => pr_alarm!(SUSPEND, "resume: {} wake alarm cleared", rtc.name()),
            Err(err) => pr_alarm!(ERROR, "resume: {} clear failed: {}", rtc.name(), err),
        }
        Ok(())
    }
}
