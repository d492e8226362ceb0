// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Fake collaborators for host tests

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicI64, Ordering};

use spin::Mutex;

use crate::clock::ClockSource;
use crate::err::{Error, Result};
use crate::hrtimer::{HrTimer, HrTimerCancel, HrTimerHandler, HrTimerRestart};
use crate::ktime::Ktime;
use crate::rtc::{RtcDevice, RtcError, RtcTime, RtcWkAlrm};
use crate::wakeup::WakeupSource;

// ============================================================================
// Clock
// ============================================================================

/// Clock that only moves when told to
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(now: Ktime) -> Arc<Self> {
        Arc::new(Self {
            now: AtomicI64::new(now.to_ns()),
        })
    }

    pub fn now(&self) -> Ktime {
        Ktime::from_ns(self.now.load(Ordering::SeqCst))
    }

    pub fn set(&self, now: Ktime) {
        self.now.store(now.to_ns(), Ordering::SeqCst);
    }

    pub fn advance(&self, delta: Ktime) {
        self.now.fetch_add(delta.to_ns(), Ordering::SeqCst);
    }

    /// A clock source reading this clock
    pub fn source(self: &Arc<Self>) -> Box<dyn ClockSource> {
        let clock = self.clone();
        Box::new(move || clock.now())
    }
}

// ============================================================================
// Hardware Timer
// ============================================================================

#[derive(Default)]
struct TimerState {
    armed: Option<Ktime>,
    expires: Option<Ktime>,
    running: bool,
    starts: usize,
    restarts: usize,
    fail_next: bool,
}

/// Hardware timer that records how it was programmed
///
/// `start` arms without touching the restart deadline, which only
/// `set_expires` changes. While [`RecordingTimer::expire`] runs the handler,
/// `try_to_cancel` reports `Running` and leaves the timer alone, and a
/// `Restart` return always re-arms from the restart deadline.
pub struct RecordingTimer {
    state: Mutex<TimerState>,
}

impl RecordingTimer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(TimerState::default()),
        })
    }

    /// Deadline the timer is armed for
    pub fn armed(&self) -> Option<Ktime> {
        self.state.lock().armed
    }

    pub fn starts(&self) -> usize {
        self.state.lock().starts
    }

    pub fn restarts(&self) -> usize {
        self.state.lock().restarts
    }

    /// Make the next start or restart fail
    pub fn fail_next_start(&self) {
        self.state.lock().fail_next = true;
    }

    /// Expire the timer into `handler` the way the platform would
    pub fn expire(&self, handler: &dyn HrTimerHandler) -> HrTimerRestart {
        {
            let mut state = self.state.lock();
            state.armed = None;
            state.running = true;
        }

        let ret = handler.run();

        let mut state = self.state.lock();
        state.running = false;
        if ret == HrTimerRestart::Restart {
            state.armed = state.expires;
        }
        ret
    }
}

impl HrTimer for RecordingTimer {
    fn start(&self, expires: Ktime) -> Result {
        let mut state = self.state.lock();
        if core::mem::take(&mut state.fail_next) {
            return Err(Error::HardwareFault);
        }
        state.armed = Some(expires);
        state.starts += 1;
        Ok(())
    }

    fn try_to_cancel(&self) -> HrTimerCancel {
        let mut state = self.state.lock();
        if state.running {
            return HrTimerCancel::Running;
        }
        match state.armed.take() {
            Some(_) => HrTimerCancel::Cancelled,
            None => HrTimerCancel::NotActive,
        }
    }

    fn set_expires(&self, expires: Ktime) {
        self.state.lock().expires = Some(expires);
    }

    fn restart(&self) -> Result {
        let mut state = self.state.lock();
        if core::mem::take(&mut state.fail_next) || state.expires.is_none() {
            return Err(Error::HardwareFault);
        }
        state.armed = state.expires;
        state.restarts += 1;
        Ok(())
    }
}

// ============================================================================
// RTC
// ============================================================================

#[derive(Default)]
struct RtcState {
    now: RtcTime,
    alarm: Option<RtcWkAlrm>,
    set_calls: usize,
    fail_read: Option<RtcError>,
    fail_set: Option<RtcError>,
}

/// RTC with a settable time and a recorded wake alarm
pub struct FakeRtc {
    name: &'static str,
    state: Mutex<RtcState>,
}

impl FakeRtc {
    pub fn new(name: &'static str, now: u64) -> Arc<Self> {
        Arc::new(Self {
            name,
            state: Mutex::new(RtcState {
                now: RtcTime::from_secs(now),
                ..RtcState::default()
            }),
        })
    }

    /// Last programmed wake alarm
    pub fn alarm(&self) -> Option<RtcWkAlrm> {
        self.state.lock().alarm
    }

    pub fn set_calls(&self) -> usize {
        self.state.lock().set_calls
    }

    pub fn fail_read(&self, err: RtcError) {
        self.state.lock().fail_read = Some(err);
    }

    pub fn fail_set(&self, err: RtcError) {
        self.state.lock().fail_set = Some(err);
    }
}

impl RtcDevice for FakeRtc {
    fn name(&self) -> &str {
        self.name
    }

    fn read_time(&self) -> core::result::Result<RtcTime, RtcError> {
        let state = self.state.lock();
        match state.fail_read {
            Some(err) => Err(err),
            None => Ok(state.now),
        }
    }

    fn set_alarm(&self, alarm: &RtcWkAlrm) -> core::result::Result<(), RtcError> {
        let mut state = self.state.lock();
        state.set_calls += 1;
        if let Some(err) = state.fail_set {
            return Err(err);
        }
        state.alarm = Some(*alarm);
        Ok(())
    }
}

// ============================================================================
// Wakeup Source
// ============================================================================

type WakeupHook = Box<dyn FnOnce() + Send>;

/// Wakeup source that records every event
pub struct WakeupCounter {
    events: Mutex<Vec<u32>>,
    hook: Mutex<Option<WakeupHook>>,
}

impl WakeupCounter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
            hook: Mutex::new(None),
        })
    }

    /// Hold durations reported so far
    pub fn events(&self) -> Vec<u32> {
        self.events.lock().clone()
    }

    /// Run `hook` once, on the next reported event
    pub fn on_next_event(&self, hook: impl FnOnce() + Send + 'static) {
        *self.hook.lock() = Some(Box::new(hook));
    }
}

impl WakeupSource for WakeupCounter {
    fn pm_wakeup_event(&self, msec: u32) {
        self.events.lock().push(msec);

        let hook = self.hook.lock().take();
        if let Some(hook) = hook {
            hook();
        }
    }
}
