// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Alarm Bases
//!
//! One base exists per alarm type. It owns the queue of pending alarms for
//! its clock and the single hardware timer that wakes it.
//!
//! # Design
//!
//! - **One lock per base**: the queue, the armed deadline and alarm state
//!   bits only change with the base lock held
//! - **Armed for the head**: outside an expiry pass, the hardware timer is
//!   armed for the earliest queued deadline, or stopped if nothing is queued
//! - **Unlocked callbacks**: the expiry handler drops the lock around every
//!   callback, so callbacks can start and cancel other alarms
//! - **Reconcile on exit**: while the handler drains the queue, other
//!   contexts leave the hardware alone; the handler re-arms for the head
//!   when it returns

use alloc::boxed::Box;
use alloc::sync::Arc;

use spin::Mutex;

use crate::alarm::{AlarmEntry, AlarmNode, AlarmRestart, AlarmState};
use crate::clock::{AlarmType, ClockSource};
use crate::err::{Error, Result};
use crate::hrtimer::{HrTimer, HrTimerCancel, HrTimerHandler, HrTimerRestart};
use crate::ktime::Ktime;
use crate::pr_alarm;
use crate::timerqueue::TimerQueue;
use crate::wakeup::WakeupSource;

/// State protected by the base lock
struct BaseInner {
    queue: TimerQueue<Arc<AlarmNode>>,

    /// Deadline the hardware timer is armed for
    armed: Option<Ktime>,

    /// The expiry handler is draining the queue
    expiring: bool,
}

/// Per-clock alarm base
pub struct AlarmBase {
    kind: AlarmType,
    clock: Box<dyn ClockSource>,
    timer: Box<dyn HrTimer>,
    wakeup: Arc<dyn WakeupSource>,
    wakeup_hold_ms: u32,
    inner: Mutex<BaseInner>,
}

/// Add `node` to the queue at its current deadline
///
/// A queued alarm is removed first, so this also moves an alarm whose
/// deadline changed. Does not touch the hardware timer.
fn enqueue(inner: &mut BaseInner, node: &Arc<AlarmNode>) {
    let entry = &node.entry;
    if entry.is_queued() {
        inner.queue.del(entry.id());
    }

    inner.queue.add(entry.id(), entry.expires(), node.clone());
    entry.set_state(entry.state().union(AlarmState::ENQUEUED));
}

/// Remove `entry` from the queue
///
/// Returns whether it was queued. Does not touch the hardware timer.
fn dequeue(inner: &mut BaseInner, entry: &AlarmEntry) -> bool {
    if !entry.is_queued() {
        return false;
    }

    inner.queue.del(entry.id());
    entry.set_state(entry.state().difference(AlarmState::ENQUEUED));
    true
}

impl AlarmBase {
    /// Create a base
    ///
    /// # Arguments
    ///
    /// * `kind` - Alarm type served by this base
    /// * `clock` - Clock the deadlines are measured on
    /// * `timer` - Hardware timer dedicated to this base
    /// * `wakeup` - Wakeup source reported after every expiry
    /// * `wakeup_hold_ms` - How long each expiry keeps the system awake
    pub fn new(
        kind: AlarmType,
        clock: Box<dyn ClockSource>,
        timer: Box<dyn HrTimer>,
        wakeup: Arc<dyn WakeupSource>,
        wakeup_hold_ms: u32,
    ) -> Self {
        Self {
            kind,
            clock,
            timer,
            wakeup,
            wakeup_hold_ms,
            inner: Mutex::new(BaseInner {
                queue: TimerQueue::new(),
                armed: None,
                expiring: false,
            }),
        }
    }

    pub fn kind(&self) -> AlarmType {
        self.kind
    }

    /// Current time on this base's clock
    pub fn now(&self) -> Ktime {
        self.clock.now()
    }

    /// Deadline of the earliest queued alarm
    pub fn next_expiry(&self) -> Option<Ktime> {
        self.inner.lock().queue.getnext().map(|(key, _)| key.expires)
    }

    /// Time until the earliest queued alarm, if any
    ///
    /// The clock is read after the lock is dropped.
    pub fn next_remaining(&self) -> Option<Ktime> {
        let next = self.next_expiry()?;
        Some(next - self.now())
    }

    /// Deadline the hardware timer is currently armed for
    pub fn armed(&self) -> Option<Ktime> {
        self.inner.lock().armed
    }

    /// Number of queued alarms
    pub fn queued(&self) -> usize {
        self.inner.lock().queue.len()
    }

    /// Whether `entry` is in this base's queue
    pub fn contains(&self, entry: &AlarmEntry) -> bool {
        self.inner.lock().queue.contains(entry.id())
    }

    /// Bring the hardware timer in line with the queue head
    ///
    /// Only reprograms when the head changed. On failure the previously
    /// armed deadline is kept.
    fn reprogram(&self, inner: &mut BaseInner) -> Result {
        if inner.expiring {
            return Ok(());
        }

        let next = inner.queue.getnext().map(|(key, _)| key.expires);
        if next == inner.armed {
            return Ok(());
        }

        match next {
            Some(expires) => {
                self.timer.start(expires)?;
                // A handler returning Restart right now re-arms from here.
                self.timer.set_expires(expires);
                pr_alarm!(FLOW, "{}: hrtimer armed for {}", self.kind.name(), expires);
            }
            None => match self.timer.try_to_cancel() {
                HrTimerCancel::Running => {
                    // The handler's restart deadline stays armed; that
                    // expiry finds nothing due and stops the timer.
                    pr_alarm!(FLOW, "{}: hrtimer stop deferred to expiry", self.kind.name());
                    return Ok(());
                }
                ret => {
                    pr_alarm!(FLOW, "{}: hrtimer stopped ({:?})", self.kind.name(), ret);
                }
            },
        }
        inner.armed = next;
        Ok(())
    }

    pub(crate) fn start(&self, node: &Arc<AlarmNode>, expires: Ktime) -> Result {
        let entry = &node.entry;
        let mut inner = self.inner.lock();

        entry.set_expires(expires);
        enqueue(&mut inner, node);
        if let Err(err) = self.reprogram(&mut inner) {
            dequeue(&mut inner, entry);
            // Best effort; the expiry handler re-arms from the queue.
            let _ = self.reprogram(&mut inner);
            drop(inner);
            pr_alarm!(ERROR, "alarm {}: start at {} failed: {}", entry.id(), expires, err);
            return Err(err);
        }
        drop(inner);

        pr_alarm!(TSET, "alarm {}: {} start at {}", entry.id(), self.kind.name(), expires);
        Ok(())
    }

    /// Re-queue `node` at its stored deadline and re-arm unconditionally if
    /// it is the head
    pub(crate) fn restart(&self, node: &Arc<AlarmNode>) -> Result {
        let entry = &node.entry;
        let expires = entry.expires();
        let mut inner = self.inner.lock();

        enqueue(&mut inner, node);
        let is_head = inner
            .queue
            .getnext()
            .map_or(false, |(key, _)| key.expires == expires);

        let ret = if is_head && !inner.expiring {
            self.timer.set_expires(expires);
            self.timer.restart().map(|()| inner.armed = Some(expires))
        } else {
            self.reprogram(&mut inner)
        };

        if let Err(err) = ret {
            dequeue(&mut inner, entry);
            let _ = self.reprogram(&mut inner);
            drop(inner);
            pr_alarm!(ERROR, "alarm {}: restart at {} failed: {}", entry.id(), expires, err);
            return Err(err);
        }
        drop(inner);

        pr_alarm!(TSET, "alarm {}: {} restart at {}", entry.id(), self.kind.name(), expires);
        Ok(())
    }

    pub(crate) fn try_cancel(&self, entry: &AlarmEntry) -> Result<bool> {
        let mut inner = self.inner.lock();

        if entry.is_running() {
            return Err(Error::Busy);
        }
        if !dequeue(&mut inner, entry) {
            return Ok(false);
        }
        if let Err(err) = self.reprogram(&mut inner) {
            // The old deadline stays armed; the expiry pass finds nothing
            // due and re-arms for the head.
            pr_alarm!(ERROR, "{}: re-arm after cancel failed: {}", self.kind.name(), err);
        }
        drop(inner);

        pr_alarm!(TSET, "alarm {}: cancelled", entry.id());
        Ok(true)
    }

    /// Dequeue the next alarm due at `now` and mark it running
    fn pop_expired(&self, now: Ktime, horizon: u64) -> Option<Arc<AlarmNode>> {
        let mut inner = self.inner.lock();
        let node = inner.queue.pop_expired(now, horizon)?;

        let entry = &node.entry;
        entry.set_state(
            entry
                .state()
                .difference(AlarmState::ENQUEUED)
                .union(AlarmState::CALLBACK),
        );
        Some(node)
    }

    /// Run every alarm due at the time of this expiry
    ///
    /// Returns whether the hardware timer must be re-armed, after setting
    /// its new deadline.
    fn expire(&self) -> HrTimerRestart {
        let now = self.now();
        let horizon = {
            let mut inner = self.inner.lock();
            inner.armed = None;
            inner.expiring = true;
            inner.queue.horizon()
        };

        while let Some(node) = self.pop_expired(now, horizon) {
            let entry = &node.entry;
            let restart = node.function.run(entry, self.now());
            pr_alarm!(CALL, "alarm {}: callback returned {:?}", entry.id(), restart);

            let mut inner = self.inner.lock();
            if restart == AlarmRestart::Restart {
                enqueue(&mut inner, &node);
            }
            entry.set_state(entry.state().difference(AlarmState::CALLBACK));
        }

        let ret = {
            let mut inner = self.inner.lock();
            inner.expiring = false;
            match inner.queue.getnext().map(|(key, _)| key.expires) {
                Some(next) => {
                    self.timer.set_expires(next);
                    inner.armed = Some(next);
                    HrTimerRestart::Restart
                }
                None => HrTimerRestart::NoRestart,
            }
        };

        self.wakeup.pm_wakeup_event(self.wakeup_hold_ms);
        ret
    }
}

impl HrTimerHandler for AlarmBase {
    fn run(&self) -> HrTimerRestart {
        self.expire()
    }
}
