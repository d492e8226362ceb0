// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Alarms
//!
//! An alarm is a single future callback on one alarm base. The owner holds
//! an [`Alarm`] handle; while the alarm is queued its base holds a shared
//! reference to the same node.
//!
//! # States
//!
//! ```text
//!                 start / restart
//!   INACTIVE ------------------------> ENQUEUED
//!      ^  ^                               |
//!      |  |     try_cancel / cancel       |  expire
//!      |  +-------------------------------+
//!      |                                  v
//!      |        NoRestart            CALLBACK ----+
//!      +----------------------------------+       | Restart
//!                                         ENQUEUED<+
//! ```
//!
//! `ENQUEUED` is set exactly while the alarm is in its base's queue.
//! `CALLBACK` is set while the callback runs; [`Alarm::try_cancel`] fails
//! with [`Error::Busy`](crate::err::Error::Busy) during that window and
//! [`Alarm::cancel`] spins until it closes.
//!
//! # Usage
//!
//! ```rust,ignore
//! let alarm = Alarm::new(&base, |alarm: &AlarmEntry, now: Ktime| {
//!     let missed = alarm.forward(now, PERIOD);
//!     AlarmRestart::Restart
//! });
//! alarm.start_relative(PERIOD)?;
//! ...
//! alarm.cancel();
//! ```

use alloc::sync::Arc;
use core::sync::atomic::{AtomicI64, AtomicU64, AtomicU8, Ordering};

use crate::base::AlarmBase;
use crate::clock::AlarmType;
use crate::err::Result;
use crate::ktime::Ktime;

bitflags::bitflags! {
    /// Alarm state bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AlarmState: u8 {
        /// Queued on the base
        const ENQUEUED = 0x01;
        /// Callback is executing
        const CALLBACK = 0x02;
    }
}

impl AlarmState {
    /// Neither queued nor running
    pub const INACTIVE: Self = Self::empty();
}

/// Return value of an alarm callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmRestart {
    /// Alarm is done
    NoRestart,
    /// Re-queue the alarm at its current deadline
    Restart,
}

/// Callback run when an alarm expires
///
/// The implementor carries the owner's data. `run` executes in timer expiry
/// context with no base lock held: it may start or cancel *other* alarms,
/// but must not block, and must not [`Alarm::cancel`] its own alarm (that
/// would spin forever waiting for itself to return).
///
/// To re-arm a periodic alarm, move the deadline with
/// [`AlarmEntry::forward`] and return [`AlarmRestart::Restart`].
pub trait AlarmFunction: Send + Sync + 'static {
    fn run(&self, alarm: &AlarmEntry, now: Ktime) -> AlarmRestart;
}

impl<F> AlarmFunction for F
where
    F: Fn(&AlarmEntry, Ktime) -> AlarmRestart + Send + Sync + 'static,
{
    fn run(&self, alarm: &AlarmEntry, now: Ktime) -> AlarmRestart {
        self(alarm, now)
    }
}

/// Next alarm id
static NEXT_ALARM_ID: AtomicU64 = AtomicU64::new(1);

/// Timing state of one alarm
///
/// `state` is only written with the owning base's lock held. `expires` may
/// be read at any time.
pub struct AlarmEntry {
    id: u64,
    kind: AlarmType,
    expires: AtomicI64,
    state: AtomicU8,
}

impl AlarmEntry {
    pub(crate) fn new(kind: AlarmType) -> Self {
        Self {
            id: NEXT_ALARM_ID.fetch_add(1, Ordering::Relaxed),
            kind,
            expires: AtomicI64::new(0),
            state: AtomicU8::new(AlarmState::INACTIVE.bits()),
        }
    }

    /// Unique id of this alarm
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> AlarmType {
        self.kind
    }

    /// Absolute deadline
    pub fn expires(&self) -> Ktime {
        Ktime::from_ns(self.expires.load(Ordering::Acquire))
    }

    /// Set the deadline
    ///
    /// On a queued alarm the new deadline takes effect at the next start,
    /// restart, or callback restart.
    pub fn set_expires(&self, expires: Ktime) {
        self.expires.store(expires.to_ns(), Ordering::Release);
    }

    pub fn state(&self) -> AlarmState {
        AlarmState::from_bits_truncate(self.state.load(Ordering::Acquire))
    }

    pub fn is_queued(&self) -> bool {
        self.state().contains(AlarmState::ENQUEUED)
    }

    /// Whether the callback is executing
    pub fn is_running(&self) -> bool {
        self.state().contains(AlarmState::CALLBACK)
    }

    pub(crate) fn set_state(&self, state: AlarmState) {
        self.state.store(state.bits(), Ordering::Release);
    }

    /// Advance the deadline past `now` by whole multiples of `interval`
    ///
    /// Returns the number of intervals the deadline moved, i.e. the number
    /// of periods that were missed. Returns 0 and leaves the deadline alone
    /// if `now` is before it. Afterwards `expires() > now`.
    ///
    /// # Panics
    ///
    /// Panics if `interval` is not positive.
    pub fn forward(&self, now: Ktime, interval: Ktime) -> u64 {
        assert!(interval > Ktime::ZERO, "alarm forward interval must be positive");

        let mut expires = self.expires();
        let delta = now - expires;
        if delta.is_negative() {
            return 0;
        }

        let mut overrun = 1;
        if delta >= interval {
            let incr = interval.to_ns();
            overrun = delta.divns(incr) as u64;
            expires = expires.add_ns(incr.saturating_mul(overrun as i64));
            if expires > now {
                self.set_expires(expires);
                return overrun;
            }
            // Division left the deadline at or before now; step once more.
            overrun += 1;
        }

        self.set_expires(expires + interval);
        overrun
    }
}

/// An alarm's timing state and its callback
pub(crate) struct AlarmNode<F: ?Sized = dyn AlarmFunction> {
    pub(crate) entry: AlarmEntry,
    pub(crate) function: F,
}

/// Owner handle of an alarm
///
/// Dropping the handle cancels the alarm and waits for a running callback
/// to return.
pub struct Alarm<F: AlarmFunction> {
    base: Arc<AlarmBase>,
    node: Arc<AlarmNode<F>>,
}

impl<F: AlarmFunction> Alarm<F> {
    /// Create an inactive alarm on `base`
    ///
    /// # Arguments
    ///
    /// * `base` - Base whose clock the deadline is measured on
    /// * `function` - Callback run when the alarm expires
    pub fn new(base: &Arc<AlarmBase>, function: F) -> Self {
        Self {
            base: base.clone(),
            node: Arc::new(AlarmNode {
                entry: AlarmEntry::new(base.kind()),
                function,
            }),
        }
    }

    fn dyn_node(&self) -> Arc<AlarmNode> {
        self.node.clone()
    }

    /// Set an absolute alarm to fire at `expires`
    pub fn start(&self, expires: Ktime) -> Result {
        self.base.start(&self.dyn_node(), expires)
    }

    /// Set an alarm to fire `delta` from now
    pub fn start_relative(&self, delta: Ktime) -> Result {
        self.start(self.base.now() + delta)
    }

    /// Re-queue the alarm at its stored deadline
    pub fn restart(&self) -> Result {
        self.base.restart(&self.dyn_node())
    }

    /// Try to cancel the alarm without waiting
    ///
    /// Returns `Ok(true)` if the alarm was queued and is now cancelled,
    /// `Ok(false)` if it was not queued, and [`Error::Busy`] if its
    /// callback is running.
    ///
    /// [`Error::Busy`]: crate::err::Error::Busy
    pub fn try_cancel(&self) -> Result<bool> {
        self.base.try_cancel(&self.node.entry)
    }

    /// Cancel the alarm and wait for a running callback to finish
    ///
    /// Busy-waits while the callback runs; the wait is bounded by one
    /// callback execution. On return the alarm is neither queued nor
    /// running. Returns whether the alarm was queued.
    pub fn cancel(&self) -> bool {
        loop {
            match self.try_cancel() {
                Ok(cancelled) => return cancelled,
                Err(_) => core::hint::spin_loop(),
            }
        }
    }

    /// See [`AlarmEntry::forward`]
    pub fn forward(&self, now: Ktime, interval: Ktime) -> u64 {
        self.node.entry.forward(now, interval)
    }

    /// Forward the deadline relative to the base's current time
    pub fn forward_now(&self, interval: Ktime) -> u64 {
        self.forward(self.base.now(), interval)
    }

    /// Time left until the deadline; negative once overdue
    pub fn expires_remaining(&self) -> Ktime {
        self.node.entry.expires() - self.base.now()
    }

    pub fn expires(&self) -> Ktime {
        self.node.entry.expires()
    }

    pub fn state(&self) -> AlarmState {
        self.node.entry.state()
    }

    pub fn is_queued(&self) -> bool {
        self.node.entry.is_queued()
    }

    pub fn entry(&self) -> &AlarmEntry {
        &self.node.entry
    }

    /// The callback and the owner data it carries
    pub fn function(&self) -> &F {
        &self.node.function
    }

    pub fn base(&self) -> &Arc<AlarmBase> {
        &self.base
    }
}

impl<F: AlarmFunction> Drop for Alarm<F> {
    fn drop(&mut self) {
        self.cancel();
    }
}
