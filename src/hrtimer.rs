// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Hardware one-shot timer interface
//!
//! Each alarm base drives exactly one high-resolution timer. The timer is
//! armed for a single absolute deadline; when it expires the platform calls
//! the base's [`HrTimerHandler::run`] from its expiry context and re-arms
//! the timer if the handler asks for it.
//!
//! # State Diagram
//!
//! ```text
//!               start            expire
//!   Stopped ------------> Armed ---------> Running
//!      ^                   |                  |
//!      |   try_to_cancel   |    NoRestart     |
//!      +-------------------+------------------+
//!                          ^     Restart      |
//!                          +------------------+
//! ```

use alloc::sync::Arc;

use crate::err::Result;
use crate::ktime::Ktime;

/// Return value of an expiry handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HrTimerRestart {
    /// Timer should not be restarted.
    NoRestart,
    /// Timer should be restarted at its (updated) expiry time.
    Restart,
}

/// Outcome of a best-effort cancel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HrTimerCancel {
    /// The timer was armed and is now stopped
    Cancelled,
    /// The timer was not armed
    NotActive,
    /// The expiry handler is executing and cannot be stopped
    Running,
}

/// A one-shot hardware timer bound to one alarm base
///
/// Implementations must not invoke the expiry handler synchronously from
/// any of these methods; the base calls them with its lock held.
///
/// The base may call `start` or `try_to_cancel` from another CPU after its
/// handler has decided on a return value but before that value reaches
/// the timer. A `start` in that window takes precedence over the handler's
/// return, as with Linux hrtimers; the base also updates the restart
/// deadline with `set_expires`, so a timer that re-arms from it ends up at
/// the same deadline.
pub trait HrTimer: Send + Sync {
    /// Arm the timer for the absolute deadline `expires`, replacing any
    /// earlier deadline.
    fn start(&self, expires: Ktime) -> Result;

    /// Stop the timer if it is armed.
    ///
    /// Returns [`HrTimerCancel::Running`] while the expiry handler runs; the
    /// timer is then re-armed or not according to the handler's return.
    fn try_to_cancel(&self) -> HrTimerCancel;

    /// Set the deadline used when the running handler returns
    /// [`HrTimerRestart::Restart`].
    fn set_expires(&self, expires: Ktime);

    /// Re-arm the timer at its last set deadline.
    fn restart(&self) -> Result;
}

impl<T: HrTimer + ?Sized> HrTimer for Arc<T> {
    fn start(&self, expires: Ktime) -> Result {
        (**self).start(expires)
    }

    fn try_to_cancel(&self) -> HrTimerCancel {
        (**self).try_to_cancel()
    }

    fn set_expires(&self, expires: Ktime) {
        (**self).set_expires(expires)
    }

    fn restart(&self) -> Result {
        (**self).restart()
    }
}

/// Target of a hardware timer expiry
///
/// `run` is called in hard interrupt context, once per expiry. It must not
/// sleep and must not wait on anything a calling thread may hold across a
/// blocking operation.
pub trait HrTimerHandler: Send + Sync {
    fn run(&self) -> HrTimerRestart;
}
