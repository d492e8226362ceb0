// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Wakeup event accounting

use alloc::sync::Arc;

/// Power-management wakeup source
///
/// Reporting an event keeps the system awake for at least `msec`
/// milliseconds, so an alarm that fires while suspend is starting aborts
/// the transition instead of being lost. Reporting is advisory and never
/// fails.
pub trait WakeupSource: Send + Sync {
    fn pm_wakeup_event(&self, msec: u32);
}

impl<T: WakeupSource + ?Sized> WakeupSource for Arc<T> {
    fn pm_wakeup_event(&self, msec: u32) {
        (**self).pm_wakeup_event(msec)
    }
}
