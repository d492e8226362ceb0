// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Clock identities and clock sources
//!
//! Every alarm is bound to one [`AlarmType`], which selects the base it is
//! queued on and the clock its deadline is measured against.

use crate::ktime::Ktime;

/// Kernel clock identities backing the alarm bases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClockId {
    /// Wall-clock time; jumps when the time of day is set
    Realtime,

    /// Time since boot, including time spent suspended
    Boottime,
}

/// Number of alarm bases
pub const ALARM_NUMTYPE: usize = 2;

/// Alarm types, one per alarm base
#[repr(usize)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlarmType {
    Realtime = 0,
    Boottime = 1,
}

impl AlarmType {
    /// All alarm types, in base order
    pub const ALL: [AlarmType; ALARM_NUMTYPE] = [AlarmType::Realtime, AlarmType::Boottime];

    /// Index of this type's base
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn clock_id(self) -> ClockId {
        match self {
            AlarmType::Realtime => ClockId::Realtime,
            AlarmType::Boottime => ClockId::Boottime,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            AlarmType::Realtime => "realtime",
            AlarmType::Boottime => "boottime",
        }
    }
}

/// Source of the current time for one clock identity
///
/// `now` must be monotonic non-decreasing for the lifetime of the base and
/// must not call back into the alarm timers.
pub trait ClockSource: Send + Sync {
    fn now(&self) -> Ktime;
}

impl<F> ClockSource for F
where
    F: Fn() -> Ktime + Send + Sync,
{
    fn now(&self) -> Ktime {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::sync::Arc;

    #[test]
    fn test_alarm_type_index() {
        assert_eq!(AlarmType::Realtime.index(), 0);
        assert_eq!(AlarmType::Boottime.index(), 1);
        for (i, kind) in AlarmType::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
        assert_eq!(AlarmType::Boottime.clock_id(), ClockId::Boottime);
    }

    #[test]
    fn test_closure_clock() {
        let clock = || Ktime::from_secs(5);
        assert_eq!(clock.now(), Ktime::from_secs(5));

        let shared: Arc<dyn ClockSource> = Arc::new(|| Ktime::from_ms(7));
        assert_eq!(shared.now(), Ktime::from_ms(7));
    }
}
