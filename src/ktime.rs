// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Kernel time values
//!
//! [`Ktime`] is a signed nanosecond count. It is used both for absolute
//! deadlines on a clock and for differences between them, so it may be
//! negative (an alarm that is already overdue has negative remaining time).
//! Arithmetic saturates instead of wrapping.

use core::fmt;
use core::ops::{Add, AddAssign, Neg, Sub, SubAssign};

pub const NSEC_PER_USEC: i64 = 1_000;
pub const NSEC_PER_MSEC: i64 = 1_000_000;
pub const NSEC_PER_SEC: i64 = 1_000_000_000;

/// Nanosecond time value
#[repr(transparent)]
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ktime(i64);

impl Ktime {
    pub const ZERO: Self = Self(0);
    pub const MAX: Self = Self(i64::MAX);

    pub const fn from_ns(ns: i64) -> Self {
        Self(ns)
    }

    pub const fn from_us(us: i64) -> Self {
        Self(us.saturating_mul(NSEC_PER_USEC))
    }

    pub const fn from_ms(ms: i64) -> Self {
        Self(ms.saturating_mul(NSEC_PER_MSEC))
    }

    pub const fn from_secs(secs: i64) -> Self {
        Self(secs.saturating_mul(NSEC_PER_SEC))
    }

    /// Returns the number of nanoseconds.
    #[inline]
    pub const fn to_ns(self) -> i64 {
        self.0
    }

    /// Whole milliseconds, truncated toward zero
    #[inline]
    pub const fn to_ms(self) -> i64 {
        self.0 / NSEC_PER_MSEC
    }

    /// Whole seconds, truncated toward zero
    #[inline]
    pub const fn to_secs(self) -> i64 {
        self.0 / NSEC_PER_SEC
    }

    #[inline]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Divide by a nanosecond count, truncating
    ///
    /// # Panics
    ///
    /// Panics if `div` is zero.
    #[inline]
    pub const fn divns(self, div: i64) -> i64 {
        self.0 / div
    }

    /// Add `ns` nanoseconds
    #[inline]
    pub const fn add_ns(self, ns: i64) -> Self {
        Self(self.0.saturating_add(ns))
    }
}

impl Add for Ktime {
    type Output = Ktime;

    fn add(self, rhs: Ktime) -> Ktime {
        Ktime(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Ktime {
    fn add_assign(&mut self, rhs: Ktime) {
        *self = *self + rhs;
    }
}

impl Sub for Ktime {
    type Output = Ktime;

    fn sub(self, rhs: Ktime) -> Ktime {
        Ktime(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Ktime {
    fn sub_assign(&mut self, rhs: Ktime) {
        *self = *self - rhs;
    }
}

impl Neg for Ktime {
    type Output = Ktime;

    fn neg(self) -> Ktime {
        Ktime(self.0.saturating_neg())
    }
}

impl fmt::Debug for Ktime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ns", self.0)
    }
}

impl fmt::Display for Ktime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(
            f,
            "{}{}.{:09}",
            sign,
            abs / NSEC_PER_SEC as u64,
            abs % NSEC_PER_SEC as u64
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn test_time_conversions() {
        assert_eq!(Ktime::from_us(1).to_ns(), 1_000);
        assert_eq!(Ktime::from_ms(1).to_ns(), 1_000_000);
        assert_eq!(Ktime::from_secs(1).to_ns(), 1_000_000_000);

        assert_eq!(Ktime::from_ns(1_999_999_999).to_secs(), 1);
        assert_eq!(Ktime::from_ns(2_500_000).to_ms(), 2);
        assert_eq!(Ktime::from_secs(-3).to_secs(), -3);
    }

    #[test]
    fn test_arithmetic() {
        let a = Ktime::from_secs(10);
        let b = Ktime::from_secs(12);
        assert_eq!(b - a, Ktime::from_secs(2));
        assert!((a - b).is_negative());
        assert_eq!(a + b, Ktime::from_secs(22));
        assert_eq!(-a, Ktime::from_secs(-10));
        assert_eq!(Ktime::from_ns(25).divns(10), 2);
    }

    #[test]
    fn test_saturation() {
        assert_eq!(Ktime::MAX + Ktime::from_secs(1), Ktime::MAX);
        assert_eq!(Ktime::MAX.add_ns(1), Ktime::MAX);
        assert_eq!(Ktime::from_secs(i64::MAX), Ktime::MAX);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Ktime::from_ms(1500)), "1.500000000");
        assert_eq!(format!("{}", Ktime::from_ms(-250)), "-0.250000000");
    }
}
