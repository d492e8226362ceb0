// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Alarm Timer Test Suite
//!
//! Host-run scenario tests that drive the alarm bases and the suspend
//! coordinator end to end through fake collaborators.
//!
//! # Organization
//!
//! - [`fakes`] - Manual clock, recording hardware timer, fake RTC and
//!   wakeup counter
//! - [`alarm_tests`] - Queue discipline, expiry and cancellation
//! - [`suspend_tests`] - Suspend, resume and RTC binding

pub mod fakes;
