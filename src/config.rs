// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Alarm Timer Configuration
//!
//! Tunables for the suspend policy and wake accounting, with defaults that
//! match the driver's fixed behaviour. They can be overridden from a kernel
//! command line.
//!
//! # Command Line
//!
//! Space-separated `key=value` pairs; only keys under the `alarmtimer.`
//! prefix are read and unknown keys are ignored. Values are decimal or
//! `0x`-prefixed hex.
//!
//! | Key                              | Field                   |
//! |----------------------------------|-------------------------|
//! | `alarmtimer.debug_mask`          | `debug_mask`            |
//! | `alarmtimer.suspend_threshold_ms`| `suspend_threshold`     |
//! | `alarmtimer.wakeup_hold_ms`      | `wakeup_hold_ms`        |
//! | `alarmtimer.busy_hold_ms`        | `suspend_busy_hold_ms`  |
//!
//! # Usage
//!
//! ```rust,ignore
//! let config = AlarmConfig::from_cmdline("quiet alarmtimer.debug_mask=0x7f")?;
//! ```

use crate::debug::AlarmDebug;
use crate::err::{Error, Result};
use crate::ktime::Ktime;
use crate::log_warn;

/// Command line key prefix
const CMDLINE_PREFIX: &str = "alarmtimer.";

/// Default minimum time to the next alarm for suspend to proceed
pub const DEFAULT_SUSPEND_THRESHOLD: Ktime = Ktime::from_secs(2);

/// Default wakeup hold after an alarm or RTC interrupt
pub const DEFAULT_WAKEUP_HOLD_MS: u32 = 1000;

/// Default wakeup hold when suspend is refused; covers the threshold
pub const DEFAULT_SUSPEND_BUSY_HOLD_MS: u32 = DEFAULT_SUSPEND_THRESHOLD.to_ms() as u32;

/// Alarm timer tunables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmConfig {
    /// Suspend fails with `Busy` when an alarm is due sooner than this
    pub suspend_threshold: Ktime,

    /// Wakeup hold reported after every expiry and RTC alarm interrupt, and
    /// when programming the wake alarm fails
    pub wakeup_hold_ms: u32,

    /// Wakeup hold reported when suspend is refused
    ///
    /// Should cover `suspend_threshold`, so the alarm that blocked suspend
    /// fires before the next attempt. The command line keeps the two in
    /// step unless `busy_hold_ms` is given.
    pub suspend_busy_hold_ms: u32,

    /// Log classes enabled for `pr_alarm!`
    pub debug_mask: AlarmDebug,
}

impl AlarmConfig {
    pub const fn new() -> Self {
        Self {
            suspend_threshold: DEFAULT_SUSPEND_THRESHOLD,
            wakeup_hold_ms: DEFAULT_WAKEUP_HOLD_MS,
            suspend_busy_hold_ms: DEFAULT_SUSPEND_BUSY_HOLD_MS,
            debug_mask: AlarmDebug::DEFAULT,
        }
    }

    /// Parse overrides from a command line
    ///
    /// # Arguments
    ///
    /// * `cmdline` - Space-separated `key=value` arguments
    ///
    /// # Returns
    ///
    /// The defaults with every recognised key applied, or
    /// [`Error::InvalidArgs`] if a recognised key has a malformed value.
    pub fn from_cmdline(cmdline: &str) -> Result<Self> {
        let mut config = Self::new();
        let mut busy_hold_ms = None;

        for arg in cmdline.split_ascii_whitespace() {
            let Some(arg) = arg.strip_prefix(CMDLINE_PREFIX) else {
                continue;
            };
            let (key, value) = arg.split_once('=').unwrap_or((arg, ""));

            match key {
                "debug_mask" => {
                    config.debug_mask = AlarmDebug::from_bits_truncate(parse_u32(key, value)?);
                }
                "suspend_threshold_ms" => {
                    let threshold_ms = parse_u32(key, value)?;
                    config.suspend_threshold = Ktime::from_ms(threshold_ms as i64);
                    config.suspend_busy_hold_ms = threshold_ms;
                }
                "wakeup_hold_ms" => config.wakeup_hold_ms = parse_u32(key, value)?,
                "busy_hold_ms" => busy_hold_ms = Some(parse_u32(key, value)?),
                _ => {}
            }
        }

        if let Some(hold_ms) = busy_hold_ms {
            config.suspend_busy_hold_ms = hold_ms;
        }
        Ok(config)
    }
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a decimal or `0x` hex value
fn parse_u32(key: &str, value: &str) -> Result<u32> {
    let parsed = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => value.parse::<u32>(),
    };

    parsed.map_err(|_| {
        log_warn!("{}{}: invalid value '{}'", CMDLINE_PREFIX, key, value);
        Error::InvalidArgs
    })
}
