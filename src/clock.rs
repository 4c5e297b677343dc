//! Strictly monotonic microsecond timestamps.
//!
//! Frame metadata carries sender-side time tags. The steady clock can
//! report the same microsecond twice in a row; this source never does:
//! whenever the clock has not advanced past the previously returned value,
//! the result is bumped by one microsecond instead. The counter is shared
//! by the whole process.

use std::sync::{Mutex, OnceLock};
use std::time::Instant;

static BASE: OnceLock<Instant> = OnceLock::new();
static LAST: Mutex<u64> = Mutex::new(0);

/// Microseconds of steady-clock time, strictly increasing across the
/// process. Successive calls never return the same value twice.
pub fn timestamp_micros() -> u64 {
    let base = *BASE.get_or_init(Instant::now);
    let now = base.elapsed().as_micros() as u64;

    let mut last = LAST.lock().unwrap_or_else(|e| e.into_inner());
    if now <= *last {
        *last += 1;
    } else {
        *last = now;
    }
    *last
}

/// Truncating 32-bit variant of [`timestamp_micros`].
pub fn timestamp_micros_32() -> u32 {
    timestamp_micros() as u32
}
