//! DateTime display utilities.

use std::fmt;

use jiff::{tz::TimeZone, SignedDuration, Timestamp};

/// A `Timestamp` rendered in the system timezone as `YYYY-MM-DD HH:MM:SS TZ`.
pub struct LocalDateTime<'a>(pub &'a Timestamp);

impl fmt::Display for LocalDateTime<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.0
                .to_zoned(TimeZone::system())
                .strftime("%Y-%m-%d %H:%M:%S %Z")
        )
    }
}

/// A duration rounded to whole seconds, e.g. `2m 05s` or `0.4s`.
pub struct Elapsed(pub SignedDuration);

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let millis = self.0.as_millis().max(0);
        if millis < 1_000 {
            return write!(f, "{:.1}s", millis as f64 / 1_000.0);
        }
        let seconds = millis / 1_000;
        match (seconds / 3_600, seconds / 60 % 60, seconds % 60) {
            (0, 0, s) => write!(f, "{s}s"),
            (0, m, s) => write!(f, "{m}m {s:02}s"),
            (h, m, s) => write!(f, "{h}h {m:02}m {s:02}s"),
        }
    }
}
