use serde::{Serialize, Serializer};
use std::fmt;

/// Severity of a log record.
///
/// Levels are plain integers so that callers can define intermediate
/// severities (e.g. `Level::new(2)` sits between `INFO` and `WARN`).
/// Higher values are more severe; the ordering is total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(i32);

impl Level {
    pub const DEBUG: Level = Level(-4);
    pub const INFO: Level = Level(0);
    pub const WARN: Level = Level(4);
    pub const ERROR: Level = Level(8);

    /// Create a custom level from its numeric value.
    pub const fn new(value: i32) -> Self {
        Level(value)
    }

    /// Numeric value of the level.
    pub const fn value(self) -> i32 {
        self.0
    }
}

impl fmt::Display for Level {
    /// Named levels render as `DEBUG`/`INFO`/`WARN`/`ERROR`; intermediate
    /// values render relative to the nearest named level below the next
    /// threshold, e.g. `INFO+2` or `DEBUG-1`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn offset(f: &mut fmt::Formatter<'_>, name: &str, delta: i32) -> fmt::Result {
            if delta == 0 {
                f.write_str(name)
            } else {
                write!(f, "{}{:+}", name, delta)
            }
        }

        let v = self.0;
        if v < Self::INFO.0 {
            offset(f, "DEBUG", v - Self::DEBUG.0)
        } else if v < Self::WARN.0 {
            offset(f, "INFO", v - Self::INFO.0)
        } else if v < Self::ERROR.0 {
            offset(f, "WARN", v - Self::WARN.0)
        } else {
            offset(f, "ERROR", v - Self::ERROR.0)
        }
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
