//! Defines a **timestamp** type with an explicit "never updated" sentinel.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
/// A monotonic timestamp, measured as a duration since some external epoch.
///
/// `Timestamp::never()` is a distinct sentinel for "this value has not been written yet",
/// kept out of band from any real duration so that "time zero" and "no data" can never
/// be confused by a caller.
pub enum Timestamp {
    #[default]
    Never,
    At(Duration),
}

impl Timestamp {
    #[must_use]
    pub fn never() -> Self {
        Timestamp::Never
    }

    #[must_use]
    pub fn at(duration: Duration) -> Self {
        Timestamp::At(duration)
    }

    #[must_use]
    pub fn is_never(&self) -> bool {
        matches!(self, Timestamp::Never)
    }

    /// Age of this timestamp relative to `now`, or `None` if this timestamp is the
    /// never-updated sentinel.
    #[must_use]
    pub fn age(&self, now: Duration) -> Option<Duration> {
        match self {
            Timestamp::Never => None,
            Timestamp::At(t) => Some(now.saturating_sub(*t)),
        }
    }
}
