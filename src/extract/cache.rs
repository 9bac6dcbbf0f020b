//! An owned, timestamped cache slot.
//!
//! Extractors that read something expensive (the DeepSeek database dump)
//! keep the last result in an [`ElementCache`] and ask it whether it is
//! still fresh before reusing it.

use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct ElementCache<T> {
    value: T,
    captured_at: DateTime<Utc>,
}

impl<T> ElementCache<T> {
    pub fn new(value: T, captured_at: DateTime<Utc>) -> Self {
        Self { value, captured_at }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// True once more than `ttl` has elapsed since capture.
    ///
    /// A clock that went backwards counts as fresh.
    pub fn is_stale(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.captured_at) > ttl
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn staleness_boundary() {
        let t0 = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let c = ElementCache::new("el", t0);
        let ttl = Duration::seconds(5);
        assert!(!c.is_stale(t0, ttl));
        assert!(!c.is_stale(t0 + Duration::seconds(5), ttl));
        assert!(c.is_stale(t0 + Duration::seconds(6), ttl));
        assert!(!c.is_stale(t0 - Duration::seconds(30), ttl));
        assert_eq!(*c.value(), "el");
    }
}
