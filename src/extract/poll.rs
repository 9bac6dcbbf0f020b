//! Bounded polling for something that is expected to appear soon.

use std::future::Future;
use std::time::Duration;
use tracing::trace;

/// How a [`poll_until`] call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    Ready(T),
    GaveUp { attempts: u32 },
}

impl<T> PollOutcome<T> {
    pub fn ready(self) -> Option<T> {
        match self {
            PollOutcome::Ready(v) => Some(v),
            PollOutcome::GaveUp { .. } => None,
        }
    }
}

/// Run `probe` up to `max_attempts` times, sleeping `interval` between
/// attempts, until it yields `Some`.
///
/// The probe receives the 1-based attempt number. No sleep follows the
/// final attempt. `max_attempts == 0` gives up immediately.
pub async fn poll_until<T, F, Fut>(max_attempts: u32, interval: Duration, mut probe: F) -> PollOutcome<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Option<T>>,
{
    for attempt in 1..=max_attempts {
        if let Some(v) = probe(attempt).await {
            trace!("Poll succeeded on attempt {}", attempt);
            return PollOutcome::Ready(v);
        }
        if attempt < max_attempts {
            tokio::time::sleep(interval).await;
        }
    }
    PollOutcome::GaveUp {
        attempts: max_attempts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ready_on_third_attempt() {
        let out = poll_until(5, Duration::from_millis(1), |n| async move {
            (n == 3).then_some(n * 10)
        })
        .await;
        assert_eq!(out, PollOutcome::Ready(30));
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let mut calls = 0;
        let out: PollOutcome<()> = poll_until(4, Duration::from_millis(1), |_| {
            calls += 1;
            async { None }
        })
        .await;
        assert_eq!(out, PollOutcome::GaveUp { attempts: 4 });
        assert_eq!(calls, 4);
    }

    #[test]
    fn zero_attempts_never_probes() {
        let mut calls = 0;
        let out: PollOutcome<u8> = tokio_test::block_on(poll_until(0, Duration::from_secs(60), |_| {
            calls += 1;
            async { Some(1) }
        }));
        assert_eq!(out.ready(), None);
        assert_eq!(calls, 0);
    }

    #[test]
    fn immediate_success_does_not_sleep() {
        let out = tokio_test::block_on(poll_until(3, Duration::from_secs(60), |n| async move { Some(n) }));
        assert_eq!(out.ready(), Some(1));
    }
}
