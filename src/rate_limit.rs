//! Per-session submission frequency bound.
//!
//! Uses [`tokio::time::Instant`] so windows follow the runtime clock,
//! including paused time in tests.

use std::time::Duration;

use tokio::time::Instant;

/// Rate-limit bookkeeping for one controller.
///
/// The stored counter is only meaningful together with the window length,
/// so it is read through [`RateLimiter::effective_count`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmissionWindow {
    last_submission: Option<Instant>,
    count_in_window: u32,
}

impl SubmissionWindow {
    pub fn last_submission(&self) -> Option<Instant> {
        self.last_submission
    }
}

/// Permits at most `max_per_window` submissions while less than `window`
/// has passed since the previous one.
#[derive(Debug, Clone, Copy)]
pub struct RateLimiter {
    max_per_window: u32,
    window: Duration,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(2, Duration::from_secs(60))
    }
}

impl RateLimiter {
    pub fn new(max_per_window: u32, window: Duration) -> Self {
        Self {
            max_per_window,
            window,
        }
    }

    /// Whether a submission at `now` would be allowed. Does not touch the
    /// window.
    pub fn permit(&self, window: &SubmissionWindow, now: Instant) -> bool {
        self.effective_count(window, now) < self.max_per_window
    }

    /// Record an actual submission at `now`.
    pub fn record(&self, window: &mut SubmissionWindow, now: Instant) {
        window.count_in_window = self.effective_count(window, now).saturating_add(1);
        window.last_submission = Some(now);
    }

    /// Submissions counted against `now`; zero once the window has expired.
    pub fn effective_count(&self, window: &SubmissionWindow, now: Instant) -> u32 {
        match window.last_submission {
            Some(last) if now.saturating_duration_since(last) < self.window => {
                window.count_in_window
            }
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_window_permits() {
        let limiter = RateLimiter::default();
        let window = SubmissionWindow::default();
        assert!(limiter.permit(&window, Instant::now()));
    }

    #[test]
    fn denies_after_max_within_window() {
        let limiter = RateLimiter::default();
        let mut window = SubmissionWindow::default();
        let start = Instant::now();

        assert!(limiter.permit(&window, start));
        limiter.record(&mut window, start);
        assert!(limiter.permit(&window, start + Duration::from_secs(10)));
        limiter.record(&mut window, start + Duration::from_secs(10));
        assert_eq!(
            limiter.effective_count(&window, start + Duration::from_secs(10)),
            2
        );

        assert!(!limiter.permit(&window, start + Duration::from_secs(20)));
    }

    #[test]
    fn checking_does_not_perturb_window() {
        let limiter = RateLimiter::default();
        let mut window = SubmissionWindow::default();
        let start = Instant::now();
        limiter.record(&mut window, start);

        let before = window;
        for s in 0..5 {
            limiter.permit(&window, start + Duration::from_secs(s));
        }
        assert_eq!(window, before);
    }

    #[test]
    fn window_expires_measured_from_last_submission() {
        let limiter = RateLimiter::default();
        let mut window = SubmissionWindow::default();
        let start = Instant::now();
        limiter.record(&mut window, start);
        limiter.record(&mut window, start + Duration::from_secs(30));

        // 60 s after the first, but only 30 s after the second
        assert!(!limiter.permit(&window, start + Duration::from_secs(60)));
        // exactly one window after the last submission
        let expired = start + Duration::from_secs(90);
        assert!(limiter.permit(&window, expired));
        assert_eq!(limiter.effective_count(&window, expired), 0);

        limiter.record(&mut window, expired);
        assert_eq!(limiter.effective_count(&window, expired), 1);
        assert_eq!(window.last_submission(), Some(expired));
    }

    #[test]
    fn count_reads_zero_after_expiry_without_new_submission() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let mut window = SubmissionWindow::default();
        let start = Instant::now();
        limiter.record(&mut window, start);
        limiter.record(&mut window, start + Duration::from_secs(1));

        let later = start + Duration::from_secs(61);
        assert_eq!(limiter.effective_count(&window, later), 0);
        assert_eq!(window.last_submission(), Some(start + Duration::from_secs(1)));
    }

    #[test]
    fn max_of_one() {
        let limiter = RateLimiter::new(1, Duration::from_secs(5));
        let mut window = SubmissionWindow::default();
        let start = Instant::now();
        limiter.record(&mut window, start);
        assert!(!limiter.permit(&window, start + Duration::from_secs(4)));
        assert!(limiter.permit(&window, start + Duration::from_secs(5)));
    }
}
