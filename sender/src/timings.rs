use std::time::Duration;

/// Fixed waits and limits used while driving WhatsApp Web.
///
/// WhatsApp Web gives no readiness signal for most UI transitions, so every
/// navigation and UI action is followed by a fixed settle time.
#[derive(Debug, Clone)]
pub struct Timings {
    /// After opening the app or a chat deep link.
    pub page_settle: Duration,
    /// How long the user has to scan the QR code.
    pub auth_window: Duration,
    pub auth_poll: Duration,
    pub auth_progress_every: Duration,
    /// Extra wait once a login was detected.
    pub post_login_settle: Duration,
    /// Extra wait when the login wait timed out.
    pub login_timeout_settle: Duration,
    /// Per-strategy ceiling when looking for the compose box.
    pub element_wait: Duration,
    pub element_poll: Duration,
    pub focus_settle: Duration,
    pub clear_settle: Duration,
    pub line_break_pause: Duration,
    pub after_send: Duration,
    pub max_attempts: u32,
    pub retry_backoff: Duration,
    /// Bounds of the random pause between two contacts.
    pub jitter_min: Duration,
    pub jitter_max: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            page_settle: Duration::from_secs(5),
            auth_window: Duration::from_secs(60),
            auth_poll: Duration::from_secs(2),
            auth_progress_every: Duration::from_secs(15),
            post_login_settle: Duration::from_secs(5),
            login_timeout_settle: Duration::from_secs(10),
            element_wait: Duration::from_secs(15),
            element_poll: Duration::from_millis(500),
            focus_settle: Duration::from_secs(2),
            clear_settle: Duration::from_secs(1),
            line_break_pause: Duration::from_millis(100),
            after_send: Duration::from_secs(4),
            max_attempts: 3,
            retry_backoff: Duration::from_secs(5),
            jitter_min: Duration::from_secs(10),
            jitter_max: Duration::from_secs(25),
        }
    }
}

impl Timings {
    /// A uniformly drawn pause between `jitter_min` and `jitter_max`.
    pub fn jitter(&self) -> Duration {
        use rand::Rng;

        let min = self.jitter_min.as_millis() as u64;
        let max = (self.jitter_max.as_millis() as u64).max(min);
        Duration::from_millis(rand::rng().random_range(min..=max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jitter_stays_in_range() {
        let timings = Timings::default();
        for _ in 0..100 {
            let d = timings.jitter();
            assert!(d >= Duration::from_secs(10) && d <= Duration::from_secs(25));
        }
    }

    #[test]
    fn inverted_jitter_bounds_collapse_to_min() {
        let timings = Timings {
            jitter_min: Duration::from_secs(3),
            jitter_max: Duration::from_secs(1),
            ..Timings::default()
        };
        assert_eq!(timings.jitter(), Duration::from_secs(3));
    }
}
