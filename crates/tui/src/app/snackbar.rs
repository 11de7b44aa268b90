use std::time::{Duration, Instant};

/// A transient notification that hides itself once its duration has passed.
#[derive(Clone, Debug)]
pub struct Snackbar {
    pub message: String,
    shown_at: Instant,
    duration: Duration,
}

impl Snackbar {
    pub fn new<S: Into<String>>(message: S, duration: Duration, now: Instant) -> Self {
        Self {
            message: message.into(),
            shown_at: now,
            duration,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_after_duration() {
        let t0 = Instant::now();
        let s = Snackbar::new("hi", Duration::from_millis(3000), t0);
        assert!(!s.is_expired(t0));
        assert!(!s.is_expired(t0 + Duration::from_millis(2999)));
        assert!(s.is_expired(t0 + Duration::from_millis(3000)));
    }
}
