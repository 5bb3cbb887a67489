//! In-memory watermark: the newest timestamp already handed downstream.

/// Monotonic timestamp boundary. Records at or below it are considered seen.
///
/// Owned by a single poll loop; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Watermark {
    value: i64,
}

impl Watermark {
    /// Start at an explicit timestamp (epoch seconds).
    pub fn starting_at(value: i64) -> Self {
        Self { value }
    }

    /// Start one window before `now`, so the first poll sees exactly one window.
    pub fn one_window_before(now: i64, window_secs: i64) -> Self {
        Self::starting_at(now.saturating_sub(window_secs))
    }

    pub fn get(&self) -> i64 {
        self.value
    }

    /// Move forward to `candidate` if it is newer. Returns whether it moved.
    pub fn advance(&mut self, candidate: i64) -> bool {
        if candidate > self.value {
            self.value = candidate;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_one_window_back() {
        let wm = Watermark::one_window_before(1_000_000, 120);
        assert_eq!(wm.get(), 999_880);
    }

    #[test]
    fn advances_forward_only() {
        let mut wm = Watermark::starting_at(100);
        assert!(wm.advance(150));
        assert_eq!(wm.get(), 150);

        assert!(!wm.advance(120));
        assert_eq!(wm.get(), 150);

        assert!(!wm.advance(150));
        assert_eq!(wm.get(), 150);
    }

    #[test]
    fn saturates_at_min() {
        let wm = Watermark::one_window_before(i64::MIN + 10, 60);
        assert_eq!(wm.get(), i64::MIN);
    }
}
