//! Duration-gated pose confirmation.

use tracing::debug;

/// Result of one hold update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoldUpdate {
    /// True only on the frame the hold completed.
    pub fired: bool,
    /// Fraction of the hold duration elapsed, in [0, 1].
    pub progress: f64,
}

/// Fires once after a predicate has held continuously for a duration.
/// Any frame where the predicate fails starts over from zero.
#[derive(Debug, Clone)]
pub struct HoldGesture {
    duration_ms: f64,
    start_ms: Option<f64>,
    confirmed: bool,
}

impl HoldGesture {
    pub fn new(duration_ms: f64) -> Self {
        Self {
            duration_ms,
            start_ms: None,
            confirmed: false,
        }
    }

    pub fn update(&mut self, satisfied: bool, now_ms: f64) -> HoldUpdate {
        if !satisfied {
            self.reset();
            return HoldUpdate {
                fired: false,
                progress: 0.0,
            };
        }

        let start = *self.start_ms.get_or_insert(now_ms);
        let elapsed = now_ms - start;

        if elapsed >= self.duration_ms && !self.confirmed {
            self.confirmed = true;
            debug!("Hold confirmed after {:.0}ms", elapsed);
            return HoldUpdate {
                fired: true,
                progress: 1.0,
            };
        }

        let progress = if self.duration_ms > 0.0 {
            (elapsed / self.duration_ms).clamp(0.0, 1.0)
        } else {
            1.0
        };
        HoldUpdate {
            fired: false,
            progress,
        }
    }

    pub fn progress_at(&self, now_ms: f64) -> f64 {
        match self.start_ms {
            Some(start) if self.duration_ms > 0.0 => {
                ((now_ms - start) / self.duration_ms).clamp(0.0, 1.0)
            }
            Some(_) => 1.0,
            None => 0.0,
        }
    }

    pub fn is_holding(&self) -> bool {
        self.start_ms.is_some()
    }

    pub fn reset(&mut self) {
        self.start_ms = None;
        self.confirmed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_at_duration() {
        let mut hold = HoldGesture::new(2000.0);
        let mut fired = Vec::new();
        for t in (0..=4000).step_by(100) {
            if hold.update(true, t as f64).fired {
                fired.push(t);
            }
        }
        assert_eq!(fired, vec![2000]);
    }

    #[test]
    fn test_not_fired_before_duration() {
        let mut hold = HoldGesture::new(2000.0);
        hold.update(true, 0.0);
        let u = hold.update(true, 1999.0);
        assert!(!u.fired);
        assert!((u.progress - 0.9995).abs() < 1e-9);
    }

    #[test]
    fn test_release_resets_progress() {
        let mut hold = HoldGesture::new(2000.0);
        hold.update(true, 0.0);
        hold.update(true, 1500.0);
        let u = hold.update(false, 1600.0);
        assert_eq!(u.progress, 0.0);
        assert!(!hold.is_holding());

        // Re-asserting starts from zero, not from 1500ms.
        let u = hold.update(true, 1700.0);
        assert_eq!(u.progress, 0.0);
        assert!(!hold.update(true, 3000.0).fired);
        assert!(hold.update(true, 3700.0).fired);
    }

    #[test]
    fn test_refires_after_release() {
        let mut hold = HoldGesture::new(100.0);
        hold.update(true, 0.0);
        assert!(hold.update(true, 100.0).fired);
        assert!(!hold.update(true, 500.0).fired);
        hold.update(false, 600.0);
        hold.update(true, 700.0);
        assert!(hold.update(true, 800.0).fired);
    }

    #[test]
    fn test_progress_at() {
        let mut hold = HoldGesture::new(1000.0);
        assert_eq!(hold.progress_at(0.0), 0.0);
        hold.update(true, 0.0);
        assert_eq!(hold.progress_at(250.0), 0.25);
        assert_eq!(hold.progress_at(5000.0), 1.0);
    }
}
