//! Suppression windows for zoom steps.
//!
//! Zoom is blocked right after an activation edge, while the depth hovers
//! just above the entry threshold, and after a sudden depth drop (the user
//! pulling the hand back reads as a pinch change first).

use tracing::debug;

/// Block applied after a depth drop, independent of grace/cooldown.
pub const DROP_PENALTY_MS: f64 = 120.0;

#[derive(Debug, Clone)]
pub struct GuardConfig {
    pub active_grace_ms: f64,
    pub release_cooldown_ms: f64,
    /// Pixels above `threshold_on` that still count as the boundary.
    pub edge_band: f64,
    /// Largest per-frame depth decrease tolerated.
    pub drop_guard: f64,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            active_grace_ms: 180.0,
            release_cooldown_ms: 280.0,
            edge_band: 8.0,
            drop_guard: 12.0,
        }
    }
}

/// Outcome of a guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allowed,
    Cooldown,
    EdgeBand,
    DepthDrop,
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allowed => "",
            Self::Cooldown => "cooldown/grace",
            Self::EdgeBand => "edge-band",
            Self::DepthDrop => "z-drop-guard",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ZoomGuard {
    config: GuardConfig,
    block_until_ms: f64,
    prev_depth: Option<f64>,
}

impl ZoomGuard {
    pub fn new(config: GuardConfig) -> Self {
        Self {
            config,
            block_until_ms: 0.0,
            prev_depth: None,
        }
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Arm the post-activation grace window.
    pub fn set_grace_period(&mut self, now_ms: f64) {
        self.block_until_ms = now_ms + self.config.active_grace_ms;
    }

    /// Arm the post-release cooldown window.
    pub fn set_cooldown(&mut self, now_ms: f64) {
        self.block_until_ms = now_ms + self.config.release_cooldown_ms;
    }

    /// Checks run in order; the previous depth is only recorded when the
    /// step is allowed.  `threshold_off` is accepted for symmetry with the
    /// activation report but does not take part in any check.
    pub fn is_allowed(
        &mut self,
        now_ms: f64,
        depth: f64,
        threshold_on: f64,
        _threshold_off: f64,
    ) -> GuardDecision {
        if now_ms < self.block_until_ms {
            return GuardDecision::Cooldown;
        }

        if depth < threshold_on + self.config.edge_band {
            return GuardDecision::EdgeBand;
        }

        if let Some(prev) = self.prev_depth {
            if prev - depth > self.config.drop_guard {
                self.block_until_ms = now_ms + DROP_PENALTY_MS;
                debug!("Zoom blocked: depth dropped {:.1}px", prev - depth);
                return GuardDecision::DepthDrop;
            }
        }

        self.prev_depth = Some(depth);
        GuardDecision::Allowed
    }

    pub fn block_until_ms(&self) -> f64 {
        self.block_until_ms
    }

    pub fn reset(&mut self) {
        self.block_until_ms = 0.0;
        self.prev_depth = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ON: f64 = 125.0;
    const OFF: f64 = 109.0;

    #[test]
    fn test_allows_deep_depth() {
        let mut guard = ZoomGuard::new(GuardConfig::default());
        assert_eq!(guard.is_allowed(0.0, 140.0, ON, OFF), GuardDecision::Allowed);
    }

    #[test]
    fn test_grace_window() {
        let mut guard = ZoomGuard::new(GuardConfig::default());
        guard.set_grace_period(1000.0);
        assert_eq!(guard.is_allowed(1179.0, 140.0, ON, OFF), GuardDecision::Cooldown);
        assert_eq!(guard.is_allowed(1180.0, 140.0, ON, OFF), GuardDecision::Allowed);
    }

    #[test]
    fn test_release_cooldown() {
        let mut guard = ZoomGuard::new(GuardConfig::default());
        guard.set_cooldown(1000.0);
        assert_eq!(guard.block_until_ms(), 1280.0);
        assert_eq!(guard.is_allowed(1200.0, 140.0, ON, OFF), GuardDecision::Cooldown);
    }

    #[test]
    fn test_edge_band() {
        let mut guard = ZoomGuard::new(GuardConfig::default());
        assert_eq!(guard.is_allowed(0.0, 132.9, ON, OFF), GuardDecision::EdgeBand);
        assert_eq!(guard.is_allowed(0.0, 133.0, ON, OFF), GuardDecision::Allowed);
    }

    #[test]
    fn test_depth_drop_arms_penalty() {
        let mut guard = ZoomGuard::new(GuardConfig::default());
        assert!(guard.is_allowed(0.0, 160.0, ON, OFF).is_allowed());
        assert_eq!(guard.is_allowed(10.0, 147.0, ON, OFF), GuardDecision::DepthDrop);
        assert_eq!(guard.block_until_ms(), 10.0 + DROP_PENALTY_MS);
        assert_eq!(guard.is_allowed(100.0, 147.0, ON, OFF), GuardDecision::Cooldown);
        // Previous depth is still the last allowed one.
        assert_eq!(guard.is_allowed(130.0, 147.0, ON, OFF), GuardDecision::DepthDrop);
    }

    #[test]
    fn test_small_drop_tolerated() {
        let mut guard = ZoomGuard::new(GuardConfig::default());
        guard.is_allowed(0.0, 160.0, ON, OFF);
        assert_eq!(guard.is_allowed(10.0, 148.0, ON, OFF), GuardDecision::Allowed);
    }

    #[test]
    fn test_decision_strings() {
        assert_eq!(GuardDecision::Allowed.as_str(), "");
        assert_eq!(GuardDecision::Cooldown.as_str(), "cooldown/grace");
        assert_eq!(GuardDecision::EdgeBand.as_str(), "edge-band");
        assert_eq!(GuardDecision::DepthDrop.as_str(), "z-drop-guard");
    }

    #[test]
    fn test_reset() {
        let mut guard = ZoomGuard::new(GuardConfig::default());
        guard.is_allowed(0.0, 160.0, ON, OFF);
        guard.set_cooldown(0.0);
        guard.reset();
        assert_eq!(guard.block_until_ms(), 0.0);
        assert_eq!(guard.is_allowed(0.0, 140.0, ON, OFF), GuardDecision::Allowed);
    }
}
