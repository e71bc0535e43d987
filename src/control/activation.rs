//! ACTIVE/IDLE activation state machine.
//!
//! Converts the face-to-fingertip depth distance into a binary state.  The
//! first smoothed sample latches a baseline; the entry and exit thresholds
//! are derived from it and kept apart so a single value can never flip the
//! state back and forth.

use tracing::debug;

use crate::signal::EmaFilter;

/// Floor applied to `factor * hysteresis_ratio` for the exit threshold.
const OFF_FACTOR_FLOOR: f64 = 0.8;

/// Minimum gap (pixels) kept between the exit and entry thresholds.
pub const MIN_HYSTERESIS_GAP: f64 = 1.0;

const Z_MARGIN_STEP: f64 = 1.0;
const Z_MARGIN_MAX: f64 = 50.0;
const HYSTERESIS_STEP: f64 = 0.01;
const HYSTERESIS_MIN: f64 = 0.80;
const HYSTERESIS_MAX: f64 = 0.99;

// ── Config ─────────────────────────────────────────────────

/// Tuning for the activation detector.
#[derive(Debug, Clone)]
pub struct ActivationConfig {
    /// Entry threshold as a multiple of the baseline.
    pub factor: f64,
    pub factor_min: f64,
    pub factor_max: f64,
    pub factor_step: f64,
    /// Safety margin (pixels) added on entry and subtracted on exit.
    pub z_margin: f64,
    /// Exit factor relative to the entry factor.
    pub hysteresis_ratio: f64,
    /// EMA coefficient for the depth signal.
    pub ema_alpha: f64,
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            factor: 1.20,
            factor_min: 0.3,
            factor_max: 3.0,
            factor_step: 0.2,
            z_margin: 5.0,
            hysteresis_ratio: 0.95,
            ema_alpha: 0.5,
        }
    }
}

// ── Output ─────────────────────────────────────────────────

/// A state change edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// IDLE → ACTIVE.
    Activated,
    /// ACTIVE → IDLE.
    Released,
}

/// Result of one activation update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivationUpdate {
    pub active: bool,
    pub smoothed: f64,
    pub base_len: f64,
    pub threshold_on: f64,
    pub threshold_off: f64,
    /// Set only on the frame the state changed.
    pub transition: Option<Transition>,
}

// ── State machine ──────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ActivationState {
    factor: f64,
    factor_min: f64,
    factor_max: f64,
    factor_step: f64,
    z_margin: f64,
    hysteresis_ratio: f64,
    filter: EmaFilter,
    active: bool,
    base_len: Option<f64>,
}

impl ActivationState {
    pub fn new(config: &ActivationConfig) -> Self {
        Self {
            factor: config.factor.clamp(config.factor_min, config.factor_max),
            factor_min: config.factor_min,
            factor_max: config.factor_max,
            factor_step: config.factor_step,
            z_margin: config.z_margin,
            hysteresis_ratio: config.hysteresis_ratio,
            filter: EmaFilter::new(config.ema_alpha),
            active: false,
            base_len: None,
        }
    }

    /// Entry and exit thresholds for a given baseline.
    ///
    /// The exit threshold is clamped below the entry threshold: with a low
    /// factor the 0.8 floor would otherwise put it above.
    pub fn thresholds(&self, base: f64) -> (f64, f64) {
        let on = base * self.factor + self.z_margin;
        let off = base * OFF_FACTOR_FLOOR.max(self.factor * self.hysteresis_ratio) - self.z_margin;
        (on, off.min(on - MIN_HYSTERESIS_GAP))
    }

    /// Feed one raw depth distance.
    pub fn update(&mut self, raw_distance: f64) -> ActivationUpdate {
        let smoothed = self.filter.update(raw_distance);
        let base = *self.base_len.get_or_insert(smoothed);
        let (threshold_on, threshold_off) = self.thresholds(base);

        let transition = if !self.active && smoothed >= threshold_on {
            self.active = true;
            Some(Transition::Activated)
        } else if self.active && smoothed < threshold_off {
            self.active = false;
            Some(Transition::Released)
        } else {
            None
        };

        if let Some(t) = transition {
            debug!(
                "Activation {:?}: z={:.1} base={:.1} on={:.1} off={:.1}",
                t, smoothed, base, threshold_on, threshold_off
            );
        }

        ActivationUpdate {
            active: self.active,
            smoothed,
            base_len: base,
            threshold_on,
            threshold_off,
            transition,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn base_len(&self) -> Option<f64> {
        self.base_len
    }

    pub fn smoothed(&self) -> Option<f64> {
        self.filter.value()
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn z_margin(&self) -> f64 {
        self.z_margin
    }

    pub fn hysteresis_ratio(&self) -> f64 {
        self.hysteresis_ratio
    }

    /// Reseed the baseline from the current smoothed value.
    pub fn reset_baseline(&mut self) {
        if let Some(v) = self.filter.value() {
            self.base_len = Some(v);
        }
    }

    // ── Adjusters (saturating) ────────────────────────────

    pub fn increase_factor(&mut self) -> f64 {
        self.factor = (self.factor + self.factor_step).min(self.factor_max);
        self.factor
    }

    pub fn decrease_factor(&mut self) -> f64 {
        self.factor = (self.factor - self.factor_step).max(self.factor_min);
        self.factor
    }

    pub fn increase_z_margin(&mut self) -> f64 {
        self.z_margin = (self.z_margin + Z_MARGIN_STEP).min(Z_MARGIN_MAX);
        self.z_margin
    }

    pub fn decrease_z_margin(&mut self) -> f64 {
        self.z_margin = (self.z_margin - Z_MARGIN_STEP).max(0.0);
        self.z_margin
    }

    pub fn increase_hysteresis(&mut self) -> f64 {
        self.hysteresis_ratio = (self.hysteresis_ratio + HYSTERESIS_STEP).min(HYSTERESIS_MAX);
        self.hysteresis_ratio
    }

    pub fn decrease_hysteresis(&mut self) -> f64 {
        self.hysteresis_ratio = (self.hysteresis_ratio - HYSTERESIS_STEP).max(HYSTERESIS_MIN);
        self.hysteresis_ratio
    }

    /// Clear filter, baseline and state.
    pub fn reset(&mut self) {
        self.filter.reset();
        self.base_len = None;
        self.active = false;
    }
}

// ── Tests ──────────────────────────────────────────────────
