//! Pinch-to-zoom quantizer.
//!
//! Turns the thumb-index pinch distance into signed zoom steps.  The pinch
//! is first rescaled by `reference_z / current_z` so that moving the hand
//! nearer to or farther from the camera does not read as a pinch.  Steps
//! are issued incrementally: the quantizer tracks how many steps the caller
//! has already sent and only reports the difference to the current target.

use tracing::debug;

use crate::signal::EmaFilter;

// ── Config ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ZoomConfig {
    /// Pinch change (pixels) per zoom step.
    pub px_per_step: f64,
    /// Pinch changes within this many pixels of the base produce no steps.
    pub deadzone_px: f64,
    /// Cap on steps reported in a single frame.
    pub max_steps_per_frame: i32,
    /// Rescale the pinch by depth.
    pub normalization_enabled: bool,
    /// Depth samples below this are ignored for normalisation.
    pub min_depth: f64,
    /// Depth samples averaged into the reference depth.
    pub reference_samples: usize,
    pub ema_alpha: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            px_per_step: 30.0,
            deadzone_px: 3.0,
            max_steps_per_frame: 6,
            normalization_enabled: true,
            min_depth: 20.0,
            reference_samples: 5,
            ema_alpha: 0.5,
        }
    }
}

// ── Report ─────────────────────────────────────────────────

/// Diagnostics and result for one pinch sample.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomReport {
    pub raw_pinch: f64,
    pub normalized_pinch: f64,
    pub smoothed_pinch: f64,
    pub z_avg: Option<f64>,
    pub reference_z: Option<f64>,
    pub scale_factor: f64,
    pub base_pinch: Option<f64>,
    pub delta: f64,
    pub steps_total: i32,
    /// Steps the caller should emit now (and then `commit`).
    pub steps_to_fire: i32,
    /// Still collecting depth samples for the reference.
    pub collecting_reference: bool,
}

// ── Quantizer ──────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PinchZoom {
    config: ZoomConfig,
    filter: EmaFilter,
    base_pinch: Option<f64>,
    prev_steps_sent: i32,
    reference_z: Option<f64>,
    z_samples: Vec<f64>,
}

impl PinchZoom {
    pub fn new(config: ZoomConfig) -> Self {
        let filter = EmaFilter::new(config.ema_alpha);
        Self {
            config,
            filter,
            base_pinch: None,
            prev_steps_sent: 0,
            reference_z: None,
            z_samples: Vec::new(),
        }
    }

    pub fn config(&self) -> &ZoomConfig {
        &self.config
    }

    /// Process one pinch sample.
    ///
    /// `depths` are the depth proxies of the two pinching fingertips.  When
    /// normalisation is enabled but depths are missing, the raw pinch is
    /// used for this frame.
    pub fn process(&mut self, raw_pinch: f64, depths: Option<(f64, f64)>) -> ZoomReport {
        let mut report = ZoomReport {
            raw_pinch,
            normalized_pinch: raw_pinch,
            smoothed_pinch: raw_pinch,
            z_avg: None,
            reference_z: self.reference_z,
            scale_factor: 1.0,
            base_pinch: self.base_pinch,
            delta: 0.0,
            steps_total: 0,
            steps_to_fire: 0,
            collecting_reference: false,
        };

        let mut normalized = raw_pinch;
        if self.config.normalization_enabled {
            if let Some((z1, z2)) = depths {
                let z_avg = (z1.abs() + z2.abs()) / 2.0;
                report.z_avg = Some(z_avg);

                if self.reference_z.is_none() {
                    self.collect_reference(z_avg);
                    report.reference_z = self.reference_z;
                    report.collecting_reference = self.reference_z.is_none();
                }

                if let Some(reference) = self.reference_z {
                    if z_avg >= self.config.min_depth {
                        report.scale_factor = reference / z_avg;
                        normalized = raw_pinch * report.scale_factor;
                    }
                }
            } else {
                report.collecting_reference = self.reference_z.is_none();
            }
        }
        report.normalized_pinch = normalized;

        let smoothed = self.filter.update(normalized);
        report.smoothed_pinch = smoothed;

        // The zero-step reference is only latched once calibration is done.
        let calibrated = !self.config.normalization_enabled || self.reference_z.is_some();
        if self.base_pinch.is_none() && calibrated {
            self.base_pinch = Some(smoothed);
            self.prev_steps_sent = 0;
            debug!("Zoom base latched at {:.1}px", smoothed);
        }
        report.base_pinch = self.base_pinch;

        let Some(base) = self.base_pinch else {
            return report;
        };

        let delta = smoothed - base;
        let steps_total = self.steps_for_delta(delta);
        // Widened: both totals may sit at the i32 limits.
        let pending = i64::from(steps_total) - i64::from(self.prev_steps_sent);
        let cap = i64::from(self.config.max_steps_per_frame.max(0));
        let steps_to_fire = pending.clamp(-cap, cap) as i32;

        report.delta = delta;
        report.steps_total = steps_total;
        report.steps_to_fire = steps_to_fire;
        report
    }

    /// Quantize a pinch delta into a total step count.
    pub fn steps_for_delta(&self, delta: f64) -> i32 {
        if delta.abs() <= self.config.deadzone_px {
            0
        } else {
            (delta / self.config.px_per_step).round_ties_even() as i32
        }
    }

    /// Record that `steps` were actually emitted.
    pub fn commit(&mut self, steps: i32) {
        self.prev_steps_sent = self.prev_steps_sent.saturating_add(steps);
    }

    fn collect_reference(&mut self, z_avg: f64) {
        if z_avg >= self.config.min_depth {
            self.z_samples.push(z_avg);
        }
        if self.z_samples.len() >= self.config.reference_samples.max(1) {
            let mean = self.z_samples.iter().sum::<f64>() / self.z_samples.len() as f64;
            self.reference_z = Some(mean);
            debug!("Zoom reference depth fixed at {:.1}", mean);
        }
    }

    pub fn prev_steps_sent(&self) -> i32 {
        self.prev_steps_sent
    }

    pub fn reference_z(&self) -> Option<f64> {
        self.reference_z
    }

    pub fn base_pinch(&self) -> Option<f64> {
        self.base_pinch
    }

    pub fn normalization_enabled(&self) -> bool {
        self.config.normalization_enabled
    }

    /// Flip perspective normalisation; clears all session state.
    pub fn toggle_normalization(&mut self) -> bool {
        self.config.normalization_enabled = !self.config.normalization_enabled;
        self.reset();
        self.config.normalization_enabled
    }

    pub fn reset(&mut self) {
        self.base_pinch = None;
        self.prev_steps_sent = 0;
        self.reference_z = None;
        self.z_samples.clear();
        self.filter.reset();
    }
}

// ── Tests ──────────────────────────────────────────────────
