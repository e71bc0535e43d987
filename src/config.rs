//! Pipeline configuration.
//!
//! Every component has its own `…Config` with defaults.  `PipelineConfig`
//! bundles them and can be overridden from a keyword plist, e.g.
//!
//! ```text
//! (:factor 1.4 :z-margin 6 :normalization nil :screen-width 2560)
//! ```

use lexpr::Value;
use tracing::debug;

use crate::control::{ActivationConfig, CursorConfig, GuardConfig, ZoomConfig};
use crate::error::{PipelineError, Result};
use crate::gesture::{GestureConfig, KeyboardConfig, ScrollConfig};
use crate::sexp::{as_f64, bool_sexp, get_keyword, plist_get, plist_keys};

#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub activation: ActivationConfig,
    pub zoom: ZoomConfig,
    pub guard: GuardConfig,
    pub gesture: GestureConfig,
    pub scroll: ScrollConfig,
    pub cursor: CursorConfig,
    pub keyboard: KeyboardConfig,
}

impl PipelineConfig {
    /// Defaults overridden by the plist in `text`.
    pub fn from_sexp(text: &str) -> Result<Self> {
        let mut config = Self::default();
        config.apply_sexp(text)?;
        Ok(config)
    }

    /// Apply overrides from a plist string on top of the current values.
    pub fn apply_sexp(&mut self, text: &str) -> Result<()> {
        let value = lexpr::from_str(text).map_err(|e| PipelineError::Parse(e.to_string()))?;
        self.apply_value(&value)
    }

    pub fn apply_value(&mut self, value: &Value) -> Result<()> {
        if !matches!(value, Value::Cons(_) | Value::Null | Value::Nil) {
            return Err(PipelineError::Parse("config must be a plist".into()));
        }
        for key in plist_keys(value) {
            self.apply_key(value, &key)?;
            debug!("Config override :{}", key);
        }
        self.validate()
    }

    fn apply_key(&mut self, plist: &Value, key: &str) -> Result<()> {
        let a = &mut self.activation;
        let z = &mut self.zoom;
        let g = &mut self.guard;
        let r = &mut self.gesture;
        let s = &mut self.scroll;
        let c = &mut self.cursor;
        let k = &mut self.keyboard;

        match key {
            // Activation
            "factor" => a.factor = float(plist, key)?,
            "factor-min" => a.factor_min = float(plist, key)?,
            "factor-max" => a.factor_max = float(plist, key)?,
            "factor-step" => a.factor_step = non_negative(plist, key)?,
            "z-margin" => a.z_margin = non_negative(plist, key)?,
            "hysteresis-ratio" => a.hysteresis_ratio = float(plist, key)?,
            "depth-alpha" => a.ema_alpha = float(plist, key)?,
            // Zoom
            "px-per-step" => z.px_per_step = positive(plist, key)?,
            "deadzone-px" => z.deadzone_px = non_negative(plist, key)?,
            "max-steps-per-frame" => z.max_steps_per_frame = small_count(plist, key)?,
            "normalization" => z.normalization_enabled = boolean(plist, key)?,
            "min-depth" => z.min_depth = non_negative(plist, key)?,
            "reference-samples" => z.reference_samples = count(plist, key)? as usize,
            "pinch-alpha" => z.ema_alpha = float(plist, key)?,
            // Guard
            "active-grace-ms" => g.active_grace_ms = non_negative(plist, key)?,
            "release-cooldown-ms" => g.release_cooldown_ms = non_negative(plist, key)?,
            "edge-band" => g.edge_band = float(plist, key)?,
            "drop-guard" => g.drop_guard = non_negative(plist, key)?,
            // Finger gestures
            "click-engage-deg" => r.click_engage_deg = float(plist, key)?,
            "click-release-deg" => r.click_release_deg = float(plist, key)?,
            "drag-engage-deg" => r.drag_engage_deg = float(plist, key)?,
            "drag-release-deg" => r.drag_release_deg = float(plist, key)?,
            "click-refractory-ms" => r.click_refractory_ms = non_negative(plist, key)?,
            "pose-extended-deg" => r.pose_extended_deg = float(plist, key)?,
            "pose-curled-deg" => r.pose_curled_deg = float(plist, key)?,
            "hold-duration-ms" => r.hold_duration_ms = non_negative(plist, key)?,
            // Scroll
            "scroll-unit" => s.scroll_unit = positive(plist, key)?,
            "scroll-delay-ms" => s.delay_ms = non_negative(plist, key)?,
            "scroll-pinch-threshold" => s.pinch_threshold = positive(plist, key)?,
            // Cursor
            "screen-width" => c.screen_width = count(plist, key)?,
            "screen-height" => c.screen_height = count(plist, key)?,
            "cursor-alpha" => c.ema_alpha = float(plist, key)?,
            "move-threshold" => c.move_threshold = small_count(plist, key)?,
            "mirror" => c.mirror = boolean(plist, key)?,
            "cursor-enabled" => c.enabled = boolean(plist, key)?,
            "change-cursor-shape" => c.change_shape_on_active = boolean(plist, key)?,
            // Keyboard
            "key-size" => k.key_size = positive(plist, key)?,
            "key-spacing" => k.key_spacing = non_negative(plist, key)?,
            "keyboard-y-start" => k.y_start = float(plist, key)?,
            "key-cooldown-ms" => k.key_cooldown_ms = non_negative(plist, key)?,
            "typing" => k.typing_enabled = boolean(plist, key)?,
            "keyboard-visible" => k.visible = boolean(plist, key)?,
            other => {
                return Err(PipelineError::InvalidValue {
                    key: other.to_string(),
                    reason: "unknown key".into(),
                })
            }
        }
        Ok(())
    }

    /// Cross-field checks.
    pub fn validate(&self) -> Result<()> {
        let a = &self.activation;
        if a.factor_min > a.factor_max {
            return Err(PipelineError::InvalidValue {
                key: "factor-min".into(),
                reason: format!("{} exceeds factor-max {}", a.factor_min, a.factor_max),
            });
        }
        let r = &self.gesture;
        if r.click_engage_deg >= r.click_release_deg {
            return Err(PipelineError::InvalidValue {
                key: "click-engage-deg".into(),
                reason: "must be below click-release-deg".into(),
            });
        }
        if r.drag_engage_deg >= r.drag_release_deg {
            return Err(PipelineError::InvalidValue {
                key: "drag-engage-deg".into(),
                reason: "must be below drag-release-deg".into(),
            });
        }
        if self.cursor.screen_width == 0 || self.cursor.screen_height == 0 {
            return Err(PipelineError::InvalidValue {
                key: "screen-width".into(),
                reason: "screen size must be non-zero".into(),
            });
        }
        Ok(())
    }

    /// Effective values as a plist accepted by `from_sexp`.
    pub fn config_sexp(&self) -> String {
        let a = &self.activation;
        let z = &self.zoom;
        let g = &self.guard;
        let r = &self.gesture;
        let s = &self.scroll;
        let c = &self.cursor;
        let k = &self.keyboard;
        format!(
            "(:factor {} :factor-min {} :factor-max {} :factor-step {} :z-margin {} \
             :hysteresis-ratio {} :depth-alpha {} \
             :px-per-step {} :deadzone-px {} :max-steps-per-frame {} :normalization {} \
             :min-depth {} :reference-samples {} :pinch-alpha {} \
             :active-grace-ms {} :release-cooldown-ms {} :edge-band {} :drop-guard {} \
             :click-engage-deg {} :click-release-deg {} :drag-engage-deg {} \
             :drag-release-deg {} :click-refractory-ms {} :pose-extended-deg {} \
             :pose-curled-deg {} :hold-duration-ms {} \
             :scroll-unit {} :scroll-delay-ms {} :scroll-pinch-threshold {} \
             :screen-width {} :screen-height {} :cursor-alpha {} :move-threshold {} \
             :mirror {} :cursor-enabled {} :change-cursor-shape {} \
             :key-size {} :key-spacing {} :keyboard-y-start {} :key-cooldown-ms {} \
             :typing {} :keyboard-visible {})",
            num(a.factor),
            num(a.factor_min),
            num(a.factor_max),
            num(a.factor_step),
            num(a.z_margin),
            num(a.hysteresis_ratio),
            num(a.ema_alpha),
            num(z.px_per_step),
            num(z.deadzone_px),
            z.max_steps_per_frame,
            bool_sexp(z.normalization_enabled),
            num(z.min_depth),
            z.reference_samples,
            num(z.ema_alpha),
            num(g.active_grace_ms),
            num(g.release_cooldown_ms),
            num(g.edge_band),
            num(g.drop_guard),
            num(r.click_engage_deg),
            num(r.click_release_deg),
            num(r.drag_engage_deg),
            num(r.drag_release_deg),
            num(r.click_refractory_ms),
            num(r.pose_extended_deg),
            num(r.pose_curled_deg),
            num(r.hold_duration_ms),
            num(s.scroll_unit),
            num(s.delay_ms),
            num(s.pinch_threshold),
            c.screen_width,
            c.screen_height,
            num(c.ema_alpha),
            c.move_threshold,
            bool_sexp(c.mirror),
            bool_sexp(c.enabled),
            bool_sexp(c.change_shape_on_active),
            num(k.key_size),
            num(k.key_spacing),
            num(k.y_start),
            num(k.key_cooldown_ms),
            bool_sexp(k.typing_enabled),
            bool_sexp(k.visible),
        )
    }
}

// ── Value extraction ───────────────────────────────────────

/// Floats always render with a decimal point so they read back as floats.
fn num(v: f64) -> String {
    if v.fract() == 0.0 && v.is_finite() {
        format!("{:.1}", v)
    } else {
        format!("{}", v)
    }
}

fn invalid(key: &str, reason: &str) -> PipelineError {
    PipelineError::InvalidValue {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn float(plist: &Value, key: &str) -> Result<f64> {
    let v = plist_get(plist, key).ok_or_else(|| PipelineError::MissingField(key.to_string()))?;
    let x = as_f64(v).ok_or_else(|| invalid(key, "expected a number"))?;
    if !x.is_finite() {
        return Err(invalid(key, "must be finite"));
    }
    Ok(x)
}

fn non_negative(plist: &Value, key: &str) -> Result<f64> {
    let x = float(plist, key)?;
    if x < 0.0 {
        return Err(invalid(key, "must not be negative"));
    }
    Ok(x)
}

fn positive(plist: &Value, key: &str) -> Result<f64> {
    let x = float(plist, key)?;
    if x <= 0.0 {
        return Err(invalid(key, "must be positive"));
    }
    Ok(x)
}

/// Non-negative integer.
fn count(plist: &Value, key: &str) -> Result<u32> {
    let x = float(plist, key)?;
    if x < 0.0 || x.fract() != 0.0 || x > f64::from(u32::MAX) {
        return Err(invalid(key, "expected a non-negative integer"));
    }
    Ok(x as u32)
}

/// Non-negative integer that fits an `i32`.
fn small_count(plist: &Value, key: &str) -> Result<i32> {
    i32::try_from(count(plist, key)?).map_err(|_| invalid(key, "exceeds i32::MAX"))
}

fn boolean(plist: &Value, key: &str) -> Result<bool> {
    match get_keyword(plist, key).as_deref() {
        Some("t") | Some("#t") => Ok(true),
        Some("nil") | Some("#f") => Ok(false),
        Some(_) => Err(invalid(key, "expected t or nil")),
        None => Err(PipelineError::MissingField(key.to_string())),
    }
}
