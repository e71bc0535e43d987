//! Angle-threshold gesture recognition.
//!
//! Each digit's bend is measured as the interior angle at one joint: 180°
//! is a straight finger, smaller values are more curled.  Click and drag
//! use independent hysteretic latches so a finger hovering at one angle
//! never retriggers.

use tracing::debug;

use super::landmarks::{Finger, HandObservation};
use crate::signal::geometry::joint_angle;

// ── Config ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct GestureConfig {
    /// Index angle (degrees) at or below which a click engages.
    pub click_engage_deg: f64,
    /// Index angle at or above which the click latch releases.
    pub click_release_deg: f64,
    pub drag_engage_deg: f64,
    pub drag_release_deg: f64,
    /// Minimum time between two clicks.
    pub click_refractory_ms: f64,
    /// Angle above which a digit counts as extended in the mode pose.
    pub pose_extended_deg: f64,
    /// Angle below which a digit counts as curled in the mode pose.
    pub pose_curled_deg: f64,
    /// How long the mode pose must be held.
    pub hold_duration_ms: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            click_engage_deg: 150.0,
            click_release_deg: 165.0,
            drag_engage_deg: 150.0,
            drag_release_deg: 165.0,
            click_refractory_ms: 250.0,
            pose_extended_deg: 150.0,
            pose_curled_deg: 140.0,
            hold_duration_ms: 2000.0,
        }
    }
}

// ── Finger angles ──────────────────────────────────────────

/// Bend angle (degrees) of every digit of one hand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FingerAngles {
    angles: [f64; 5],
}

impl FingerAngles {
    pub fn from_hand(hand: &HandObservation) -> Self {
        let mut angles = [0.0; 5];
        for (slot, finger) in angles.iter_mut().zip(Finger::ALL) {
            let [a, b, c] = finger.bend_joint();
            *slot = joint_angle(&hand.point(a), &hand.point(b), &hand.point(c));
        }
        Self { angles }
    }

    pub fn get(&self, finger: Finger) -> f64 {
        self.angles[finger as usize]
    }

    pub fn thumb(&self) -> f64 {
        self.get(Finger::Thumb)
    }

    pub fn index(&self) -> f64 {
        self.get(Finger::Index)
    }

    pub fn middle(&self) -> f64 {
        self.get(Finger::Middle)
    }

    pub fn ring(&self) -> f64 {
        self.get(Finger::Ring)
    }

    pub fn pinky(&self) -> f64 {
        self.get(Finger::Pinky)
    }
}

/// Thumb and pinky extended with the three middle digits curled.
pub fn is_mode_switch_pose(angles: &FingerAngles, config: &GestureConfig) -> bool {
    let extended = config.pose_extended_deg;
    let curled = config.pose_curled_deg;
    angles.thumb() > extended
        && angles.index() < curled
        && angles.middle() < curled
        && angles.ring() < curled
        && angles.pinky() > extended
}

// ── Latch ──────────────────────────────────────────────────

/// Edge reported by a `Latch` update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatchEdge {
    None,
    Engaged,
    Released,
}

/// Boolean latch with separate engage and release angles.
#[derive(Debug, Clone)]
pub struct Latch {
    engage_at: f64,
    release_at: f64,
    engaged: bool,
}

impl Latch {
    pub fn new(engage_at: f64, release_at: f64) -> Self {
        Self {
            engage_at,
            release_at,
            engaged: false,
        }
    }

    pub fn update(&mut self, angle: f64) -> LatchEdge {
        if !self.engaged && angle <= self.engage_at {
            self.engaged = true;
            LatchEdge::Engaged
        } else if self.engaged && angle >= self.release_at {
            self.engaged = false;
            LatchEdge::Released
        } else {
            LatchEdge::None
        }
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    pub fn reset(&mut self) {
        self.engaged = false;
    }
}

// ── Click refractory ───────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ClickGate {
    refractory_ms: f64,
    last_click_ms: Option<f64>,
}

impl ClickGate {
    pub fn new(refractory_ms: f64) -> Self {
        Self {
            refractory_ms,
            last_click_ms: None,
        }
    }

    pub fn can_click(&self, now_ms: f64) -> bool {
        self.last_click_ms
            .map_or(true, |last| now_ms - last > self.refractory_ms)
    }

    pub fn register(&mut self, now_ms: f64) {
        self.last_click_ms = Some(now_ms);
    }

    pub fn reset(&mut self) {
        self.last_click_ms = None;
    }
}

// ── Click/drag recognizer ──────────────────────────────────

/// Edges produced by one recognizer update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerGestures {
    pub click: bool,
    pub drag_start: bool,
    pub drag_end: bool,
}

/// Index-finger click and middle-finger drag.
#[derive(Debug, Clone)]
pub struct ClickDragRecognizer {
    click: Latch,
    drag: Latch,
    gate: ClickGate,
}

impl ClickDragRecognizer {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            click: Latch::new(config.click_engage_deg, config.click_release_deg),
            drag: Latch::new(config.drag_engage_deg, config.drag_release_deg),
            gate: ClickGate::new(config.click_refractory_ms),
        }
    }

    pub fn update(&mut self, angles: &FingerAngles, now_ms: f64) -> PointerGestures {
        let mut out = PointerGestures::default();

        if self.click.update(angles.index()) == LatchEdge::Engaged {
            if self.gate.can_click(now_ms) {
                self.gate.register(now_ms);
                out.click = true;
                debug!("Click at index angle {:.1}", angles.index());
            } else {
                debug!("Click suppressed by refractory period");
            }
        }

        match self.drag.update(angles.middle()) {
            LatchEdge::Engaged => out.drag_start = true,
            LatchEdge::Released => out.drag_end = true,
            LatchEdge::None => {}
        }
        out
    }

    /// Release the latches; the refractory timer survives.
    pub fn release(&mut self) {
        self.click.reset();
        self.drag.reset();
    }

    pub fn reset(&mut self) {
        self.release();
        self.gate.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::landmarks::hand_with_angles;

    fn angles(values: [f64; 5]) -> FingerAngles {
        FingerAngles::from_hand(&hand_with_angles([400.0, 400.0], values))
    }

    #[test]
    fn test_finger_angles_from_hand() {
        let a = angles([170.0, 120.0, 100.0, 130.0, 175.0]);
        assert!((a.thumb() - 170.0).abs() < 1e-6);
        assert!((a.index() - 120.0).abs() < 1e-6);
        assert!((a.middle() - 100.0).abs() < 1e-6);
        assert!((a.ring() - 130.0).abs() < 1e-6);
        assert!((a.pinky() - 175.0).abs() < 1e-6);
    }

    #[test]
    fn test_mode_switch_pose() {
        let config = GestureConfig::default();
        assert!(is_mode_switch_pose(&angles([170.0, 100.0, 100.0, 100.0, 170.0]), &config));
        // Open hand.
        assert!(!is_mode_switch_pose(&angles([170.0; 5]), &config));
        // Pinky curled.
        assert!(!is_mode_switch_pose(&angles([170.0, 100.0, 100.0, 100.0, 120.0]), &config));
        // Thumb not extended far enough.
        assert!(!is_mode_switch_pose(&angles([145.0, 100.0, 100.0, 100.0, 170.0]), &config));
    }

    #[test]
    fn test_latch_hysteresis() {
        let mut latch = Latch::new(150.0, 165.0);
        assert_eq!(latch.update(170.0), LatchEdge::None);
        assert_eq!(latch.update(150.0), LatchEdge::Engaged);
        assert_eq!(latch.update(140.0), LatchEdge::None);
        assert_eq!(latch.update(160.0), LatchEdge::None);
        assert!(latch.is_engaged());
        assert_eq!(latch.update(165.0), LatchEdge::Released);
        assert_eq!(latch.update(155.0), LatchEdge::None);
    }

    #[test]
    fn test_click_fires_once_per_bend() {
        let mut rec = ClickDragRecognizer::new(&GestureConfig::default());
        let bent = angles([170.0, 120.0, 170.0, 170.0, 170.0]);
        let straight = angles([170.0; 5]);

        assert!(rec.update(&bent, 0.0).click);
        assert!(!rec.update(&bent, 300.0).click);
        rec.update(&straight, 400.0);
        assert!(rec.update(&bent, 700.0).click);
    }

    #[test]
    fn test_click_refractory() {
        let mut rec = ClickDragRecognizer::new(&GestureConfig::default());
        let bent = angles([170.0, 120.0, 170.0, 170.0, 170.0]);
        let straight = angles([170.0; 5]);

        assert!(rec.update(&bent, 0.0).click);
        rec.update(&straight, 50.0);
        assert!(!rec.update(&bent, 100.0).click);
        rec.update(&straight, 150.0);
        assert!(rec.update(&bent, 260.0).click);
    }

    #[test]
    fn test_click_gate_boundary_is_exclusive() {
        let mut gate = ClickGate::new(250.0);
        assert!(gate.can_click(0.0));
        gate.register(0.0);
        assert!(!gate.can_click(250.0));
        assert!(gate.can_click(250.5));
    }

    #[test]
    fn test_drag_edges() {
        let mut rec = ClickDragRecognizer::new(&GestureConfig::default());
        let bent = angles([170.0, 170.0, 120.0, 170.0, 170.0]);
        let half = angles([170.0, 170.0, 158.0, 170.0, 170.0]);
        let straight = angles([170.0; 5]);

        let g = rec.update(&bent, 0.0);
        assert!(g.drag_start && !g.drag_end && !g.click);
        assert_eq!(rec.update(&half, 10.0), PointerGestures::default());
        let g = rec.update(&straight, 20.0);
        assert!(g.drag_end && !g.drag_start);
    }

    #[test]
    fn test_release_keeps_refractory() {
        let mut rec = ClickDragRecognizer::new(&GestureConfig::default());
        let bent = angles([170.0, 120.0, 170.0, 170.0, 170.0]);
        assert!(rec.update(&bent, 0.0).click);
        rec.release();
        assert!(!rec.update(&bent, 100.0).click);
        rec.reset();
        assert!(rec.update(&bent, 110.0).click);
    }
}
