//! Per-frame orchestration.
//!
//! `Session` owns every filter, state machine and recognizer and turns one
//! `LandmarkFrame` into an ordered list of `InputEvent`s.  It also owns the
//! cross-component reset rules: an activation edge resets the zoom session,
//! losing the face or hand releases any held drag and cursor shape, and a
//! mode switch does both.

use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::control::{
    ActivationState, ActivationUpdate, CursorMapper, GuardDecision, PinchZoom, Transition,
    ZoomGuard, ZoomReport,
};
use crate::error::Result;
use crate::event::{InputEvent, Mode};
use crate::gesture::landmarks::{HandLandmark, HandObservation, LandmarkFrame};
use crate::gesture::recognizer::is_mode_switch_pose;
use crate::gesture::{
    ClickDragRecognizer, DualHandScroll, FingerAngles, HoldGesture, VirtualKeyboard,
};
use crate::sexp::{bool_sexp, opt_float_sexp};
use crate::signal::geometry::normalize_coordinates;

// ── Status ─────────────────────────────────────────────────

/// Snapshot of session state for display and diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStatus {
    pub mode: Mode,
    pub active: bool,
    pub depth: Option<f64>,
    pub base_len: Option<f64>,
    pub threshold_on: Option<f64>,
    pub threshold_off: Option<f64>,
    pub factor: f64,
    pub z_margin: f64,
    pub hysteresis_ratio: f64,
    /// The mode-switch pose is currently held.
    pub pose_held: bool,
    pub hold_progress: f64,
    pub zoom_normalization: bool,
    pub zoom_collecting_reference: bool,
    pub zoom_reference_z: Option<f64>,
    pub last_guard: Option<GuardDecision>,
    pub dragging: bool,
    pub cursor_enabled: bool,
    pub mirror: bool,
    pub frames: u64,
}

// ── Session ────────────────────────────────────────────────

pub struct Session {
    config: PipelineConfig,
    mode: Mode,
    activation: ActivationState,
    zoom: PinchZoom,
    guard: ZoomGuard,
    recognizer: ClickDragRecognizer,
    hold: HoldGesture,
    scroll: DualHandScroll,
    cursor: CursorMapper,
    keyboard: VirtualKeyboard,
    cursor_enabled: bool,
    /// A drag is held on the host.
    dragging: bool,
    /// The host cursor currently shows the active shape.
    cursor_shape_active: bool,
    /// Timestamp of the last processed frame.
    last_frame_ms: f64,
    last_activation: Option<ActivationUpdate>,
    last_zoom: Option<ZoomReport>,
    last_guard: Option<GuardDecision>,
    frames: u64,
}

impl Session {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            mode: Mode::Touch,
            activation: ActivationState::new(&config.activation),
            zoom: PinchZoom::new(config.zoom.clone()),
            guard: ZoomGuard::new(config.guard.clone()),
            recognizer: ClickDragRecognizer::new(&config.gesture),
            hold: HoldGesture::new(config.gesture.hold_duration_ms),
            scroll: DualHandScroll::new(config.scroll.clone()),
            cursor: CursorMapper::new(&config.cursor),
            keyboard: VirtualKeyboard::new(&config.keyboard),
            cursor_enabled: config.cursor.enabled,
            dragging: false,
            cursor_shape_active: false,
            last_frame_ms: 0.0,
            last_activation: None,
            last_zoom: None,
            last_guard: None,
            frames: 0,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn last_zoom(&self) -> Option<&ZoomReport> {
        self.last_zoom.as_ref()
    }

    /// Run the whole pipeline on one frame.
    pub fn process_frame(&mut self, frame: &LandmarkFrame) -> Result<Vec<InputEvent>> {
        self.frames += 1;
        let now = frame.timestamp_ms;
        self.last_frame_ms = now;
        let mut events = Vec::new();

        // Mode-switch pose on any hand, confirmed by holding it.
        let mut pose_held = false;
        if frame.hands.is_empty() {
            self.hold.reset();
        } else {
            pose_held = frame
                .hands
                .iter()
                .any(|h| is_mode_switch_pose(&FingerAngles::from_hand(h), &self.config.gesture));
            if self.hold.update(pose_held, now).fired {
                self.mode = self.mode.toggled();
                info!("Mode switched to {}", self.mode.as_str());
                events.push(InputEvent::ModeToggle { mode: self.mode });
                self.release_all(&mut events);
            }
        }

        let hand = frame.control_hand();

        if self.mode == Mode::Touch && self.cursor_enabled {
            if let Some(hand) = hand {
                let anchor = hand.cursor_anchor();
                let (nx, ny) = normalize_coordinates(
                    anchor[0],
                    anchor[1],
                    frame.image_width,
                    frame.image_height,
                );
                let update = self.cursor.map_to_screen(nx, ny)?;
                if update.moved {
                    events.push(InputEvent::CursorMove {
                        x: update.x,
                        y: update.y,
                    });
                }
            }
        }

        let (Some(face), Some(hand)) = (frame.face.as_ref(), hand) else {
            self.release_all(&mut events);
            return Ok(events);
        };

        match self.mode {
            Mode::Touch => {
                let depth = (face.eye_mid_z - hand.index_tip_z).abs();
                self.process_touch(frame, hand, depth, pose_held, &mut events);
            }
            Mode::Keyboard => {
                let angles = FingerAngles::from_hand(hand);
                let pointer = hand.point(HandLandmark::IndexMcp);
                if let Some(key) = self.keyboard.process(pointer, angles.index(), now) {
                    events.push(InputEvent::KeyPress {
                        key: key.to_string(),
                    });
                }
            }
        }
        Ok(events)
    }

    fn process_touch(
        &mut self,
        frame: &LandmarkFrame,
        hand: &HandObservation,
        depth: f64,
        pose_held: bool,
        events: &mut Vec<InputEvent>,
    ) {
        let now = frame.timestamp_ms;
        let update = self.activation.update(depth);
        self.last_activation = Some(update);

        match update.transition {
            Some(Transition::Activated) => {
                self.guard.set_grace_period(now);
                self.apply_cursor_shape(events);
                self.end_drag(events);
                self.zoom.reset();
            }
            Some(Transition::Released) => {
                self.guard.set_cooldown(now);
                self.restore_cursor_shape(events);
                self.zoom.reset();
            }
            None => {}
        }

        if update.active {
            if let Some(thumb_z) = hand.thumb_tip_z {
                let report = self
                    .zoom
                    .process(hand.pinch_distance(), Some((hand.index_tip_z, thumb_z)));
                let decision = self.guard.is_allowed(
                    now,
                    update.smoothed,
                    update.threshold_on,
                    update.threshold_off,
                );
                if !decision.is_allowed() {
                    debug!("Zoom blocked: {}", decision.as_str());
                } else if report.steps_to_fire != 0 {
                    events.push(InputEvent::ZoomStep {
                        steps: report.steps_to_fire,
                    });
                    self.zoom.commit(report.steps_to_fire);
                }
                self.last_guard = Some(decision);
                self.last_zoom = Some(report);
            }
        } else if pose_held {
            self.end_drag(events);
        } else {
            let angles = FingerAngles::from_hand(hand);
            let gestures = self.recognizer.update(&angles, now);
            if gestures.click {
                events.push(InputEvent::Click);
            }
            if gestures.drag_start && !self.dragging {
                self.dragging = true;
                events.push(InputEvent::DragStart);
            }
            if gestures.drag_end {
                self.end_drag(events);
            }
        }

        for direction in self.scroll.update(frame) {
            events.push(InputEvent::ScrollStep {
                axis: direction.axis(),
                direction,
            });
        }
    }

    // ── Held resources ────────────────────────────────────

    fn end_drag(&mut self, events: &mut Vec<InputEvent>) {
        if self.dragging {
            self.dragging = false;
            events.push(InputEvent::DragEnd);
        }
    }

    fn apply_cursor_shape(&mut self, events: &mut Vec<InputEvent>) {
        if self.config.cursor.change_shape_on_active && !self.cursor_shape_active {
            self.cursor_shape_active = true;
            events.push(InputEvent::CursorShape { active: true });
        }
    }

    fn restore_cursor_shape(&mut self, events: &mut Vec<InputEvent>) {
        if self.cursor_shape_active {
            self.cursor_shape_active = false;
            events.push(InputEvent::CursorShape { active: false });
        }
    }

    /// Release drag and cursor shape, and clear every transient gesture
    /// session.  Activation state and calibration are kept.
    fn release_all(&mut self, events: &mut Vec<InputEvent>) {
        self.end_drag(events);
        self.restore_cursor_shape(events);
        self.zoom.reset();
        self.guard.reset();
        self.scroll.reset();
        self.recognizer.release();
        self.keyboard.release();
    }

    // ── Operator controls ─────────────────────────────────

    pub fn toggle_cursor(&mut self) -> bool {
        self.cursor_enabled = !self.cursor_enabled;
        if !self.cursor_enabled {
            self.cursor.reset();
        }
        info!("Cursor {}", if self.cursor_enabled { "on" } else { "off" });
        self.cursor_enabled
    }

    pub fn toggle_mirror(&mut self) -> bool {
        let mirror = self.cursor.toggle_mirror();
        info!("Mirror {}", if mirror { "on" } else { "off" });
        mirror
    }

    pub fn toggle_normalization(&mut self) -> bool {
        let enabled = self.zoom.toggle_normalization();
        info!("Zoom normalization {}", if enabled { "on" } else { "off" });
        enabled
    }

    pub fn increase_factor(&mut self) -> f64 {
        let v = self.activation.increase_factor();
        info!("Factor {:.2}", v);
        v
    }

    pub fn decrease_factor(&mut self) -> f64 {
        let v = self.activation.decrease_factor();
        info!("Factor {:.2}", v);
        v
    }

    pub fn increase_z_margin(&mut self) -> f64 {
        let v = self.activation.increase_z_margin();
        info!("Z margin {:.0}", v);
        v
    }

    pub fn decrease_z_margin(&mut self) -> f64 {
        let v = self.activation.decrease_z_margin();
        info!("Z margin {:.0}", v);
        v
    }

    pub fn increase_hysteresis(&mut self) -> f64 {
        let v = self.activation.increase_hysteresis();
        info!("Hysteresis {:.2}", v);
        v
    }

    pub fn decrease_hysteresis(&mut self) -> f64 {
        let v = self.activation.decrease_hysteresis();
        info!("Hysteresis {:.2}", v);
        v
    }

    pub fn reset_baseline(&mut self) {
        self.activation.reset_baseline();
        info!("Baseline reset to {}", opt_float_sexp(self.activation.base_len()));
    }

    pub fn toggle_typing(&mut self) -> bool {
        self.keyboard.toggle_typing()
    }

    pub fn toggle_keyboard_display(&mut self) -> bool {
        self.keyboard.toggle_visible()
    }

    /// Clear all state, including activation and calibration.  Returns the
    /// events that release anything still held.
    pub fn reset(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();
        self.release_all(&mut events);
        self.activation.reset();
        self.recognizer.reset();
        self.hold.reset();
        self.cursor.reset();
        self.last_activation = None;
        self.last_zoom = None;
        self.last_guard = None;
        info!("Session reset");
        events
    }

    /// Events to emit before the process exits.
    pub fn shutdown(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();
        self.release_all(&mut events);
        info!("Session shut down after {} frames", self.frames);
        events
    }

    // ── Status ────────────────────────────────────────────

    pub fn status(&self) -> SessionStatus {
        let act = self.last_activation.as_ref();
        SessionStatus {
            mode: self.mode,
            active: self.activation.is_active(),
            depth: self.activation.smoothed(),
            base_len: self.activation.base_len(),
            threshold_on: act.map(|a| a.threshold_on),
            threshold_off: act.map(|a| a.threshold_off),
            factor: self.activation.factor(),
            z_margin: self.activation.z_margin(),
            hysteresis_ratio: self.activation.hysteresis_ratio(),
            pose_held: self.hold.is_holding(),
            hold_progress: self.hold.progress_at(self.last_frame_ms),
            zoom_normalization: self.zoom.normalization_enabled(),
            zoom_collecting_reference: self.zoom.normalization_enabled()
                && self.zoom.reference_z().is_none(),
            zoom_reference_z: self.zoom.reference_z(),
            last_guard: self.last_guard,
            dragging: self.dragging,
            cursor_enabled: self.cursor_enabled,
            mirror: self.cursor.mirror(),
            frames: self.frames,
        }
    }

    pub fn status_sexp(&self) -> String {
        let s = self.status();
        format!(
            "(:mode :{} :active {} :depth {} :base {} :on {} :off {} :factor {:.2} \
             :z-margin {:.1} :hysteresis {:.2} :pose-held {} :hold-progress {:.2} :normalization {} \
             :collecting-reference {} :reference-z {} :guard {} :dragging {} \
             :cursor {} :mirror {} :frames {} :keyboard {})",
            s.mode.as_str(),
            bool_sexp(s.active),
            opt_float_sexp(s.depth),
            opt_float_sexp(s.base_len),
            opt_float_sexp(s.threshold_on),
            opt_float_sexp(s.threshold_off),
            s.factor,
            s.z_margin,
            s.hysteresis_ratio,
            bool_sexp(s.pose_held),
            s.hold_progress,
            bool_sexp(s.zoom_normalization),
            bool_sexp(s.zoom_collecting_reference),
            opt_float_sexp(s.zoom_reference_z),
            match s.last_guard {
                None => "nil".to_string(),
                Some(GuardDecision::Allowed) => ":allowed".to_string(),
                Some(d) => format!("\"{}\"", d.as_str()),
            },
            bool_sexp(s.dragging),
            bool_sexp(s.cursor_enabled),
            bool_sexp(s.mirror),
            s.frames,
            self.keyboard.status_sexp(),
        )
    }
}

// ── Tests ──────────────────────────────────────────────────
