//! On-screen virtual keyboard driven by an index-finger bend.
//!
//! Keys are laid out in camera-image pixels.  The index MCP joint acts as
//! the pointer; bending the index finger while hovering a key presses it.

use tracing::{debug, info};

use super::landmarks::Point2;
use super::recognizer::{Latch, LatchEdge};

/// QWERTY rows; the last row holds the wide keys.
const ROWS: [&[&str]; 4] = [
    &["Q", "W", "E", "R", "T", "Y", "U", "I", "O", "P"],
    &["A", "S", "D", "F", "G", "H", "J", "K", "L"],
    &["Z", "X", "C", "V", "B", "N", "M"],
    &["SPACE", "BACKSPACE"],
];

/// Left edge of the first row.
const LEFT_MARGIN: f64 = 10.0;

// ── Key definition ─────────────────────────────────────────

/// One key rectangle in image pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyDef {
    pub label: &'static str,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl KeyDef {
    /// Whether point (px, py) is inside this key, edges included.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }
}

// ── Config ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct KeyboardConfig {
    pub key_size: f64,
    pub key_spacing: f64,
    /// Top edge of the first row.
    pub y_start: f64,
    pub press_engage_deg: f64,
    pub press_release_deg: f64,
    /// Minimum time between two presses of the same key.
    pub key_cooldown_ms: f64,
    pub typing_enabled: bool,
    pub visible: bool,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            key_size: 60.0,
            key_spacing: 10.0,
            y_start: 400.0,
            press_engage_deg: 150.0,
            press_release_deg: 165.0,
            key_cooldown_ms: 300.0,
            typing_enabled: true,
            visible: true,
        }
    }
}

/// Lay out the QWERTY rows.
///
/// Rows are offset from the left margin by 0, half a key, one key and two
/// keys.  SPACE spans five keys and BACKSPACE two, gaps included.
pub fn generate_layout(key_size: f64, key_spacing: f64, y_start: f64) -> Vec<KeyDef> {
    let offsets = [0.0, (key_size / 2.0).floor(), key_size, key_size * 2.0];
    let mut keys = Vec::new();
    let mut y = y_start;

    for (row, offset) in ROWS.iter().zip(offsets) {
        let mut x = LEFT_MARGIN + offset;
        for &label in row.iter() {
            let width = match label {
                "SPACE" => key_size * 5.0 + key_spacing * 4.0,
                "BACKSPACE" => key_size * 2.0 + key_spacing,
                _ => key_size,
            };
            keys.push(KeyDef {
                label,
                x,
                y,
                width,
                height: key_size,
            });
            x += width + key_spacing;
        }
        y += key_size + key_spacing;
    }
    keys
}

// ── State ──────────────────────────────────────────────────

pub struct VirtualKeyboard {
    keys: Vec<KeyDef>,
    press: Latch,
    cooldown_ms: f64,
    /// Last press time per key, indexed like `keys`.
    last_press: Vec<Option<f64>>,
    hovered: Option<usize>,
    typing_enabled: bool,
    visible: bool,
}

impl VirtualKeyboard {
    pub fn new(config: &KeyboardConfig) -> Self {
        let keys = generate_layout(config.key_size, config.key_spacing, config.y_start);
        let last_press = vec![None; keys.len()];
        Self {
            keys,
            press: Latch::new(config.press_engage_deg, config.press_release_deg),
            cooldown_ms: config.key_cooldown_ms,
            last_press,
            hovered: None,
            typing_enabled: config.typing_enabled,
            visible: config.visible,
        }
    }

    pub fn keys(&self) -> &[KeyDef] {
        &self.keys
    }

    /// Find the key under a point.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<&KeyDef> {
        self.keys.iter().find(|k| k.contains(x, y))
    }

    /// Feed the pointer position and index angle; returns the pressed key.
    ///
    /// The press latch only advances while a key is hovered, so bending the
    /// finger outside the keyboard does nothing.
    pub fn process(&mut self, pointer: Point2, index_angle: f64, now_ms: f64) -> Option<&'static str> {
        self.hovered = self
            .keys
            .iter()
            .position(|k| k.contains(pointer[0], pointer[1]));
        let idx = self.hovered?;

        if self.press.update(index_angle) != LatchEdge::Engaged {
            return None;
        }

        let ready = self.last_press[idx].map_or(true, |last| now_ms - last > self.cooldown_ms);
        if !ready {
            return None;
        }
        self.last_press[idx] = Some(now_ms);

        let label = self.keys[idx].label;
        if !self.typing_enabled {
            debug!("Key {} pressed with typing disabled", label);
            return None;
        }
        debug!("Key {} pressed", label);
        Some(label)
    }

    pub fn hovered(&self) -> Option<&'static str> {
        self.hovered.map(|i| self.keys[i].label)
    }

    pub fn is_pressing(&self) -> bool {
        self.press.is_engaged()
    }

    pub fn typing_enabled(&self) -> bool {
        self.typing_enabled
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn toggle_typing(&mut self) -> bool {
        self.typing_enabled = !self.typing_enabled;
        info!("Typing {}", if self.typing_enabled { "enabled" } else { "disabled" });
        self.typing_enabled
    }

    /// Display only; hit testing continues while hidden.
    pub fn toggle_visible(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }

    /// Clear the press latch and hover; cooldown history is kept.
    pub fn release(&mut self) {
        self.press.reset();
        self.hovered = None;
    }

    pub fn status_sexp(&self) -> String {
        format!(
            "(:visible {} :typing {} :key-count {} :hovered {} :pressing {})",
            if self.visible { "t" } else { "nil" },
            if self.typing_enabled { "t" } else { "nil" },
            self.keys.len(),
            self.hovered()
                .map(|k| format!("\"{}\"", k))
                .unwrap_or_else(|| "nil".to_string()),
            if self.press.is_engaged() { "t" } else { "nil" },
        )
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const BENT: f64 = 120.0;
    const STRAIGHT: f64 = 175.0;

    fn keyboard() -> VirtualKeyboard {
        VirtualKeyboard::new(&KeyboardConfig::default())
    }

    fn centre(kb: &VirtualKeyboard, label: &str) -> Point2 {
        let k = kb.keys().iter().find(|k| k.label == label).unwrap();
        [k.x + k.width / 2.0, k.y + k.height / 2.0]
    }

    #[test]
    fn test_layout_positions() {
        let keys = generate_layout(60.0, 10.0, 400.0);
        assert_eq!(keys.len(), 28);

        let q = &keys[0];
        assert_eq!((q.label, q.x, q.y), ("Q", 10.0, 400.0));
        let w = &keys[1];
        assert_eq!(w.x, 80.0);

        let a = keys.iter().find(|k| k.label == "A").unwrap();
        assert_eq!((a.x, a.y), (40.0, 470.0));
        let z = keys.iter().find(|k| k.label == "Z").unwrap();
        assert_eq!((z.x, z.y), (70.0, 540.0));

        let space = keys.iter().find(|k| k.label == "SPACE").unwrap();
        assert_eq!((space.x, space.y, space.width), (130.0, 610.0, 340.0));
        let back = keys.iter().find(|k| k.label == "BACKSPACE").unwrap();
        assert_eq!((back.x, back.width), (480.0, 130.0));
    }

    #[test]
    fn test_hit_test() {
        let kb = keyboard();
        assert_eq!(kb.hit_test(10.0, 400.0).map(|k| k.label), Some("Q"));
        assert_eq!(kb.hit_test(70.0, 460.0).map(|k| k.label), Some("Q"));
        // Gap between Q and W.
        assert!(kb.hit_test(75.0, 420.0).is_none());
        assert!(kb.hit_test(0.0, 0.0).is_none());
    }

    #[test]
    fn test_press_on_bend_edge() {
        let mut kb = keyboard();
        let p = centre(&kb, "E");
        assert_eq!(kb.process(p, STRAIGHT, 0.0), None);
        assert_eq!(kb.hovered(), Some("E"));
        assert_eq!(kb.process(p, BENT, 10.0), Some("E"));
        // Held bend does not repeat.
        assert_eq!(kb.process(p, BENT, 500.0), None);
    }

    #[test]
    fn test_per_key_cooldown() {
        let mut kb = keyboard();
        let e = centre(&kb, "E");
        let r = centre(&kb, "R");

        assert_eq!(kb.process(e, BENT, 0.0), Some("E"));
        kb.process(e, STRAIGHT, 50.0);
        assert_eq!(kb.process(e, BENT, 100.0), None);
        kb.process(e, STRAIGHT, 150.0);
        // A different key is not affected.
        assert_eq!(kb.process(r, BENT, 200.0), Some("R"));
        kb.process(e, STRAIGHT, 250.0);
        assert_eq!(kb.process(e, BENT, 301.0), Some("E"));
    }

    #[test]
    fn test_bend_outside_keyboard_ignored() {
        let mut kb = keyboard();
        assert_eq!(kb.process([5.0, 5.0], BENT, 0.0), None);
        assert!(!kb.is_pressing());
        assert_eq!(kb.process(centre(&kb, "A"), BENT, 10.0), Some("A"));
    }

    #[test]
    fn test_typing_disabled() {
        let mut kb = keyboard();
        assert!(!kb.toggle_typing());
        let p = centre(&kb, "SPACE");
        assert_eq!(kb.process(p, BENT, 0.0), None);
        assert!(kb.toggle_typing());
    }

    #[test]
    fn test_status_sexp() {
        let mut kb = keyboard();
        kb.toggle_visible();
        let sexp = kb.status_sexp();
        assert!(sexp.contains(":visible nil"));
        assert!(sexp.contains(":typing t"));
        assert!(sexp.contains(":key-count 28"));
        assert!(sexp.contains(":hovered nil"));
    }

    #[test]
    fn test_key_contains() {
        let key = KeyDef {
            label: "A",
            x: 10.0,
            y: 20.0,
            width: 20.0,
            height: 20.0,
        };
        assert!(key.contains(10.0, 20.0));
        assert!(key.contains(30.0, 40.0));
        assert!(!key.contains(31.0, 30.0));
    }
}
