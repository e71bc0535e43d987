//! Discrete gestures recognised from hand landmarks.

pub mod hold;
pub mod keyboard;
pub mod landmarks;
pub mod recognizer;
pub mod scroll;

pub use hold::{HoldGesture, HoldUpdate};
pub use keyboard::{KeyboardConfig, VirtualKeyboard};
pub use landmarks::{FaceObservation, HandLandmark, HandObservation, LandmarkFrame};
pub use recognizer::{ClickDragRecognizer, FingerAngles, GestureConfig};
pub use scroll::{DualHandScroll, ScrollAxis, ScrollConfig, ScrollDirection};
