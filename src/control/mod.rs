//! Continuous controls: activation, zoom quantization and guarding, cursor.

pub mod activation;
pub mod cursor;
pub mod guard;
pub mod zoom;

pub use activation::{ActivationConfig, ActivationState, ActivationUpdate, Transition};
pub use cursor::{CursorConfig, CursorMapper, CursorUpdate};
pub use guard::{GuardConfig, GuardDecision, ZoomGuard};
pub use zoom::{PinchZoom, ZoomConfig, ZoomReport};
