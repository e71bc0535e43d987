//! Discrete events handed to the input-injection layer.

use crate::gesture::scroll::{ScrollAxis, ScrollDirection};
use crate::sexp::{bool_sexp, escape_string, format_event};

/// Interaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Touch,
    Keyboard,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Touch => "touch",
            Self::Keyboard => "keyboard",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Self::Touch => Self::Keyboard,
            Self::Keyboard => Self::Touch,
        }
    }
}

/// Events emitted by the pipeline, in emission order within a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Move the pointer to an absolute screen position.
    CursorMove { x: i32, y: i32 },
    Click,
    DragStart,
    DragEnd,
    /// Positive zooms in.
    ZoomStep { steps: i32 },
    ScrollStep {
        axis: ScrollAxis,
        direction: ScrollDirection,
    },
    KeyPress { key: String },
    ModeToggle { mode: Mode },
    /// Switch the system cursor to the active shape, or restore it.
    CursorShape { active: bool },
}

impl InputEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CursorMove { .. } => "cursor-move",
            Self::Click => "click",
            Self::DragStart => "drag-start",
            Self::DragEnd => "drag-end",
            Self::ZoomStep { .. } => "zoom-step",
            Self::ScrollStep { .. } => "scroll-step",
            Self::KeyPress { .. } => "key-press",
            Self::ModeToggle { .. } => "mode-toggle",
            Self::CursorShape { .. } => "cursor-shape",
        }
    }

    pub fn to_sexp(&self) -> String {
        let name = self.name();
        match self {
            Self::CursorMove { x, y } => format_event(
                name,
                &[("x", &x.to_string()), ("y", &y.to_string())],
            ),
            Self::Click | Self::DragStart | Self::DragEnd => format_event(name, &[]),
            Self::ZoomStep { steps } => format_event(name, &[("steps", &steps.to_string())]),
            Self::ScrollStep { axis, direction } => format_event(
                name,
                &[
                    ("axis", &format!(":{}", axis.as_str())),
                    ("direction", &format!(":{}", direction.as_str())),
                ],
            ),
            Self::KeyPress { key } => format_event(
                name,
                &[("key", &format!("\"{}\"", escape_string(key)))],
            ),
            Self::ModeToggle { mode } => {
                format_event(name, &[("mode", &format!(":{}", mode.as_str()))])
            }
            Self::CursorShape { active } => format_event(name, &[("active", bool_sexp(*active))]),
        }
    }
}
