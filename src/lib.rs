//! airtouch - hand and face landmark gesture pipeline.
//!
//! Turns per-frame landmark observations into discrete input events:
//! cursor motion, click and drag, quantized pinch zoom, dual-hand scroll and
//! virtual keyboard presses.  Capture, landmark estimation and event
//! injection live outside this crate.

pub mod config;
pub mod control;
pub mod error;
pub mod event;
pub mod gesture;
pub mod replay;
pub mod session;
pub mod sexp;
pub mod signal;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use event::{InputEvent, Mode};
pub use gesture::{FaceObservation, HandObservation, LandmarkFrame};
pub use session::{Session, SessionStatus};
