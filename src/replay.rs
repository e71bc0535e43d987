//! Landmark frame serialization for recording and replay.
//!
//! One frame per line:
//!
//! ```text
//! (:t 1033.0 :width 1280 :height 720
//!  :face (:x 640 :y 300 :z -20)
//!  :hands ((:points (x0 y0 x1 y1 ... x20 y20) :z-index -55 :z-thumb -50)))
//! ```
//!
//! `:face` and `:hands` may be omitted or `nil`; `:z-thumb` is optional.

use lexpr::Value;

use crate::error::{PipelineError, Result};
use crate::gesture::landmarks::{
    FaceObservation, HandObservation, LandmarkFrame, Point2, LANDMARK_COUNT,
};
use crate::sexp::{as_f64, list_items, plist_get};

fn is_nil(v: &Value) -> bool {
    match v {
        Value::Null | Value::Nil => true,
        Value::Symbol(s) => s.as_ref() == "nil",
        _ => false,
    }
}

fn required_float(plist: &Value, key: &str) -> Result<f64> {
    let v = plist_get(plist, key).ok_or_else(|| PipelineError::MissingField(key.to_string()))?;
    as_f64(v).ok_or_else(|| PipelineError::InvalidValue {
        key: key.to_string(),
        reason: "expected a number".into(),
    })
}

fn optional_float(plist: &Value, key: &str) -> Result<Option<f64>> {
    match plist_get(plist, key) {
        None => Ok(None),
        Some(v) if is_nil(v) => Ok(None),
        Some(v) => as_f64(v).map(Some).ok_or_else(|| PipelineError::InvalidValue {
            key: key.to_string(),
            reason: "expected a number".into(),
        }),
    }
}

fn parse_face(value: &Value) -> Result<FaceObservation> {
    Ok(FaceObservation {
        eye_mid: [required_float(value, "x")?, required_float(value, "y")?],
        eye_mid_z: required_float(value, "z")?,
    })
}

fn parse_hand(value: &Value) -> Result<HandObservation> {
    let raw = plist_get(value, "points")
        .ok_or_else(|| PipelineError::MissingField("points".to_string()))?;
    let coords = list_items(raw)
        .into_iter()
        .map(as_f64)
        .collect::<Option<Vec<f64>>>()
        .ok_or_else(|| PipelineError::InvalidValue {
            key: "points".into(),
            reason: "expected numbers".into(),
        })?;
    if coords.len() != LANDMARK_COUNT * 2 {
        return Err(PipelineError::InvalidValue {
            key: "points".into(),
            reason: format!("expected {} numbers, got {}", LANDMARK_COUNT * 2, coords.len()),
        });
    }

    let mut points: [Point2; LANDMARK_COUNT] = [[0.0; 2]; LANDMARK_COUNT];
    for (p, xy) in points.iter_mut().zip(coords.chunks_exact(2)) {
        *p = [xy[0], xy[1]];
    }

    Ok(HandObservation::new(
        points,
        required_float(value, "z-index")?,
        optional_float(value, "z-thumb")?,
    ))
}

/// Parse a single frame line.
pub fn parse_frame(text: &str) -> Result<LandmarkFrame> {
    let value = lexpr::from_str(text).map_err(|e| PipelineError::Parse(e.to_string()))?;
    frame_from_value(&value)
}

pub fn frame_from_value(value: &Value) -> Result<LandmarkFrame> {
    let mut frame = LandmarkFrame::empty(
        required_float(value, "t")?,
        required_float(value, "width")?,
        required_float(value, "height")?,
    );

    if let Some(face) = plist_get(value, "face").filter(|v| !is_nil(v)) {
        frame.face = Some(parse_face(face)?);
    }
    if let Some(hands) = plist_get(value, "hands") {
        frame.hands = list_items(hands)
            .into_iter()
            .map(parse_hand)
            .collect::<Result<Vec<_>>>()?;
    }
    Ok(frame)
}
