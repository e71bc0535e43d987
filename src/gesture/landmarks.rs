//! Per-frame landmark observations consumed by the pipeline.
//!
//! Models the 21 points per hand produced by the hand estimator plus an
//! eye-midpoint reference from the face estimator.  All positions are in
//! image pixels; depth values are the estimator's depth proxy scaled to
//! the same pixel units.

use crate::signal::geometry::distance;

// ── Landmark definitions ───────────────────────────────────

/// The 21 hand landmarks, in estimator order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandLandmark {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

/// Total number of landmarks per hand.
pub const LANDMARK_COUNT: usize = 21;

impl HandLandmark {
    /// Array index (0-20).
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wrist => "wrist",
            Self::ThumbCmc => "thumb-cmc",
            Self::ThumbMcp => "thumb-mcp",
            Self::ThumbIp => "thumb-ip",
            Self::ThumbTip => "thumb-tip",
            Self::IndexMcp => "index-mcp",
            Self::IndexPip => "index-pip",
            Self::IndexDip => "index-dip",
            Self::IndexTip => "index-tip",
            Self::MiddleMcp => "middle-mcp",
            Self::MiddlePip => "middle-pip",
            Self::MiddleDip => "middle-dip",
            Self::MiddleTip => "middle-tip",
            Self::RingMcp => "ring-mcp",
            Self::RingPip => "ring-pip",
            Self::RingDip => "ring-dip",
            Self::RingTip => "ring-tip",
            Self::PinkyMcp => "pinky-mcp",
            Self::PinkyPip => "pinky-pip",
            Self::PinkyDip => "pinky-dip",
            Self::PinkyTip => "pinky-tip",
        }
    }
}

/// The five digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    /// The three landmarks whose middle one is the joint used to measure
    /// this digit's bend.  The thumb bends at its MCP, the others at PIP.
    pub fn bend_joint(&self) -> [HandLandmark; 3] {
        use HandLandmark::*;
        match self {
            Self::Thumb => [ThumbCmc, ThumbMcp, ThumbIp],
            Self::Index => [IndexMcp, IndexPip, IndexDip],
            Self::Middle => [MiddleMcp, MiddlePip, MiddleDip],
            Self::Ring => [RingMcp, RingPip, RingDip],
            Self::Pinky => [PinkyMcp, PinkyPip, PinkyDip],
        }
    }

    pub fn tip(&self) -> HandLandmark {
        match self {
            Self::Thumb => HandLandmark::ThumbTip,
            Self::Index => HandLandmark::IndexTip,
            Self::Middle => HandLandmark::MiddleTip,
            Self::Ring => HandLandmark::RingTip,
            Self::Pinky => HandLandmark::PinkyTip,
        }
    }
}

/// A 2-D pixel-space point.
pub type Point2 = [f64; 2];

// ── Observations ───────────────────────────────────────────

/// One tracked hand in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct HandObservation {
    /// 21 landmark positions indexed by `HandLandmark`.
    pub points: [Point2; LANDMARK_COUNT],
    /// Depth proxy of the index fingertip.
    pub index_tip_z: f64,
    /// Depth proxy of the thumb tip, if the estimator reported one.
    pub thumb_tip_z: Option<f64>,
}

impl HandObservation {
    pub fn new(points: [Point2; LANDMARK_COUNT], index_tip_z: f64, thumb_tip_z: Option<f64>) -> Self {
        Self {
            points,
            index_tip_z,
            thumb_tip_z,
        }
    }

    pub fn point(&self, landmark: HandLandmark) -> Point2 {
        self.points[landmark.index()]
    }

    /// Distance between thumb tip and index tip, in pixels.
    pub fn pinch_distance(&self) -> f64 {
        distance(
            &self.point(HandLandmark::ThumbTip),
            &self.point(HandLandmark::IndexTip),
        )
    }

    /// Midpoint of the index and middle MCP joints, used as the cursor
    /// anchor because it moves little when fingers bend.
    pub fn cursor_anchor(&self) -> Point2 {
        let a = self.point(HandLandmark::IndexMcp);
        let b = self.point(HandLandmark::MiddleMcp);
        [0.5 * (a[0] + b[0]), 0.5 * (a[1] + b[1])]
    }
}

/// Face reference: the midpoint between the two eye centres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceObservation {
    pub eye_mid: Point2,
    pub eye_mid_z: f64,
}

impl FaceObservation {
    /// Build from the four eye-corner landmarks, each `(xy, z)`.
    pub fn from_eye_corners(
        right_outer: (Point2, f64),
        right_inner: (Point2, f64),
        left_outer: (Point2, f64),
        left_inner: (Point2, f64),
    ) -> Self {
        let centre = |a: (Point2, f64), b: (Point2, f64)| {
            (
                [0.5 * (a.0[0] + b.0[0]), 0.5 * (a.0[1] + b.0[1])],
                0.5 * (a.1 + b.1),
            )
        };
        let (r_xy, r_z) = centre(right_outer, right_inner);
        let (l_xy, l_z) = centre(left_outer, left_inner);
        Self {
            eye_mid: [0.5 * (r_xy[0] + l_xy[0]), 0.5 * (r_xy[1] + l_xy[1])],
            eye_mid_z: 0.5 * (r_z + l_z),
        }
    }
}

/// Everything the estimator reported for one video frame.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkFrame {
    /// Monotonic capture time in milliseconds.
    pub timestamp_ms: f64,
    pub image_width: f64,
    pub image_height: f64,
    pub face: Option<FaceObservation>,
    /// Tracked hands; the first one is the control hand.
    pub hands: Vec<HandObservation>,
}

impl LandmarkFrame {
    pub fn empty(timestamp_ms: f64, image_width: f64, image_height: f64) -> Self {
        Self {
            timestamp_ms,
            image_width,
            image_height,
            face: None,
            hands: Vec::new(),
        }
    }

    pub fn control_hand(&self) -> Option<&HandObservation> {
        self.hands.first()
    }
}

// ── Test helpers ───────────────────────────────────────────

/// Build a hand whose digits bend to the requested PIP/MCP angles.
///
/// Each digit is laid out as a chain starting at its base joint: the first
/// segment points up (-y), the second is rotated so the interior angle at
/// the middle joint equals the requested value.
#[cfg(test)]
pub(crate) fn hand_with_angles(base: Point2, angles: [f64; 5]) -> HandObservation {
    let mut points = [[0.0; 2]; LANDMARK_COUNT];
    points[HandLandmark::Wrist.index()] = [base[0], base[1] + 80.0];

    for (i, finger) in Finger::ALL.iter().enumerate() {
        let [first, joint, third] = finger.bend_joint();
        let root = [base[0] + (i as f64 - 2.0) * 20.0, base[1]];
        let seg = 30.0;
        let j = [root[0], root[1] - seg];
        // Direction from joint back to root is +y; rotate by the angle.
        let theta = angles[i].to_radians();
        let t = [j[0] + seg * theta.sin(), j[1] + seg * theta.cos()];
        points[first.index()] = root;
        points[joint.index()] = j;
        points[third.index()] = t;
        points[finger.tip().index()] = [t[0] + (t[0] - j[0]), t[1] + (t[1] - j[1])];
    }
    HandObservation::new(points, -40.0, Some(-38.0))
}
