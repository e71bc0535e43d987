//! Two-hand pinch scrolling.
//!
//! Scrolling is armed when both tracked hands pinch at once.  After a short
//! settle delay, the first hand's thumb tip is tracked frame to frame and
//! every displacement larger than one scroll unit becomes a scroll step.

use tracing::debug;

use super::landmarks::{HandLandmark, HandObservation, LandmarkFrame, Point2};
use crate::signal::geometry::distance;

#[derive(Debug, Clone)]
pub struct ScrollConfig {
    /// Minimum per-frame displacement, as a fraction of the image size.
    pub scroll_unit: f64,
    /// Settle time after both hands start pinching.
    pub delay_ms: f64,
    /// Pinch distance, as a fraction of the image width, below which a hand
    /// counts as pinching.
    pub pinch_threshold: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            scroll_unit: 0.03,
            delay_ms: 200.0,
            pinch_threshold: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAxis {
    Vertical,
    Horizontal,
}

impl ScrollAxis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vertical => "vertical",
            Self::Horizontal => "horizontal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
    Left,
    Right,
}

impl ScrollDirection {
    pub fn axis(&self) -> ScrollAxis {
        match self {
            Self::Up | Self::Down => ScrollAxis::Vertical,
            Self::Left | Self::Right => ScrollAxis::Horizontal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DualHandScroll {
    config: ScrollConfig,
    armed_at_ms: Option<f64>,
    last_point: Option<Point2>,
}

impl DualHandScroll {
    pub fn new(config: ScrollConfig) -> Self {
        Self {
            config,
            armed_at_ms: None,
            last_point: None,
        }
    }

    pub fn config(&self) -> &ScrollConfig {
        &self.config
    }

    fn is_pinching(&self, hand: &HandObservation, image_width: f64) -> bool {
        if image_width <= 0.0 {
            return false;
        }
        hand.pinch_distance() / image_width < self.config.pinch_threshold
    }

    /// Feed one frame; returns the scroll steps to emit, vertical first.
    pub fn update(&mut self, frame: &LandmarkFrame) -> Vec<ScrollDirection> {
        let [first, second] = frame.hands.as_slice() else {
            self.reset();
            return Vec::new();
        };
        if !self.is_pinching(first, frame.image_width)
            || !self.is_pinching(second, frame.image_width)
        {
            self.reset();
            return Vec::new();
        }

        let now = frame.timestamp_ms;
        let point = first.point(HandLandmark::ThumbTip);

        let Some(armed_at) = self.armed_at_ms else {
            self.armed_at_ms = Some(now);
            self.last_point = Some(point);
            debug!("Scroll armed");
            return Vec::new();
        };
        if now - armed_at <= self.config.delay_ms {
            return Vec::new();
        }
        let Some(last) = self.last_point else {
            self.last_point = Some(point);
            return Vec::new();
        };

        let dx = if frame.image_width > 0.0 {
            (point[0] - last[0]) / frame.image_width
        } else {
            0.0
        };
        let dy = if frame.image_height > 0.0 {
            (point[1] - last[1]) / frame.image_height
        } else {
            0.0
        };

        let unit = self.config.scroll_unit;
        let mut steps = Vec::new();
        if dy.abs() >= unit {
            steps.push(if dy < 0.0 {
                ScrollDirection::Up
            } else {
                ScrollDirection::Down
            });
        }
        if dx.abs() >= unit {
            steps.push(if dx < 0.0 {
                ScrollDirection::Left
            } else {
                ScrollDirection::Right
            });
        }
        self.last_point = Some(point);

        if !steps.is_empty() {
            debug!("Scroll {:?} (dx={:.3} dy={:.3})", steps, dx, dy);
        }
        steps
    }

    pub fn is_armed(&self) -> bool {
        self.armed_at_ms.is_some()
    }

    pub fn reset(&mut self) {
        self.armed_at_ms = None;
        self.last_point = None;
    }
}
