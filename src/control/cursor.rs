//! Hand position to screen cursor mapping.

use crate::error::Result;
use crate::signal::geometry::clamp;
use crate::signal::VectorEmaFilter;

#[derive(Debug, Clone)]
pub struct CursorConfig {
    pub screen_width: u32,
    pub screen_height: u32,
    pub ema_alpha: f64,
    /// Minimum per-axis change (pixels) before a new position is emitted.
    pub move_threshold: i32,
    pub mirror: bool,
    /// Emit cursor motion at all.
    pub enabled: bool,
    /// Emit `CursorShape` events on activation edges.
    pub change_shape_on_active: bool,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            screen_width: 1920,
            screen_height: 1080,
            ema_alpha: 0.6,
            move_threshold: 1,
            mirror: false,
            enabled: false,
            change_shape_on_active: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorUpdate {
    pub x: i32,
    pub y: i32,
    /// The position differs enough from the last emitted one.
    pub moved: bool,
}

#[derive(Debug, Clone)]
pub struct CursorMapper {
    width: f64,
    height: f64,
    move_threshold: i32,
    mirror: bool,
    filter: VectorEmaFilter,
    last_sent: Option<(i32, i32)>,
}

impl CursorMapper {
    pub fn new(config: &CursorConfig) -> Self {
        Self {
            width: f64::from(config.screen_width.max(1)),
            height: f64::from(config.screen_height.max(1)),
            move_threshold: config.move_threshold,
            mirror: config.mirror,
            filter: VectorEmaFilter::new(config.ema_alpha, 2),
            last_sent: None,
        }
    }

    /// Map unit-square coordinates to a smoothed screen position.
    pub fn map_to_screen(&mut self, nx: f64, ny: f64) -> Result<CursorUpdate> {
        let nx = if self.mirror { 1.0 - nx } else { nx };
        let sx = clamp(nx, 0.0, 1.0) * self.width;
        let sy = clamp(ny, 0.0, 1.0) * self.height;

        let filtered = self.filter.update(&[sx, sy])?;
        let x = clamp(filtered[0], 0.0, self.width - 1.0) as i32;
        let y = clamp(filtered[1], 0.0, self.height - 1.0) as i32;

        let moved = match self.last_sent {
            None => true,
            Some((lx, ly)) => {
                (x - lx).abs() >= self.move_threshold || (y - ly).abs() >= self.move_threshold
            }
        };
        if moved {
            self.last_sent = Some((x, y));
        }
        Ok(CursorUpdate { x, y, moved })
    }

    pub fn mirror(&self) -> bool {
        self.mirror
    }

    pub fn toggle_mirror(&mut self) -> bool {
        self.mirror = !self.mirror;
        self.mirror
    }

    pub fn set_mirror(&mut self, enabled: bool) {
        self.mirror = enabled;
    }

    pub fn reset(&mut self) {
        self.filter.reset();
        self.last_sent = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper(alpha: f64, threshold: i32) -> CursorMapper {
        CursorMapper::new(&CursorConfig {
            ema_alpha: alpha,
            move_threshold: threshold,
            ..CursorConfig::default()
        })
    }

    #[test]
    fn test_first_call_always_moves() {
        let mut m = mapper(1.0, 1);
        let u = m.map_to_screen(0.5, 0.5).unwrap();
        assert_eq!((u.x, u.y, u.moved), (960, 540, true));
    }

    #[test]
    fn test_clamped_to_screen() {
        let mut m = mapper(1.0, 1);
        let u = m.map_to_screen(1.5, -0.2).unwrap();
        assert_eq!((u.x, u.y), (1919, 0));
    }

    #[test]
    fn test_mirror() {
        let mut m = mapper(1.0, 1);
        m.set_mirror(true);
        let u = m.map_to_screen(0.25, 0.5).unwrap();
        assert_eq!(u.x, 1440);
        assert!(!m.toggle_mirror());
    }

    #[test]
    fn test_move_threshold() {
        let mut m = mapper(1.0, 5);
        m.map_to_screen(0.5, 0.5).unwrap();
        // 2px horizontal change is below the threshold.
        let u = m.map_to_screen(962.0 / 1920.0, 0.5).unwrap();
        assert!(!u.moved);
        let u = m.map_to_screen(966.0 / 1920.0, 0.5).unwrap();
        assert!(u.moved);
    }

    #[test]
    fn test_smoothing() {
        let mut m = mapper(0.5, 1);
        m.map_to_screen(0.0, 0.0).unwrap();
        let u = m.map_to_screen(1000.0 / 1920.0, 0.0).unwrap();
        assert_eq!(u.x, 500);
    }

    #[test]
    fn test_reset_clears_last_sent() {
        let mut m = mapper(1.0, 100);
        m.map_to_screen(0.5, 0.5).unwrap();
        m.reset();
        assert!(m.map_to_screen(0.5, 0.5).unwrap().moved);
    }
}
