//! Stateless geometry helpers over pixel-space points.

/// Epsilon added to vector norms in `joint_angle`.
const NORM_EPSILON: f64 = 1e-9;

/// Clamp `v` into `[lo, hi]`.  NaN handling is unspecified; callers
/// validate inputs first.
pub fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
    if v < lo {
        lo
    } else if v > hi {
        hi
    } else {
        v
    }
}

/// Euclidean distance between two points of the same dimension.
pub fn distance<const N: usize>(a: &[f64; N], b: &[f64; N]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Angle at vertex `b` between rays `b→a` and `b→c`, in degrees [0, 180].
///
/// Zero-length rays are absorbed by an epsilon on the norms; the cosine is
/// clamped before `acos` so rounding never produces NaN.
pub fn joint_angle<const N: usize>(a: &[f64; N], b: &[f64; N], c: &[f64; N]) -> f64 {
    let mut dot = 0.0;
    let mut n1 = 0.0;
    let mut n2 = 0.0;
    for i in 0..N {
        let v1 = a[i] - b[i];
        let v2 = c[i] - b[i];
        dot += v1 * v2;
        n1 += v1 * v1;
        n2 += v2 * v2;
    }
    let cos = dot / ((n1.sqrt() + NORM_EPSILON) * (n2.sqrt() + NORM_EPSILON));
    clamp(cos, -1.0, 1.0).acos().to_degrees()
}

/// Pixel coordinates to the unit square.  A zero dimension maps to 0.
pub fn normalize_coordinates(x: f64, y: f64, width: f64, height: f64) -> (f64, f64) {
    let nx = if width > 0.0 { x / width } else { 0.0 };
    let ny = if height > 0.0 { y / height } else { 0.0 };
    (nx, ny)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(-1.0, 0.0, 1.0), 0.0);
        assert_eq!(clamp(2.0, 0.0, 1.0), 1.0);
        assert_eq!(clamp(0.5, 0.0, 1.0), 0.5);
    }

    #[test]
    fn test_distance() {
        assert_eq!(distance(&[0.0, 0.0], &[3.0, 4.0]), 5.0);
        assert_eq!(distance(&[1.0, 1.0, 1.0], &[1.0, 1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_joint_angle_straight_and_right() {
        let straight = joint_angle(&[0.0, 0.0], &[1.0, 0.0], &[2.0, 0.0]);
        assert!((straight - 180.0).abs() < 1e-6);

        let right = joint_angle(&[0.0, 1.0], &[0.0, 0.0], &[1.0, 0.0]);
        assert!((right - 90.0).abs() < 1e-6);

        let folded = joint_angle(&[1.0, 0.0], &[0.0, 0.0], &[2.0, 0.0]);
        assert!(folded.abs() < 1e-6);
    }

    #[test]
    fn test_joint_angle_degenerate_is_finite() {
        let angle = joint_angle(&[5.0, 5.0], &[5.0, 5.0], &[5.0, 5.0]);
        assert!(angle.is_finite());
        assert!((0.0..=180.0).contains(&angle));
    }

    #[test]
    fn test_normalize_zero_size() {
        assert_eq!(normalize_coordinates(10.0, 10.0, 0.0, 0.0), (0.0, 0.0));
        assert_eq!(normalize_coordinates(640.0, 360.0, 1280.0, 720.0), (0.5, 0.5));
    }
}
