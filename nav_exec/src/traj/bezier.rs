//! Cubic Bézier evaluation

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Evaluate the cubic Bézier curve defined by the four points at parameter
/// `t`, which should be in [0, 1].
pub fn cubic_bezier(
    t: f64,
    p0: &Vector2<f64>,
    p1: &Vector2<f64>,
    p2: &Vector2<f64>,
    p3: &Vector2<f64>,
) -> Vector2<f64> {
    let u = 1.0 - t;

    u.powi(3) * p0 + 3.0 * u.powi(2) * t * p1 + 3.0 * u * t.powi(2) * p2 + t.powi(3) * p3
}

/// Sample the curve at `num_samples` evenly spaced parameters, including both
/// ends.
///
/// A single sample gives the start point only.
pub fn sample_cubic(
    p0: &Vector2<f64>,
    p1: &Vector2<f64>,
    p2: &Vector2<f64>,
    p3: &Vector2<f64>,
    num_samples: usize,
) -> Vec<Vector2<f64>> {
    match num_samples {
        0 => vec![],
        1 => vec![*p0],
        n => (0..n)
            .map(|i| {
                // Last sample pinned so the end point is exact
                if i == n - 1 {
                    *p3
                } else {
                    cubic_bezier(i as f64 / (n - 1) as f64, p0, p1, p2, p3)
                }
            })
            .collect(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_cubic_bezier_ends() {
        let p0 = Vector2::new(0.0, 0.0);
        let p1 = Vector2::new(1.0, 2.0);
        let p3 = Vector2::new(4.0, 0.0);

        assert_eq!(cubic_bezier(0.0, &p0, &p1, &p1, &p3), p0);
        assert_eq!(cubic_bezier(1.0, &p0, &p1, &p1, &p3), p3);

        // Symmetric control polygon peaks half way along
        let p1 = Vector2::new(1.0, 2.0);
        let p2 = Vector2::new(3.0, 2.0);
        let mid = cubic_bezier(0.5, &p0, &p1, &p2, &p3);
        assert!((mid - Vector2::new(2.0, 1.5)).norm() < 1e-12);
    }

    #[test]
    fn test_sample_cubic() {
        let p0 = Vector2::new(0.0, 0.0);
        let p1 = Vector2::new(1.0, 1.0);
        let p3 = Vector2::new(2.0, 0.0);

        let samples = sample_cubic(&p0, &p1, &p1, &p3, 5);
        assert_eq!(samples.len(), 5);
        assert_eq!(samples[0], p0);
        assert_eq!(samples[4], p3);

        assert_eq!(sample_cubic(&p0, &p1, &p1, &p3, 1), vec![p0]);
        assert!(sample_cubic(&p0, &p1, &p1, &p3, 0).is_empty());
    }
}
