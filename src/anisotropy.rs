//! Scalar measures used by tractography on normalized diffusion data
//!
//! Provides fractional anisotropy from tensor eigenvalues, generalized
//! anisotropy computed directly from a normalized diffusion signal, and the
//! curvature radius at the growing end of a fiber.

use ndarray::ArrayView1;

/// Fractional anisotropy of a tensor with eigenvalues `l1`, `l2`, `l3`
///
/// Returns 0 for the zero tensor.
pub fn fractional_anisotropy(l1: f64, l2: f64, l3: f64) -> f64 {
    if l2 == l3 {
        let denominator = (l1 * l1 + 2.0 * l2 * l2).sqrt();
        if denominator == 0.0 {
            return 0.0;
        }
        return (l1 - l2).abs() / denominator;
    }

    let denominator = l1 * l1 + l2 * l2 + l3 * l3;
    let spread = (l1 - l2).powi(2) + (l2 - l3).powi(2) + (l3 - l1).powi(2);
    (0.5 * spread / denominator).sqrt()
}

/// Generalized anisotropy of one voxel's normalized signal
///
/// Normalized standard deviation of the signal over its root mean square,
/// 0 for an isotropic signal. Signals with fewer than two samples or no
/// energy yield 0.
pub fn generalized_anisotropy(signal: ArrayView1<'_, f32>) -> f32 {
    let n = signal.len();
    if n < 2 {
        return 0.0;
    }

    let mean = signal.iter().map(|&s| s as f64).sum::<f64>() / n as f64;
    let (sum_sq, sum_dev) = signal.iter().fold((0.0f64, 0.0f64), |(sq, dev), &s| {
        let s = s as f64;
        (sq + s * s, dev + (s - mean) * (s - mean))
    });

    if sum_sq == 0.0 {
        return 0.0;
    }
    ((sum_dev * n as f64).sqrt() / ((n - 1) as f64 * sum_sq).sqrt()) as f32
}

/// Radius of curvature at the last point of `fiber`
///
/// Uses the unit directions of the last two segments: the curvature is
/// `|d2 - d1| / 2` and the radius its inverse, so a straight end gives an
/// infinite radius. Fibers shorter than 3 points return 1 and a degenerate
/// (zero-length) segment returns 0.
pub fn curve_radius(fiber: &[[f64; 3]]) -> f64 {
    let length = fiber.len();
    if length < 3 {
        return 1.0;
    }

    let segment = |from: [f64; 3], to: [f64; 3]| -> [f64; 3] {
        let d = [to[0] - from[0], to[1] - from[1], to[2] - from[2]];
        let norm = (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt();
        d.map(|c| c / norm)
    };
    let d1 = segment(fiber[length - 3], fiber[length - 2]);
    let d2 = segment(fiber[length - 2], fiber[length - 1]);

    let change = [d2[0] - d1[0], d2[1] - d1[1], d2[2] - d1[2]];
    let curvature =
        (change[0] * change[0] + change[1] * change[1] + change[2] * change[2]).sqrt() / 2.0;
    if curvature.is_nan() {
        return 0.0;
    }
    1.0 / curvature
}
