//! Scale helpers for mapping data values to colors and axis domains.

use eco_core::transition::lerp;

/// Threshold scale bucketing continuous values into discrete bands.
///
/// A value below the first threshold lands in bucket 0, a value at or above
/// threshold `i` lands in bucket `i + 1`. With `n` thresholds there are
/// `n + 1` buckets.
#[derive(Debug, Clone)]
pub struct ThresholdScale {
    thresholds: Vec<f64>,
}

impl ThresholdScale {
    /// `thresholds` must be sorted ascending.
    pub fn new(thresholds: Vec<f64>) -> Self {
        debug_assert!(thresholds.windows(2).all(|w| w[0] <= w[1]));
        Self { thresholds }
    }

    pub fn bucket_count(&self) -> usize {
        self.thresholds.len() + 1
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    /// Bucket index for `value`, or `None` for NaN.
    pub fn bucket(&self, value: f64) -> Option<usize> {
        if value.is_nan() {
            return None;
        }
        Some(self.thresholds.iter().take_while(|t| value >= **t).count())
    }
}

/// Interpolate between two axis domains.
pub fn lerp_domain(from: (f64, f64), to: (f64, f64), t: f64) -> (f64, f64) {
    (lerp(from.0, to.0, t), lerp(from.1, to.1, t))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn risk_scale() -> ThresholdScale {
        ThresholdScale::new(vec![20.0, 35.0, 50.0, 65.0, 75.0, 100.0])
    }

    #[test]
    fn test_bucket_below_first_threshold() {
        assert_eq!(risk_scale().bucket(19.9), Some(0));
        assert_eq!(risk_scale().bucket(0.0), Some(0));
        assert_eq!(risk_scale().bucket(-5.0), Some(0));
    }

    #[test]
    fn test_bucket_boundary_is_inclusive_upward() {
        let scale = risk_scale();
        assert_eq!(scale.bucket(20.0), Some(1));
        assert_eq!(scale.bucket(34.9), Some(1));
        assert_eq!(scale.bucket(35.0), Some(2));
        assert_eq!(scale.bucket(99.0), Some(5));
    }

    #[test]
    fn test_bucket_at_or_above_last_threshold() {
        let scale = risk_scale();
        assert_eq!(scale.bucket(100.0), Some(6));
        assert_eq!(scale.bucket(250.0), Some(6));
        assert_eq!(scale.bucket_count(), 7);
    }

    #[test]
    fn test_bucket_nan_is_none() {
        assert_eq!(risk_scale().bucket(f64::NAN), None);
    }

    #[test]
    fn test_lerp_domain_midpoint() {
        let d = lerp_domain((0.0, 10.0), (10.0, 30.0), 0.5);
        assert_eq!(d, (5.0, 20.0));
    }
}
