//! Transition timing engine
//!
//! Drives the animated deltas between old and new shapes. Views advance
//! their transitions with the frame delta from the UI loop; nothing here
//! owns a thread or a wall clock.

/// Length of primary transitions: fills, line paths, stream layers, axis
/// domains (seconds).
pub const PRIMARY_DURATION: f32 = 0.8;

/// Length of removal fades when shapes leave a plot (seconds).
pub const REMOVAL_DURATION: f32 = 0.5;

/// Period of the map's year-cycling timer (seconds).
pub const YEAR_CYCLE_PERIOD: f32 = 1.2;

/// Easing curve applied to transition progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    /// Slow start, fast middle, slow end; symmetric around 1/2.
    #[default]
    CubicInOut,
}

impl Easing {
    /// Map raw progress in [0, 1] through the curve
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// One running transition between an old and a new set of shapes
#[derive(Debug, Clone)]
pub struct Transition {
    duration: f32,
    elapsed: f32,
    easing: Easing,
}

impl Transition {
    pub fn new(duration: f32, easing: Easing) -> Self {
        Self {
            duration: duration.max(f32::EPSILON),
            elapsed: 0.0,
            easing,
        }
    }

    /// The 800 ms transition used for fills, paths and domains
    pub fn primary() -> Self {
        Self::new(PRIMARY_DURATION, Easing::CubicInOut)
    }

    /// The 500 ms fade used when shapes are removed
    pub fn removal() -> Self {
        Self::new(REMOVAL_DURATION, Easing::CubicInOut)
    }

    /// Advance by a frame delta; returns whether the transition finished
    pub fn advance(&mut self, dt: f32) -> bool {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.is_finished()
    }

    /// Eased progress in [0, 1]
    pub fn progress(&self) -> f64 {
        self.easing.apply((self.elapsed / self.duration) as f64)
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Repeating timer, advanced by frame deltas.
///
/// Owned by the view that needs it and dropped on unmount; there is no
/// process-wide scheduler that could outlive the view.
#[derive(Debug, Clone)]
pub struct Interval {
    period: f32,
    accumulated: f32,
}

impl Interval {
    pub fn new(period: f32) -> Self {
        Self {
            period: period.max(f32::EPSILON),
            accumulated: 0.0,
        }
    }

    /// Accumulate a frame delta; returns how many periods elapsed
    pub fn tick(&mut self, dt: f32) -> u32 {
        self.accumulated += dt;
        let fired = (self.accumulated / self.period) as u32;
        self.accumulated -= fired as f32 * self.period;
        fired
    }
}

/// Linear interpolation between two values
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Resample a polyline to a fixed number of points, uniform in parameter
/// space. Used to put an old and a new path into pointwise correspondence
/// before interpolating them.
pub fn resample(points: &[[f64; 2]], samples: usize) -> Vec<[f64; 2]> {
    if points.is_empty() || samples == 0 {
        return Vec::new();
    }
    if points.len() == 1 || samples == 1 {
        return vec![points[0]; samples];
    }

    let last = (points.len() - 1) as f64;
    (0..samples)
        .map(|i| {
            let s = i as f64 / (samples - 1) as f64 * last;
            let idx = (s.floor() as usize).min(points.len() - 2);
            let frac = s - idx as f64;
            [
                lerp(points[idx][0], points[idx + 1][0], frac),
                lerp(points[idx][1], points[idx + 1][1], frac),
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cubic_in_out_shape() {
        let e = Easing::CubicInOut;
        assert_eq!(e.apply(0.0), 0.0);
        assert_eq!(e.apply(1.0), 1.0);
        assert!((e.apply(0.5) - 0.5).abs() < 1e-12);
        // Slow start: well below linear in the first quarter.
        assert!(e.apply(0.25) < 0.25);
        // Symmetric tail.
        assert!((e.apply(0.75) - (1.0 - e.apply(0.25))).abs() < 1e-12);
        // Clamped outside the unit interval.
        assert_eq!(e.apply(-1.0), 0.0);
        assert_eq!(e.apply(2.0), 1.0);
    }

    #[test]
    fn test_transition_advances_and_finishes() {
        let mut t = Transition::new(0.8, Easing::Linear);
        assert!(!t.advance(0.4));
        assert!((t.progress() - 0.5).abs() < 1e-6);

        assert!(t.advance(0.4));
        assert!(t.is_finished());
        assert_eq!(t.progress(), 1.0);

        // Overshooting clamps instead of running past the end.
        assert!(t.advance(10.0));
        assert_eq!(t.progress(), 1.0);
    }

    #[test]
    fn test_primary_transition_midpoint_is_halfway() {
        // Cubic-in-out is symmetric, so the eased midpoint equals 1/2 and
        // interpolated shapes sit exactly between old and new.
        let mut t = Transition::primary();
        t.advance(PRIMARY_DURATION / 2.0);
        assert!((t.progress() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_interval_fires_per_period() {
        let mut timer = Interval::new(1.0);
        assert_eq!(timer.tick(0.25), 0);
        assert_eq!(timer.tick(0.75), 1);
        // Large frame deltas fire multiple times without losing remainder.
        assert_eq!(timer.tick(2.5), 2);
        assert_eq!(timer.tick(0.5), 1);
    }

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(lerp(2.0, 10.0, 0.0), 2.0);
        assert_eq!(lerp(2.0, 10.0, 1.0), 10.0);
        assert_eq!(lerp(2.0, 10.0, 0.5), 6.0);
    }

    #[test]
    fn test_resample_preserves_endpoints() {
        let line = vec![[0.0, 0.0], [1.0, 2.0], [2.0, 0.0]];
        let resampled = resample(&line, 5);
        assert_eq!(resampled.len(), 5);
        assert_eq!(resampled[0], [0.0, 0.0]);
        assert_eq!(resampled[4], [2.0, 0.0]);
        assert_eq!(resampled[2], [1.0, 2.0]);

        assert!(resample(&[], 4).is_empty());
        assert_eq!(resample(&[[3.0, 3.0]], 3), vec![[3.0, 3.0]; 3]);
    }
}
