//! Cubic B-spline smoothing for the stream graph outlines.

/// Sample a uniform cubic B-spline through `points`.
///
/// End control points are tripled so the curve starts and ends exactly on the
/// first and last input point. Interior points act as control points the
/// curve approaches without passing through. With fewer than three points the
/// input is returned unchanged.
pub fn basis_curve(points: &[[f64; 2]], samples_per_segment: usize) -> Vec<[f64; 2]> {
    if points.len() < 3 || samples_per_segment < 2 {
        return points.to_vec();
    }

    let first = points[0];
    let last = points[points.len() - 1];
    let mut controls = Vec::with_capacity(points.len() + 4);
    controls.push(first);
    controls.push(first);
    controls.extend_from_slice(points);
    controls.push(last);
    controls.push(last);

    let segments = controls.len() - 3;
    let mut out = Vec::with_capacity(segments * samples_per_segment + 1);
    for seg in 0..segments {
        let p0 = controls[seg];
        let p1 = controls[seg + 1];
        let p2 = controls[seg + 2];
        let p3 = controls[seg + 3];
        for step in 0..samples_per_segment {
            let t = step as f64 / samples_per_segment as f64;
            out.push(basis_point(p0, p1, p2, p3, t));
        }
    }
    out.push(last);
    out
}

fn basis_point(p0: [f64; 2], p1: [f64; 2], p2: [f64; 2], p3: [f64; 2], t: f64) -> [f64; 2] {
    let t2 = t * t;
    let t3 = t2 * t;
    let b0 = (1.0 - t).powi(3) / 6.0;
    let b1 = (3.0 * t3 - 6.0 * t2 + 4.0) / 6.0;
    let b2 = (-3.0 * t3 + 3.0 * t2 + 3.0 * t + 1.0) / 6.0;
    let b3 = t3 / 6.0;
    [
        b0 * p0[0] + b1 * p1[0] + b2 * p2[0] + b3 * p3[0],
        b0 * p0[1] + b1 * p1[1] + b2 * p2[1] + b3 * p3[1],
    ]
}
