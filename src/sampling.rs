// Sampling-point planner
//
// Pure and deterministic. Offsets concentrate in the likely-representative
// region of the video: long videos sample 5%-60% to skip opening titles
// and trailing credits, short videos pad half a second off each end.

use crate::constants::{
    LONG_WINDOW_END_FRACTION, LONG_WINDOW_START_FRACTION, MEDIUM_EDGE_MARGIN_SECS,
    MEDIUM_VIDEO_SECS, SHORT_SAMPLE_FRACTIONS, SHORT_VIDEO_SECS,
};

/// Compute the sampling plan for a video.
///
/// `duration` of `None` (or a non-positive value) selects the fallback
/// offsets. All offsets are rounded to one decimal place; the result is
/// non-decreasing and never exceeds a known duration.
pub fn compute_sample_points(duration: Option<f64>, count: usize, fallback: &[f64]) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }

    let d = match duration {
        Some(d) if d > 0.0 => d,
        _ => return fallback.iter().take(count).map(|&o| round1(o)).collect(),
    };

    if d < SHORT_VIDEO_SECS {
        return SHORT_SAMPLE_FRACTIONS
            .iter()
            .take(count)
            .map(|f| round1(f * d))
            .collect();
    }

    let (start, end) = if d < MEDIUM_VIDEO_SECS {
        (MEDIUM_EDGE_MARGIN_SECS, d - MEDIUM_EDGE_MARGIN_SECS)
    } else {
        (d * LONG_WINDOW_START_FRACTION, d * LONG_WINDOW_END_FRACTION)
    };

    linspace(start, end, count)
}

/// `count` evenly spaced points on [start, end] inclusive, rounded to one
/// decimal. A single point lands on the interval midpoint.
fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    if count == 1 {
        return vec![round1((start + end) / 2.0)];
    }
    let step = (end - start) / (count - 1) as f64;
    (0..count).map(|i| round1(start + step * i as f64)).collect()
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}
