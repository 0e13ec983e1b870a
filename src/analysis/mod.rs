// Frame quality analysis
//
// Scores candidate stills on brightness, contrast and edge energy so the
// selector can rank them. Pure with respect to shared state; the only
// side effect is reading the input file.

mod stats;

use std::path::Path;

use anyhow::{Context, Result};
use image::imageops::FilterType;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::constants::{
    BRIGHTNESS_IDEAL_MEAN, CONTRAST_NORM_STD, SCORE_WEIGHT_BRIGHTNESS, SCORE_WEIGHT_CONTRAST,
    SCORE_WEIGHT_SHARPNESS, SHARPNESS_NORM_STD, VALID_MEAN_MAX, VALID_MEAN_MIN,
};

use stats::{channel_stats, edge_stddev};

/// Result of analyzing a single candidate frame.
///
/// All components and the combined score are normalized to [0, 1].
/// `valid` is false for near-black and near-white frames regardless of
/// score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameAnalysis {
    pub brightness: f64,
    pub contrast: f64,
    pub sharpness: f64,
    pub score: f64,
    pub valid: bool,
    pub mean_luminance: f64,
}

impl FrameAnalysis {
    fn from_measurements(mean: f64, stddev: f64, edge_std: f64) -> Self {
        let brightness =
            1.0 - ((mean - BRIGHTNESS_IDEAL_MEAN).abs() / BRIGHTNESS_IDEAL_MEAN).min(1.0);
        let contrast = (stddev / CONTRAST_NORM_STD).min(1.0);
        let sharpness = (edge_std / SHARPNESS_NORM_STD).min(1.0);

        let score = (brightness * SCORE_WEIGHT_BRIGHTNESS
            + contrast * SCORE_WEIGHT_CONTRAST
            + sharpness * SCORE_WEIGHT_SHARPNESS)
            .clamp(0.0, 1.0);

        let valid = !(mean < VALID_MEAN_MIN || mean > VALID_MEAN_MAX);

        Self {
            brightness,
            contrast,
            sharpness,
            score,
            valid,
            mean_luminance: mean,
        }
    }
}

/// Analyze a candidate still on disk.
pub fn analyze_frame(path: &Path, analysis_width: u32) -> Result<FrameAnalysis> {
    let img =
        image::open(path).with_context(|| format!("failed to decode {}", path.display()))?;
    Ok(analyze_image(&img, analysis_width))
}

/// Analyze an already-decoded image. Split out so tests can feed
/// synthetic buffers.
pub fn analyze_image(img: &DynamicImage, analysis_width: u32) -> FrameAnalysis {
    // Downsample to bound CPU cost; never upscale
    let scaled;
    let img = if analysis_width > 0 && img.width() > analysis_width {
        let h = (f64::from(img.height()) * f64::from(analysis_width) / f64::from(img.width()))
            .round()
            .max(1.0) as u32;
        scaled = img.resize_exact(analysis_width, h, FilterType::Triangle);
        &scaled
    } else {
        img
    };

    let rgb = img.to_rgb8();
    let (mean, stddev) = channel_stats(&rgb);

    // Edge energy on a grayscale copy; plain stddev when the image is too
    // small to convolve
    let gray = img.to_luma8();
    let edge_std = edge_stddev(&gray).unwrap_or(stddev);

    FrameAnalysis::from_measurements(mean, stddev, edge_std)
}
