// Pixel statistics for frame scoring

use image::{GrayImage, RgbImage};

/// Mean and standard deviation of pixel intensity, computed per channel
/// and averaged across the three color channels.
pub(crate) fn channel_stats(img: &RgbImage) -> (f64, f64) {
    let n = (img.width() as u64 * img.height() as u64) as f64;
    if n == 0.0 {
        return (0.0, 0.0);
    }

    let mut sum = [0f64; 3];
    let mut sum_sq = [0f64; 3];
    for pixel in img.pixels() {
        for (i, &v) in pixel.0.iter().enumerate() {
            let v = v as f64;
            sum[i] += v;
            sum_sq[i] += v * v;
        }
    }

    let mut mean_acc = 0.0;
    let mut std_acc = 0.0;
    for i in 0..3 {
        let mean = sum[i] / n;
        let variance = (sum_sq[i] / n - mean * mean).max(0.0);
        mean_acc += mean;
        std_acc += variance.sqrt();
    }
    (mean_acc / 3.0, std_acc / 3.0)
}

/// Standard deviation of a 3x3 Laplacian response over the grayscale
/// image (center -4, edge neighbors +1, corners 0). Returns `None` when
/// the image is too small to convolve.
pub(crate) fn edge_stddev(img: &GrayImage) -> Option<f64> {
    let (w, h) = img.dimensions();
    if w < 3 || h < 3 {
        return None;
    }

    let mut sum = 0f64;
    let mut sum_sq = 0f64;
    let mut count = 0u64;
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let center = img.get_pixel(x, y).0[0] as f64;
            let up = img.get_pixel(x, y - 1).0[0] as f64;
            let down = img.get_pixel(x, y + 1).0[0] as f64;
            let left = img.get_pixel(x - 1, y).0[0] as f64;
            let right = img.get_pixel(x + 1, y).0[0] as f64;
            let response = up + down + left + right - 4.0 * center;
            sum += response;
            sum_sq += response * response;
            count += 1;
        }
    }

    let n = count as f64;
    let mean = sum / n;
    let variance = (sum_sq / n - mean * mean).max(0.0);
    Some(variance.sqrt())
}
