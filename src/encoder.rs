// Cover encoding
//
// Re-encodes the chosen frame into the configured formats, highest
// priority first, with bounded retries per format. A format's retries
// are exhausted before the next format is tried; later formats are
// deliberate fallbacks, so no reordering.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::imageops::FilterType;
use image::DynamicImage;

use crate::config::{CoverConfig, CoverFormat, FormatSpec};
use crate::selector::BestFrame;

/// Re-encode `src` into `dest` as the given format, resizing down to
/// `width` when the source is wider. Never upscales. A failed attempt
/// removes its staged `.tmp` file before the error propagates.
pub fn convert_frame(src: &Path, dest: &Path, spec: &FormatSpec, width: u32) -> Result<()> {
    let img =
        image::open(src).with_context(|| format!("failed to decode {}", src.display()))?;
    let img = resize_down(img, width);

    let tmp = dest.with_extension("tmp");
    let staged = encode_into(&img, &tmp, spec, dest).and_then(|_| commit_nonempty(&tmp, dest));
    if staged.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    staged
}

fn encode_into(img: &DynamicImage, tmp: &Path, spec: &FormatSpec, dest: &Path) -> Result<()> {
    match spec.format {
        CoverFormat::Webp => {
            let rgb = img.to_rgb8();
            let encoder = webp::Encoder::from_rgb(rgb.as_raw(), rgb.width(), rgb.height());
            let data = encoder.encode(spec.quality.clamp(1, 100) as f32);
            std::fs::write(tmp, &*data)
                .with_context(|| format!("failed to write {}", tmp.display()))?;
        }
        CoverFormat::Jpeg => {
            let rgb = img.to_rgb8();
            let file = std::fs::File::create(tmp)
                .with_context(|| format!("failed to create {}", tmp.display()))?;
            let writer = std::io::BufWriter::new(file);
            let encoder = JpegEncoder::new_with_quality(writer, spec.quality.clamp(1, 100) as u8);
            rgb.write_with_encoder(encoder)
                .with_context(|| format!("jpeg encode failed for {}", dest.display()))?;
        }
        CoverFormat::Png => {
            let file = std::fs::File::create(tmp)
                .with_context(|| format!("failed to create {}", tmp.display()))?;
            let writer = std::io::BufWriter::new(file);
            let encoder =
                PngEncoder::new_with_quality(writer, CompressionType::Best, PngFilterType::Adaptive);
            img.write_with_encoder(encoder)
                .with_context(|| format!("png encode failed for {}", dest.display()))?;
        }
    }
    Ok(())
}

/// Scale to the target width with aspect preserved; pass through images
/// that are already narrow enough.
fn resize_down(img: DynamicImage, width: u32) -> DynamicImage {
    if width == 0 || img.width() <= width {
        return img;
    }
    let height = (f64::from(img.height()) * f64::from(width) / f64::from(img.width()))
        .round()
        .max(1.0) as u32;
    img.resize_exact(width, height, FilterType::Lanczos3)
}

/// Atomic finish: verify the staged file is non-empty, then rename it
/// into place. A zero-byte stage is deleted and reported as failure.
fn commit_nonempty(tmp: &Path, dest: &Path) -> Result<()> {
    let size = std::fs::metadata(tmp)
        .with_context(|| format!("missing staged output {}", tmp.display()))?
        .len();
    if size == 0 {
        let _ = std::fs::remove_file(tmp);
        return Err(anyhow!("encoded cover is empty: {}", dest.display()));
    }
    std::fs::rename(tmp, dest)
        .with_context(|| format!("failed to move cover into place at {}", dest.display()))?;
    Ok(())
}

/// Encode the best frame into `{output_dir}/{item_id}.{ext}`, trying
/// formats in priority order. Returns the winning format and path, or
/// `None` when every format exhausted its retries.
pub async fn encode_cover(
    best: &BestFrame,
    item_id: &str,
    output_dir: &Path,
    cfg: &CoverConfig,
) -> Option<(CoverFormat, PathBuf)> {
    encode_with(cfg, |spec| {
        let dest = output_dir.join(format!("{}.{}", item_id, spec.format.extension()));
        convert_frame(&best.frame_path, &dest, spec, cfg.width)?;
        Ok(dest)
    })
    .await
}

/// The retry and priority loop, written against an attempt closure so
/// the bounds are testable without media files.
async fn encode_with<F>(cfg: &CoverConfig, mut attempt: F) -> Option<(CoverFormat, PathBuf)>
where
    F: FnMut(&FormatSpec) -> Result<PathBuf>,
{
    for spec in &cfg.formats {
        let attempts = 1 + cfg.max_retries;
        for n in 1..=attempts {
            match attempt(spec) {
                Ok(path) => return Some((spec.format, path)),
                Err(e) => {
                    log::warn!(
                        "{} encode attempt {}/{} failed: {:#}",
                        spec.format,
                        n,
                        attempts,
                        e
                    );
                    if n < attempts {
                        tokio::time::sleep(cfg.retry_delay()).await;
                    }
                }
            }
        }
    }
    None
}
