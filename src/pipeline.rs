// Cover pipeline facade
//
// Probe, plan, select, encode. Ordinary media failures come back as
// Ok(None); Err is reserved for caller mistakes and environment
// problems. The run's temporary directory lives inside the returned
// BestFrame and is deleted exactly once when it drops, on every path.

use std::path::Path;
use std::time::Instant;

use crate::config::{CoverConfig, CoverOptions};
use crate::encoder::encode_cover;
use crate::error::{CoverError, Result};
use crate::probe::probe_duration;
use crate::sampling::compute_sample_points;
use crate::selector::select_best_frame;

/// Generate a cover image for one video.
///
/// On success returns the site-relative path the web layer serves, e.g.
/// `/uploads/cover/{item_id}.webp`. Returns `Ok(None)` when no cover
/// could be produced from the media.
pub async fn generate_cover_for_video(
    media_url: &str,
    item_id: &str,
    output_dir: &Path,
    options: &CoverOptions,
    config: &CoverConfig,
) -> Result<Option<String>> {
    validate_item_id(item_id)?;
    let cfg = options.apply(config);

    std::fs::create_dir_all(output_dir)
        .map_err(|e| CoverError::OutputDir(format!("{}: {}", output_dir.display(), e)))?;

    let started = Instant::now();

    // A local path that does not exist cannot yield frames; skip the
    // tool churn. Remote URLs go straight to the tools.
    if is_local_path(media_url) && !Path::new(media_url).exists() {
        log::warn!("media not found: {}", media_url);
        return Ok(None);
    }

    let points = match &options.sample_points {
        Some(points) if !points.is_empty() => points.clone(),
        _ => {
            let duration = probe_duration(media_url, &cfg).await;
            compute_sample_points(duration, cfg.sample_count, &cfg.fallback_offsets)
        }
    };

    let Some(best) = select_best_frame(media_url, &points, &cfg).await? else {
        log::warn!(
            "no cover for {}: all {} sampling points failed",
            item_id,
            points.len()
        );
        return Ok(None);
    };

    let Some((format, _dest)) = encode_cover(&best, item_id, output_dir, &cfg).await else {
        log::warn!("no cover for {}: every format exhausted its retries", item_id);
        return Ok(None);
    };

    let public = public_path(&cfg.public_prefix, item_id, format.extension());
    log::info!(
        "cover for {}: offset {:.1}s, score {:.2}, {} in {}ms",
        item_id,
        best.offset_secs,
        best.score,
        format,
        started.elapsed().as_millis()
    );
    Ok(Some(public))
}

/// Item ids become file names; reject anything that could escape the
/// output directory or surprise the web layer.
fn validate_item_id(item_id: &str) -> Result<()> {
    let re = regex::Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").unwrap();
    if re.is_match(item_id) {
        Ok(())
    } else {
        Err(CoverError::InvalidItemId(item_id.to_string()))
    }
}

/// Anything without a URL scheme is treated as a local path.
fn is_local_path(media: &str) -> bool {
    !media.contains("://")
}

fn public_path(prefix: &str, item_id: &str, extension: &str) -> String {
    format!("{}/{}.{}", prefix.trim_end_matches('/'), item_id, extension)
}
