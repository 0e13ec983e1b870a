// Candidate frame extraction
//
// One scaled still per sampling point, written into the run's temp dir.
// Failure is per-point: log it and return false so the orchestrator can
// continue with the remaining points.

use std::path::Path;

use crate::config::CoverConfig;
use crate::exec::{run_tool, ToolOutcome};
use crate::tools;

/// Candidate file name for a given plan index.
pub fn frame_file_name(index: usize) -> String {
    format!("frame_{:02}.png", index)
}

/// Extract one scaled still at `offset` seconds into `dest`.
///
/// Returns false on any failure, including timeout. The caller never
/// relies on partial output; a file left behind by a failed run is
/// removed here.
pub async fn extract_frame(media: &str, offset: f64, dest: &Path, cfg: &CoverConfig) -> bool {
    // Seek before input for fast keyframe seeking; scale down but never up
    let offset_arg = seek_arg(offset);
    let scale_filter = format!("scale='min({},iw)':-1", cfg.width);
    let probe_size = cfg.probe_size_bytes.to_string();
    let analyze_duration = cfg.analyze_duration_us.to_string();
    let dest_str = dest.to_string_lossy();

    let args = [
        "-y",
        "-loglevel",
        "error",
        "-probesize",
        probe_size.as_str(),
        "-analyzeduration",
        analyze_duration.as_str(),
        "-ss",
        offset_arg.as_str(),
        "-i",
        media,
        "-frames:v",
        "1",
        "-vf",
        scale_filter.as_str(),
        dest_str.as_ref(),
    ];

    match run_tool(&tools::ffmpeg_path(), &args, cfg.extract_timeout()).await {
        ToolOutcome::Success { .. } => {
            // ffmpeg can exit zero without output when the seek lands past
            // the end of the stream
            match std::fs::metadata(dest) {
                Ok(meta) if meta.len() > 0 => true,
                _ => {
                    log::warn!("no frame produced at {}s for {}", offset, media);
                    let _ = std::fs::remove_file(dest);
                    false
                }
            }
        }
        ToolOutcome::Failed { exit_code, stderr } => {
            log::warn!(
                "frame extraction at {}s failed for {} (exit {:?}): {}",
                offset,
                media,
                exit_code,
                stderr
            );
            let _ = std::fs::remove_file(dest);
            false
        }
        ToolOutcome::TimedOut => {
            log::warn!("frame extraction at {}s timed out for {}", offset, media);
            let _ = std::fs::remove_file(dest);
            false
        }
    }
}

/// The `-ss` seek value. Millisecond precision so caller-supplied
/// offsets are not re-rounded.
fn seek_arg(offset: f64) -> String {
    format!("{:.3}", offset.max(0.0))
}
