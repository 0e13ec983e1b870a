// Duration probing via ffprobe
//
// Probe failure is never fatal: any non-zero exit, timeout, or parse
// failure degrades to "duration unknown" and the planner falls back to
// its fixed offsets.

use serde::Deserialize;

use crate::config::CoverConfig;
use crate::exec::{run_tool, ToolOutcome};
use crate::tools;

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Probe the media's duration in seconds.
///
/// Returns `None` when the duration cannot be determined: tool failure,
/// timeout, or unparsable output.
pub async fn probe_duration(media: &str, cfg: &CoverConfig) -> Option<f64> {
    let probe_size = cfg.probe_size_bytes.to_string();
    let analyze_duration = cfg.analyze_duration_us.to_string();
    let args = [
        "-v",
        "error",
        "-probesize",
        probe_size.as_str(),
        "-analyzeduration",
        analyze_duration.as_str(),
        "-print_format",
        "json",
        "-show_format",
        "-show_streams",
        media,
    ];

    match run_tool(&tools::ffprobe_path(), &args, cfg.probe_timeout()).await {
        ToolOutcome::Success { stdout } => match serde_json::from_slice::<ProbeOutput>(&stdout) {
            Ok(parsed) => {
                let duration = parse_duration(&parsed);
                if duration.is_none() {
                    log::debug!("ffprobe output for {} carries no usable duration", media);
                }
                duration
            }
            Err(e) => {
                log::debug!("failed to parse ffprobe output for {}: {}", media, e);
                None
            }
        },
        ToolOutcome::Failed { exit_code, stderr } => {
            log::debug!(
                "ffprobe failed for {} (exit {:?}): {}",
                media,
                exit_code,
                stderr
            );
            None
        }
        ToolOutcome::TimedOut => {
            log::debug!("ffprobe timed out for {}", media);
            None
        }
    }
}

/// Duration precedence: format-level value first, then the first video
/// stream. Non-positive or non-finite durations count as unknown.
fn parse_duration(probe: &ProbeOutput) -> Option<f64> {
    if let Some(secs) = probe
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .and_then(parse_secs)
    {
        return Some(secs);
    }

    probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .and_then(|s| s.duration.as_deref())
        .and_then(parse_secs)
}

fn parse_secs(s: &str) -> Option<f64> {
    let secs: f64 = s.parse().ok()?;
    if secs.is_finite() && secs > 0.0 {
        Some(secs)
    } else {
        None
    }
}
