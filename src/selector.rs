// Best-frame selection
//
// Runs the sampling plan against the media, scores what it gets back and
// picks the frame to encode. One extraction or analysis failure never
// fails the run; the run fails only when no frame could be produced at
// all.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tokio::task::JoinSet;

use crate::analysis::{analyze_frame, FrameAnalysis};
use crate::config::{CoverConfig, SamplingStrategy};
use crate::error::Result;
use crate::extract::{extract_frame, frame_file_name};

/// One sampling point that produced a frame, plus its analysis when the
/// analyzer could read the file.
#[derive(Debug)]
pub struct Candidate {
    pub index: usize,
    pub offset_secs: f64,
    pub path: PathBuf,
    pub analysis: Option<FrameAnalysis>,
}

/// The chosen frame. Owns the run's temporary directory: dropping this
/// deletes every candidate file, so whoever holds the value controls
/// cleanup.
#[derive(Debug)]
pub struct BestFrame {
    pub offset_secs: f64,
    pub frame_path: PathBuf,
    pub score: f64,
    _temp_dir: TempDir,
}

/// Extract and score candidates for each sampling point, returning the
/// best frame or `None` when every extraction failed.
pub async fn select_best_frame(
    media: &str,
    points: &[f64],
    cfg: &CoverConfig,
) -> Result<Option<BestFrame>> {
    if points.is_empty() {
        return Ok(None);
    }

    let temp_dir = tempfile::Builder::new().prefix("covergen-").tempdir()?;

    let candidates = match cfg.strategy {
        SamplingStrategy::Staggered => {
            staggered_candidates(media, points, temp_dir.path(), cfg).await
        }
        SamplingStrategy::Exhaustive => {
            exhaustive_candidates(media, points, temp_dir.path(), cfg).await
        }
    };

    let Some(best) = pick_best(&candidates) else {
        log::warn!(
            "no usable frame among {} sampling points for {}",
            points.len(),
            media
        );
        return Ok(None);
    };

    let score = best.analysis.as_ref().map(|a| a.score).unwrap_or(0.0);
    log::debug!(
        "selected frame at {:.1}s (score {:.2}, {} candidates)",
        best.offset_secs,
        score,
        candidates.len()
    );

    Ok(Some(BestFrame {
        offset_secs: best.offset_secs,
        frame_path: best.path.clone(),
        score,
        _temp_dir: temp_dir,
    }))
}

/// One point at a time with a spacing delay between extraction calls,
/// stopping early once a valid candidate clears the threshold.
async fn staggered_candidates(
    media: &str,
    points: &[f64],
    dir: &Path,
    cfg: &CoverConfig,
) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for (index, &offset) in points.iter().enumerate() {
        if index > 0 {
            tokio::time::sleep(cfg.stagger_delay()).await;
        }

        let path = dir.join(frame_file_name(index));
        if !extract_frame(media, offset, &path, cfg).await {
            continue;
        }

        let analysis = analyze_candidate(&path, offset, cfg);
        let good_enough = analysis
            .as_ref()
            .map(|a| a.valid && a.score >= cfg.early_stop_threshold)
            .unwrap_or(false);

        candidates.push(Candidate {
            index,
            offset_secs: offset,
            path,
            analysis,
        });

        if good_enough {
            log::debug!(
                "early stop at {:.1}s, score cleared {:.2}",
                offset,
                cfg.early_stop_threshold
            );
            break;
        }
    }

    candidates
}

/// All points concurrently. Results are restored to planner order before
/// selection so ties break exactly as in the staggered path.
async fn exhaustive_candidates(
    media: &str,
    points: &[f64],
    dir: &Path,
    cfg: &CoverConfig,
) -> Vec<Candidate> {
    let mut set = JoinSet::new();

    for (index, &offset) in points.iter().enumerate() {
        let path = dir.join(frame_file_name(index));
        let media = media.to_string();
        let cfg = cfg.clone();
        set.spawn(async move {
            if !extract_frame(&media, offset, &path, &cfg).await {
                return None;
            }
            let analysis = analyze_candidate(&path, offset, &cfg);
            Some(Candidate {
                index,
                offset_secs: offset,
                path,
                analysis,
            })
        });
    }

    let mut candidates = Vec::new();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(Some(candidate)) => candidates.push(candidate),
            Ok(None) => {}
            Err(e) => log::warn!("extraction task failed: {}", e),
        }
    }

    candidates.sort_by_key(|c| c.index);
    candidates
}

fn analyze_candidate(path: &Path, offset: f64, cfg: &CoverConfig) -> Option<FrameAnalysis> {
    match analyze_frame(path, cfg.analysis_width) {
        Ok(analysis) => Some(analysis),
        Err(e) => {
            log::warn!("analysis failed for frame at {:.1}s: {:#}", offset, e);
            None
        }
    }
}

/// Selection policy.
///
/// Among valid candidates a strictly higher score wins and the earliest
/// seen wins exact ties. With no valid candidate, the best analyzed
/// candidate of any validity. With no analyzed candidate, the first
/// extracted frame: a produced frame still beats no cover. `None` only
/// when there are no candidates at all.
pub fn pick_best(candidates: &[Candidate]) -> Option<&Candidate> {
    let mut best_valid: Option<(f64, &Candidate)> = None;
    let mut best_analyzed: Option<(f64, &Candidate)> = None;

    for candidate in candidates {
        if let Some(analysis) = &candidate.analysis {
            if best_analyzed.map_or(true, |(score, _)| analysis.score > score) {
                best_analyzed = Some((analysis.score, candidate));
            }
            if analysis.valid && best_valid.map_or(true, |(score, _)| analysis.score > score) {
                best_valid = Some((analysis.score, candidate));
            }
        }
    }

    best_valid
        .or(best_analyzed)
        .map(|(_, candidate)| candidate)
        .or_else(|| candidates.first())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(index: usize, analysis: Option<(f64, bool)>) -> Candidate {
        Candidate {
            index,
            offset_secs: index as f64,
            path: PathBuf::from(format!("/tmp/{}", frame_file_name(index))),
            analysis: analysis.map(|(score, valid)| FrameAnalysis {
                brightness: score,
                contrast: score,
                sharpness: score,
                score,
                valid,
                mean_luminance: 128.0,
            }),
        }
    }

    #[test]
    fn test_valid_beats_higher_scoring_invalid() {
        let candidates = vec![
            candidate(0, Some((0.9, false))),
            candidate(1, Some((0.3, true))),
        ];
        assert_eq!(pick_best(&candidates).unwrap().index, 1);
    }

    #[test]
    fn test_higher_score_wins_among_valid() {
        let candidates = vec![
            candidate(0, Some((0.4, true))),
            candidate(1, Some((0.8, true))),
            candidate(2, Some((0.6, true))),
        ];
        assert_eq!(pick_best(&candidates).unwrap().index, 1);
    }

    #[test]
    fn test_first_seen_wins_ties() {
        let candidates = vec![
            candidate(0, Some((0.5, true))),
            candidate(1, Some((0.5, true))),
            candidate(2, Some((0.5, true))),
        ];
        assert_eq!(pick_best(&candidates).unwrap().index, 0);
    }

    #[test]
    fn test_no_valid_falls_back_to_best_any() {
        let candidates = vec![
            candidate(0, Some((0.2, false))),
            candidate(1, Some((0.7, false))),
        ];
        assert_eq!(pick_best(&candidates).unwrap().index, 1);
    }

    #[test]
    fn test_no_analysis_falls_back_to_first_extracted() {
        let candidates = vec![candidate(0, None), candidate(1, None)];
        assert_eq!(pick_best(&candidates).unwrap().index, 0);
    }

    #[test]
    fn test_unanalyzed_never_beats_analyzed() {
        let candidates = vec![candidate(0, None), candidate(1, Some((0.1, false)))];
        assert_eq!(pick_best(&candidates).unwrap().index, 1);
    }

    #[test]
    fn test_no_candidates_is_none() {
        assert!(pick_best(&[]).is_none());
    }

    #[tokio::test]
    async fn test_empty_plan_selects_nothing() {
        let cfg = CoverConfig::default();
        let result = select_best_frame("/nonexistent/video.mp4", &[], &cfg)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_total_extraction_failure_selects_nothing() {
        let cfg = CoverConfig {
            stagger_ms: 0,
            ..Default::default()
        };
        let result = select_best_frame("/nonexistent/video.mp4", &[0.5, 1.0], &cfg)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_dropping_best_frame_removes_candidate_files() {
        let temp_dir = tempfile::Builder::new()
            .prefix("covergen-")
            .tempdir()
            .unwrap();
        let frame_path = temp_dir.path().join(frame_file_name(0));
        std::fs::write(&frame_path, b"frame bytes").unwrap();
        let dir_path = temp_dir.path().to_path_buf();

        let best = BestFrame {
            offset_secs: 1.0,
            frame_path,
            score: 0.5,
            _temp_dir: temp_dir,
        };
        assert!(best.frame_path.exists());

        drop(best);
        assert!(!dir_path.exists());
    }
}
