// Pipeline Test Fixtures
// Uses FFmpeg lavfi sources to generate deterministic test videos.
// No binary fixtures checked in; every test skips when ffmpeg is absent.

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::process::Command;

    use tempfile::TempDir;

    use crate::analysis::analyze_frame;
    use crate::config::{CoverConfig, CoverOptions};
    use crate::extract::{extract_frame, frame_file_name};
    use crate::pipeline::generate_cover_for_video;
    use crate::probe::probe_duration;
    use crate::tools;

    /// Fixture videos exercising different cover-selection paths
    #[derive(Debug, Clone, Copy)]
    enum FixtureKind {
        /// Animated test pattern: bright, detailed frames that score well
        Animated,
        /// Uniform mid-gray: valid frames with no contrast or detail
        FlatGray,
        /// Pure black: every frame fails the validity screen
        Black,
    }

    /// Generate a 5-second test video using FFmpeg lavfi sources.
    /// Returns the path to the generated file (in the temp directory).
    fn generate_fixture(temp_dir: &Path, kind: FixtureKind) -> anyhow::Result<PathBuf> {
        let output_path = temp_dir.join(format!("fixture_{:?}.mp4", kind));

        let source = match kind {
            FixtureKind::Animated => "testsrc2=s=320x240:d=5:r=30",
            FixtureKind::FlatGray => "color=c=gray:s=320x240:d=5:r=30",
            FixtureKind::Black => "color=c=black:s=320x240:d=5:r=30",
        };

        let args = vec![
            "-f", "lavfi",
            "-i", source,
            "-c:v", "libx264",
            "-preset", "ultrafast",
            "-pix_fmt", "yuv420p",
            "-an",
            "-y",
        ];

        let mut cmd = Command::new(tools::ffmpeg_path());
        for arg in &args {
            cmd.arg(arg);
        }
        cmd.arg(&output_path);

        let output = cmd.output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("FFmpeg failed: {}", stderr);
        }

        if !output_path.exists() {
            anyhow::bail!("Fixture file was not created");
        }

        Ok(output_path)
    }

    /// A config tuned for tests: no stagger or retry delays.
    fn fast_config() -> CoverConfig {
        CoverConfig {
            stagger_ms: 0,
            retry_delay_ms: 0,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_fixture_probe_duration() {
        let temp_dir = TempDir::new().unwrap();

        let video = match generate_fixture(temp_dir.path(), FixtureKind::FlatGray) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Skipping test - FFmpeg not available: {}", e);
                return;
            }
        };

        let cfg = fast_config();
        let duration = probe_duration(video.to_str().unwrap(), &cfg).await;

        // Container rounding varies across FFmpeg versions; stay permissive
        let secs = duration.expect("fixture duration should be probeable");
        assert!(
            (4.0..=6.0).contains(&secs),
            "probed duration {} not near 5s",
            secs
        );
    }

    #[tokio::test]
    async fn test_fixture_extract_and_analyze() {
        let temp_dir = TempDir::new().unwrap();

        let video = match generate_fixture(temp_dir.path(), FixtureKind::Animated) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Skipping test - FFmpeg not available: {}", e);
                return;
            }
        };

        let cfg = fast_config();
        let dest = temp_dir.path().join(frame_file_name(0));

        let ok = extract_frame(video.to_str().unwrap(), 1.0, &dest, &cfg).await;
        assert!(ok, "extraction from fixture should succeed");
        assert!(std::fs::metadata(&dest).unwrap().len() > 0);

        let analysis = analyze_frame(&dest, cfg.analysis_width).unwrap();
        assert!(analysis.valid, "test pattern frame should be valid");
        assert!(analysis.score > 0.0 && analysis.score <= 1.0);
    }

    #[tokio::test]
    async fn test_fixture_extract_past_end_fails_cleanly() {
        let temp_dir = TempDir::new().unwrap();

        let video = match generate_fixture(temp_dir.path(), FixtureKind::FlatGray) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Skipping test - FFmpeg not available: {}", e);
                return;
            }
        };

        let cfg = fast_config();
        let dest = temp_dir.path().join(frame_file_name(0));

        // Seeking far past the end produces no frame; the point fails
        // without leaving a partial file behind
        let ok = extract_frame(video.to_str().unwrap(), 60.0, &dest, &cfg).await;
        assert!(!ok);
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_fixture_end_to_end_cover() {
        let temp_dir = TempDir::new().unwrap();

        let video = match generate_fixture(temp_dir.path(), FixtureKind::Animated) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Skipping test - FFmpeg not available: {}", e);
                return;
            }
        };

        let cfg = fast_config();
        let out = temp_dir.path().join("covers");
        let result = generate_cover_for_video(
            video.to_str().unwrap(),
            "fixture-anim",
            &out,
            &CoverOptions::default(),
            &cfg,
        )
        .await
        .unwrap();

        // Default format priority puts webp first
        assert_eq!(result.as_deref(), Some("/uploads/cover/fixture-anim.webp"));
        let cover = out.join("fixture-anim.webp");
        assert!(cover.exists());
        assert!(std::fs::metadata(&cover).unwrap().len() > 0);
    }

    #[tokio::test]
    async fn test_fixture_black_video_still_yields_cover() {
        let temp_dir = TempDir::new().unwrap();

        let video = match generate_fixture(temp_dir.path(), FixtureKind::Black) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Skipping test - FFmpeg not available: {}", e);
                return;
            }
        };

        // Every frame is near-black and invalid; the selector falls back
        // to the best-scoring invalid frame rather than giving up
        let cfg = fast_config();
        let out = temp_dir.path().join("covers");
        let result = generate_cover_for_video(
            video.to_str().unwrap(),
            "fixture-black",
            &out,
            &CoverOptions::default(),
            &cfg,
        )
        .await
        .unwrap();

        let public = result.expect("black video should still produce a cover");
        assert!(public.starts_with("/uploads/cover/fixture-black."));
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_fixture_explicit_sample_points() {
        let temp_dir = TempDir::new().unwrap();

        let video = match generate_fixture(temp_dir.path(), FixtureKind::Animated) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Skipping test - FFmpeg not available: {}", e);
                return;
            }
        };

        // Explicit points skip probing and planning entirely
        let cfg = fast_config();
        let options = CoverOptions {
            sample_points: Some(vec![2.0]),
            ..Default::default()
        };
        let out = temp_dir.path().join("covers");
        let result = generate_cover_for_video(
            video.to_str().unwrap(),
            "fixture-points",
            &out,
            &options,
            &cfg,
        )
        .await
        .unwrap();

        assert!(result.is_some());
        assert!(out.join("fixture-points.webp").exists());
    }
}
