// Cover pipeline configuration
//
// Every field has a default so partial JSON config files work.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{CoverError, Result};

/// Output image format for covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverFormat {
    Webp,
    Jpeg,
    Png,
}

impl CoverFormat {
    /// File extension used for output files and public paths.
    pub fn extension(&self) -> &'static str {
        match self {
            CoverFormat::Webp => "webp",
            CoverFormat::Jpeg => "jpg",
            CoverFormat::Png => "png",
        }
    }
}

impl std::fmt::Display for CoverFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// One encode target: format plus its quality knob (ignored for png).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatSpec {
    pub format: CoverFormat,
    #[serde(default = "default_format_quality")]
    pub quality: u32,
}

fn default_format_quality() -> u32 {
    COVER_JPEG_QUALITY
}

impl FormatSpec {
    pub fn new(format: CoverFormat, quality: u32) -> Self {
        Self { format, quality }
    }
}

/// How candidate frames are extracted and analyzed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SamplingStrategy {
    /// Sequential extraction with a spacing delay and early stop on a
    /// good-enough frame. Default; easiest on remote storage.
    Staggered,
    /// Extract and analyze every sampling point concurrently.
    Exhaustive,
}

/// Pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverConfig {
    /// Encode targets in priority order; first success wins.
    pub formats: Vec<FormatSpec>,
    /// Target cover width in pixels (never upscales).
    pub width: u32,
    /// Number of sampling points planned per run.
    pub sample_count: usize,
    /// Offsets used when the duration is unknown.
    pub fallback_offsets: Vec<f64>,
    pub probe_timeout_ms: u64,
    pub extract_timeout_ms: u64,
    /// Additional encode attempts per format after the first.
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    /// Downsample width for frame scoring.
    pub analysis_width: u32,
    pub strategy: SamplingStrategy,
    /// Staggered mode stops early once a valid frame scores at least this.
    pub early_stop_threshold: f64,
    /// Delay between extraction calls in staggered mode.
    pub stagger_ms: u64,
    /// ffmpeg/ffprobe -probesize hint.
    pub probe_size_bytes: u64,
    /// ffmpeg/ffprobe -analyzeduration hint.
    pub analyze_duration_us: u64,
    /// Site-relative prefix of the returned cover path.
    pub public_prefix: String,
}

impl Default for CoverConfig {
    fn default() -> Self {
        Self {
            formats: default_formats(),
            width: COVER_WIDTH,
            sample_count: SAMPLE_COUNT,
            fallback_offsets: FALLBACK_OFFSETS.to_vec(),
            probe_timeout_ms: PROBE_TIMEOUT_MS,
            extract_timeout_ms: EXTRACT_TIMEOUT_MS,
            max_retries: ENCODE_MAX_RETRIES,
            retry_delay_ms: ENCODE_RETRY_DELAY_MS,
            analysis_width: ANALYSIS_WIDTH,
            strategy: SamplingStrategy::Staggered,
            early_stop_threshold: EARLY_STOP_THRESHOLD,
            stagger_ms: STAGGER_MS,
            probe_size_bytes: PROBE_SIZE_BYTES,
            analyze_duration_us: ANALYZE_DURATION_US,
            public_prefix: PUBLIC_COVER_PREFIX.to_string(),
        }
    }
}

/// Default encode targets: webp first, jpeg second, png last resort.
pub fn default_formats() -> Vec<FormatSpec> {
    vec![
        FormatSpec::new(CoverFormat::Webp, COVER_WEBP_QUALITY),
        FormatSpec::new(CoverFormat::Jpeg, COVER_JPEG_QUALITY),
        FormatSpec::new(CoverFormat::Png, 100),
    ]
}

impl CoverConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Per-frame extraction timeout, hard-capped so a misconfigured value
    /// cannot hold a worker indefinitely.
    pub fn extract_timeout(&self) -> Duration {
        Duration::from_millis(self.extract_timeout_ms.min(EXTRACT_TIMEOUT_CAP_MS))
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn stagger_delay(&self) -> Duration {
        Duration::from_millis(self.stagger_ms)
    }

    /// Load configuration from a JSON file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| CoverError::Config(format!("{}: {}", path.display(), e)))?;
        let cfg: CoverConfig = serde_json::from_str(&data)?;
        Ok(cfg)
    }

    /// Default config file location (platform config dir).
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "covergen")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load from an explicit path, else the default location, else defaults.
    /// An explicit path that fails to load is an error; a missing default
    /// file is not.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }
        Ok(Self::default())
    }
}

/// Per-call overrides accepted by the pipeline facade. `None` fields fall
/// through to the configuration.
#[derive(Debug, Clone, Default)]
pub struct CoverOptions {
    pub width: Option<u32>,
    /// Explicit sampling offsets; skips probing and planning entirely.
    pub sample_points: Option<Vec<f64>>,
    pub timeout_ms: Option<u64>,
    pub max_retries: Option<u32>,
    pub retry_delay_ms: Option<u64>,
}

impl CoverOptions {
    /// Fold these overrides into a config, returning the effective config.
    pub fn apply(&self, base: &CoverConfig) -> CoverConfig {
        let mut cfg = base.clone();
        if let Some(w) = self.width {
            cfg.width = w;
        }
        if let Some(t) = self.timeout_ms {
            cfg.extract_timeout_ms = t;
        }
        if let Some(r) = self.max_retries {
            cfg.max_retries = r;
        }
        if let Some(d) = self.retry_delay_ms {
            cfg.retry_delay_ms = d;
        }
        cfg
    }
}
