// Covergen Constants
// Tuned defaults for the cover pipeline. Config overrides all of these.

// Public path returned to callers on success
pub const PUBLIC_COVER_PREFIX: &str = "/uploads/cover";

// Cover output settings
pub const COVER_WIDTH: u32 = 640;
pub const COVER_WEBP_QUALITY: u32 = 82;
pub const COVER_JPEG_QUALITY: u32 = 85;

// Sampling plan
pub const SAMPLE_COUNT: usize = 5;
pub const FALLBACK_OFFSETS: [f64; 3] = [1.0, 3.0, 5.0];
pub const SHORT_VIDEO_SECS: f64 = 3.0;
pub const MEDIUM_VIDEO_SECS: f64 = 10.0;
pub const SHORT_SAMPLE_FRACTIONS: [f64; 3] = [0.3, 0.5, 0.7];
pub const MEDIUM_EDGE_MARGIN_SECS: f64 = 0.5;
pub const LONG_WINDOW_START_FRACTION: f64 = 0.05;
pub const LONG_WINDOW_END_FRACTION: f64 = 0.60;

// Tool timeouts
pub const PROBE_TIMEOUT_MS: u64 = 5_000;
pub const EXTRACT_TIMEOUT_MS: u64 = 10_000;
pub const EXTRACT_TIMEOUT_CAP_MS: u64 = 15_000;

// Stream probing hints (bound how much of a remote URL gets read)
pub const PROBE_SIZE_BYTES: u64 = 5_000_000;
pub const ANALYZE_DURATION_US: u64 = 10_000_000;

// Encode retry policy
pub const ENCODE_MAX_RETRIES: u32 = 2;
pub const ENCODE_RETRY_DELAY_MS: u64 = 500;

// Frame analysis
pub const ANALYSIS_WIDTH: u32 = 64;

// Component weights (must sum to 1.0)
pub const SCORE_WEIGHT_BRIGHTNESS: f64 = 0.4;
pub const SCORE_WEIGHT_CONTRAST: f64 = 0.3;
pub const SCORE_WEIGHT_SHARPNESS: f64 = 0.3;

// Normalization divisors
pub const BRIGHTNESS_IDEAL_MEAN: f64 = 128.0;
pub const CONTRAST_NORM_STD: f64 = 64.0;
pub const SHARPNESS_NORM_STD: f64 = 50.0;

// Validity bounds on mean luminance (outside = near-black / near-white)
pub const VALID_MEAN_MIN: f64 = 10.0;
pub const VALID_MEAN_MAX: f64 = 245.0;

// Selection strategy tuning
pub const EARLY_STOP_THRESHOLD: f64 = 0.7;
pub const STAGGER_MS: u64 = 300;

// Diagnostics
pub const STDERR_CAPTURE_LIMIT: usize = 4_096;

// Video extensions recognized by batch mode
pub const VIDEO_EXTENSIONS: [&str; 12] = [
    "mp4", "mov", "avi", "mkv", "mpg", "mpeg",
    "wmv", "flv", "webm", "3gp", "m4v", "ts",
];
