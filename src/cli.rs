// Covergen CLI binary

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use walkdir::WalkDir;

use covergen::analysis::analyze_frame;
use covergen::config::{CoverConfig, CoverOptions};
use covergen::constants::VIDEO_EXTENSIONS;
use covergen::pipeline::generate_cover_for_video;
use covergen::probe::probe_duration;
use covergen::sampling::compute_sample_points;
use covergen::tools;

#[derive(Parser)]
#[command(name = "covergen")]
#[command(about = "Smart cover generation for video uploads", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (JSON); defaults to the platform config directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a cover for one video
    Generate(GenerateArgs),

    /// Generate covers for every video file under a directory
    Batch {
        /// Directory to scan for video files
        dir: PathBuf,
        /// Output directory for cover files
        #[arg(long, default_value = "covers")]
        out: PathBuf,
        /// Regenerate covers that already exist
        #[arg(long)]
        force: bool,
    },

    /// Print the probed duration of a media file in seconds
    Probe {
        /// Media URL or file path
        media: String,
    },

    /// Print the sampling plan for a duration
    Plan {
        /// Duration in seconds; omit for the unknown-duration fallback
        #[arg(long)]
        duration: Option<f64>,
        /// Number of sampling points
        #[arg(long)]
        count: Option<usize>,
    },

    /// Score a still image
    Analyze {
        /// Image file path
        image: PathBuf,
    },

    /// Verify that ffmpeg and ffprobe are available
    Check,
}

#[derive(Args)]
struct GenerateArgs {
    /// Media URL or file path
    media: String,

    /// Item id used for the output file name
    #[arg(long)]
    id: String,

    /// Output directory for cover files
    #[arg(long, default_value = "covers")]
    out: PathBuf,

    /// Target cover width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Explicit sampling offsets in seconds, comma separated
    #[arg(long, value_delimiter = ',')]
    points: Option<Vec<f64>>,

    /// Per-frame extraction timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Additional encode attempts per format
    #[arg(long)]
    retries: Option<u32>,

    /// Delay between encode attempts in milliseconds
    #[arg(long)]
    retry_delay_ms: Option<u64>,

    /// Public path prefix to report on success
    #[arg(long)]
    prefix: Option<String>,

    /// Regenerate even if a cover already exists
    #[arg(long)]
    force: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = CoverConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate(args) => cmd_generate(&config, args).await,
        Commands::Batch { dir, out, force } => cmd_batch(&config, dir, out, force).await,
        Commands::Probe { media } => cmd_probe(&config, media).await,
        Commands::Plan { duration, count } => cmd_plan(&config, duration, count),
        Commands::Analyze { image } => cmd_analyze(&config, image),
        Commands::Check => cmd_check(),
    }
}

async fn cmd_generate(config: &CoverConfig, args: GenerateArgs) -> Result<()> {
    ensure_tools()?;

    let mut config = config.clone();
    if let Some(prefix) = args.prefix {
        config.public_prefix = prefix;
    }

    if !args.force && cover_exists(&args.out, &args.id, &config) {
        println!(
            "Cover for '{}' already exists in {} (use --force to regenerate)",
            args.id,
            args.out.display()
        );
        return Ok(());
    }

    let options = CoverOptions {
        width: args.width,
        sample_points: args.points,
        timeout_ms: args.timeout_ms,
        max_retries: args.retries,
        retry_delay_ms: args.retry_delay_ms,
    };

    match generate_cover_for_video(&args.media, &args.id, &args.out, &options, &config).await? {
        Some(public_path) => {
            println!("{}", public_path);
            Ok(())
        }
        None => anyhow::bail!("No cover could be generated for {}", args.media),
    }
}

async fn cmd_batch(config: &CoverConfig, dir: PathBuf, out: PathBuf, force: bool) -> Result<()> {
    ensure_tools()?;

    let mut generated = 0usize;
    let mut skipped = 0usize;
    let mut failed = 0usize;

    let walker = WalkDir::new(&dir).sort_by_file_name();
    for entry in walker.into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() || !is_video_file(entry.path()) {
            continue;
        }
        let path = entry.path();

        let Some(id) = item_id_for(path) else {
            log::warn!("skipping {}: cannot derive an item id", path.display());
            skipped += 1;
            continue;
        };

        if !force && cover_exists(&out, &id, config) {
            skipped += 1;
            continue;
        }

        let media = path.to_string_lossy();
        match generate_cover_for_video(&media, &id, &out, &CoverOptions::default(), config).await {
            Ok(Some(public_path)) => {
                println!("{}  {}", public_path, path.display());
                generated += 1;
            }
            Ok(None) => {
                println!("FAILED  {}", path.display());
                failed += 1;
            }
            Err(e) => {
                log::error!("{}: {}", path.display(), e);
                failed += 1;
            }
        }
    }

    println!();
    println!(
        "Batch complete: {} generated, {} skipped, {} failed",
        generated, skipped, failed
    );
    Ok(())
}

async fn cmd_probe(config: &CoverConfig, media: String) -> Result<()> {
    match probe_duration(&media, config).await {
        Some(secs) => println!("{:.3}", secs),
        None => println!("unknown"),
    }
    Ok(())
}

fn cmd_plan(config: &CoverConfig, duration: Option<f64>, count: Option<usize>) -> Result<()> {
    let count = count.unwrap_or(config.sample_count);
    let points = compute_sample_points(duration, count, &config.fallback_offsets);
    let rendered: Vec<String> = points.iter().map(|p| format!("{:.1}", p)).collect();
    println!("{}", rendered.join(" "));
    Ok(())
}

fn cmd_analyze(config: &CoverConfig, image: PathBuf) -> Result<()> {
    let analysis = analyze_frame(&image, config.analysis_width)?;
    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}

fn cmd_check() -> Result<()> {
    let mut missing = false;
    for (tool, path) in [
        ("ffmpeg", tools::ffmpeg_path()),
        ("ffprobe", tools::ffprobe_path()),
    ] {
        if tools::is_tool_available(tool) {
            println!("{:>8}  ok       {}", tool, path.display());
        } else {
            println!("{:>8}  MISSING  {}", tool, path.display());
            missing = true;
        }
    }
    if missing {
        anyhow::bail!(
            "Required tools are missing. Install ffmpeg, or point COVERGEN_FFMPEG_PATH / COVERGEN_FFPROBE_PATH at the binaries."
        );
    }
    Ok(())
}

// --- Helper Functions ---

fn ensure_tools() -> Result<()> {
    for tool in ["ffmpeg", "ffprobe"] {
        if !tools::is_tool_available(tool) {
            anyhow::bail!(
                "{} is not available. Install it or set COVERGEN_{}_PATH.",
                tool,
                tool.to_uppercase()
            );
        }
    }
    Ok(())
}

/// True when a cover for this id already exists in any configured format.
fn cover_exists(out: &Path, id: &str, config: &CoverConfig) -> bool {
    config.formats.iter().any(|spec| {
        out.join(format!("{}.{}", id, spec.format.extension())).exists()
    })
}

fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| VIDEO_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Derive a usable item id from a file stem: keep alphanumerics, dots,
/// underscores and dashes, replace the rest, trim junk off the front.
fn item_id_for(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_string_lossy();
    let cleaned: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches(|c: char| !c.is_ascii_alphanumeric());
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}
