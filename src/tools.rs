// External tool resolver for ffmpeg/ffprobe
//
// Resolution order:
// 1) Environment variable override (COVERGEN_FFMPEG_PATH, COVERGEN_FFPROBE_PATH)
// 2) PATH fallback

use std::env;
use std::path::PathBuf;

/// Resolve an external tool path.
fn resolve_tool(env_key: &str, default_name: &str) -> PathBuf {
    // 1) Check environment variable override
    if let Ok(v) = env::var(env_key) {
        let p = PathBuf::from(&v);
        if p.exists() {
            return p;
        }
    }

    // Add .exe on Windows
    let mut filename = default_name.to_string();
    if cfg!(windows) && !filename.to_lowercase().ends_with(".exe") {
        filename.push_str(".exe");
    }

    // 2) Fall back to PATH
    PathBuf::from(filename)
}

/// Get path to ffprobe binary
pub fn ffprobe_path() -> PathBuf {
    resolve_tool("COVERGEN_FFPROBE_PATH", "ffprobe")
}

/// Get path to ffmpeg binary
pub fn ffmpeg_path() -> PathBuf {
    resolve_tool("COVERGEN_FFMPEG_PATH", "ffmpeg")
}

/// Check if a tool is available at the resolved path
pub fn is_tool_available(tool: &str) -> bool {
    let path = match tool {
        "ffprobe" => ffprobe_path(),
        "ffmpeg" => ffmpeg_path(),
        _ => return false,
    };

    std::process::Command::new(&path)
        .arg("-version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
