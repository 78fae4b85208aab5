//! Platform-specific directory utilities
//!
//! Provides consistent directory paths across different operating systems,
//! following platform conventions for cache directories.

use std::path::PathBuf;

/// Get the platform-specific log directory
///
/// `CRAWL_LOG_DIR` wins when set. Otherwise follows platform conventions:
/// - macOS: `~/Library/Caches/crawl/logs`
/// - Linux: `~/.cache/crawl/logs` (or `$XDG_CACHE_HOME/crawl/logs`)
/// - Windows: `%LOCALAPPDATA%\crawl\logs`
/// - Fallback: `/tmp/crawl/logs`
pub fn log_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("CRAWL_LOG_DIR") {
        return PathBuf::from(dir);
    }
    let base_dir = directories::ProjectDirs::from("", "", "crawl")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/tmp/crawl"));

    base_dir.join("logs")
}
