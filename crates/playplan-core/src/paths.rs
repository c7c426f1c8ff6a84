use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// File name constants
// ---------------------------------------------------------------------------

pub const CONFIG_FILE: &str = "playplan.yaml";
pub const SUMMARY_SUFFIX: &str = "-summary";
pub const SUMMARY_JSON_EXT: &str = "json";
pub const SUMMARY_MD_EXT: &str = "md";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// `YYYY-MM-DDTHH-MM-SSZ-summary`: the run start time, seconds precision,
/// with `-` in place of `:`.
pub fn summary_file_stem(started: DateTime<Utc>) -> String {
    format!("{}{SUMMARY_SUFFIX}", started.format("%Y-%m-%dT%H-%M-%SZ"))
}

pub fn summary_json_path(summary_dir: &Path, started: DateTime<Utc>) -> PathBuf {
    summary_dir.join(format!("{}.{SUMMARY_JSON_EXT}", summary_file_stem(started)))
}

pub fn summary_markdown_path(summary_dir: &Path, started: DateTime<Utc>) -> PathBuf {
    summary_dir.join(format!("{}.{SUMMARY_MD_EXT}", summary_file_stem(started)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
