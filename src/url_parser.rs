//! Extraction of Drive item ids from URLs, raw ids and id listing files.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{DriveError, Result};

/// Folder, file, document and `open?id=` style Drive links.
static DRIVE_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://(?:drive|docs)\.google\.com/(?:drive/(?:u/\d+/)?folders/|file/d/|(?:document|spreadsheets|presentation)/d/|open\?id=)([a-zA-Z0-9_-]+)",
    )
    .expect("Invalid Drive URL regex")
});

/// Valid Google Drive ID pattern (alphanumeric, underscore, hyphen).
static ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("Invalid ID regex"));

/// Extract a Google Drive ID from a URL or validate a raw ID.
///
/// ```
/// use drive_transfer::url_parser::extract_id;
///
/// let id = extract_id("https://drive.google.com/drive/folders/1abc123").unwrap();
/// assert_eq!(id, "1abc123");
///
/// let id = extract_id("1abc123").unwrap();
/// assert_eq!(id, "1abc123");
/// ```
pub fn extract_id(url_or_id: &str) -> Result<String> {
    let trimmed = url_or_id.trim();

    if let Some(id) = DRIVE_URL_REGEX.captures(trimmed).and_then(|c| c.get(1)) {
        return Ok(id.as_str().to_string());
    }

    if ID_REGEX.is_match(trimmed) {
        return Ok(trimmed.to_string());
    }

    Err(DriveError::InvalidUrlOrId(url_or_id.to_string()))
}

/// Parse an id listing: one id or URL per line, blank lines skipped.
pub fn parse_id_list(content: &str) -> Result<Vec<String>> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(extract_id)
        .collect()
}

/// Read and parse an id listing file.
pub fn read_id_list<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    parse_id_list(&content)
}
