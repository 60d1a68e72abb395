//! URL parser for extracting Google Drive file IDs from user references.

use regex::Regex;
use std::sync::LazyLock;

/// `/file/d/<ID>` and the Docs editors' `/document/d/<ID>`, `/spreadsheets/d/<ID>`,
/// `/presentation/d/<ID>` path shapes.
static PATH_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/(?:file|document|spreadsheets|presentation)/d/([a-zA-Z0-9_-]+)")
        .expect("Invalid path ID regex")
});

/// `?id=<ID>` or `&id=<ID>` query parameter, as used by `open?id=` share links.
static QUERY_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]id=([a-zA-Z0-9_-]+)").expect("Invalid query ID regex"));

/// `drive.google.com/drive/folders/<ID>`, optionally under `/u/<N>/`.
static FOLDER_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://drive\.google\.com/drive/(?:u/\d+/)?folders/([a-zA-Z0-9_-]+)")
        .expect("Invalid folder URL regex")
});

/// Extract a Google Drive file ID from a URL, or return the reference as-is.
///
/// Supports the following shapes:
/// - `https://drive.google.com/file/d/<ID>/view`
/// - `https://docs.google.com/document/d/<ID>/edit`
/// - `https://docs.google.com/spreadsheets/d/<ID>/edit`
/// - `https://docs.google.com/presentation/d/<ID>/edit`
/// - `https://drive.google.com/open?id=<ID>` (or `&id=<ID>`)
///
/// Anything else is treated as a literal file ID after trimming surrounding
/// whitespace. No validation happens here: a bad ID surfaces later as a
/// "not found" error from the API.
///
/// # Examples
///
/// ```
/// use drive_fetch::url_parser::extract_id;
///
/// let id = extract_id("https://docs.google.com/document/d/ABC123/edit");
/// assert_eq!(id, "ABC123");
///
/// let id = extract_id("XYZ789");
/// assert_eq!(id, "XYZ789");
/// ```
pub fn extract_id(url_or_id: &str) -> String {
    let trimmed = url_or_id.trim();

    // Path shapes are more specific than a stray `id=` further along the URL
    if let Some(id) = PATH_ID_REGEX.captures(trimmed).and_then(|c| c.get(1)) {
        return id.as_str().to_string();
    }

    if let Some(id) = QUERY_ID_REGEX.captures(trimmed).and_then(|c| c.get(1)) {
        return id.as_str().to_string();
    }

    trimmed.to_string()
}

/// Extract a folder ID from a folder URL, falling back to [`extract_id`].
///
/// ```
/// use drive_fetch::url_parser::extract_folder_id;
///
/// let id = extract_folder_id("https://drive.google.com/drive/u/0/folders/F1?usp=sharing");
/// assert_eq!(id, "F1");
/// ```
pub fn extract_folder_id(url_or_id: &str) -> String {
    let trimmed = url_or_id.trim();

    match FOLDER_URL_REGEX.captures(trimmed).and_then(|c| c.get(1)) {
        Some(id) => id.as_str().to_string(),
        None => extract_id(trimmed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_file_url() {
        let url = "https://drive.google.com/file/d/1abc123XYZ/view";
        assert_eq!(extract_id(url), "1abc123XYZ");

        let url = "https://drive.google.com/file/d/1abc123XYZ/view?usp=sharing";
        assert_eq!(extract_id(url), "1abc123XYZ");
    }

    #[test]
    fn test_extract_editor_urls() {
        assert_eq!(
            extract_id("https://docs.google.com/document/d/ABC123/edit"),
            "ABC123"
        );
        assert_eq!(
            extract_id("https://docs.google.com/spreadsheets/d/S-1_x/edit#gid=0"),
            "S-1_x"
        );
        assert_eq!(
            extract_id("https://docs.google.com/presentation/d/P9/edit?usp=sharing"),
            "P9"
        );
    }

    #[test]
    fn test_extract_open_url() {
        let url = "https://drive.google.com/open?id=1abc123XYZ";
        assert_eq!(extract_id(url), "1abc123XYZ");

        let url = "https://drive.google.com/uc?export=download&id=1abc123XYZ";
        assert_eq!(extract_id(url), "1abc123XYZ");
    }

    #[test]
    fn test_path_shape_wins_over_query() {
        let url = "https://docs.google.com/document/d/DOC1/edit?id=OTHER";
        assert_eq!(extract_id(url), "DOC1");
    }

    #[test]
    fn test_raw_id_passthrough() {
        assert_eq!(extract_id("XYZ789"), "XYZ789");
        assert_eq!(extract_id("  XYZ789\n"), "XYZ789");
    }

    #[test]
    fn test_unrecognized_is_unchanged() {
        assert_eq!(
            extract_id("https://example.com/folder/123"),
            "https://example.com/folder/123"
        );
        assert_eq!(extract_id("not an id"), "not an id");
        assert_eq!(extract_id(""), "");
    }

    #[test]
    fn test_folder_urls_are_not_file_references() {
        let url = "https://drive.google.com/drive/folders/FOLDER123";
        assert_eq!(extract_id(url), url);
        assert_eq!(extract_folder_id(url), "FOLDER123");
    }
}
