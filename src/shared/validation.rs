use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Extensions kept on stored upload names
    /// Must be 1-10 ASCII alphanumerics
    /// - Valid: "pdf", "docx", "tar", "7z"
    /// - Invalid: "", "tar.gz", "../x", "p df"
    pub static ref EXTENSION_REGEX: Regex = Regex::new(r"^[A-Za-z0-9]{1,10}$").unwrap();
}

/// Lowercased extension of `filename` if it is safe to reuse on disk.
pub fn safe_extension(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || !EXTENSION_REGEX.is_match(ext) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Treat blank form values as missing.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
