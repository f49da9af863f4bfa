//! Extension denylist applied before any URL is queued or fetched

use url::Url;

/// Returns true if `link` points at a file type the crawler cannot read
///
/// The check runs against the URL path, ignoring query and fragment, and is
/// case-insensitive. Unparseable links are checked as raw strings.
pub fn has_excluded_extension(link: &str, exclude_extensions: &[String]) -> bool {
    let path = match Url::parse(link) {
        Ok(url) => url.path().to_ascii_lowercase(),
        Err(_) => link.to_ascii_lowercase(),
    };

    exclude_extensions
        .iter()
        .any(|ext| path.ends_with(&ext.to_ascii_lowercase()))
}
