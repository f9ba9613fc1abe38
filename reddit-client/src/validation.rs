use viewer_core::CoreError;

/// Whether `path` may be appended to the Reddit API base URL.
///
/// Only rooted, single-slash paths are accepted. Traversal (`..`),
/// protocol-relative (`//host`) and absolute URLs are rejected, as are
/// fragments.
pub fn is_safe_reddit_path(path: &str) -> bool {
    if path.is_empty() || !path.starts_with('/') || path.starts_with("//") {
        return false;
    }

    let lowered = path.to_ascii_lowercase();
    if lowered.starts_with("http:") || lowered.starts_with("https:") {
        return false;
    }

    !path.contains("..") && !path.contains('#')
}

/// [`is_safe_reddit_path`] as a `Result`, for use with `?`.
pub fn ensure_safe_reddit_path(path: &str) -> Result<(), CoreError> {
    if is_safe_reddit_path(path) {
        Ok(())
    } else {
        Err(CoreError::UnsafePath {
            path: path.to_string(),
        })
    }
}

/// Subreddit names are 1-21 characters of letters, digits and underscores.
pub fn is_valid_subreddit_name(name: &str) -> bool {
    (1..=21).contains(&name.len())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}
