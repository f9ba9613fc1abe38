//! Credential redaction for strings headed to the log sink.

use regex::Regex;
use std::sync::OnceLock;

const REDACTED: &str = "[REDACTED]";

fn bearer_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\bBearer\s+[A-Za-z0-9\-_.~+/]+=*").expect("bearer pattern is valid")
    })
}

fn token_assignment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(token)\s*([=:])\s*[^\s&,;]+").expect("token pattern is valid")
    })
}

fn long_run_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[A-Za-z0-9_\-]{20,}").expect("run pattern is valid"))
}

/// Redacts bearer tokens, `token=`/`token:` values and any 20+ character
/// identifier-like run from `message`.
///
/// Bearer sequences are replaced first so the `Bearer` keyword survives:
///
/// ```
/// use viewer_core::sanitize_error_message;
///
/// assert_eq!(
///     sanitize_error_message("Bearer abc123token1234567890xyz failed"),
///     "Bearer [REDACTED] failed"
/// );
/// ```
pub fn sanitize_error_message(message: &str) -> String {
    let redacted = bearer_pattern().replace_all(message, format!("Bearer {REDACTED}"));
    let redacted = token_assignment_pattern()
        .replace_all(&redacted, format!("${{1}}${{2}}{REDACTED}"));
    long_run_pattern()
        .replace_all(&redacted, REDACTED)
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_redacted() {
        assert_eq!(
            sanitize_error_message("Bearer abc123token1234567890xyz failed"),
            "Bearer [REDACTED] failed"
        );
        assert_eq!(
            sanitize_error_message("header was bearer short"),
            "header was Bearer [REDACTED]"
        );
    }

    #[test]
    fn test_token_assignment_redacted() {
        assert_eq!(
            sanitize_error_message("request failed: token=abc123&limit=25"),
            "request failed: token=[REDACTED]&limit=25"
        );
        assert_eq!(
            sanitize_error_message("access_token: xyz"),
            "access_token:[REDACTED]"
        );
    }

    #[test]
    fn test_long_runs_redacted() {
        assert_eq!(
            sanitize_error_message("client abcdefghij0123456789_- rejected"),
            "client [REDACTED] rejected"
        );
        // 19 characters stay visible
        assert_eq!(
            sanitize_error_message("id abcdefghij012345678 ok"),
            "id abcdefghij012345678 ok"
        );
    }

    #[test]
    fn test_plain_messages_untouched() {
        let message = "Server error: 503 for /r/rust/hot";
        assert_eq!(sanitize_error_message(message), message);
        assert_eq!(sanitize_error_message(""), "");
    }
}
