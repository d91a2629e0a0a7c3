//! # Text Processing Utilities
//!
//! Redaction of credentials before text reaches logs or the terminal, plus
//! truncation helpers for one-line summaries.

use once_cell::sync::Lazy;
use regex::Regex;

/// Redacts values that look like secrets in a string.
///
/// Header dumps (`x-api-key: ...`, `authorization: ...`), environment-style
/// assignments (`HUDL_API_KEY=...`), and query parameters named like
/// credentials are replaced with `[REDACTED]` while the key names are kept
/// for debugging.
///
/// # Example
/// ```rust
/// use hudl_util::redact_sensitive;
///
/// assert_eq!(redact_sensitive("x-api-key: abc123"), "x-api-key: [REDACTED]");
/// assert_eq!(redact_sensitive("HUDL_API_KEY=abc123 mode=fast"), "HUDL_API_KEY=[REDACTED] mode=fast");
/// ```
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();
    for pattern in REDACT_PATTERNS.iter() {
        redacted = pattern
            .replace_all(&redacted, |captures: &regex::Captures| {
                let prefix = captures.get(1).map(|m| m.as_str()).unwrap_or("");
                format!("{prefix}[REDACTED]")
            })
            .to_string();
    }
    redacted
}

static REDACT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(x-api-key:\s*)([^\s,]+)",
        r"(?i)(authorization:\s*)((?:bearer|basic|token)\s+[^\s,]+|[^\s,]+)",
        r"(?i)\b([A-Z0-9_]*?(?:KEY|TOKEN|SECRET|PASSWORD)=)([^\s&]+)",
        r#"(?i)("(?:x-api-key|api[_-]?key|token|secret)"\s*:\s*)("[^"]*")"#,
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Truncate text to `max_len` characters, appending `...` when shortened.
pub fn truncate_for_summary(text: &str, max_len: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_len {
        return trimmed.to_string();
    }

    // Reserve space for the trailing ellipsis.
    let target_len = max_len.saturating_sub(3);
    let truncated: String = trimmed.chars().take(target_len).collect();
    format!("{}...", truncated.trim_end())
}
