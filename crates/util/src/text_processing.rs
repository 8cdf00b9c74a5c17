//! # Text Processing Utilities
//!
//! Redaction of credentials before text reaches logs or error messages.

use once_cell::sync::Lazy;
use regex::Regex;

/// Redacts values that look like secrets in a string.
///
/// Covers `Authorization: Token <value>` (or `Bearer`) header lines, JSON
/// entries whose key names a token or password, and `KEY=value` assignments.
/// A bare "Token ..." in prose is left untouched.
/// Key names are kept so the output stays useful for debugging.
///
/// # Example
/// ```rust
/// use jobapp_util::text_processing::redact_sensitive;
///
/// let redacted = redact_sensitive("Authorization: Token 9f8e7d6c");
/// assert_eq!(redacted, "Authorization: Token [REDACTED]");
///
/// let redacted = redact_sensitive(r#"{"token": "9f8e7d6c"}"#);
/// assert_eq!(redacted, r#"{"token": "[REDACTED]"}"#);
/// ```
pub fn redact_sensitive(input: &str) -> String {
    redact_sensitive_with(input, "[REDACTED]")
}

/// Redacts sensitive-looking values, using a custom replacement token.
pub fn redact_sensitive_with(input: &str, replacement: &str) -> String {
    let mut redacted = input.to_string();

    for pattern in get_redact_patterns().iter() {
        redacted = pattern
            .replace_all(&redacted, |captures: &regex::Captures| {
                let prefix = captures.get(1).map(|m| m.as_str()).unwrap_or("");
                let suffix = captures.get(3).map(|m| m.as_str()).unwrap_or("");
                format!("{prefix}{replacement}{suffix}")
            })
            .to_string();
    }

    redacted
}

fn get_redact_patterns() -> &'static Vec<Regex> {
    static REDACT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(build_redact_patterns);

    &REDACT_PATTERNS
}

fn build_redact_patterns() -> Vec<Regex> {
    const SECRET_KEYWORDS: &str = "token|password|password1|password2|secret|api_key";

    let json_entry = format!(r#"(?i)("(?:{SECRET_KEYWORDS})"\s*:\s*")([^"]*)(")"#);
    let assignment = format!(r"(?i)(\b[A-Z0-9_]*(?:{SECRET_KEYWORDS})\s*=\s*)([^\s&]+)");

    [
        r"(?i)(\bauthorization\s*:\s*(?:Token|Bearer)\s+)([A-Za-z0-9\-._~+/]+=*)",
        json_entry.as_str(),
        assignment.as_str(),
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("redaction patterns are valid"))
    .collect()
}
