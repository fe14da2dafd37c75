//! Text normalization applied before any comparison.
//!
//! Normalization lowercases the input, drops every character that is not an
//! ASCII letter, ASCII digit, or whitespace, and trims the result. There is
//! no locale handling and no unicode normalization: accented letters are
//! removed, not folded.

use std::collections::HashSet;

/// Normalize a question or query for equality and overlap comparisons.
///
/// ```rust
/// use faqbot_core::normalize;
///
/// assert_eq!(normalize("  What is the GPA requirement?  "), "what is the gpa requirement");
/// assert_eq!(normalize("???"), "");
/// ```
pub fn normalize(text: &str) -> String {
    let kept: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();
    kept.trim().to_string()
}

/// Split the normalized form of `text` into a set of whitespace tokens.
pub fn tokenize(text: &str) -> HashSet<String> {
    normalize(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
