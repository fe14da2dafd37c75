//! Prompt construction and cleanup for model-generated follow-up questions.

use std::collections::HashSet;

/// Prompt sent to the generation model when no related question exists.
///
/// The query is interpolated as submitted.
pub fn followup_prompt(query: &str) -> String {
    format!("Suggest follow-up questions for: '{}'", query)
}

/// Trim completions and drop empty or repeated ones, keeping first-seen order.
pub fn clean_followups<I, S>(outputs: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    outputs
        .into_iter()
        .map(|o| o.as_ref().trim().to_string())
        .filter(|o| !o.is_empty())
        .filter(|o| seen.insert(o.clone()))
        .collect()
}
