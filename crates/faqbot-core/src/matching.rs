//! Exact question matching.

use serde::Serialize;

use crate::corpus::Corpus;
use crate::normalize::normalize;

/// The corpus entry an exact match resolved to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExactMatch<'a> {
    /// Position of the matched pair in the corpus.
    pub index: usize,
    pub question: &'a str,
    pub answer: &'a str,
}

/// Find the first corpus question equal to `query`.
///
/// A question matches when its trimmed, lowercased text equals the trimmed,
/// lowercased query, or when both normalize to the same string. The scan is
/// linear with no index.
///
/// Queries that normalize to the empty string never match, even against a
/// corpus question made only of punctuation.
pub fn exact_match<'a>(query: &str, corpus: &'a Corpus) -> Option<ExactMatch<'a>> {
    let normalized = normalize(query);
    if normalized.is_empty() {
        return None;
    }
    let clean = query.trim().to_lowercase();

    corpus
        .questions()
        .iter()
        .zip(corpus.normalized_questions())
        .position(|(question, question_norm)| {
            question.trim().to_lowercase() == clean || *question_norm == normalized
        })
        .map(|index| ExactMatch {
            index,
            question: &corpus.questions()[index],
            answer: &corpus.answers()[index],
        })
}
