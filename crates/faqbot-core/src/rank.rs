//! Top-k ranking of related questions.
//!
//! # Ranking Algorithm
//!
//! 1. Score every corpus question with the configured [`Scorer`].
//! 2. Drop non-candidates and scores below `min_score`.
//! 3. Sort by score (desc); equal scores keep corpus order.
//! 4. Skip questions whose text was already emitted.
//! 5. Stop after `limit` suggestions.

use std::collections::HashSet;

use anyhow::{bail, Result};
use serde::Serialize;

use crate::corpus::Corpus;
use crate::scorer::{ScoreQuery, Scorer};

/// A related question offered when no exact match exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    /// Position of the question in the corpus.
    pub index: usize,
    pub question: String,
    /// Strategy-specific relatedness score (higher is closer).
    pub score: f64,
}

/// Ranking parameters, decoupled from application config.
#[derive(Debug, Clone)]
pub struct RankParams {
    /// Maximum suggestions to return.
    pub limit: usize,
    /// Minimum score a candidate needs to be suggested.
    pub min_score: f64,
}

impl Default for RankParams {
    fn default() -> Self {
        Self {
            limit: 5,
            min_score: 0.0,
        }
    }
}

/// Rank corpus questions against `query` and return the top suggestions.
///
/// A query whose normalized form is empty yields no suggestions.
pub fn rank(
    scorer: &dyn Scorer,
    query: &ScoreQuery<'_>,
    corpus: &Corpus,
    params: &RankParams,
) -> Result<Vec<Suggestion>> {
    if query.normalized.is_empty() || params.limit == 0 {
        return Ok(Vec::new());
    }

    let scores = scorer.score(query, corpus)?;
    if scores.len() != corpus.len() {
        bail!(
            "{} scorer returned {} scores for {} questions",
            scorer.strategy(),
            scores.len(),
            corpus.len()
        );
    }

    let mut scored: Vec<(usize, f64)> = scores
        .into_iter()
        .enumerate()
        .filter_map(|(i, score)| score.map(|s| (i, s)))
        .filter(|(_, s)| s.is_finite() && *s >= params.min_score)
        .collect();

    // Stable sort: ties stay in corpus order.
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut seen: HashSet<&str> = HashSet::new();
    let mut suggestions = Vec::with_capacity(params.limit.min(scored.len()));
    for (index, score) in scored {
        let question = corpus.questions()[index].as_str();
        if !seen.insert(question) {
            continue;
        }
        suggestions.push(Suggestion {
            index,
            question: question.to_string(),
            score,
        });
        if suggestions.len() >= params.limit {
            break;
        }
    }

    Ok(suggestions)
}
