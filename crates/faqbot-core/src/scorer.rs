//! Interchangeable scoring strategies for related-question ranking.
//!
//! Every strategy implements [`Scorer`]: given a query, produce one optional
//! score per corpus question, where `None` means "not a candidate" and a
//! higher score means "more related". Ranking, thresholds and truncation are
//! applied uniformly by [`crate::rank::rank`].
//!
//! | Strategy | Score | Candidate when |
//! |----------|-------|----------------|
//! | `keyword` | `\|Q ∩ q\| / \|q\|` over token sets | any token overlaps |
//! | `substring` | shorter / longer normalized length | one contains the other |
//! | `jaccard` | `\|Q ∩ q\| / \|Q ∪ q\|` | score > 0 |
//! | `cosine` | cosine similarity of embeddings | always |
//! | `flat_l2` | `1 / (1 + d)`, `d` the Euclidean distance | always |
//!
//! The embedding strategies own the corpus vectors computed at startup and
//! need a query vector at scoring time.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};

use crate::corpus::Corpus;
use crate::embedding::{cosine_similarity, squared_l2_distance};
use crate::normalize::{normalize, tokenize};

/// The scoring strategy selected by `matching.strategy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    Keyword,
    Substring,
    Jaccard,
    Cosine,
    FlatL2,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::Keyword,
        Strategy::Substring,
        Strategy::Jaccard,
        Strategy::Cosine,
        Strategy::FlatL2,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Keyword => "keyword",
            Strategy::Substring => "substring",
            Strategy::Jaccard => "jaccard",
            Strategy::Cosine => "cosine",
            Strategy::FlatL2 => "flat_l2",
        }
    }

    /// Whether this strategy compares embedding vectors.
    pub fn needs_embeddings(self) -> bool {
        matches!(self, Strategy::Cosine | Strategy::FlatL2)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| {
                anyhow!(
                    "Unknown matching strategy: '{}'. Must be keyword, substring, jaccard, cosine, or flat_l2.",
                    s
                )
            })
    }
}

/// A query prepared once and shared by every scorer call.
#[derive(Debug, Clone)]
pub struct ScoreQuery<'a> {
    /// Normalized query text.
    pub normalized: String,
    /// Token set of the normalized query.
    pub tokens: HashSet<String>,
    /// Pre-computed query embedding (required by embedding strategies).
    pub vector: Option<&'a [f32]>,
}

impl<'a> ScoreQuery<'a> {
    pub fn new(text: &str, vector: Option<&'a [f32]>) -> Self {
        Self {
            normalized: normalize(text),
            tokens: tokenize(text),
            vector,
        }
    }

    fn require_vector(&self, strategy: Strategy) -> Result<&'a [f32]> {
        self.vector
            .ok_or_else(|| anyhow!("query vector is required for the {} strategy", strategy))
    }
}

/// A question-relatedness scoring strategy.
///
/// Implementations return exactly one entry per corpus question, in corpus
/// order.
pub trait Scorer: Send + Sync {
    /// The strategy this scorer implements.
    fn strategy(&self) -> Strategy;

    /// Score every corpus question against `query`.
    fn score(&self, query: &ScoreQuery<'_>, corpus: &Corpus) -> Result<Vec<Option<f64>>>;
}

/// Fraction of a question's keywords that also appear in the query.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordOverlapScorer;

impl Scorer for KeywordOverlapScorer {
    fn strategy(&self) -> Strategy {
        Strategy::Keyword
    }

    fn score(&self, query: &ScoreQuery<'_>, corpus: &Corpus) -> Result<Vec<Option<f64>>> {
        Ok(corpus
            .question_tokens()
            .iter()
            .map(|question| {
                let overlap = query.tokens.intersection(question).count();
                if overlap == 0 {
                    None
                } else {
                    Some(overlap as f64 / question.len() as f64)
                }
            })
            .collect())
    }
}

/// Containment of one normalized string in the other.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringScorer;

impl Scorer for SubstringScorer {
    fn strategy(&self) -> Strategy {
        Strategy::Substring
    }

    fn score(&self, query: &ScoreQuery<'_>, corpus: &Corpus) -> Result<Vec<Option<f64>>> {
        let needle = query.normalized.as_str();
        Ok(corpus
            .normalized_questions()
            .iter()
            .map(|question| {
                if needle.is_empty() || question.is_empty() {
                    return None;
                }
                if question.contains(needle) || needle.contains(question.as_str()) {
                    let (a, b) = (question.len(), needle.len());
                    Some(a.min(b) as f64 / a.max(b) as f64)
                } else {
                    None
                }
            })
            .collect())
    }
}

/// Jaccard similarity over token sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct JaccardScorer;

impl Scorer for JaccardScorer {
    fn strategy(&self) -> Strategy {
        Strategy::Jaccard
    }

    fn score(&self, query: &ScoreQuery<'_>, corpus: &Corpus) -> Result<Vec<Option<f64>>> {
        Ok(corpus
            .question_tokens()
            .iter()
            .map(|question| {
                let intersection = query.tokens.intersection(question).count();
                if intersection == 0 {
                    return None;
                }
                let union = query.tokens.len() + question.len() - intersection;
                Some(intersection as f64 / union as f64)
            })
            .collect())
    }
}

/// Cosine similarity between the query embedding and each question embedding.
#[derive(Debug, Clone, Default)]
pub struct CosineScorer {
    vectors: Vec<Vec<f32>>,
}

impl CosineScorer {
    pub fn new(vectors: Vec<Vec<f32>>) -> Self {
        Self { vectors }
    }
}

impl Scorer for CosineScorer {
    fn strategy(&self) -> Strategy {
        Strategy::Cosine
    }

    fn score(&self, query: &ScoreQuery<'_>, corpus: &Corpus) -> Result<Vec<Option<f64>>> {
        let query_vec = query.require_vector(Strategy::Cosine)?;
        if self.vectors.len() != corpus.len() {
            bail!(
                "cosine scorer holds {} vectors but the corpus has {} questions",
                self.vectors.len(),
                corpus.len()
            );
        }
        if let Some(dims) = self.vectors.first().map(Vec::len) {
            if query_vec.len() != dims {
                bail!(
                    "query has {} dimensions but the cosine scorer expects {}",
                    query_vec.len(),
                    dims
                );
            }
        }
        Ok(self
            .vectors
            .iter()
            .map(|v| Some(cosine_similarity(query_vec, v) as f64))
            .collect())
    }
}

/// Brute-force nearest-neighbour index over contiguous `f32` rows.
///
/// Vectors are stored row-major in a single buffer. Distances are squared
/// Euclidean, as a flat L2 index reports them.
#[derive(Debug, Clone, Default)]
pub struct FlatL2Index {
    dims: usize,
    data: Vec<f32>,
}

impl FlatL2Index {
    pub fn new(dims: usize) -> Self {
        Self {
            dims,
            data: Vec::new(),
        }
    }

    /// Build an index from a list of equal-length vectors.
    ///
    /// The dimensionality is taken from the first vector. An empty list
    /// yields an empty index.
    pub fn from_vectors(vectors: &[Vec<f32>]) -> Result<Self> {
        let dims = vectors.first().map(Vec::len).unwrap_or(0);
        let mut index = Self::new(dims);
        for v in vectors {
            index.add(v)?;
        }
        Ok(index)
    }

    pub fn add(&mut self, vector: &[f32]) -> Result<()> {
        if vector.is_empty() {
            bail!("cannot add an empty vector to the index");
        }
        if vector.len() != self.dims {
            bail!(
                "vector has {} dimensions but the index expects {}",
                vector.len(),
                self.dims
            );
        }
        self.data.extend_from_slice(vector);
        Ok(())
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    pub fn len(&self) -> usize {
        if self.dims == 0 {
            0
        } else {
            self.data.len() / self.dims
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Squared distance from `query` to every stored row, in insertion order.
    pub fn distances(&self, query: &[f32]) -> Result<Vec<f32>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        if query.len() != self.dims {
            bail!(
                "query has {} dimensions but the index expects {}",
                query.len(),
                self.dims
            );
        }
        Ok(self
            .data
            .chunks_exact(self.dims)
            .map(|row| squared_l2_distance(query, row))
            .collect())
    }
}

impl Scorer for FlatL2Index {
    fn strategy(&self) -> Strategy {
        Strategy::FlatL2
    }

    fn score(&self, query: &ScoreQuery<'_>, corpus: &Corpus) -> Result<Vec<Option<f64>>> {
        let query_vec = query.require_vector(Strategy::FlatL2)?;
        if self.len() != corpus.len() {
            bail!(
                "flat L2 index holds {} vectors but the corpus has {} questions",
                self.len(),
                corpus.len()
            );
        }
        Ok(self
            .distances(query_vec)?
            .into_iter()
            .map(|d| Some(1.0 / (1.0 + (d as f64).sqrt())))
            .collect())
    }
}

/// Construct the scorer for `strategy`.
///
/// Embedding strategies require `corpus_vectors` (one per corpus question,
/// in corpus order); lexical strategies ignore it.
pub fn build_scorer(
    strategy: Strategy,
    corpus_vectors: Option<Vec<Vec<f32>>>,
) -> Result<Box<dyn Scorer>> {
    let scorer: Box<dyn Scorer> = match strategy {
        Strategy::Keyword => Box::new(KeywordOverlapScorer),
        Strategy::Substring => Box::new(SubstringScorer),
        Strategy::Jaccard => Box::new(JaccardScorer),
        Strategy::Cosine | Strategy::FlatL2 => {
            let vectors = corpus_vectors.ok_or_else(|| {
                anyhow!("the {} strategy requires corpus embeddings", strategy)
            })?;
            if strategy == Strategy::Cosine {
                Box::new(CosineScorer::new(vectors))
            } else {
                Box::new(FlatL2Index::from_vectors(&vectors)?)
            }
        }
    };
    Ok(scorer)
}
