//! # FAQ Bot Core
//!
//! Shared, I/O-free logic for FAQ Bot: the corpus model, text
//! normalization, exact matching, the interchangeable [`scorer::Scorer`]
//! strategies, and top-k ranking of related questions.
//!
//! This crate contains no tokio, HTTP, CSV, or model-runtime
//! dependencies. The application crate loads the corpus, computes
//! embeddings, and passes pre-computed vectors in.
//!
//! ## Flow
//!
//! ```text
//! query ──▶ normalize ──▶ exact_match ──▶ answer
//!                              │ (no match)
//!                              ▼
//!                     Scorer::score ──▶ rank ──▶ suggestions
//! ```

pub mod corpus;
pub mod embedding;
pub mod followups;
pub mod matching;
pub mod normalize;
pub mod rank;
pub mod scorer;

pub use corpus::{Corpus, QaRecord};
pub use matching::{exact_match, ExactMatch};
pub use normalize::{normalize, tokenize};
pub use rank::{rank, RankParams, Suggestion};
pub use scorer::{build_scorer, ScoreQuery, Scorer, Strategy};
