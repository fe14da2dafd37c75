//! One-time application initialization.
//!
//! [`AppContext`] owns everything a request needs: the loaded corpus, the
//! scorer (with corpus embeddings already computed when the strategy needs
//! them), and the model providers. It is built once at startup and shared
//! read-only behind an `Arc`.

use anyhow::{Context, Result};
use faqbot_core::{build_scorer, Corpus, RankParams, Scorer};

use crate::config::Config;
use crate::corpus::load_corpus;
use crate::embedding::{create_provider, embed_checked, EmbeddingProvider};
use crate::generation::{create_generator, Generator};

pub struct AppContext {
    pub config: Config,
    pub corpus: Corpus,
    pub scorer: Box<dyn Scorer>,
    pub embedder: Box<dyn EmbeddingProvider>,
    pub generator: Box<dyn Generator>,
}

impl AppContext {
    /// Load the corpus and create providers from `config`.
    pub async fn init(config: Config) -> Result<Self> {
        let corpus = load_corpus(&config.corpus.path)?;
        let embedder = create_provider(&config.embedding)?;
        let generator = create_generator(&config.generation)?;
        Self::with_providers(config, corpus, embedder, generator).await
    }

    /// Assemble a context from already-built parts.
    ///
    /// Embeds every corpus question when the configured strategy compares
    /// vectors.
    pub async fn with_providers(
        config: Config,
        corpus: Corpus,
        embedder: Box<dyn EmbeddingProvider>,
        generator: Box<dyn Generator>,
    ) -> Result<Self> {
        let strategy = config.matching.strategy;

        let corpus_vectors = if strategy.needs_embeddings() {
            tracing::info!(
                questions = corpus.len(),
                model = embedder.model_name(),
                "embedding corpus questions"
            );
            let vectors = embed_checked(embedder.as_ref(), corpus.questions())
                .await
                .context("Failed to embed corpus questions")?;
            Some(vectors)
        } else {
            None
        };

        let scorer = build_scorer(strategy, corpus_vectors)?;

        tracing::info!(
            questions = corpus.len(),
            %strategy,
            embedding = embedder.model_name(),
            generation = generator.model_name(),
            "chatbot ready"
        );

        Ok(Self {
            config,
            corpus,
            scorer,
            embedder,
            generator,
        })
    }

    pub fn rank_params(&self) -> RankParams {
        RankParams {
            limit: self.config.matching.suggestion_limit,
            min_score: self.config.matching.min_score,
        }
    }
}
