//! The per-query chat flow.
//!
//! 1. An exact match answers directly.
//! 2. Otherwise the reply carries the fallback text and up to
//!    `matching.suggestion_limit` related corpus questions.
//! 3. When nothing related is found and generation is enabled, the model is
//!    asked for follow-up questions.

use anyhow::Result;
use serde::Serialize;

use faqbot_core::followups::{clean_followups, followup_prompt};
use faqbot_core::{exact_match, normalize, rank, ScoreQuery, Suggestion};

use crate::config::Config;
use crate::context::AppContext;
use crate::embedding::embed_query;

/// Reply text when no corpus question matches exactly.
pub const NO_EXACT_ANSWER: &str = "I couldn't find an exact answer.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub response: String,
    /// The corpus question that answered the query, on an exact match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_question: Option<String>,
    pub suggestions: Vec<Suggestion>,
    pub followups: Vec<String>,
}

pub async fn ask(ctx: &AppContext, query: &str) -> Result<ChatReply> {
    if let Some(hit) = exact_match(query, &ctx.corpus) {
        tracing::debug!(index = hit.index, "exact match");
        return Ok(ChatReply {
            response: hit.answer.to_string(),
            matched_question: Some(hit.question.to_string()),
            suggestions: Vec::new(),
            followups: Vec::new(),
        });
    }

    let suggestions = related_questions(ctx, query).await?;
    let followups = if suggestions.is_empty() && !normalize(query).is_empty() {
        generate_followups(ctx, query).await?
    } else {
        Vec::new()
    };

    tracing::debug!(
        suggestions = suggestions.len(),
        followups = followups.len(),
        "no exact match"
    );

    Ok(ChatReply {
        response: NO_EXACT_ANSWER.to_string(),
        matched_question: None,
        suggestions,
        followups,
    })
}

/// Rank corpus questions against `query` with the configured scorer.
pub async fn related_questions(ctx: &AppContext, query: &str) -> Result<Vec<Suggestion>> {
    let probe = ScoreQuery::new(query, None);
    if probe.normalized.is_empty() {
        return Ok(Vec::new());
    }

    let vector = if ctx.scorer.strategy().needs_embeddings() {
        Some(embed_query(ctx.embedder.as_ref(), query).await?)
    } else {
        None
    };
    let score_query = ScoreQuery {
        vector: vector.as_deref(),
        ..probe
    };

    rank(
        ctx.scorer.as_ref(),
        &score_query,
        &ctx.corpus,
        &ctx.rank_params(),
    )
}

/// Ask the generation model for follow-up questions.
///
/// Returns an empty list when generation is disabled.
pub async fn generate_followups(ctx: &AppContext, query: &str) -> Result<Vec<String>> {
    if !ctx.config.generation.is_enabled() {
        return Ok(Vec::new());
    }

    let n = ctx.config.generation.num_followups;
    let outputs = ctx
        .generator
        .generate(&followup_prompt(query), n)
        .await?;
    let mut followups = clean_followups(outputs);
    followups.truncate(n);
    Ok(followups)
}

/// Run the chat flow once and print the reply. Used by `faqbot ask`.
pub async fn run_ask(config: Config, query: &str) -> Result<()> {
    let ctx = AppContext::init(config).await?;
    let reply = ask(&ctx, query).await?;

    println!("Bot: {}", reply.response);

    if !reply.suggestions.is_empty() {
        println!();
        println!("Related questions:");
        for (i, s) in reply.suggestions.iter().enumerate() {
            println!("{}. [{:.2}] {}", i + 1, s.score, s.question);
        }
    }

    if !reply.followups.is_empty() {
        println!();
        println!("Follow-up ideas:");
        for f in &reply.followups {
            println!("- {}", f);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::embedding::EmbeddingProvider;
    use crate::generation::{DisabledGenerator, Generator};
    use async_trait::async_trait;
    use faqbot_core::Corpus;
    use std::sync::{Arc, Mutex};

    fn corpus() -> Corpus {
        Corpus::from_pairs([
            ("How do I apply for housing?", "Use the housing portal."),
            ("When is the housing deadline?", "March 1."),
            ("Where is the library?", "Building C."),
            ("What is the tuition fee?", "$5,000 per term."),
        ])
    }

    /// Three-dimensional vectors keyed on topic words.
    struct TopicEmbedder;

    #[async_trait]
    impl EmbeddingProvider for TopicEmbedder {
        fn model_name(&self) -> &str {
            "topic"
        }
        fn dims(&self) -> usize {
            3
        }
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| {
                    let t = t.to_lowercase();
                    vec![
                        t.contains("housing") as u8 as f32,
                        t.contains("library") as u8 as f32,
                        t.contains("fee") as u8 as f32 + 0.01,
                    ]
                })
                .collect())
        }
    }

    #[derive(Default)]
    struct RecordingGenerator {
        prompts: Arc<Mutex<Vec<(String, usize)>>>,
    }

    #[async_trait]
    impl Generator for RecordingGenerator {
        fn model_name(&self) -> &str {
            "recording"
        }
        async fn generate(&self, prompt: &str, n: usize) -> Result<Vec<String>> {
            self.prompts.lock().unwrap().push((prompt.to_string(), n));
            Ok(vec![
                " Are there evening classes? ".to_string(),
                "".to_string(),
                "Are there evening classes?".to_string(),
                "Is parking free?".to_string(),
                "Can I audit a course?".to_string(),
                "Is there a gym?".to_string(),
            ])
        }
    }

    async fn context(config: &str, generator: Box<dyn Generator>) -> AppContext {
        let config = parse_config(config).unwrap();
        AppContext::with_providers(config, corpus(), Box::new(TopicEmbedder), generator)
            .await
            .unwrap()
    }

    const KEYWORD: &str = "[corpus]\npath = \"faq.csv\"\n";
    const KEYWORD_WITH_GENERATION: &str = "[corpus]\npath = \"faq.csv\"\n\
        [generation]\nprovider = \"ollama\"\nmodel = \"llama3\"\n";

    #[tokio::test]
    async fn test_exact_match_answers() {
        let ctx = context(KEYWORD, Box::new(DisabledGenerator)).await;
        let reply = ask(&ctx, "  where is the LIBRARY ").await.unwrap();
        assert_eq!(reply.response, "Building C.");
        assert_eq!(reply.matched_question.as_deref(), Some("Where is the library?"));
        assert!(reply.suggestions.is_empty());
        assert!(reply.followups.is_empty());
    }

    #[tokio::test]
    async fn test_fallback_with_suggestions() {
        let ctx = context(KEYWORD, Box::new(DisabledGenerator)).await;
        let reply = ask(&ctx, "housing").await.unwrap();
        assert_eq!(reply.response, NO_EXACT_ANSWER);
        assert!(reply.matched_question.is_none());
        let questions: Vec<&str> = reply.suggestions.iter().map(|s| s.question.as_str()).collect();
        assert_eq!(
            questions,
            vec!["When is the housing deadline?", "How do I apply for housing?"]
        );
        assert!(reply.followups.is_empty());
    }

    #[tokio::test]
    async fn test_suggestion_limit_applies() {
        let config = "[corpus]\npath = \"faq.csv\"\n[matching]\nsuggestion_limit = 1\n";
        let ctx = context(config, Box::new(DisabledGenerator)).await;
        let reply = ask(&ctx, "is the housing library").await.unwrap();
        assert_eq!(reply.suggestions.len(), 1);
    }

    #[tokio::test]
    async fn test_no_suggestions_generates_followups() {
        let generator = RecordingGenerator::default();
        let prompts = Arc::clone(&generator.prompts);
        let ctx = context(KEYWORD_WITH_GENERATION, Box::new(generator)).await;

        let reply = ask(&ctx, "xyzzy plugh").await.unwrap();
        assert_eq!(reply.response, NO_EXACT_ANSWER);
        assert!(reply.suggestions.is_empty());
        assert_eq!(
            reply.followups,
            vec!["Are there evening classes?", "Is parking free?", "Can I audit a course?"]
        );

        let prompts = prompts.lock().unwrap();
        assert_eq!(
            prompts.as_slice(),
            &[("Suggest follow-up questions for: 'xyzzy plugh'".to_string(), 3)]
        );
    }

    #[tokio::test]
    async fn test_followups_skipped_when_suggestions_exist() {
        let generator = RecordingGenerator::default();
        let prompts = Arc::clone(&generator.prompts);
        let ctx = context(KEYWORD_WITH_GENERATION, Box::new(generator)).await;

        let reply = ask(&ctx, "library hours").await.unwrap();
        assert!(!reply.suggestions.is_empty());
        assert!(reply.followups.is_empty());
        assert!(prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_query_is_plain_fallback() {
        let generator = RecordingGenerator::default();
        let prompts = Arc::clone(&generator.prompts);
        let ctx = context(KEYWORD_WITH_GENERATION, Box::new(generator)).await;

        for query in ["", "   ", "?!..."] {
            let reply = ask(&ctx, query).await.unwrap();
            assert_eq!(reply.response, NO_EXACT_ANSWER);
            assert!(reply.suggestions.is_empty());
        }
        assert!(prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cosine_strategy_uses_embeddings() {
        let config = "[corpus]\npath = \"faq.csv\"\n[matching]\nstrategy = \"cosine\"\n\
            [embedding]\nprovider = \"local\"\n";
        let ctx = context(config, Box::new(DisabledGenerator)).await;
        let reply = ask(&ctx, "library opening times").await.unwrap();
        assert_eq!(reply.suggestions[0].question, "Where is the library?");
    }

    #[tokio::test]
    async fn test_flat_l2_strategy_uses_embeddings() {
        let config = "[corpus]\npath = \"faq.csv\"\n[matching]\nstrategy = \"flat_l2\"\n\
            [embedding]\nprovider = \"local\"\n";
        let ctx = context(config, Box::new(DisabledGenerator)).await;
        let reply = ask(&ctx, "fee").await.unwrap();
        assert_eq!(reply.suggestions[0].question, "What is the tuition fee?");
        assert!(reply.suggestions[0].score <= 1.0);
    }

    /// Embeds the corpus at three dimensions but single queries at two.
    struct InconsistentEmbedder;

    #[async_trait]
    impl EmbeddingProvider for InconsistentEmbedder {
        fn model_name(&self) -> &str {
            "inconsistent"
        }
        fn dims(&self) -> usize {
            3
        }
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let dims = if texts.len() == 1 { 2 } else { 3 };
            Ok(texts.iter().map(|_| vec![1.0; dims]).collect())
        }
    }

    #[tokio::test]
    async fn test_wrong_query_dims_is_an_error() {
        let config = parse_config(
            "[corpus]\npath = \"faq.csv\"\n[matching]\nstrategy = \"cosine\"\n\
             [embedding]\nprovider = \"local\"\n",
        )
        .unwrap();
        let ctx = AppContext::with_providers(
            config,
            corpus(),
            Box::new(InconsistentEmbedder),
            Box::new(DisabledGenerator),
        )
        .await
        .unwrap();
        let err = ask(&ctx, "library opening times").await.unwrap_err();
        assert!(err.to_string().contains("expected 3"), "{}", err);
    }

    #[test]
    fn test_reply_json_shape() {
        let reply = ChatReply {
            response: NO_EXACT_ANSWER.to_string(),
            matched_question: None,
            suggestions: Vec::new(),
            followups: vec!["Is parking free?".to_string()],
        };
        let json = serde_json::to_value(&reply).unwrap();
        assert!(json.get("matched_question").is_none());
        assert_eq!(json["followups"][0], "Is parking free?");
    }
}
