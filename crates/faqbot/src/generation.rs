//! Text generation providers for follow-up questions.
//!
//! A [`Generator`] turns a prompt into `n` short completions. The chat flow
//! only calls it when a query has neither an exact answer nor a related
//! corpus question.
//!
//! | Config Value | Generator | Endpoint |
//! |-------------|-----------|----------|
//! | `"disabled"` | [`DisabledGenerator`] | none |
//! | `"openai"` | [`OpenAIGenerator`] | `POST {url}/chat/completions` with `n` choices |
//! | `"ollama"` | [`OllamaGenerator`] | `POST {url}/api/generate`, once per completion |

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use crate::config::GenerationConfig;
use crate::http;

#[async_trait]
pub trait Generator: Send + Sync {
    fn model_name(&self) -> &str;
    /// Produce up to `n` completions for `prompt`.
    async fn generate(&self, prompt: &str, n: usize) -> Result<Vec<String>>;
}

/// Used when `generation.provider = "disabled"`.
pub struct DisabledGenerator;

#[async_trait]
impl Generator for DisabledGenerator {
    fn model_name(&self) -> &str {
        "disabled"
    }
    async fn generate(&self, _prompt: &str, _n: usize) -> Result<Vec<String>> {
        bail!("Generation provider is disabled")
    }
}

/// Generator backed by an OpenAI-compatible chat completions endpoint.
///
/// Requires the `OPENAI_API_KEY` environment variable.
pub struct OpenAIGenerator {
    model: String,
    url: String,
    api_key: String,
    max_tokens: u32,
    temperature: f32,
    max_retries: u32,
    client: reqwest::Client,
}

impl OpenAIGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow!("generation.model required for OpenAI provider"))?;
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow!("OPENAI_API_KEY environment variable not set"))?;
        let url = config
            .url
            .clone()
            .unwrap_or_else(|| "https://api.openai.com/v1".to_string());

        Ok(Self {
            model,
            url: url.trim_end_matches('/').to_string(),
            api_key,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            max_retries: config.max_retries,
            client: http::client(config.timeout_secs)?,
        })
    }
}

#[async_trait]
impl Generator for OpenAIGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str, n: usize) -> Result<Vec<String>> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "n": n,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
        });
        let url = format!("{}/chat/completions", self.url);
        let json = http::post_json(
            &self.client,
            "OpenAI",
            &url,
            Some(&self.api_key),
            &body,
            self.max_retries,
        )
        .await?;
        parse_chat_choices(&json)
    }
}

/// Extract `choices[].message.content` from a chat completions response.
fn parse_chat_choices(json: &serde_json::Value) -> Result<Vec<String>> {
    let choices = json
        .get("choices")
        .and_then(|c| c.as_array())
        .ok_or_else(|| anyhow!("Invalid OpenAI response: missing choices array"))?;

    Ok(choices
        .iter()
        .filter_map(|choice| {
            choice
                .pointer("/message/content")
                .and_then(|c| c.as_str())
                .map(str::to_string)
        })
        .collect())
}

/// Generator backed by a local Ollama instance.
///
/// `/api/generate` yields one completion per call, so `n` completions cost
/// `n` sequential requests.
pub struct OllamaGenerator {
    model: String,
    url: String,
    max_tokens: u32,
    temperature: f32,
    max_retries: u32,
    client: reqwest::Client,
}

impl OllamaGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow!("generation.model required for Ollama provider"))?;
        let url = config
            .url
            .clone()
            .unwrap_or_else(|| "http://localhost:11434".to_string());

        Ok(Self {
            model,
            url: url.trim_end_matches('/').to_string(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            max_retries: config.max_retries,
            client: http::client(config.timeout_secs)?,
        })
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str, n: usize) -> Result<Vec<String>> {
        let url = format!("{}/api/generate", self.url);
        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "num_predict": self.max_tokens,
                "temperature": self.temperature,
            },
        });

        let mut outputs = Vec::with_capacity(n);
        for _ in 0..n {
            let json =
                http::post_json(&self.client, "Ollama", &url, None, &body, self.max_retries)
                    .await?;
            outputs.push(parse_ollama_generate(&json)?);
        }
        Ok(outputs)
    }
}

fn parse_ollama_generate(json: &serde_json::Value) -> Result<String> {
    json.get("response")
        .and_then(|r| r.as_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Invalid Ollama response: missing response field"))
}

/// Create the [`Generator`] named by `generation.provider`.
pub fn create_generator(config: &GenerationConfig) -> Result<Box<dyn Generator>> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledGenerator)),
        "openai" => Ok(Box::new(OpenAIGenerator::new(config)?)),
        "ollama" => Ok(Box::new(OllamaGenerator::new(config)?)),
        other => bail!("Unknown generation provider: {}", other),
    }
}
