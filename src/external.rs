//! Optional second opinion from a hosted language model.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    config::ExternalConfig,
    error::{DetectorError, Result},
    prediction::PredictionResult,
};

const SYSTEM_PROMPT: &str = "You are an expert at detecting fake news and misinformation. \
Analyze the following news text and determine if it's likely to be fake news or real news. \
Consider factors like: sensationalist language, emotional manipulation, lack of cited sources, \
political bias, inconsistencies, implausible claims, etc. \
Respond with JSON in this format: {\"is_fake\": boolean, \"confidence\": float between 0 and 1, \"explanation\": string}";

/// Anything that can judge raw text independently of the local model.
pub trait ExternalAnalyzer: Send + Sync {
    fn analyze(&self, text: &str) -> Result<PredictionResult>;
}

/// Run `analyzer`, turning any failure into "unavailable".
pub fn analyze_or_unavailable(analyzer: &dyn ExternalAnalyzer, text: &str) -> Option<PredictionResult> {
    match analyzer.analyze(text) {
        Ok(result) => Some(result),
        Err(e) => {
            warn!(error = %e, "external analysis unavailable, using local model only");
            None
        }
    }
}

/// Cut `text` to at most `max_chars` characters, marking the cut with `...`.
pub fn truncate(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        Some((byte, _)) => Cow::Owned(format!("{}...", &text[..byte])),
        None => Cow::Borrowed(text),
    }
}

#[derive(Debug, Deserialize)]
struct Verdict {
    is_fake: bool,
    confidence: f64,
    #[serde(default)]
    explanation: Option<String>,
}

/// Parse the model's JSON answer. Missing fields or a confidence outside
/// `[0, 1]` are malformed.
pub fn parse_verdict(content: &str) -> Result<PredictionResult> {
    let verdict: Verdict = serde_json::from_str(content)
        .map_err(|e| DetectorError::ExternalService(format!("malformed verdict: {e}")))?;
    if !(0.0..=1.0).contains(&verdict.confidence) {
        return Err(DetectorError::ExternalService(format!(
            "confidence {} out of range",
            verdict.confidence
        )));
    }
    if let Some(explanation) = &verdict.explanation {
        debug!(%explanation, "external verdict explanation");
    }
    Ok(PredictionResult::new(verdict.is_fake, verdict.confidence))
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Chat-completions client.
pub struct OpenAiAnalyzer {
    client: reqwest::blocking::Client,
    config: ExternalConfig,
    api_key: String,
}

impl OpenAiAnalyzer {
    /// Build a client, or `Configuration` if no key is set.
    pub fn new(config: ExternalConfig) -> Result<Self> {
        let api_key = config
            .api_key()
            .ok_or_else(|| DetectorError::Configuration("OPENAI_API_KEY is not set".to_string()))?
            .to_string();
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DetectorError::Configuration(format!("http client: {e}")))?;
        Ok(Self { client, config, api_key })
    }

    /// `Some` analyzer when a key is configured, `None` otherwise.
    pub fn from_config(config: &ExternalConfig) -> Option<Self> {
        if !config.is_enabled() {
            return None;
        }
        match Self::new(config.clone()) {
            Ok(analyzer) => Some(analyzer),
            Err(e) => {
                debug!(error = %e, "external analysis disabled");
                None
            }
        }
    }
}

impl ExternalAnalyzer for OpenAiAnalyzer {
    fn analyze(&self, text: &str) -> Result<PredictionResult> {
        let text = truncate(text, self.config.max_chars);
        let request = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage { role: "system", content: SYSTEM_PROMPT },
                ChatMessage { role: "user", content: &*text },
            ],
            response_format: ResponseFormat { kind: "json_object" },
            temperature: self.config.temperature,
        };
        let service = |e: reqwest::Error| DetectorError::ExternalService(e.to_string());

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(service)?;
        if !response.status().is_success() {
            return Err(DetectorError::ExternalService(format!("status {}", response.status())));
        }
        let body: ChatResponse = response.json().map_err(service)?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| DetectorError::ExternalService("empty completion".to_string()))?;
        parse_verdict(&content)
    }
}
