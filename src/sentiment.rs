//! Sentiment analysis: reply interpretation and console rendering.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::completion::provider::{ChatCompletion, CompletionParams, ProviderError, Usage};
use crate::prompts::sentiment_messages;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    #[serde(alias = "Positive")]
    Positive,
    #[serde(alias = "Negative")]
    Negative,
    #[serde(alias = "Neutral")]
    Neutral,
    #[serde(alias = "Mixed")]
    Mixed,
}

impl Sentiment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
            Self::Mixed => "mixed",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured result of one sentiment analysis. Every field is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub overall_sentiment: Sentiment,
    pub confidence: f64,
    pub emotions_detected: Vec<String>,
    pub key_phrases: Vec<String>,
    pub summary: String,
}

impl SentimentResult {
    /// Confidence as a whole percentage, e.g. `90%`.
    pub fn confidence_percent(&self) -> String {
        format!("{:.0}%", self.confidence * 100.0)
    }
}

/// The reply could not be read as a [`SentimentResult`].
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Error parsing response: {reason}\nRaw response may not be valid JSON:\n{raw}")]
pub struct MalformedResponse {
    pub reason: String,
    pub raw: String,
}

#[derive(Debug, Error)]
pub enum SentimentError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Malformed(#[from] MalformedResponse),
}

#[derive(Debug, Clone)]
pub struct Analysis {
    pub result: SentimentResult,
    pub usage: Option<Usage>,
}

/// Builds the prompt for `text`, runs one completion and interprets the reply.
pub fn analyze<C: ChatCompletion + ?Sized>(
    client: &C,
    text: &str,
    params: &CompletionParams,
) -> Result<Analysis, SentimentError> {
    let completion = client.complete(&sentiment_messages(text), params)?;
    let result = interpret(&completion.content)?;
    Ok(Analysis {
        result,
        usage: completion.usage,
    })
}

/// Strips a leading Markdown fence and an optional `json` tag.
///
/// Only the text between the first and second fence is kept; a reply with no
/// closing fence keeps everything after the opening one.
pub fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    let inner = trimmed.split("```").nth(1).unwrap_or_default();
    inner.strip_prefix("json").unwrap_or(inner)
}

/// Returns the first balanced `{...}` block, skipping braces inside strings.
pub fn extract_json_object(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in reply[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&reply[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parses a model reply into a [`SentimentResult`].
pub fn interpret(reply: &str) -> Result<SentimentResult, MalformedResponse> {
    let malformed = |reason: String| MalformedResponse {
        reason,
        raw: reply.to_string(),
    };

    let result = match serde_json::from_str::<SentimentResult>(strip_code_fence(reply)) {
        Ok(result) => result,
        Err(strict) => {
            let candidate = extract_json_object(reply).ok_or_else(|| malformed(strict.to_string()))?;
            debug!("fence stripping failed ({strict}); retrying with embedded JSON object");
            serde_json::from_str(candidate).map_err(|err| malformed(err.to_string()))?
        }
    };

    if !(0.0..=1.0).contains(&result.confidence) {
        return Err(malformed(format!(
            "confidence {} is outside 0.0..=1.0",
            result.confidence
        )));
    }
    Ok(result)
}

/// Renders every field in the fixed console layout.
pub fn render(result: &SentimentResult) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Overall Sentiment: {}\n",
        result.overall_sentiment.as_str().to_uppercase()
    ));
    out.push_str(&format!("Confidence: {}\n", result.confidence_percent()));
    out.push_str(&format!(
        "\nEmotions Detected: {}\n",
        result.emotions_detected.join(", ")
    ));
    out.push_str("\nKey Phrases:\n");
    for phrase in &result.key_phrases {
        out.push_str(&format!("  • {phrase}\n"));
    }
    out.push_str(&format!("\nSummary: {}\n", result.summary));
    out
}
