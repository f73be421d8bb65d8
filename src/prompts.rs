//! Fixed system/user message pairs for each task.
//!
//! Input text is embedded verbatim. Nothing is truncated or chunked, so
//! fitting the deployment's context window is the caller's concern.

use serde::Serialize;

use crate::completion::provider::{ChatMessage, CompletionParams, ReasoningEffort};

pub const SENTIMENT_SYSTEM: &str =
    "You are a sentiment analysis assistant. Respond only with valid JSON.";

pub const SUMMARY_SYSTEM: &str = "You are a helpful assistant that summarizes government policy documents clearly and concisely.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    Sentiment,
    Summary,
}

impl Task {
    pub fn messages(self, text: &str) -> [ChatMessage; 2] {
        match self {
            Self::Sentiment => sentiment_messages(text),
            Self::Summary => summary_messages(text),
        }
    }

    /// Low temperature for structured output; low reasoning effort and a
    /// larger token cap for free-form summaries.
    pub fn default_params(self) -> CompletionParams {
        match self {
            Self::Sentiment => CompletionParams {
                max_completion_tokens: 300,
                temperature: Some(0.1),
                reasoning_effort: None,
                timeout_secs: None,
            },
            Self::Summary => CompletionParams {
                max_completion_tokens: 1000,
                temperature: None,
                reasoning_effort: Some(ReasoningEffort::Low),
                timeout_secs: None,
            },
        }
    }
}

pub fn sentiment_messages(text: &str) -> [ChatMessage; 2] {
    let prompt = format!(
        r#"Analyze the sentiment of the following text and provide a structured response.

Text to analyze:
"{text}"

Respond in JSON format with:
{{
    "overall_sentiment": "positive" | "negative" | "neutral" | "mixed",
    "confidence": 0.0 to 1.0,
    "emotions_detected": ["list", "of", "emotions"],
    "key_phrases": ["important", "phrases"],
    "summary": "Brief 1-sentence summary of the sentiment"
}}

Only respond with valid JSON, no additional text.
"#
    );
    [ChatMessage::system(SENTIMENT_SYSTEM), ChatMessage::user(prompt)]
}

pub fn summary_messages(text: &str) -> [ChatMessage; 2] {
    let prompt = format!(
        "Please provide a concise summary of the following document. \n\
         Include:\n\
         1. Main purpose/topic (1-2 sentences)\n\
         2. Key points (bullet list, max 5 items)\n\
         3. Action items or deadlines mentioned\n\
         \n\
         Document:\n\
         {text}\n"
    );
    [ChatMessage::system(SUMMARY_SYSTEM), ChatMessage::user(prompt)]
}
