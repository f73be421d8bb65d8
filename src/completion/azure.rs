use std::fmt;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::completion::chat_runtime::send_chat_request;
use crate::completion::provider::{
    ChatCompletion, ChatMessage, Completion, CompletionParams, ProviderError, Usage,
};
use crate::config::AzureConfig;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(flatten)]
    params: &'a CompletionParams,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<UsagePayload>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsagePayload {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
    total_tokens: Option<u32>,
}

/// Builds the deployment-scoped chat-completions URL.
pub fn chat_completions_url(endpoint: &str, deployment: &str, api_version: &str) -> String {
    format!(
        "{}/openai/deployments/{deployment}/chat/completions?api-version={api_version}",
        endpoint.trim_end_matches('/')
    )
}

/// Blocking Azure OpenAI chat-completions client.
#[derive(Clone)]
pub struct AzureOpenAi {
    client: Client,
    url: String,
    api_key: String,
    deployment: String,
}

impl AzureOpenAi {
    pub fn new(config: &AzureConfig) -> Result<Self, ProviderError> {
        let client = Client::builder().build().map_err(ProviderError::Client)?;
        Ok(Self {
            client,
            url: chat_completions_url(&config.endpoint, &config.deployment, &config.api_version),
            api_key: config.api_key.clone(),
            deployment: config.deployment.clone(),
        })
    }
}

impl fmt::Debug for AzureOpenAi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureOpenAi")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .field("deployment", &self.deployment)
            .finish()
    }
}

impl ChatCompletion for AzureOpenAi {
    fn complete(
        &self,
        messages: &[ChatMessage],
        params: &CompletionParams,
    ) -> Result<Completion, ProviderError> {
        debug!(
            url = %self.url,
            deployment = %self.deployment,
            api_key_present = !self.api_key.is_empty(),
            messages = messages.len(),
            "sending chat completion"
        );

        let payload = ChatCompletionRequest {
            model: &self.deployment,
            messages,
            params,
        };
        let response = send_chat_request(
            &self.client,
            &self.url,
            &self.api_key,
            &payload,
            params.timeout_secs,
        )?;

        let body: ChatCompletionResponse = response.json().map_err(ProviderError::Decode)?;
        parse_response(body)
    }
}

/// Takes the first choice's content; null or empty content is an error.
fn parse_response(body: ChatCompletionResponse) -> Result<Completion, ProviderError> {
    let content = body
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.is_empty())
        .ok_or(ProviderError::EmptyResponse)?;
    let usage = body.usage.map(|usage| Usage {
        prompt_tokens: usage.prompt_tokens,
        completion_tokens: usage.completion_tokens,
        total_tokens: usage.total_tokens,
    });

    Ok(Completion { content, usage })
}

#[cfg(test)]
mod tests {
    use super::{
        AzureOpenAi, ChatCompletionRequest, ChatCompletionResponse, chat_completions_url,
        parse_response,
    };
    use crate::completion::provider::{ChatMessage, CompletionParams, ProviderError, Usage};
    use crate::config::AzureConfig;
    use serde_json::json;

    fn decode(raw: &str) -> ChatCompletionResponse {
        serde_json::from_str(raw).expect("fixture should decode")
    }

    #[test]
    fn url_joins_endpoint_without_doubling_slashes() {
        assert_eq!(
            chat_completions_url("https://example.openai.azure.com/", "gpt-5-nano", "2024-12-01-preview"),
            "https://example.openai.azure.com/openai/deployments/gpt-5-nano/chat/completions?api-version=2024-12-01-preview"
        );
    }

    #[test]
    fn request_body_flattens_generation_params() {
        let messages = [ChatMessage::system("sys"), ChatMessage::user("hi")];
        let params = CompletionParams {
            max_completion_tokens: 300,
            temperature: Some(0.1),
            reasoning_effort: None,
            timeout_secs: Some(5),
        };
        let body = serde_json::to_value(ChatCompletionRequest {
            model: "gpt-5-nano",
            messages: &messages,
            params: &params,
        })
        .expect("request should serialize");

        assert_eq!(body["model"], json!("gpt-5-nano"));
        assert_eq!(body["messages"][1]["content"], json!("hi"));
        assert_eq!(body["max_completion_tokens"], json!(300));
        assert!(body.get("reasoning_effort").is_none());
        assert!(body.get("timeout_secs").is_none());
        let temperature = body["temperature"].as_f64().expect("temperature is numeric");
        assert!((temperature - 0.1).abs() < 1e-6);
    }

    #[test]
    fn first_choice_content_and_usage_are_returned() {
        let completion = parse_response(decode(
            r#"{
                "id": "chatcmpl-1",
                "choices": [
                    {"index": 0, "finish_reason": "stop", "message": {"role": "assistant", "content": "first"}},
                    {"index": 1, "finish_reason": "stop", "message": {"role": "assistant", "content": "second"}}
                ],
                "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
            }"#,
        ))
        .expect("reply has content");

        assert_eq!(completion.content, "first");
        assert_eq!(
            completion.usage,
            Some(Usage {
                prompt_tokens: Some(12),
                completion_tokens: Some(3),
                total_tokens: Some(15),
            })
        );
    }

    #[test]
    fn missing_usage_is_tolerated() {
        let completion = parse_response(decode(
            r#"{"choices": [{"message": {"role": "assistant", "content": "ok"}}]}"#,
        ))
        .expect("reply has content");
        assert_eq!(completion.content, "ok");
        assert!(completion.usage.is_none());
    }

    #[test]
    fn null_empty_or_absent_content_is_an_empty_response() {
        for raw in [
            r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#,
            r#"{"choices": [{"message": {"role": "assistant", "content": ""}}]}"#,
            r#"{"choices": [{"message": {"role": "assistant"}}]}"#,
            r#"{"choices": []}"#,
        ] {
            let err = parse_response(decode(raw)).expect_err("no usable content");
            assert!(matches!(err, ProviderError::EmptyResponse), "{raw}");
        }
    }

    #[test]
    fn debug_output_hides_the_key() {
        let client = AzureOpenAi::new(&AzureConfig {
            endpoint: "https://example.openai.azure.com".to_string(),
            api_key: "azure-secret-value".to_string(),
            deployment: "gpt-5-nano".to_string(),
            api_version: "2024-12-01-preview".to_string(),
        })
        .expect("client should build");

        let rendered = format!("{client:?}");
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("azure-secret-value"));
    }
}
