use serde::Serialize;

use crate::completion::provider::{ChatCompletion, CompletionParams, ProviderError, Usage};
use crate::prompts::summary_messages;

/// Summary text exactly as the model returned it.
#[derive(Debug, Clone)]
pub struct DocumentSummary {
    pub text: String,
    pub usage: Option<Usage>,
}

/// Machine-readable form printed with `--output json`.
#[derive(Debug, Serialize)]
pub struct SummaryReport<'a> {
    pub file: &'a str,
    pub characters: usize,
    pub summary: &'a str,
}

pub fn summarize<C: ChatCompletion + ?Sized>(
    client: &C,
    document: &str,
    params: &CompletionParams,
) -> Result<DocumentSummary, ProviderError> {
    let completion = client.complete(&summary_messages(document), params)?;
    Ok(DocumentSummary {
        text: completion.content,
        usage: completion.usage,
    })
}

#[cfg(test)]
mod tests {
    use super::summarize;
    use crate::completion::provider::{
        ChatCompletion, ChatMessage, Completion, CompletionParams, ProviderError,
    };
    use crate::prompts::Task;
    use reqwest::StatusCode;

    struct Echo;

    impl ChatCompletion for Echo {
        fn complete(
            &self,
            messages: &[ChatMessage],
            params: &CompletionParams,
        ) -> Result<Completion, ProviderError> {
            Ok(Completion::text(format!(
                "{} tokens for {} chars",
                params.max_completion_tokens,
                messages[1].content.len()
            )))
        }
    }

    struct Rejecting;

    impl ChatCompletion for Rejecting {
        fn complete(
            &self,
            _messages: &[ChatMessage],
            _params: &CompletionParams,
        ) -> Result<Completion, ProviderError> {
            Err(ProviderError::Api {
                status: StatusCode::TOO_MANY_REQUESTS,
                body: "quota exceeded".to_string(),
            })
        }
    }

    #[test]
    fn reply_is_used_verbatim() {
        let summary = summarize(&Echo, "short doc", &Task::Summary.default_params())
            .expect("echo never fails");
        assert!(summary.text.starts_with("1000 tokens for "));
    }

    #[test]
    fn transport_errors_propagate_unchanged() {
        let err = summarize(&Rejecting, "doc", &Task::Summary.default_params())
            .expect_err("rejected");
        assert!(matches!(err, ProviderError::Api { status, .. } if status == StatusCode::TOO_MANY_REQUESTS));
        assert!(err.to_string().contains("quota exceeded"));
    }
}
