use std::io;
use std::process;

use thiserror::Error;

use crate::completion::provider::ProviderError;
use crate::config::ConfigError;
use crate::input::InputError;
use crate::sentiment::{MalformedResponse, SentimentError};

/// Every way an invocation can fail. All of them exit with status 1.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Malformed(#[from] MalformedResponse),
    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to write output: {0}")]
    Write(#[from] io::Error),
}

impl From<SentimentError> for CliError {
    fn from(err: SentimentError) -> Self {
        match err {
            SentimentError::Provider(err) => Self::Provider(err),
            SentimentError::Malformed(err) => Self::Malformed(err),
        }
    }
}

impl CliError {
    /// Usage text and missing-credential guidance are ordinary console output.
    pub fn to_stdout(&self) -> bool {
        matches!(
            self,
            Self::Usage(_) | Self::Config(ConfigError::MissingVariables(_))
        )
    }

    pub fn exit(&self) -> ! {
        if self.to_stdout() {
            println!("{self}");
        } else {
            eprintln!("{self}");
        }
        process::exit(1);
    }
}
