//! Sentiment analysis and document summarization against Azure OpenAI chat deployments.
//!
//! Each invocation builds a fixed two-message prompt, sends a single
//! completion request and interprets the reply.

pub mod commands;
pub mod completion;
pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod prompts;
pub mod sentiment;
pub mod summary;

/// Package version with the commit and build time recorded by `build.rs`.
pub const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit: ",
    env!("AZP_GIT_SHA"),
    ", built: ",
    env!("AZP_BUILD_TS"),
    ")"
);
