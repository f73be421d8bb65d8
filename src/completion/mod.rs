//! Chat-completion plumbing.
//!
//! [`provider`] holds the transport-neutral message and parameter types plus the
//! [`ChatCompletion`](provider::ChatCompletion) trait; [`azure`] is the only
//! network-backed implementation.

/// Azure OpenAI chat-completions client.
pub mod azure;
pub(crate) mod chat_runtime;
/// Messages, parameters, errors and the completion trait.
pub mod provider;
