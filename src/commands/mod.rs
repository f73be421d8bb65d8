//! Command implementations shared by the standalone binaries and `azpipe`.

pub mod config;
pub mod sentiment;
pub mod summarize;

use std::io::Write;
use std::process;
use std::time::Duration;

use clap::{Args, Parser};
use serde_json::json;
use tracing::debug;

use crate::completion::azure::chat_completions_url;
use crate::completion::provider::{ChatMessage, CompletionParams, Usage};
use crate::config::{OutputFormat, Overrides, Settings};
use crate::error::CliError;
use crate::prompts::Task;

pub(crate) const RULE: &str =
    "------------------------------------------------------------";

/// Parses arguments, exiting with status 1 on any parse error.
///
/// `--help` and `--version` still exit 0.
pub fn parse_args<T: Parser>() -> T {
    match T::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            process::exit(if err.use_stderr() { 1 } else { 0 });
        }
    }
}

/// Connection and generation flags shared by both tools.
#[derive(Debug, Args, Clone, Default)]
pub struct RequestArgs {
    /// Profile from the azpipe config file.
    #[arg(long)]
    pub profile: Option<String>,
    /// Deployment name; overrides AZURE_OPENAI_DEPLOYMENT.
    #[arg(long)]
    pub deployment: Option<String>,
    /// Cap on generated tokens.
    #[arg(long)]
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    #[arg(long)]
    pub temperature: Option<f32>,
    /// Request timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,
    #[arg(long, value_enum)]
    pub output: Option<OutputFormat>,
    /// Shorthand for `--output json`.
    #[arg(long)]
    pub json: bool,
    /// Print the request instead of sending it.
    #[arg(long)]
    pub dry_run: bool,
    /// Print token usage and latency to stderr.
    #[arg(long)]
    pub show_usage: bool,
    #[arg(long, short)]
    pub verbose: bool,
    /// Suppress logs and usage output; errors are still shown.
    #[arg(long, short)]
    pub quiet: bool,
}

/// Settings and parameters resolved once per invocation.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub task: Task,
    pub settings: Settings,
    pub params: CompletionParams,
}

impl Prepared {
    pub fn output(&self) -> OutputFormat {
        self.settings.output
    }
}

impl RequestArgs {
    pub fn init_logging(&self) {
        crate::logging::init(self.verbose, self.quiet);
    }

    pub fn prepare(&self, task: Task) -> Result<Prepared, CliError> {
        let overrides = Overrides {
            deployment: self.deployment.clone(),
            timeout_secs: self.timeout,
            output: if self.json {
                Some(OutputFormat::Json)
            } else {
                self.output
            },
        };
        let settings = Settings::from_env(self.profile.as_deref(), &overrides)?;
        Ok(Prepared {
            task,
            params: self.params(task, &settings),
            settings,
        })
    }

    fn params(&self, task: Task, settings: &Settings) -> CompletionParams {
        let mut params = task.default_params();
        if let Some(max_tokens) = self.max_tokens {
            params.max_completion_tokens = max_tokens;
        }
        if let Some(temperature) = self.temperature {
            params.temperature = Some(temperature);
        }
        params.timeout_secs = settings.timeout_secs;
        params
    }

    pub fn report_usage(&self, usage: Option<&Usage>, latency: Duration) {
        if self.show_usage && !self.quiet {
            eprintln!("{}", usage_line(usage, latency));
        }
    }
}

pub(crate) fn usage_line(usage: Option<&Usage>, latency: Duration) -> String {
    let latency_ms = latency.as_millis();
    match usage {
        Some(usage) => {
            let count = |value: Option<u32>| {
                value.map_or_else(|| "?".to_string(), |value| value.to_string())
            };
            format!(
                "usage: prompt_tokens={} completion_tokens={} total_tokens={} latency_ms={latency_ms}",
                count(usage.prompt_tokens),
                count(usage.completion_tokens),
                count(usage.total_tokens),
            )
        }
        None => format!("usage: unavailable latency_ms={latency_ms}"),
    }
}

/// Prints the would-be request as one JSON line. The key itself is never included.
pub(crate) fn print_dry_run(
    prepared: &Prepared,
    messages: &[ChatMessage],
    args: &RequestArgs,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let settings = &prepared.settings;
    debug!(
        deployment = %settings.deployment,
        api_key_present = settings.api_key.is_some(),
        "dry run; no request sent"
    );

    let url = settings
        .endpoint
        .as_deref()
        .map(|endpoint| chat_completions_url(endpoint, &settings.deployment, &settings.api_version));
    let body = json!({
        "dry_run": true,
        "task": prepared.task,
        "endpoint": settings.endpoint,
        "url": url,
        "deployment": settings.deployment,
        "api_version": settings.api_version,
        "api_key_present": settings.api_key.is_some(),
        "messages": messages,
        "request": {
            "max_completion_tokens": prepared.params.max_completion_tokens,
            "temperature": prepared.params.temperature,
            "reasoning_effort": prepared.params.reasoning_effort,
            "timeout_secs": prepared.params.timeout_secs,
        },
        "output": prepared.output(),
    });
    writeln!(out, "{}", serde_json::to_string(&body)?)?;

    if args.show_usage && !args.quiet {
        eprintln!("usage: unavailable latency_ms=0 (dry-run)");
    }
    Ok(())
}
