use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use owo_colors::{OwoColorize, Stream};

use crate::commands::{Prepared, RULE, RequestArgs, print_dry_run};
use crate::completion::azure::AzureOpenAi;
use crate::completion::provider::ChatCompletion;
use crate::config::OutputFormat;
use crate::error::CliError;
use crate::input::read_document;
use crate::prompts::Task;
use crate::sentiment::{SentimentError, analyze, render};

#[derive(Debug, Args, Clone, Default)]
pub struct SentimentArgs {
    /// Text to analyze; several words are joined with single spaces.
    #[arg(
        value_name = "TEXT",
        conflicts_with = "file",
        allow_hyphen_values = true,
        trailing_var_arg = true
    )]
    pub text: Vec<String>,
    /// Analyze the contents of a file instead.
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,
    #[command(flatten)]
    pub request: RequestArgs,
}

const COMPLETED: &str = "✅ Analysis completed via private endpoint";

pub fn usage(prog: &str) -> String {
    format!("Usage:\n  {prog} \"Your text to analyze\"\n  {prog} --file feedback.txt")
}

/// Literal words win unless `--file` was given; neither is a usage error.
pub fn resolve_text(args: &SentimentArgs, prog: &str) -> Result<String, CliError> {
    if let Some(path) = &args.file {
        return Ok(read_document(path)?);
    }
    if args.text.is_empty() {
        return Err(CliError::Usage(usage(prog)));
    }
    Ok(args.text.join(" "))
}

pub fn run(args: SentimentArgs, prog: &str) -> Result<(), CliError> {
    args.request.init_logging();

    let text = resolve_text(&args, prog)?;
    let prepared = args.request.prepare(Task::Sentiment)?;
    let mut stdout = io::stdout().lock();

    if args.request.dry_run {
        let messages = prepared.task.messages(&text);
        return print_dry_run(&prepared, &messages, &args.request, &mut stdout);
    }

    let config = prepared.settings.clone().into_azure_config()?;
    let client = AzureOpenAi::new(&config)?;
    execute(&client, &text, &prepared, &args.request, &mut stdout)
}

/// Runs the analysis against `client` and prints the result to `out`.
pub fn execute<C, W>(
    client: &C,
    text: &str,
    prepared: &Prepared,
    args: &RequestArgs,
    out: &mut W,
) -> Result<(), CliError>
where
    C: ChatCompletion + ?Sized,
    W: Write,
{
    let text_mode = prepared.output() == OutputFormat::Text;
    if text_mode {
        writeln!(out, "Analyzing sentiment...")?;
        writeln!(out, "{RULE}")?;
    }

    let started = Instant::now();
    let analysis = match analyze(client, text, &prepared.params) {
        Ok(analysis) => analysis,
        Err(SentimentError::Malformed(err)) => {
            if text_mode {
                writeln!(out, "\n{RULE}")?;
                writeln!(out, "{COMPLETED}")?;
            }
            return Err(err.into());
        }
        Err(err) => return Err(err.into()),
    };
    args.report_usage(analysis.usage.as_ref(), started.elapsed());

    if !text_mode {
        writeln!(out, "{}", serde_json::to_string(&analysis.result)?)?;
        return Ok(());
    }

    writeln!(
        out,
        "\n{}\n",
        "🎭 SENTIMENT ANALYSIS RESULTS".if_supports_color(Stream::Stdout, |text| text.bold())
    )?;
    write!(out, "{}", render(&analysis.result))?;
    writeln!(out, "\n{RULE}")?;
    writeln!(out, "{COMPLETED}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{SentimentArgs, execute, resolve_text};
    use crate::commands::{Prepared, RequestArgs};
    use crate::completion::provider::{
        ChatCompletion, ChatMessage, Completion, CompletionParams, ProviderError,
    };
    use crate::config::{OutputFormat, Overrides, Settings};
    use crate::error::CliError;
    use crate::prompts::Task;

    struct Canned(&'static str);

    impl ChatCompletion for Canned {
        fn complete(
            &self,
            _messages: &[ChatMessage],
            _params: &CompletionParams,
        ) -> Result<Completion, ProviderError> {
            Ok(Completion::text(self.0))
        }
    }

    fn prepared(output: OutputFormat) -> Prepared {
        let overrides = Overrides {
            output: Some(output),
            ..Overrides::default()
        };
        Prepared {
            task: Task::Sentiment,
            settings: Settings::resolve(|_: &str| None, None, &overrides)
                .expect("empty environment resolves"),
            params: Task::Sentiment.default_params(),
        }
    }

    fn run_with(reply: &'static str, output: OutputFormat) -> (Result<(), CliError>, String) {
        let mut out = Vec::new();
        let result = execute(
            &Canned(reply),
            "text",
            &prepared(output),
            &RequestArgs::default(),
            &mut out,
        );
        (result, String::from_utf8(out).expect("output is utf-8"))
    }

    const FENCED: &str = "```json\n{\"overall_sentiment\":\"mixed\",\"confidence\":0.55,\"emotions_detected\":[\"relief\",\"frustration\"],\"key_phrases\":[\"finally fixed\"],\"summary\":\"Relieved but annoyed.\"}\n```";

    #[test]
    fn words_are_joined_and_missing_input_is_a_usage_error() {
        let args = SentimentArgs {
            text: vec!["not".to_string(), "bad".to_string()],
            ..SentimentArgs::default()
        };
        assert_eq!(resolve_text(&args, "prog").expect("text given"), "not bad");

        let err = resolve_text(&SentimentArgs::default(), "prog").expect_err("no input");
        assert!(matches!(err, CliError::Usage(ref text) if text.contains("prog --file feedback.txt")));
    }

    #[test]
    fn text_output_renders_full_report() {
        let (result, out) = run_with(FENCED, OutputFormat::Text);
        result.expect("fenced reply is valid");
        assert!(out.starts_with("Analyzing sentiment...\n"));
        assert!(out.contains("Overall Sentiment: MIXED"));
        assert!(out.contains("Confidence: 55%"));
        assert!(out.contains("Emotions Detected: relief, frustration"));
        assert!(out.contains("  • finally fixed"));
        assert!(out.contains("🎭 SENTIMENT ANALYSIS RESULTS"));
        assert!(out.trim_end().ends_with("✅ Analysis completed via private endpoint"));
    }

    #[test]
    fn json_output_prints_only_the_record() {
        let (result, out) = run_with(FENCED, OutputFormat::Json);
        result.expect("fenced reply is valid");
        let value: serde_json::Value =
            serde_json::from_str(out.trim()).expect("stdout is a JSON record");
        assert_eq!(value["overall_sentiment"], "mixed");
        assert_eq!(value["key_phrases"][0], "finally fixed");
    }

    #[test]
    fn malformed_reply_still_prints_trailing_status() {
        let (result, out) = run_with("Sorry, I cannot help.", OutputFormat::Text);
        let err = result.expect_err("reply is not JSON");
        assert!(matches!(err, CliError::Malformed(_)));
        assert!(err.to_string().contains("Sorry, I cannot help."));
        assert!(out.trim_end().ends_with("✅ Analysis completed via private endpoint"));
        assert!(!out.contains("SENTIMENT ANALYSIS RESULTS"));
    }
}
