use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use owo_colors::{OwoColorize, Stream};

use crate::commands::{Prepared, RULE, RequestArgs, print_dry_run};
use crate::completion::azure::AzureOpenAi;
use crate::completion::provider::ChatCompletion;
use crate::config::OutputFormat;
use crate::error::CliError;
use crate::input::{ensure_exists, read_document};
use crate::prompts::Task;
use crate::summary::{SummaryReport, summarize};

#[derive(Debug, Args, Clone, Default)]
pub struct SummarizeArgs {
    /// Document to summarize.
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,
    #[command(flatten)]
    pub request: RequestArgs,
}

pub fn usage(prog: &str) -> String {
    format!("Usage: {prog} <filename>\nExample: {prog} sample-document.txt")
}

pub fn run(args: SummarizeArgs, prog: &str) -> Result<(), CliError> {
    args.request.init_logging();

    let path = args
        .path
        .as_deref()
        .ok_or_else(|| CliError::Usage(usage(prog)))?;
    ensure_exists(path)?;
    let prepared = args.request.prepare(Task::Summary)?;
    let mut stdout = io::stdout().lock();

    if args.request.dry_run {
        let document = read_document(path)?;
        let messages = prepared.task.messages(&document);
        return print_dry_run(&prepared, &messages, &args.request, &mut stdout);
    }

    let config = prepared.settings.clone().into_azure_config()?;
    let client = AzureOpenAi::new(&config)?;
    execute(&client, path, &prepared, &args.request, &mut stdout)
}

/// Loads `path`, summarizes it with `client` and prints the result to `out`.
pub fn execute<C, W>(
    client: &C,
    path: &Path,
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
        writeln!(out, "Loading document: {}", path.display())?;
    }
    let document = read_document(path)?;
    let characters = document.chars().count();
    if text_mode {
        writeln!(out, "Document length: {characters} characters")?;
        writeln!(out, "{RULE}")?;
        writeln!(out, "Sending to Azure OpenAI for summarization...")?;
        writeln!(out, "{RULE}")?;
    }

    let started = Instant::now();
    let summary = summarize(client, &document, &prepared.params)?;
    args.report_usage(summary.usage.as_ref(), started.elapsed());

    if !text_mode {
        let file = path.to_string_lossy();
        let report = SummaryReport {
            file: &file,
            characters,
            summary: &summary.text,
        };
        writeln!(out, "{}", serde_json::to_string(&report)?)?;
        return Ok(());
    }

    writeln!(
        out,
        "\n{}\n",
        "📄 DOCUMENT SUMMARY".if_supports_color(Stream::Stdout, |text| text.bold())
    )?;
    writeln!(out, "{}", summary.text)?;
    writeln!(out, "\n{RULE}")?;
    writeln!(out, "✅ Summary generated via private endpoint")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::execute;
    use crate::commands::{Prepared, RequestArgs};
    use crate::completion::provider::{
        ChatCompletion, ChatMessage, Completion, CompletionParams, ProviderError,
    };
    use crate::config::{OutputFormat, Overrides, Settings};
    use crate::prompts::Task;

    #[derive(Default)]
    struct Recording {
        prompts: RefCell<Vec<String>>,
    }

    impl ChatCompletion for Recording {
        fn complete(
            &self,
            messages: &[ChatMessage],
            _params: &CompletionParams,
        ) -> Result<Completion, ProviderError> {
            self.prompts.borrow_mut().push(messages[1].content.clone());
            Ok(Completion::text("Purpose: budget.\n- point one\nAction items: none"))
        }
    }

    fn temp_document(label: &str, body: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("azpipe-summary-{label}-{nanos}.txt"));
        fs::write(&path, body).expect("temp document should be writable");
        path
    }

    fn prepared(output: OutputFormat) -> Prepared {
        let overrides = Overrides {
            output: Some(output),
            ..Overrides::default()
        };
        Prepared {
            task: Task::Summary,
            settings: Settings::resolve(|_: &str| None, None, &overrides)
                .expect("empty environment resolves"),
            params: Task::Summary.default_params(),
        }
    }

    #[test]
    fn whole_document_reaches_the_prompt_and_reply_is_printed_verbatim() {
        let body = "Policy ¶ 1: submit forms by 31 March.\n".repeat(2_000);
        let path = temp_document("text", &body);
        let client = Recording::default();
        let mut out = Vec::new();

        execute(
            &client,
            &path,
            &prepared(OutputFormat::Text),
            &RequestArgs::default(),
            &mut out,
        )
        .expect("recording client never fails");

        let prompts = client.prompts.borrow();
        assert!(prompts[0].contains(&body));
        let out = String::from_utf8(out).expect("output is utf-8");
        assert!(out.contains(&format!(
            "Document length: {} characters",
            body.chars().count()
        )));
        assert!(out.contains("Purpose: budget.\n- point one\nAction items: none\n"));
        assert!(out.contains("📄 DOCUMENT SUMMARY"));
        assert!(out.trim_end().ends_with("✅ Summary generated via private endpoint"));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn json_output_reports_file_and_summary() {
        let path = temp_document("json", "short");
        let mut out = Vec::new();

        execute(
            &Recording::default(),
            &path,
            &prepared(OutputFormat::Json),
            &RequestArgs::default(),
            &mut out,
        )
        .expect("recording client never fails");

        let value: serde_json::Value =
            serde_json::from_slice(&out).expect("stdout is a JSON record");
        assert_eq!(value["characters"], 5);
        assert_eq!(value["summary"], "Purpose: budget.\n- point one\nAction items: none");
        let _ = fs::remove_file(&path);
    }
}
