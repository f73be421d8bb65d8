use std::io;

use azpipe::commands::config::{self, ConfigArgs};
use azpipe::commands::sentiment::{self, SentimentArgs};
use azpipe::commands::summarize::{self, SummarizeArgs};
use azpipe::commands::parse_args;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, shells};

const ROOT_HELP_EXAMPLES: &str = "Examples:\n  azpipe sentiment \"The new portal is so much faster!\"\n  azpipe sentiment --file feedback.txt --json\n  azpipe summarize policy.txt --show-usage\n  azpipe summarize policy.txt --dry-run\n  azpipe config check --profile prod\n  azpipe completion bash > ~/.local/share/bash-completion/completions/azpipe";

#[derive(Debug, Parser)]
#[command(
    name = "azpipe",
    about = "Azure OpenAI sentiment and summarization tools",
    version = azpipe::VERSION,
    propagate_version = true,
    after_help = ROOT_HELP_EXAMPLES
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Analyze the sentiment of text or a file")]
    Sentiment(SentimentArgs),
    #[command(about = "Summarize a document file")]
    Summarize(SummarizeArgs),
    #[command(about = "Manage local config")]
    Config(ConfigArgs),
    #[command(about = "Generate shell completion script")]
    Completion {
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

fn print_completion(shell: CompletionShell) {
    let mut cmd = Cli::command();
    match shell {
        CompletionShell::Bash => generate(shells::Bash, &mut cmd, "azpipe", &mut io::stdout()),
        CompletionShell::Zsh => generate(shells::Zsh, &mut cmd, "azpipe", &mut io::stdout()),
        CompletionShell::Fish => generate(shells::Fish, &mut cmd, "azpipe", &mut io::stdout()),
    }
}

fn main() {
    let cli: Cli = parse_args();

    let result = match cli.command {
        Commands::Sentiment(args) => sentiment::run(args, "azpipe sentiment"),
        Commands::Summarize(args) => summarize::run(args, "azpipe summarize"),
        Commands::Config(args) => config::run(args),
        Commands::Completion { shell } => {
            print_completion(shell);
            Ok(())
        }
    };

    if let Err(err) = result {
        err.exit();
    }
}
