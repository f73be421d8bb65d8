use azpipe::commands::parse_args;
use azpipe::commands::summarize::{self, SummarizeArgs};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "summarize-document",
    about = "Summarize a document with Azure OpenAI",
    version = azpipe::VERSION
)]
struct Cli {
    #[command(flatten)]
    summarize: SummarizeArgs,
}

fn main() {
    let cli: Cli = parse_args();
    if let Err(err) = summarize::run(cli.summarize, "summarize-document") {
        err.exit();
    }
}
