use azpipe::commands::parse_args;
use azpipe::commands::sentiment::{self, SentimentArgs};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "analyze-sentiment",
    about = "Analyze the sentiment of text or a file with Azure OpenAI",
    version = azpipe::VERSION
)]
struct Cli {
    #[command(flatten)]
    sentiment: SentimentArgs,
}

fn main() {
    let cli: Cli = parse_args();
    if let Err(err) = sentiment::run(cli.sentiment, "analyze-sentiment") {
        err.exit();
    }
}
