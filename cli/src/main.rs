//! Relops CLI - experiment branches, CI docker builds and heap profile reports

use clap::Parser;

use relops_cli::cli::Cli;
use relops_cli::output::{OutputContext, json};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let (as_json, no_color) = (cli.json, cli.no_color);
    if let Err(e) = cli.run().await {
        let message = format!("{e:#}");
        match json::format_error(&message, "error") {
            Ok(body) if as_json => println!("{body}"),
            _ => OutputContext::new(no_color, false).error(&format!("Error: {message}")),
        }
        std::process::exit(1);
    }
}
