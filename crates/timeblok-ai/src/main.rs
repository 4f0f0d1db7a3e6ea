//! Chat with an LLM to generate timeblok calendar scripts.
//!
//! Reads the API key from the `OPENAI_API_KEY` environment variable and an
//! optional alternate endpoint from `OPENAI_API_BASE`.
//!
//! # Examples
//!
//! ```sh
//! # Interactive chat loop (default)
//! timeblok-ai
//!
//! # Same, with a different transcripts directory
//! timeblok-ai --samples ./my-transcripts chat
//!
//! # Bundle the base prompt (system + examples) into a JSON file
//! timeblok-ai gen-prompt --out prompt.json
//! ```

use clap::{Parser, Subcommand};
use std::process;

use timeblok_ai::prompt::{base_conversation, export_prompt};
use timeblok_ai::repl::{ChatSession, run_chat};
use timeblok_ai::{Credentials, OpenAiClient};

/// Chat with an LLM to generate timeblok calendar scripts.
#[derive(Parser)]
#[command(name = "timeblok-ai")]
struct Cli {
    /// Directory of few-shot example transcripts.
    #[arg(long, default_value = "samples")]
    samples: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat loop (the default when no subcommand is given).
    Chat,
    /// Assemble the base prompt and write it to a JSON file.
    GenPrompt {
        /// Output path for the serialized prompt.
        #[arg(long, default_value = "prompt.json")]
        out: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::GenPrompt { out } => {
            if let Err(e) = export_prompt(&cli.samples, &out) {
                eprintln!("Error: {e}");
                process::exit(1);
            }
            println!("Wrote base prompt to {out}");
        }
        Commands::Chat => {
            let credentials = match Credentials::from_env() {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
            let client = match OpenAiClient::new(credentials) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
            let base = match base_conversation(&cli.samples) {
                Ok(b) => b,
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };

            if let Err(e) = run_chat(&client, ChatSession::new(base)).await {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
    }
}
