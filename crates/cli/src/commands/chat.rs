//! Chat command handler.
//!
//! Indexes the documents once, then answers questions read from stdin until
//! `:quit` or end of input. Failures are printed and the loop carries on.

use super::render;
use super::session::Session;
use casebook_core::{config::AppConfig, AppResult};
use clap::Args;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Interactive question answering over a set of documents
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Documents or directories to index (repeatable)
    #[arg(long = "path", required = true)]
    pub paths: Vec<PathBuf>,

    /// Number of passages to ground each answer on
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,
}

/// A line of chat input.
#[derive(Debug, PartialEq, Eq)]
enum ChatInput<'a> {
    Quit,
    Reload,
    Status,
    Skip,
    Question(&'a str),
}

fn parse_input(line: &str) -> ChatInput<'_> {
    match line.trim() {
        "" => ChatInput::Skip,
        ":quit" | ":q" | ":exit" => ChatInput::Quit,
        ":reload" => ChatInput::Reload,
        ":status" => ChatInput::Status,
        question => ChatInput::Question(question),
    }
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let mut session = Session::open(config, self.paths.clone())?;
        let report = session.load().await?;
        eprintln!("{}", render::report(&report));
        eprintln!("Commands: :reload, :status, :quit");

        let top_k = self
            .top_k
            .unwrap_or_else(|| session.orchestrator.config().top_k);

        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            match parse_input(&line) {
                ChatInput::Skip => continue,
                ChatInput::Quit => break,
                ChatInput::Reload => match session.load().await {
                    Ok(report) => eprintln!("{}", render::report(&report)),
                    Err(e) => eprintln!("Error: {}", e),
                },
                ChatInput::Status => match session.orchestrator.summary() {
                    Some(summary) => println!("{}", render::summary(&summary)),
                    None => println!("No index built"),
                },
                ChatInput::Question(question) => {
                    let start = Instant::now();
                    match session.orchestrator.answer_with_k(question, top_k).await {
                        Ok(result) => {
                            let secs = start.elapsed().as_secs_f64();
                            println!("{}\n", render::answer(&result, secs));
                        }
                        Err(e) => {
                            tracing::debug!("Question failed: {}", e);
                            eprintln!("Error: {}", e);
                        }
                    }
                }
            }
        }

        tracing::info!("Chat session ended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_input(":quit"), ChatInput::Quit);
        assert_eq!(parse_input("  :q "), ChatInput::Quit);
        assert_eq!(parse_input(":reload"), ChatInput::Reload);
        assert_eq!(parse_input(":status\n"), ChatInput::Status);
        assert_eq!(parse_input("   "), ChatInput::Skip);
    }

    #[test]
    fn test_parse_question_is_trimmed() {
        assert_eq!(
            parse_input("  Who pays for repairs?  "),
            ChatInput::Question("Who pays for repairs?")
        );
    }
}
