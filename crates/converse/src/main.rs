//! A terminal front end for conversing with the completion backend.

#[macro_use]
extern crate tracing;

mod config;
mod terminal;

use std::io::Write as _;
use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;

use converse_core::collaborator::UpgradePrompt;
use converse_core::render::{ContentTrust, Page};
use converse_core::{Session, SessionBuilder, SubmissionError};
use converse_http_model::HttpProvider;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncBufReadExt};
use tokio::select;
use tokio::time::sleep;

use config::Config;
use terminal::{BAR_CHAR, Toast, UpgradeBanner};

enum Command {
    Prompt(String),
    NewConversation,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Self {
        // Only the line break is stripped; the prompt is sent verbatim.
        let line = line.trim_end_matches(['\r', '\n']);
        match line {
            "/new" => Command::NewConversation,
            "/quit" | "/exit" => Command::Quit,
            _ => Command::Prompt(line.to_owned()),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return;
        }
    };
    debug!("loaded config: {config:?}");

    let upgrade_banner = Arc::new(UpgradeBanner::default());
    let session = SessionBuilder::with_completion_provider(HttpProvider::new(
        config.http.clone(),
    ))
    .with_upgrade_prompt(upgrade_banner.clone())
    .with_notifier(Arc::new(Toast))
    .with_request_timeout(config.request_timeout)
    .build();

    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");

    println!("{}", "Conversation".bright_white().bold());
    println!("{}", "Type a prompt, /new to start over, /quit to leave.".dimmed());

    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = read_line().await else {
            break;
        };
        if upgrade_banner.is_open() {
            upgrade_banner.close();
        }

        let prompt = match Command::parse(&line) {
            Command::Prompt(prompt) => prompt,
            Command::NewConversation => {
                session.reset();
                println!("{}", "No conversation started.".dimmed());
                continue;
            }
            Command::Quit => break,
        };

        session.set_draft(prompt);
        let progress_bar = ProgressBar::new_spinner();
        progress_bar.set_style(progress_style.clone());
        progress_bar.set_message("🤔 Thinking...");

        let mut submission = pin!(session.submit_draft());
        let result = loop {
            select! {
                result = &mut submission => break result,
                _ = sleep(Duration::from_millis(100)) => progress_bar.inc(1),
            }
        };
        progress_bar.finish_and_clear();

        match result {
            Ok(()) => print_last_reply(&session),
            Err(SubmissionError::EmptyPrompt) => {
                if let Some(feedback) = session.snapshot().prompt_error() {
                    println!("{}⚠️  {feedback}", BAR_CHAR.bright_yellow());
                }
            }
            // Everything else has been reported by the collaborators.
            Err(err) => debug!("submission failed: {err}"),
        }
    }

    if let Some(path) = &config.html_out {
        let page = Page::from_snapshot(&session.snapshot(), ContentTrust::Untrusted);
        if let Err(err) = std::fs::write(path, page.to_html()) {
            error!("error writing {}: {err}", path.display());
        } else {
            info!("conversation written to {}", path.display());
        }
    }
}

fn print_last_reply(session: &Session) {
    let snapshot = session.snapshot();
    let Some(turn) = snapshot.conversation().turns().last() else {
        return;
    };
    if let Some(reply) = turn.assistant {
        println!("{}🤖 {}", BAR_CHAR.bright_cyan(), reply.bright_white());
    }
}

async fn read_line() -> Option<String> {
    let mut stdin = io::BufReader::new(io::stdin());
    let mut line = String::new();

    match stdin.read_line(&mut line).await {
        Ok(count) => {
            if count == 0 {
                return None;
            }
            Some(line)
        }
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}
