//! A terminal front end for `trip-agent`.

#[macro_use]
extern crate tracing;

use std::io::Write as _;
use std::process::ExitCode;
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::select;
use tokio::sync::mpsc;
use tokio::time::sleep;
use trip_agent::core::{AgentError, SearchProgress};
use trip_agent::{Config, SessionBuilder};

enum SessionEvent {
    Replying,
    SearchProgress(Vec<SearchProgress>),
}

const BAR_CHAR: &str = "▎";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    debug!("loaded config: {config:?}");

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    let retry = ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::from_secs(60)))
        .build();
    let mut session = SessionBuilder::from_config(&config)
        .with_retry(retry)
        .on_transcript({
            let event_tx = event_tx.clone();
            move |_| {
                event_tx.send(SessionEvent::Replying).ok();
            }
        })
        .on_search_progress({
            let event_tx = event_tx.clone();
            move |progress| {
                event_tx
                    .send(SessionEvent::SearchProgress(progress.to_vec()))
                    .ok();
            }
        })
        .build();

    let Ok(progress_style) = ProgressStyle::with_template("{spinner} {wide_msg}")
    else {
        return ExitCode::FAILURE;
    };
    let progress_style = progress_style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");

    let mut input = io::BufReader::new(io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = read_line(&mut input).await else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let progress_bar = ProgressBar::new_spinner();
        progress_bar.set_style(progress_style.clone());
        progress_bar.set_message("🤔 Thinking...");

        let result = {
            let turn = session.send_message(line);
            tokio::pin!(turn);
            loop {
                progress_bar.inc(1);
                select! {
                    result = &mut turn => break result,
                    Some(event) = event_rx.recv() => {
                        progress_bar.set_message(describe(&event));
                    }
                    _ = sleep(Duration::from_millis(100)) => {}
                }
            }
        };
        // Finish the progress bar before printing anything else.
        progress_bar.finish_and_clear();
        while event_rx.try_recv().is_ok() {}

        match result {
            Ok(()) => {
                let reply = session.last_reply().unwrap_or_default();
                println!("{}🤖 {}", BAR_CHAR.bright_cyan(), reply.bright_white());
                if let Some(trip) = session.state().selected_trip() {
                    println!(
                        "{}📍 {} ({} places)",
                        BAR_CHAR.bright_green(),
                        trip.name,
                        trip.places.len()
                    );
                }
            }
            Err(err) => print_error(&err),
        }
        println!();
    }

    ExitCode::SUCCESS
}

fn describe(event: &SessionEvent) -> String {
    match event {
        SessionEvent::Replying => "💬 Replying...".to_owned(),
        SessionEvent::SearchProgress(progress) if progress.is_empty() => {
            "🤔 Thinking...".to_owned()
        }
        SessionEvent::SearchProgress(progress) => {
            let done = progress.iter().filter(|entry| entry.done).count();
            let current = progress
                .iter()
                .find(|entry| !entry.done)
                .map(|entry| entry.query.as_str())
                .unwrap_or_default();
            format!("🔎 Searching ({done}/{}) {current}", progress.len())
        }
    }
}

fn print_error(err: &AgentError) {
    let bar = BAR_CHAR.bright_red();
    println!("{bar}⚠️  {}", err.bright_white());
    if err.is_retryable() {
        println!("{bar}The service is busy, try again in a moment.");
    }
}

async fn read_line<R: AsyncBufRead + Unpin>(
    input: &mut Lines<R>,
) -> Option<String> {
    match input.next_line().await {
        Ok(line) => line,
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}
