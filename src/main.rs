//! Interview chat terminal client
//!
//! Runs one interview session against the configured service, printing the
//! transcript as it grows and reading answers from stdin.

use interview_chat::backend::{
    HttpBackend, LoggingBackend, ReportData, MAX_ANSWER_SCORE, MAX_PROFICIENCY_SCORE,
};
use interview_chat::config::ClientConfig;
use interview_chat::runtime::{InterviewSessionClient, SessionError};
use interview_chat::state_machine::{Message, SessionContext, SessionStatus, Speaker};
use std::future::Future;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HELP: &str = "Commands: /start  /report  /dismiss  /quit  (Ctrl-C cancels a pending request)";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they never interleave with the transcript
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "interview_chat=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = ClientConfig::from_env();
    tracing::info!(
        base_url = %config.base_url,
        request_timeout = ?config.request_timeout,
        report_timeout = ?config.report_timeout,
        "Loaded configuration"
    );

    let backend = LoggingBackend::new(HttpBackend::new(&config.base_url, config.http_timeout())?);
    let client =
        InterviewSessionClient::spawn(backend, SessionContext::default(), config.timeouts());

    println!("{HELP}");
    start(&client, &config).await;
    let mut printed = print_new_messages(&client, 0);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => line,
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        };
        match parse_input(&line, client.snapshot().status) {
            Input::Quit => break,
            Input::Start => start(&client, &config).await,
            Input::Report => match cancellable(&client, client.request_report()).await {
                Ok(report) => print_report(&report),
                Err(e) => report_error(&e),
            },
            Input::Dismiss => {
                if let Err(e) = client.dismiss_report().await {
                    report_error(&e);
                }
            }
            Input::Answer(text) => {
                if let Err(e) = cancellable(&client, client.submit_answer(text)).await {
                    report_error(&e);
                }
            }
            Input::NotStarted => {
                println!("No interview in progress. Press Enter or type /start to begin.");
            }
            Input::Finished => println!("The interview is complete. {HELP}"),
        }

        printed = print_new_messages(&client, printed);
    }

    Ok(())
}

/// What a line of user input asks for
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Quit,
    Start,
    Report,
    Dismiss,
    Answer(&'a str),
    /// Text typed while no session is running
    NotStarted,
    /// Text typed after the last question
    Finished,
}

fn parse_input(line: &str, status: SessionStatus) -> Input<'_> {
    match (line.trim(), status) {
        ("/quit", _) => Input::Quit,
        ("/start", _) | ("", SessionStatus::Idle) => Input::Start,
        ("/report", _) => Input::Report,
        ("/dismiss", _) => Input::Dismiss,
        (_, SessionStatus::Idle) => Input::NotStarted,
        (_, SessionStatus::Complete) => Input::Finished,
        (text, _) => Input::Answer(text),
    }
}

async fn start(client: &InterviewSessionClient, config: &ClientConfig) {
    println!("Connecting to {} ...", config.base_url);
    if let Err(e) = cancellable(client, client.start(config.candidate_name.as_str())).await {
        report_error(&e);
        if e.is_retryable() {
            println!("Press Enter or type /start to try again.");
        }
    }
}

/// Await an operation, cancelling it on Ctrl-C
async fn cancellable<T>(
    client: &InterviewSessionClient,
    operation: impl Future<Output = Result<T, SessionError>>,
) -> Result<T, SessionError> {
    tokio::pin!(operation);
    tokio::select! {
        result = &mut operation => result,
        _ = tokio::signal::ctrl_c() => {
            if let Err(e) = client.cancel().await {
                tracing::debug!(error = %e, "Nothing to cancel");
            }
            operation.await
        }
    }
}

/// Print transcript entries after `already_printed`; returns the new count
fn print_new_messages(client: &InterviewSessionClient, already_printed: usize) -> usize {
    let transcript = client.snapshot().transcript;
    for message in transcript.iter().skip(already_printed) {
        print_message(message);
    }
    transcript.len()
}

fn print_message(message: &Message) {
    match (message.speaker, &message.evaluation) {
        // Answers are already on screen as typed
        (Speaker::User, _) => {}
        (Speaker::Interviewer, Some(evaluation)) => {
            println!(
                "  [score {}/{MAX_ANSWER_SCORE}] {}",
                evaluation.score, evaluation.rationale
            );
        }
        (Speaker::Interviewer, None) if message.is_question => println!("\nQ: {}", message.text),
        (Speaker::Interviewer, None) => println!("{}", message.text),
    }
}

fn print_report(report: &ReportData) {
    println!("\n=== Interview report ===");
    println!(
        "Recommendation: {} [{}]",
        report.overall_recommendation,
        hire_marker(report)
    );
    println!(
        "Proficiency:    {}/{MAX_PROFICIENCY_SCORE}",
        report.proficiency_score
    );
    println!("\nKey strengths:\n{}", report.key_strengths);
    println!("\nAreas for improvement:\n{}", report.areas_for_improvement);
    println!("\nSummary:\n{}\n", report.summary);
}

fn hire_marker(report: &ReportData) -> &'static str {
    if report.recommends_hire() {
        "hire"
    } else {
        "no hire"
    }
}

fn report_error(error: &SessionError) {
    tracing::debug!(error = %error, retryable = error.is_retryable(), "Action failed");
    if error.is_retryable() {
        eprintln!("Error: {error} (you can try again)");
    } else {
        eprintln!("Error: {error}");
    }
}
