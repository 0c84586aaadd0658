//! coachctl - CLI client for coachd
//!
//! Local control plane client for the skill coaching daemon.

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod client;
mod render;

use clap::{Parser, Subcommand};
use client::{AssessRequest, ChatRequest, Client, ClientError};
use serde_json::{json, Value};

/// CLI client for the coachd skill coaching daemon.
#[derive(Parser)]
#[command(name = "coachctl")]
#[command(about = "Control plane for the coachd skill coaching daemon")]
#[command(version)]
struct Cli {
    /// Daemon address (default: http://127.0.0.1:7760)
    #[arg(long, global = true, env = "COACHD_ADDR")]
    addr: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Send a chat message to the skill coach
    Chat {
        /// The message to send
        message: String,

        /// User identifier to attach to the conversation
        #[arg(long)]
        user: Option<String>,

        /// Session identifier (continues an existing conversation)
        #[arg(long)]
        session: Option<String>,
    },

    /// Submit a skill assessment (10 comma-separated scores, 0-3)
    ///
    /// The first five scores answer the competency questions, the last
    /// five the capability questions.
    Assess {
        /// Scores, e.g. 3,2,1,2,3,1,2,3,2,1
        scores: String,

        /// User identifier to attach to the assessment
        #[arg(long)]
        user: Option<String>,

        /// Session identifier
        #[arg(long)]
        session: Option<String>,
    },

    /// Show agent status and session counters
    Status,

    /// Remove idle sessions
    Sweep {
        /// Maximum idle age in hours (defaults to the daemon's setting)
        #[arg(long)]
        max_age_hours: Option<u32>,
    },
}

/// Parse "3,2,1,..." into the ten assessment response objects.
fn parse_scores(input: &str) -> Result<Vec<Value>, ClientError> {
    let scores: Result<Vec<u8>, _> = input
        .split(',')
        .map(|s| s.trim().parse::<u8>())
        .collect();
    let scores = scores.map_err(|_| {
        ClientError::InvalidInput("scores must be integers between 0 and 3".to_string())
    })?;

    if scores.len() != 10 {
        return Err(ClientError::InvalidInput(format!(
            "expected 10 scores, got {}",
            scores.len()
        )));
    }
    if let Some(bad) = scores.iter().find(|s| **s > 3) {
        return Err(ClientError::InvalidInput(format!(
            "score {} is out of range, expected 0-3",
            bad
        )));
    }

    let mut responses = Vec::with_capacity(10);
    for (i, score) in scores[..5].iter().enumerate() {
        responses.push(json!({ "question_id": format!("comp_{}", i + 1), "score": score }));
    }
    for (i, score) in scores[5..].iter().enumerate() {
        responses.push(json!({ "question_id": format!("cap_{}", i + 1), "score": score }));
    }
    Ok(responses)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let addr = cli
        .addr
        .unwrap_or_else(|| "http://127.0.0.1:7760".to_string());
    let client = Client::new(&addr);

    // Wait for daemon to be ready with exponential backoff.
    if let Err(e) = client.wait_for_ready().await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }

    let result = match cli.command {
        Command::Chat {
            message,
            user,
            session,
        } => run_chat(&client, message, user, session).await,
        Command::Assess {
            scores,
            user,
            session,
        } => run_assess(&client, &scores, user, session).await,
        Command::Status => run_status(&client).await,
        Command::Sweep { max_age_hours } => run_sweep(&client, max_age_hours).await,
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

async fn run_chat(
    client: &Client,
    message: String,
    user: Option<String>,
    session: Option<String>,
) -> Result<(), ClientError> {
    let response = client
        .chat(ChatRequest {
            message,
            user_id: user,
            session_id: session,
        })
        .await?;
    render::print_chat_response(&response);
    Ok(())
}

async fn run_assess(
    client: &Client,
    scores: &str,
    user: Option<String>,
    session: Option<String>,
) -> Result<(), ClientError> {
    let responses = parse_scores(scores)?;
    let response = client
        .assess(AssessRequest {
            responses,
            user_id: user,
            session_id: session,
        })
        .await?;
    render::print_assessment(&response);
    Ok(())
}

async fn run_status(client: &Client) -> Result<(), ClientError> {
    let status = client.status().await?;
    render::print_status(&status);
    Ok(())
}

async fn run_sweep(client: &Client, max_age_hours: Option<u32>) -> Result<(), ClientError> {
    let result = client.sweep(max_age_hours).await?;
    println!("Removed {} idle session(s)", result.removed);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_scores_splits_competency_and_capability() {
        let responses = parse_scores("3,2,1,2,3,1,2,3,2,1").unwrap();
        assert_eq!(responses.len(), 10);
        assert_eq!(responses[0]["question_id"].as_str(), Some("comp_1"));
        assert_eq!(responses[0]["score"].as_u64(), Some(3));
        assert_eq!(responses[5]["question_id"].as_str(), Some("cap_1"));
        assert_eq!(responses[9]["question_id"].as_str(), Some("cap_5"));
        assert_eq!(responses[9]["score"].as_u64(), Some(1));
    }

    #[test]
    fn parse_scores_allows_whitespace() {
        let responses = parse_scores("3, 2, 1, 2, 3, 1, 2, 3, 2, 1").unwrap();
        assert_eq!(responses.len(), 10);
    }

    #[test]
    fn parse_scores_rejects_wrong_count() {
        let err = parse_scores("1,2,3").unwrap_err();
        assert!(err.to_string().contains("expected 10 scores"));
    }

    #[test]
    fn parse_scores_rejects_out_of_range() {
        let err = parse_scores("3,2,1,2,4,1,2,3,2,1").unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn parse_scores_rejects_non_numeric() {
        assert!(parse_scores("a,b,c,d,e,f,g,h,i,j").is_err());
    }
}
