//! Output rendering for the coachctl CLI.

use coach_core::AgentStatus;
use serde_json::Value;

use crate::client::{AssessResponse, ChatResponse, StatusResponse};

/// Print the coach's reply and any follow-up suggestions.
pub fn print_chat_response(response: &ChatResponse) {
    let payload = &response.response.payload;

    if let Some(message) = payload["message"].as_str() {
        println!("{}", message);
    } else {
        // Fall back to the raw payload for unexpected shapes.
        println!("{}", serde_json::to_string_pretty(payload).unwrap_or_default());
    }

    let suggestions = payload["suggestions"]
        .as_array()
        .or_else(|| payload["suggested_actions"].as_array());
    if let Some(suggestions) = suggestions {
        if !suggestions.is_empty() {
            println!();
            println!("Suggestions:");
            for suggestion in suggestions {
                if let Some(text) = suggestion.as_str() {
                    println!("  - {}", text);
                }
            }
        }
    }
}

/// Print assessment results: scores, quadrant, gaps, recommendations.
pub fn print_assessment(response: &AssessResponse) {
    let results = &response.results["results"];

    println!("Assessment Results");
    println!();
    println!(
        "  Competency: {:.2} / 3.00",
        results["competency_score"].as_f64().unwrap_or(0.0)
    );
    println!(
        "  Capability: {:.2} / 3.00",
        results["capability_score"].as_f64().unwrap_or(0.0)
    );
    println!(
        "  Profile:    {}",
        results["quadrant"].as_str().unwrap_or("unknown")
    );

    if let Some(summary) = response.results["summary"].as_str() {
        println!();
        println!("{}", summary);
    }

    if let Some(gaps) = results["skill_gaps"].as_array() {
        if !gaps.is_empty() {
            println!();
            println!("Skill gaps:");
            for gap in gaps {
                println!(
                    "  [{}] {} - {}",
                    gap["priority"].as_str().unwrap_or("-"),
                    gap["area"].as_str().unwrap_or("-"),
                    gap["description"].as_str().unwrap_or(""),
                );
            }
        }
    }

    if let Some(recommendations) = results["recommendations"].as_array() {
        if !recommendations.is_empty() {
            println!();
            println!("Recommendations:");
            for rec in recommendations {
                if let Some(text) = rec.as_str() {
                    println!("  - {}", text);
                }
            }
        }
    }

    print_next_steps(&response.results["next_steps"]);
}

fn print_next_steps(steps: &Value) {
    if let Some(steps) = steps.as_array() {
        if !steps.is_empty() {
            println!();
            println!("Next steps:");
            for step in steps {
                if let Some(text) = step.as_str() {
                    println!("  - {}", text);
                }
            }
        }
    }
}

/// Print agent status in tabular format.
pub fn print_status(status: &StatusResponse) {
    println!(
        "{:<16}  {:<8}  {:<10}  {:<10}  {:<8}  {:<20}",
        "AGENT", "STATE", "REQUESTS", "AVG MS", "ERRORS", "LAST ACTIVITY"
    );
    println!("{}", "-".repeat(84));

    for agent in &status.agents {
        print_agent_row(agent);
    }

    println!();
    println!("{} active session(s)", status.sessions);
}

fn print_agent_row(agent: &AgentStatus) {
    println!(
        "{:<16}  {:<8}  {:<10}  {:<10.1}  {:<8}  {:<20}",
        agent.name,
        agent.state.as_str(),
        agent.metrics.requests_processed,
        agent.metrics.average_response_time_ms,
        agent.metrics.error_count,
        agent
            .last_activity
            .map_or_else(|| "-".to_string(), |dt| format_time(&dt)),
    );
}

fn format_time(dt: &chrono::DateTime<chrono::Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}
