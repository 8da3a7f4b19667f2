use anyhow::Result;
use colored::Colorize;
use serde_json::json;
use smartcare_client::artifact::ArtifactStatus;
use smartcare_client::{Admission, BootstrapOutcome, SmartCareClient};

use crate::cli::OutputFormat;
use crate::output::print_value;

fn describe_artifact(artifact: &Option<ArtifactStatus>) -> String {
    match artifact {
        None => "none".to_string(),
        Some(ArtifactStatus::Valid {
            expires_at: Some(exp),
        }) => format!("valid (expires at {exp})"),
        Some(ArtifactStatus::Valid { expires_at: None }) => "valid (no expiry)".to_string(),
        Some(ArtifactStatus::Expired { expired_at }) => {
            format!("expired at {expired_at}, removed")
        }
        Some(ArtifactStatus::Malformed { reason }) => format!("malformed ({reason}), removed"),
    }
}

pub fn status(
    client: &SmartCareClient,
    server: &str,
    outcome: &BootstrapOutcome,
    format: OutputFormat,
) -> Result<()> {
    let session = client.session();
    let user = session.identity();

    if format != OutputFormat::Table {
        let report = json!({
            "server": server,
            "session": outcome.phase.to_string(),
            "user": user,
            "artifact": describe_artifact(&outcome.artifact),
            "location": client.location().path(),
            "error": session.last_error,
        });
        return print_value(&report, format);
    }

    println!("{}: {}", "Server".cyan(), server);
    let phase = outcome.phase.to_string();
    if user.is_some() {
        println!("{}: {}", "Session".cyan(), phase.green());
    } else {
        println!("{}: {}", "Session".cyan(), phase.yellow());
    }
    if let Some(user) = user {
        println!("{}: {} ({}, {})", "User".cyan(), user.name, user.username, user.role);
    }
    if let Some(err) = &session.last_error {
        println!("{}: {}", "Reason".cyan(), err);
    }
    println!("{}: {}", "Artifact".cyan(), describe_artifact(&outcome.artifact));
    println!("{}: {}", "Location".cyan(), client.location());
    Ok(())
}

/// Open a route through the access gate and report what the page would show.
pub fn open(client: &SmartCareClient, path: &str) -> Result<()> {
    match client.open(path) {
        Admission::Render => {
            println!("{} {}", "✓".green(), client.location().to_string().cyan());
        }
        Admission::Pending => println!("{} session check pending", "…".yellow()),
        Admission::Redirect(target) => {
            println!("{} redirected to {}", "→".yellow(), target.to_string().cyan());
        }
        Admission::Denied { role } => {
            println!(
                "{} {} is not available to the {} role",
                "✗".red(),
                client.location().to_string().cyan(),
                role
            );
        }
    }
    Ok(())
}
