//! Command implementations for finadvisorctl
//!
//! Each command prints its result and returns the process exit code.

use crate::client::{AdvisorClient, ClientError};
use crate::errors::EXIT_SUCCESS;
use anyhow::Result;
use finadvisor_common::{evaluate, AdviceResponse, FinancialProfile, HealthResponse};
use owo_colors::OwoColorize;

/// Get advice for a profile, from the daemon or in-process with `local`
pub async fn advise(url: &str, profile: FinancialProfile, local: bool, json: bool) -> Result<i32> {
    if let Err(e) = profile.validate() {
        eprintln!("{} {}", "Error:".red().bold(), e);
        return Ok(crate::errors::EXIT_GENERAL_ERROR);
    }

    let reply = if local {
        AdviceResponse::from(evaluate(&profile))
    } else {
        let client = AdvisorClient::new(url)?;
        match client.advise(&profile).await {
            Ok(reply) => reply,
            Err(e) => return Ok(report(e)),
        }
    };

    println!("{}", render_advice(&reply, json)?);
    Ok(EXIT_SUCCESS)
}

/// Show daemon health
pub async fn health(url: &str) -> Result<i32> {
    let client = AdvisorClient::new(url)?;
    match client.health().await {
        Ok(health) => {
            println!("{}", render_health(&health));
            Ok(EXIT_SUCCESS)
        }
        Err(e) => Ok(report(e)),
    }
}

pub fn render_advice(reply: &AdviceResponse, json: bool) -> Result<String> {
    if json {
        Ok(serde_json::to_string_pretty(reply)?)
    } else {
        Ok(format!("{} {}", "Advice:".bold(), reply.advice))
    }
}

pub fn render_health(health: &HealthResponse) -> String {
    format!(
        "{} {} (v{}, up {}s)",
        "finadvisord:".bold(),
        health.status.green(),
        health.version,
        health.uptime_seconds
    )
}

fn report(err: ClientError) -> i32 {
    eprintln!("{} {}", "Error:".red().bold(), err);
    err.exit_code()
}
