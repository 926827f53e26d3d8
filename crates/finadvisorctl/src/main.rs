//! Finadvisor Control - CLI client for the finance advisor daemon

use anyhow::Result;
use clap::{Parser, Subcommand};
use finadvisor_common::FinancialProfile;
use finadvisorctl::client::DEFAULT_URL;
use finadvisorctl::commands;

#[derive(Parser)]
#[command(name = "finadvisorctl")]
#[command(about = "Personal finance advisor - command line client", long_about = None)]
#[command(version)]
struct Cli {
    /// Daemon base URL
    #[arg(long, global = true, default_value = DEFAULT_URL)]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get advice for a financial profile
    Advise {
        /// Monthly income
        #[arg(long, allow_negative_numbers = true)]
        income: f64,

        /// Monthly expenses
        #[arg(long, allow_negative_numbers = true)]
        expenses: f64,

        /// Current savings
        #[arg(long, allow_negative_numbers = true)]
        savings: f64,

        /// Current debt
        #[arg(long, allow_negative_numbers = true)]
        debt: f64,

        /// Evaluate in-process instead of asking the daemon
        #[arg(long)]
        local: bool,

        /// Print the raw JSON response
        #[arg(long)]
        json: bool,
    },

    /// Show daemon health
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let code = match cli.command {
        Commands::Advise {
            income,
            expenses,
            savings,
            debt,
            local,
            json,
        } => {
            let profile = FinancialProfile::new(income, expenses, savings, debt);
            commands::advise(&cli.url, profile, local, json).await?
        }
        Commands::Health => commands::health(&cli.url).await?,
    };

    std::process::exit(code);
}
