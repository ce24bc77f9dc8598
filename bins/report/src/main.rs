//! Polyroll reports.
//!
//! Logs go to stderr so stdout stays machine-readable.

use std::io::{self, Write};

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use polyroll_db::{CustomerRepository, connect};
use polyroll_shared::AppConfig;
use polyroll_shared::types::CustomerId;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "polyroll-report")]
#[command(about = "Customer balances and statements for Polyroll")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Customer balances as CSV on stdout
    Balances,

    /// Period statement of one customer as JSON
    Statement {
        /// Customer id
        customer: CustomerId,
        /// First day of the period (YYYY-MM-DD)
        start: NaiveDate,
        /// Last day of the period (YYYY-MM-DD)
        end: NaiveDate,
    },

    /// Recompute every cached pending balance
    Refresh,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "polyroll_report=info,polyroll_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let db = connect(&config.database).await.context("Failed to connect to database")?;
    info!("Connected to database");
    let customers = CustomerRepository::new(db, config.billing);

    match cli.command {
        Command::Balances => {
            let stdout = io::stdout();
            let rows = customers.export_balances_csv(stdout.lock()).await?;
            info!(rows, "balances exported");
        }
        Command::Statement { customer, start, end } => {
            let statement = customers.statement(customer, start, end).await?;
            let mut stdout = io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &statement)?;
            writeln!(stdout)?;
        }
        Command::Refresh => {
            let all = customers.list().await?;
            for customer in &all {
                customers.refresh_pending_balance(customer.id).await?;
            }
            info!(customers = all.len(), "pending balances refreshed");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_statement_arguments_are_typed() {
        let customer = CustomerId::new();
        let id = customer.to_string();
        let cli = Cli::try_parse_from([
            "polyroll-report",
            "statement",
            id.as_str(),
            "2026-03-01",
            "2026-03-31",
        ])
        .unwrap();

        match cli.command {
            Command::Statement { customer: parsed, start, end } => {
                assert_eq!(parsed, customer);
                assert_eq!(start, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
                assert_eq!(end, NaiveDate::from_ymd_opt(2026, 3, 31).unwrap());
            }
            other => panic!("expected statement, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_statement_arguments_rejected() {
        let id = CustomerId::new().to_string();
        let customer = id.as_str();
        assert!(Cli::try_parse_from(["polyroll-report", "statement", "acme", "2026-03-01", "2026-03-31"]).is_err());
        assert!(Cli::try_parse_from(["polyroll-report", "statement", customer, "01/03/2026", "2026-03-31"]).is_err());
        assert!(Cli::try_parse_from(["polyroll-report", "statement", customer, "2026-03-01"]).is_err());
        assert!(Cli::try_parse_from(["polyroll-report", "export"]).is_err());
    }

    #[test]
    fn test_simple_commands_parse() {
        assert!(matches!(
            Cli::try_parse_from(["polyroll-report", "balances"]).unwrap().command,
            Command::Balances
        ));
        assert!(matches!(
            Cli::try_parse_from(["polyroll-report", "refresh"]).unwrap().command,
            Command::Refresh
        ));
    }
}
