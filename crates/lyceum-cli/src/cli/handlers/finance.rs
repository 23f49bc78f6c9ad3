//! Finance report handlers

use crate::cli::commands::FinanceAction;
use crate::client::create_authenticated_client;
use crate::config::CliConfig;
use crate::error::{CliError, Result};
use crate::output::{format_amount, json_output, print_info, table_output};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;

/// Handle `finance` subcommands
pub async fn handle_finance(action: FinanceAction, config: &CliConfig, json: bool) -> Result<()> {
    let client = create_authenticated_client(config)?;

    match action {
        FinanceAction::Balance => {
            let balance = client.finance_balance().await?;
            if json {
                return json_output(&balance);
            }
            table_output::display_balance(&balance);
        }
        FinanceAction::Debtors { min_debt } => {
            if min_debt.is_some_and(|amount| amount < 0.0 || !amount.is_finite()) {
                return Err(CliError::invalid_argument(
                    "--min-debt must be a non-negative amount",
                ));
            }
            info!("Fetching debtors...");
            let debtors = client.finance_debtors(min_debt).await?;
            if json {
                return json_output(&debtors);
            }
            if debtors.is_empty() {
                print_info("No debtors");
                return Ok(());
            }
            table_output::display_debtors(&debtors);
            let total: f64 = debtors.iter().map(|d| d.total_debt).sum();
            print_info(&format!(
                "{} debtors, {} outstanding",
                debtors.len(),
                format_amount(total)
            ));
        }
        FinanceAction::Overview { from, to } => {
            let overview = match (from, to) {
                (Some(from), Some(to)) => {
                    let (from, to) = date_range(from, to)?;
                    client.finance_overview(from, to).await?
                }
                _ => client.finance_overview_recent().await?,
            };
            if json {
                return json_output(&overview);
            }
            table_output::display_overview(&overview);
        }
    }
    Ok(())
}

/// Inclusive day range as UTC midnights
fn date_range(from: NaiveDate, to: NaiveDate) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    if from > to {
        return Err(CliError::invalid_argument(format!(
            "--from ({from}) is after --to ({to})"
        )));
    }
    let from = from.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    let to = to.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    match (from, to) {
        (Some(from), Some(to)) => Ok((from, to)),
        _ => Err(CliError::internal("could not build the overview range")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_range_uses_utc_midnight() {
        let (from, to) = date_range(date(2025, 1, 1), date(2025, 6, 30)).unwrap();
        assert_eq!(from.to_rfc3339(), "2025-01-01T00:00:00+00:00");
        assert_eq!(to.to_rfc3339(), "2025-06-30T00:00:00+00:00");
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let err = date_range(date(2025, 6, 30), date(2025, 1, 1)).unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument(_)));
    }
}
