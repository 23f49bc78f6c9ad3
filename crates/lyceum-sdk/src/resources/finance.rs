use crate::client::LyceumClient;
use crate::error::{ApiError, Result};
use crate::types::{Debtor, FinanceOverview, GlobalBalance};
use chrono::{DateTime, Datelike, Months, NaiveDate, SecondsFormat, Utc};
use serde::Serialize;

/// Months covered by the default overview, current month included
const OVERVIEW_MONTHS: u32 = 6;

/// Date range sent to `/finance/overview`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverviewWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

#[derive(Serialize)]
struct OverviewQuery {
    from: String,
    to: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DebtorsQuery {
    // Display keeps whole amounts integral ("0", not "0.0")
    min_debt: String,
}

/// Six-month window ending with the month of `today`
///
/// Starts at midnight on the first day of the month five months back and ends
/// at midnight on the last day of the current month.
pub fn overview_window(today: NaiveDate) -> Option<OverviewWindow> {
    let month_start = today.with_day(1)?;
    let from = month_start.checked_sub_months(Months::new(OVERVIEW_MONTHS - 1))?;
    let to = month_start
        .checked_add_months(Months::new(1))?
        .pred_opt()?;

    Some(OverviewWindow {
        from: from.and_hms_opt(0, 0, 0)?.and_utc(),
        to: to.and_hms_opt(0, 0, 0)?.and_utc(),
    })
}

fn iso(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl LyceumClient {
    // ===== Finance =====

    /// Income, expense and profit between two instants
    pub async fn finance_overview(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<FinanceOverview> {
        if from > to {
            return Err(ApiError::InvalidRequest {
                message: format!("overview range is inverted: {} > {}", iso(from), iso(to)),
            });
        }
        let query = OverviewQuery {
            from: iso(from),
            to: iso(to),
        };
        self.get_with_query("/finance/overview", &query).await
    }

    /// Overview for the last six months, current month included
    pub async fn finance_overview_recent(&self) -> Result<FinanceOverview> {
        let window =
            overview_window(Utc::now().date_naive()).ok_or_else(|| ApiError::Internal {
                message: "could not compute the overview window".into(),
            })?;
        self.finance_overview(window.from, window.to).await
    }

    pub async fn finance_balance(&self) -> Result<GlobalBalance> {
        self.get("/finance/balance").await
    }

    /// Students owing at least `min_debt` (0 lists every debtor)
    pub async fn finance_debtors(&self, min_debt: Option<f64>) -> Result<Vec<Debtor>> {
        let query = DebtorsQuery {
            min_debt: min_debt.unwrap_or(0.0).to_string(),
        };
        self.get_with_query("/finance/debtors", &query).await
    }
}
