use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone};

use crate::models::rates::RateSnapshot;
use crate::models::report::{AssetDetail, Period, PeriodReport};
use crate::models::transaction::{StoredTransaction, TransactionKind, FALLBACK_CATEGORY};

/// Builds period summaries from stored transactions.
///
/// Totals use the converted amounts captured when each entry was created.
/// Savings held in foreign currencies or commodities are additionally valued
/// at the rates of the snapshot passed in, so the asset figures move with
/// the market while the totals do not.
pub struct ReportService;

impl ReportService {
    pub fn new() -> Self {
        Self
    }

    /// Aggregate `transactions` into a report in a single pass.
    ///
    /// The caller selects the transactions of the period; nothing here
    /// filters by date.
    pub fn aggregate(
        &self,
        period: Period,
        start_date: NaiveDate,
        transactions: &[StoredTransaction],
        rates: &RateSnapshot,
    ) -> PeriodReport {
        let mut report = PeriodReport::empty(period, start_date);

        for tx in transactions {
            match tx.kind {
                TransactionKind::Income => {
                    report.total_income += tx.converted_amount;
                }
                TransactionKind::Expense => {
                    report.total_expense += tx.converted_amount;
                    let category = tx
                        .category
                        .as_deref()
                        .filter(|c| !c.is_empty())
                        .unwrap_or(FALLBACK_CATEGORY);
                    *report
                        .expense_by_category
                        .entry(category.to_string())
                        .or_insert(0.0) += tx.converted_amount;
                }
                TransactionKind::Saving => {
                    report.total_savings_local += tx.converted_amount;
                    if !tx.currency.is_local() {
                        let asset = report.assets.entry(tx.currency).or_default();
                        asset.quantity += tx.original_amount;
                    }
                }
            }
        }

        // Value holdings at today's rates
        let mut total_assets = 0.0;
        for (currency, asset) in report.assets.iter_mut() {
            let rate = rates.rate_for(*currency);
            *asset = AssetDetail {
                quantity: asset.quantity,
                rate,
                current_local: asset.quantity * rate,
            };
            total_assets += asset.current_local;
        }
        report.total_assets_local = total_assets;

        report.balance = report.total_income - report.total_expense - report.total_savings_local;
        report
    }
}

impl Default for ReportService {
    fn default() -> Self {
        Self::new()
    }
}

/// Local midnight at which `period` started, as seen from `now`.
///
/// Weeks start on Monday. When midnight does not exist in the zone (a DST
/// gap) `now` is returned unchanged.
pub fn period_start<Tz: TimeZone>(period: Period, now: &DateTime<Tz>) -> DateTime<Tz> {
    let today = now.date_naive();
    let start = match period {
        Period::Week => {
            today - Duration::days(i64::from(today.weekday().num_days_from_monday()))
        }
        Period::Month => today.with_day(1).unwrap_or(today),
    };

    now.timezone()
        .from_local_datetime(&start.and_time(NaiveTime::MIN))
        .earliest()
        .unwrap_or_else(|| now.clone())
}
