use chrono::NaiveDate;
use serde::Deserialize;

/// Report window; defaults to the first of this month through today.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MonthlyQuery {
    /// `YYYY-MM` or any `YYYY-MM-DD` inside the month.
    pub month: Option<String>,
}
