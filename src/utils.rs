use crate::error::{KpiError, Result};
use crate::schema::Period;
use chrono::NaiveDate;

pub fn first_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// `None` when the month is outside chrono's date range.
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    if month == 12 {
        return NaiveDate::from_ymd_opt(year, 12, 31);
    }

    first_day_of_month(year, month + 1)?.pred_opt()
}

/// Rounds half to even at the given number of decimals, the way tabular
/// analysis libraries round a column (`round(2)` of 0.125 gives 0.12).
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

/// Percentage change from `previous` to `current`. `None` when `previous` is zero.
pub fn pct_change(previous: f64, current: f64) -> Option<f64> {
    if previous == 0.0 {
        return None;
    }
    Some((current - previous) / previous * 100.0)
}

/// Parses a period string in the format "YYYY-MM"
pub fn parse_period_string(period: &str) -> Result<Period> {
    let trimmed = period.trim();
    let start_str = format!("{}-01", trimmed);
    let date = NaiveDate::parse_from_str(&start_str, "%Y-%m-%d").map_err(|_| {
        KpiError::InvalidPeriod(format!(
            "Invalid period format: {}. Expected YYYY-MM",
            period
        ))
    })?;

    Ok(Period::from_date(date))
}

/// Parses the date column of a ledger export. Time components are discarded.
pub fn parse_ledger_date(value: &str) -> Result<NaiveDate> {
    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
    const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

    let value = value.trim();

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Ok(date);
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(datetime) = chrono::NaiveDateTime::parse_from_str(value, format) {
            return Ok(datetime.date());
        }
    }

    Err(KpiError::DateError(format!(
        "Unrecognised date '{}'. Expected YYYY-MM-DD, YYYY/MM/DD, MM/DD/YYYY or YYYY-MM-DD HH:MM:SS",
        value
    )))
}
