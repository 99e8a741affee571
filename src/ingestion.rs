use crate::error::{KpiError, Result};
use crate::schema::TransactionRecord;
use crate::utils::parse_ledger_date;
use log::{debug, warn};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// One row of a ledger export before validation. Every column is optional so that
/// a missing column surfaces as a schema error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTransactionRow {
    #[serde(rename = "Date")]
    pub date: Option<String>,
    #[serde(rename = "Transaction Amount")]
    pub transaction_amount: Option<f64>,
    #[serde(rename = "Cash Flow")]
    pub cash_flow: Option<f64>,
    #[serde(rename = "Net Income")]
    pub net_income: Option<f64>,
    #[serde(rename = "Revenue")]
    pub revenue: Option<f64>,
    #[serde(rename = "Expenditure")]
    pub expenditure: Option<f64>,
    #[serde(rename = "Transaction Outcome")]
    pub transaction_outcome: Option<f64>,
    #[serde(rename = "Profit Margin")]
    pub profit_margin: Option<f64>,
}

fn require<T>(value: Option<T>, row: usize, field: &'static str) -> Result<T> {
    value.ok_or(KpiError::Schema { row, field })
}

impl RawTransactionRow {
    pub fn into_record(self, row: usize) -> Result<TransactionRecord> {
        let date_str = require(self.date, row, "date")?;
        if date_str.trim().is_empty() {
            return Err(KpiError::Schema { row, field: "date" });
        }

        let record = TransactionRecord {
            date: parse_ledger_date(&date_str)?,
            transaction_amount: require(self.transaction_amount, row, "transaction_amount")?,
            cash_flow: require(self.cash_flow, row, "cash_flow")?,
            net_income: require(self.net_income, row, "net_income")?,
            revenue: require(self.revenue, row, "revenue")?,
            expenditure: require(self.expenditure, row, "expenditure")?,
            transaction_outcome: require(self.transaction_outcome, row, "transaction_outcome")?,
            profit_margin: require(self.profit_margin, row, "profit_margin")?,
        };
        record.validate(row)?;

        if !(0.0..=1.0).contains(&record.transaction_outcome) {
            warn!(
                "Row {}: transaction outcome {} is outside [0, 1]",
                row, record.transaction_outcome
            );
        }

        Ok(record)
    }
}

pub fn convert_rows_to_records(rows: Vec<RawTransactionRow>) -> Result<Vec<TransactionRecord>> {
    rows.into_iter()
        .enumerate()
        .map(|(idx, row)| row.into_record(idx))
        .collect()
}

/// Reads a headed CSV ledger (`Date`, `Transaction Amount`, `Cash Flow`, `Net Income`,
/// `Revenue`, `Expenditure`, `Transaction Outcome`, `Profit Margin`). Extra columns
/// are ignored.
pub fn read_transactions_csv<R: Read>(reader: R) -> Result<Vec<TransactionRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (idx, row) in csv_reader.deserialize::<RawTransactionRow>().enumerate() {
        records.push(row?.into_record(idx)?);
    }

    debug!("Read {} transaction records from CSV", records.len());
    Ok(records)
}

pub fn read_transactions_csv_path<P: AsRef<Path>>(path: P) -> Result<Vec<TransactionRecord>> {
    let file = std::fs::File::open(path.as_ref())?;
    read_transactions_csv(file)
}
