use monthly_kpi_builder::*;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let records = match std::env::args().nth(1) {
        Some(path) => read_transactions_csv_path(path)?,
        None => SyntheticLedger::new(Period::new(2023, 1)?, 12, 42).generate()?,
    };

    let summary = LedgerSummary::from_records(&records);
    let (rows, columns) = summary.shape();
    println!("Loaded ledger with {} rows and {} columns", rows, columns);
    if let (Some(first), Some(last)) = (summary.first_date, summary.last_date) {
        println!("Dates span {} to {}", first, last);
    }

    let fmt = |v: Option<f64>| v.map(|x| format!("{:.2}", x)).unwrap_or_else(|| "n/a".to_string());
    println!(
        "\n{:<20} {:>6} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}",
        "Column", "Count", "Mean", "Std", "Min", "25%", "50%", "75%", "Max"
    );
    for col in &summary.column_stats {
        println!(
            "{:<20} {:>6} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}",
            col.column,
            col.count,
            fmt(col.mean),
            fmt(col.std),
            fmt(col.min),
            fmt(col.q25),
            fmt(col.median),
            fmt(col.q75),
            fmt(col.max)
        );
    }

    let processor = KpiProcessor::new(KpiConfig::default());
    let report = processor.report(&records)?;

    println!(
        "\n{:<8} {:>14} {:>10} {:>10} {:>10} {:>12} {:>8}",
        "Period", "Revenue", "Margin %", "Problem %", "Growth %", "Rev / Tx", "Health"
    );
    for row in &report.rows {
        let growth = row
            .revenue_growth_pct
            .map(|g| format!("{:.2}", g))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "{:<8} {:>14.2} {:>10.2} {:>10.2} {:>10} {:>12.2} {:>8.1}  [{}]",
            row.period.to_string(),
            row.total_revenue,
            row.profit_margin_pct,
            row.problem_rate_pct,
            growth,
            row.revenue_per_tx,
            row.health_score,
            row.health_signal
        );
    }

    println!("\nKPI correlations:");
    for (metric, values) in report.correlations.metrics.iter().zip(&report.correlations.values) {
        let cells: Vec<String> = values
            .iter()
            .map(|v| v.map(|r| format!("{:>6.2}", r)).unwrap_or_else(|| "   n/a".to_string()))
            .collect();
        println!("{:<20} {}", format!("{:?}", metric), cells.join(" "));
    }

    report.write_csv(std::fs::File::create("kpi_table.csv")?)?;
    println!("\nKPI table written to kpi_table.csv");

    Ok(())
}
