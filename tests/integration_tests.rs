use chrono::NaiveDate;
use monthly_kpi_builder::*;

fn month_aggregate(year: i32, month: u32, revenue: f64, tx_count: u64) -> MonthlyAggregate {
    MonthlyAggregate {
        period: Period::new(year, month).unwrap(),
        total_amount: revenue,
        tx_count,
        avg_amount: revenue / tx_count as f64,
        net_cashflow: 0.0,
        net_income: 0.0,
        total_revenue: revenue,
        total_expenses: 0.0,
        problem_rate: 0.0,
        avg_margin: 0.0,
    }
}

fn transaction(date: &str, revenue: f64, outcome: f64, margin: f64) -> TransactionRecord {
    TransactionRecord {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        transaction_amount: revenue * 0.8,
        cash_flow: revenue * 0.3,
        net_income: revenue * margin,
        revenue,
        expenditure: revenue * (1.0 - margin),
        transaction_outcome: outcome,
        profit_margin: margin,
    }
}

fn synthetic_records() -> Vec<TransactionRecord> {
    let mut ledger = SyntheticLedger::new(Period::new(2022, 6).unwrap(), 18, 2024);
    ledger.transactions_per_month = 25;
    ledger.problem_probability = 0.3;
    ledger.generate().unwrap()
}

#[test]
fn test_revenue_growth_scenario() {
    let aggregates = vec![
        month_aggregate(2023, 1, 1000.0, 10),
        month_aggregate(2023, 2, 1100.0, 10),
        month_aggregate(2023, 3, 990.0, 10),
    ];

    let kpis = derive_kpis(&aggregates).unwrap();
    let growth: Vec<f64> = kpis
        .iter()
        .map(|k| utils::round2(k.revenue_growth_pct.unwrap()))
        .collect();
    assert_eq!(growth, vec![0.0, 10.0, -10.0]);
}

#[test]
fn test_high_problem_rate_is_red() {
    let aggregate = MonthlyAggregate {
        problem_rate: 0.97,
        ..month_aggregate(2023, 1, 1000.0, 10)
    };

    let kpis = derive_kpis(&[aggregate]).unwrap();
    assert!((kpis[0].problem_rate_pct - 97.0).abs() < 1e-9);
    assert_eq!(classify_problem_rate(kpis[0].problem_rate_pct), KpiSignal::Red);
    assert_eq!(kpis[0].signals().problem_rate, KpiSignal::Red);
}

#[test]
fn test_health_score_scenario() {
    let aggregate = MonthlyAggregate {
        problem_rate: 0.10,
        avg_margin: 0.80,
        ..month_aggregate(2023, 1, 1000.0, 10)
    };

    let kpis = derive_kpis(&[aggregate]).unwrap();
    assert!((kpis[0].profit_margin_pct - 80.0).abs() < 1e-9);
    assert_eq!(kpis[0].health_score, 85.0);
    assert_eq!(kpis[0].signals().health, KpiSignal::Green);
}

#[test]
fn test_empty_ledger_scenario() {
    let kpis = build_monthly_kpis(&[]).unwrap();
    assert!(kpis.is_empty());
    assert!(derive_kpis(&[]).unwrap().is_empty());
    assert!(matches!(aggregate_monthly(&[]), Err(KpiError::EmptyInput)));
}

#[test]
fn test_zero_previous_revenue_is_undefined_by_default() {
    let aggregates = vec![
        month_aggregate(2023, 1, 0.0, 2),
        month_aggregate(2023, 2, 500.0, 4),
        month_aggregate(2023, 3, 250.0, 4),
    ];

    let kpis = derive_kpis(&aggregates).unwrap();
    assert_eq!(kpis[1].revenue_growth_pct, None);
    assert_eq!(kpis[1].signals().revenue_growth, None);
    assert!((kpis[1].tx_growth_pct.unwrap() - 100.0).abs() < 1e-9);
    assert!((kpis[2].revenue_growth_pct.unwrap() + 50.0).abs() < 1e-9);

    let json = serde_json::to_string(&kpis[1]).unwrap();
    assert!(json.contains("\"revenue_growth_pct\":null"));
}

#[test]
fn test_periods_strictly_increasing_and_counts_positive() {
    let mut records = synthetic_records();
    records.reverse();

    let kpis = build_monthly_kpis(&records).unwrap();
    assert_eq!(kpis.len(), 18);

    for pair in kpis.windows(2) {
        assert!(pair[0].period() < pair[1].period());
        assert_eq!(pair[0].period().next().unwrap(), pair[1].period());
    }
    assert!(kpis.iter().all(|k| k.aggregate.tx_count >= 1));
    assert_eq!(kpis[0].period().to_string(), "2022-06");
    assert_eq!(kpis[17].period().to_string(), "2023-11");
}

#[test]
fn test_revenue_per_tx_and_first_month_growth() {
    let kpis = build_monthly_kpis(&synthetic_records()).unwrap();

    for kpi in &kpis {
        let expected = kpi.aggregate.total_amount / kpi.aggregate.tx_count as f64;
        assert!((kpi.revenue_per_tx - expected).abs() < 1e-12);
    }

    assert_eq!(kpis[0].revenue_growth_pct, Some(0.0));
    assert_eq!(kpis[0].tx_growth_pct, Some(0.0));
}

#[test]
fn test_rederiving_is_idempotent() {
    let kpis = build_monthly_kpis(&synthetic_records()).unwrap();

    let aggregates: Vec<MonthlyAggregate> = kpis.iter().map(|k| k.aggregate.clone()).collect();
    let rederived = derive_kpis(&aggregates).unwrap();

    assert_eq!(kpis, rederived);
}

#[test]
fn test_gaps_between_months_compare_with_previous_present_month() {
    let records = vec![
        transaction("2023-01-15", 1000.0, 0.0, 0.2),
        transaction("2023-04-02", 1500.0, 0.0, 0.2),
    ];

    let kpis = build_monthly_kpis(&records).unwrap();
    assert_eq!(kpis.len(), 2);
    assert_eq!(kpis[1].period().to_string(), "2023-04");
    assert!((kpis[1].revenue_growth_pct.unwrap() - 50.0).abs() < 1e-9);
}

#[test]
fn test_rounding_applies_before_derivation() {
    let records = vec![
        transaction("2023-01-01", 100.004, 0.0, 0.1),
        transaction("2023-02-01", 100.0, 0.0, 0.1),
    ];

    let rounded = build_monthly_kpis(&records).unwrap();
    assert_eq!(rounded[0].total_revenue(), 100.0);
    assert_eq!(rounded[1].revenue_growth_pct, Some(0.0));

    let config = KpiConfig {
        round_raw_aggregates: false,
        ..KpiConfig::default()
    };
    let exact = build_monthly_kpis_with_config(&records, &config).unwrap();
    assert!(exact[1].revenue_growth_pct.unwrap() < 0.0);
}

#[test]
fn test_csv_ledger_to_report() -> anyhow::Result<()> {
    let data = "\
Date,Transaction Amount,Cash Flow,Net Income,Revenue,Expenditure,Transaction Outcome,Profit Margin,Account
2023-01-03,1200.00,300.00,240.00,1500.00,1260.00,1,0.16,Sales
2023-01-19,800.00,-50.00,100.00,900.00,800.00,0,0.11,Sales
2023-02-07,950.00,120.00,180.00,1200.00,1020.00,1,0.15,Services
2023-03-22,400.00,-20.00,-40.00,300.00,340.00,1,-0.13,Services
";

    let records = read_transactions_csv(data.as_bytes())?;
    assert_eq!(records.len(), 4);

    let report = KpiProcessor::default().report(&records)?;
    assert_eq!(report.rows.len(), 3);

    let jan = &report.rows[0];
    assert_eq!(jan.total_revenue, 2400.0);
    assert_eq!(jan.revenue_per_tx, 1000.0);
    assert!((jan.problem_rate_pct - 50.0).abs() < 1e-9);

    let feb = &report.rows[1];
    assert!((feb.revenue_growth_pct.unwrap() + 50.0).abs() < 1e-9);
    assert!((feb.tx_growth_pct.unwrap() + 50.0).abs() < 1e-9);
    assert_eq!(feb.revenue_growth_signal, Some(KpiSignal::Red));
    assert_eq!(feb.problem_rate_signal, KpiSignal::Red);

    let mar = &report.rows[2];
    // (1 - 1) * 50 + (-13) * 0.5
    assert_eq!(mar.health_score, -6.5);
    assert_eq!(mar.health_signal, KpiSignal::Red);

    let mut buffer = Vec::new();
    report.write_csv(&mut buffer)?;
    let mut reader = csv::Reader::from_reader(buffer.as_slice());
    assert_eq!(reader.records().count(), 3);

    Ok(())
}

#[test]
fn test_ledger_summary_matches_aggregates() {
    let records = synthetic_records();
    let summary = LedgerSummary::from_records(&records);
    assert_eq!(summary.shape(), (18 * 25, 8));

    let aggregates = aggregate_monthly(&records).unwrap();
    let revenue = summary.column("revenue").unwrap();
    assert_eq!(revenue.count, records.len());

    let raw_total: f64 = records.iter().map(|r| r.revenue).sum();
    assert!((revenue.mean.unwrap() * records.len() as f64 - raw_total).abs() < 1e-6);
    assert!(revenue.min.unwrap() <= revenue.q25.unwrap());
    assert!(revenue.q25.unwrap() <= revenue.median.unwrap());
    assert!(revenue.median.unwrap() <= revenue.q75.unwrap());
    assert!(revenue.q75.unwrap() <= revenue.max.unwrap());

    let first = aggregates.first().unwrap().period;
    let last = aggregates.last().unwrap().period;
    assert_eq!(summary.first_date.map(Period::from_date), Some(first));
    assert_eq!(summary.last_date.map(Period::from_date), Some(last));
}
