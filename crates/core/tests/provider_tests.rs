// ═══════════════════════════════════════════════════════════════════
// Provider Tests — CsvStockRepository (parsing, caching, listing)
// ═══════════════════════════════════════════════════════════════════

use chrono::NaiveDate;
use std::path::Path;

use portfolio_analytics_core::errors::CoreError;
use portfolio_analytics_core::providers::csv_repository::CsvStockRepository;
use portfolio_analytics_core::providers::traits::StockDataProvider;

fn make_date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Write a price CSV in Yahoo Finance export layout.
fn write_price_csv(dir: &Path, ticker: &str, rows: &[(&str, f64)]) {
    let mut content = String::from("Date,Open,High,Low,Close,Adj Close,Volume\n");
    for (date, adj_close) in rows {
        content.push_str(&format!("{date},1.0,1.0,1.0,1.0,{adj_close},1000\n"));
    }
    std::fs::write(dir.join(format!("{ticker}.csv")), content).unwrap();
}

fn write_standing_csv(dir: &Path, rows: &[(&str, &str, &str)]) {
    let mut content = String::from("Symbol,Security,GICS Sector,GICS Sub-Industry\n");
    for (symbol, security, sector) in rows {
        content.push_str(&format!("{symbol},{security},{sector},Sub\n"));
    }
    std::fs::write(dir.join("standing_data.csv"), content).unwrap();
}

// ═══════════════════════════════════════════════════════════════════
// Price series
// ═══════════════════════════════════════════════════════════════════

mod price_series {
    use super::*;

    #[tokio::test]
    async fn parses_date_and_adjusted_close() {
        let dir = tempfile::tempdir().unwrap();
        write_price_csv(
            dir.path(),
            "MSFT",
            &[("2020-01-02", 150.25), ("2020-01-03", 151.0)],
        );
        let repo = CsvStockRepository::new(dir.path());

        let series = repo.price_series("MSFT").await.unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].date, make_date(2020, 1, 2));
        assert_eq!(series[0].adjusted_close, 150.25);
        assert_eq!(series[1].adjusted_close, 151.0);
    }

    #[tokio::test]
    async fn sorts_out_of_order_rows() {
        let dir = tempfile::tempdir().unwrap();
        write_price_csv(
            dir.path(),
            "MSFT",
            &[("2020-01-03", 151.0), ("2020-01-02", 150.0)],
        );
        let repo = CsvStockRepository::new(dir.path());

        let series = repo.price_series("MSFT").await.unwrap();
        assert!(series.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[tokio::test]
    async fn missing_file_is_unknown_ticker() {
        let dir = tempfile::tempdir().unwrap();
        let repo = CsvStockRepository::new(dir.path());

        let result = repo.price_series("NOPE").await;
        match result {
            Err(CoreError::UnknownTicker(ticker)) => assert_eq!(ticker, "NOPE"),
            other => panic!("Expected UnknownTicker, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_positive_price_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_price_csv(dir.path(), "BAD", &[("2020-01-02", 0.0)]);
        let repo = CsvStockRepository::new(dir.path());

        let result = repo.price_series("BAD").await;
        assert!(matches!(result, Err(CoreError::InvalidPrice { .. })));
    }

    #[tokio::test]
    async fn malformed_date_is_a_csv_error() {
        let dir = tempfile::tempdir().unwrap();
        write_price_csv(dir.path(), "BAD", &[("02/01/2020", 10.0)]);
        let repo = CsvStockRepository::new(dir.path());

        let result = repo.price_series("BAD").await;
        assert!(matches!(result, Err(CoreError::Csv(_))));
    }

    #[tokio::test]
    async fn missing_adj_close_column_is_a_csv_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("BAD.csv"),
            "Date,Close\n2020-01-02,10.0\n",
        )
        .unwrap();
        let repo = CsvStockRepository::new(dir.path());

        let result = repo.price_series("BAD").await;
        match result {
            Err(CoreError::Csv(msg)) => assert!(msg.contains("Adj Close")),
            other => panic!("Expected Csv error, got {other:?}"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// Caching
// ═══════════════════════════════════════════════════════════════════

mod caching {
    use super::*;

    #[tokio::test]
    async fn second_read_is_served_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        write_price_csv(dir.path(), "MSFT", &[("2020-01-02", 100.0)]);
        let repo = CsvStockRepository::new(dir.path());

        let first = repo.price_series("MSFT").await.unwrap();
        assert_eq!(first[0].adjusted_close, 100.0);

        // Change the file on disk; the cached parse must win
        write_price_csv(dir.path(), "MSFT", &[("2020-01-02", 999.0)]);
        let second = repo.price_series("MSFT").await.unwrap();
        assert_eq!(second[0].adjusted_close, 100.0);
    }

    #[tokio::test]
    async fn invalidate_forces_a_re_read() {
        let dir = tempfile::tempdir().unwrap();
        write_price_csv(dir.path(), "MSFT", &[("2020-01-02", 100.0)]);
        let repo = CsvStockRepository::new(dir.path());

        repo.price_series("MSFT").await.unwrap();
        write_price_csv(dir.path(), "MSFT", &[("2020-01-02", 999.0)]);

        assert!(repo.invalidate("MSFT"));
        let series = repo.price_series("MSFT").await.unwrap();
        assert_eq!(series[0].adjusted_close, 999.0);
    }

    #[tokio::test]
    async fn capacity_bound_evicts_oldest_series() {
        let dir = tempfile::tempdir().unwrap();
        write_price_csv(dir.path(), "A", &[("2020-01-02", 1.0)]);
        write_price_csv(dir.path(), "B", &[("2020-01-02", 2.0)]);
        write_price_csv(dir.path(), "C", &[("2020-01-02", 3.0)]);
        let repo = CsvStockRepository::new(dir.path()).with_cache_capacity(2);

        repo.price_series("A").await.unwrap();
        repo.price_series("B").await.unwrap();
        repo.price_series("C").await.unwrap(); // evicts A

        // A was evicted, so the changed file is re-read
        write_price_csv(dir.path(), "A", &[("2020-01-02", 42.0)]);
        let series = repo.price_series("A").await.unwrap();
        assert_eq!(series[0].adjusted_close, 42.0);

        // Loading A evicted B in turn; C is the survivor.
        write_price_csv(dir.path(), "C", &[("2020-01-02", 43.0)]);
        let series = repo.price_series("C").await.unwrap();
        assert_eq!(series[0].adjusted_close, 3.0);
    }

    #[tokio::test]
    async fn clear_cache_drops_standing_data_too() {
        let dir = tempfile::tempdir().unwrap();
        write_standing_csv(dir.path(), &[("MSFT", "Microsoft", "IT")]);
        let repo = CsvStockRepository::new(dir.path());

        let rows = repo
            .standing_data(&["MSFT".to_string()])
            .await
            .unwrap();
        assert_eq!(rows[0].sector, "IT");

        write_standing_csv(dir.path(), &[("MSFT", "Microsoft", "Energy")]);
        let rows = repo
            .standing_data(&["MSFT".to_string()])
            .await
            .unwrap();
        assert_eq!(rows[0].sector, "IT"); // cached table

        repo.clear_cache();
        let rows = repo
            .standing_data(&["MSFT".to_string()])
            .await
            .unwrap();
        assert_eq!(rows[0].sector, "Energy");
    }
}

// ═══════════════════════════════════════════════════════════════════
// Standing data & listing
// ═══════════════════════════════════════════════════════════════════

mod standing_data {
    use super::*;

    #[tokio::test]
    async fn filters_to_requested_tickers() {
        let dir = tempfile::tempdir().unwrap();
        write_standing_csv(
            dir.path(),
            &[
                ("MSFT", "Microsoft", "IT"),
                ("AAPL", "Apple", "IT"),
                ("XOM", "Exxon Mobil", "Energy"),
            ],
        );
        let repo = CsvStockRepository::new(dir.path());

        let rows = repo
            .standing_data(&["MSFT".to_string(), "XOM".to_string()])
            .await
            .unwrap();

        let symbols: Vec<&str> = rows.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["MSFT", "XOM"]);
        assert_eq!(rows[0].security, "Microsoft");
        assert_eq!(rows[1].sector, "Energy");
    }

    #[tokio::test]
    async fn missing_standing_file_is_a_csv_error() {
        let dir = tempfile::tempdir().unwrap();
        let repo = CsvStockRepository::new(dir.path());

        let result = repo.standing_data(&["MSFT".to_string()]).await;
        assert!(matches!(result, Err(CoreError::Csv(_))));
    }
}

mod list_tickers {
    use super::*;

    #[tokio::test]
    async fn lists_csv_files_excluding_standing_data() {
        let dir = tempfile::tempdir().unwrap();
        write_price_csv(dir.path(), "MSFT", &[("2020-01-02", 1.0)]);
        write_price_csv(dir.path(), "AAPL", &[("2020-01-02", 1.0)]);
        write_standing_csv(dir.path(), &[("MSFT", "Microsoft", "IT")]);
        std::fs::write(dir.path().join("notes.txt"), "not a ticker").unwrap();
        let repo = CsvStockRepository::new(dir.path());

        let tickers = repo.list_tickers().await.unwrap();
        assert_eq!(tickers, vec!["AAPL".to_string(), "MSFT".to_string()]);
    }

    #[tokio::test]
    async fn custom_standing_file_name_is_respected() {
        let dir = tempfile::tempdir().unwrap();
        write_price_csv(dir.path(), "MSFT", &[("2020-01-02", 1.0)]);
        std::fs::write(dir.path().join("universe.csv"), "Symbol,GICS Sector\n").unwrap();
        let repo = CsvStockRepository::new(dir.path()).with_standing_data_file("universe.csv");

        let tickers = repo.list_tickers().await.unwrap();
        assert_eq!(tickers, vec!["MSFT".to_string()]);
    }
}
