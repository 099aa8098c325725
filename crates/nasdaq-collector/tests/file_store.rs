//! End-to-end runs against a SQLite file, reopened between runs.

mod common;

use common::{bar, day, sync_config, StubPrices, StubSymbols};
use nasdaq_collector::modules::sync_status;
use nasdaq_collector::{run_with_sources, CollectorConfig};
use nasdaq_data::{Database, DatabaseConfig};

fn file_config(path: &std::path::Path, end: chrono::NaiveDate) -> CollectorConfig {
    CollectorConfig {
        database_path: path.to_path_buf(),
        price_sync: sync_config(end),
        ..CollectorConfig::default()
    }
}

#[tokio::test]
async fn test_runs_resume_from_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("nasdaq_prices.db");
    let symbols = StubSymbols::new(&["AAA", "BBB"]);
    let prices = StubPrices::new()
        .with_bars(
            "AAA",
            vec![
                bar("AAA", day(2020, 1, 2), 10.0),
                bar("AAA", day(2020, 1, 3), 11.0),
                bar("AAA", day(2020, 1, 6), 12.0),
            ],
        )
        .with_bars("BBB", vec![bar("BBB", day(2020, 1, 3), 20.0)]);
    let requests = prices.requests();

    let first = run_with_sources(&file_config(&path, day(2020, 1, 3)), &symbols, &prices)
        .await
        .unwrap();
    assert!(path.exists());
    assert_eq!(first.rows_inserted, 3);

    // 두 번째 실행은 파일에 남은 커서에서 이어서 조회
    let second = run_with_sources(&file_config(&path, day(2020, 1, 6)), &symbols, &prices)
        .await
        .unwrap();
    assert_eq!(second.rows_inserted, 1);
    {
        let log = requests.lock().unwrap();
        assert_eq!(log[2], ("AAA".to_string(), day(2020, 1, 4), day(2020, 1, 6)));
        assert_eq!(log[3], ("BBB".to_string(), day(2020, 1, 4), day(2020, 1, 6)));
    }

    let db = Database::open(&DatabaseConfig::new(&path)).await.unwrap();
    let status = sync_status(&db).await.unwrap();
    assert_eq!(status.total_rows, 4);
    assert_eq!(status.symbol_count, 2);
    assert_eq!(status.latest_bar_date, Some(day(2020, 1, 6)));
    assert_eq!(
        status.last_sync_timestamp.map(|t| t.timestamp_micros()),
        second.synced_at.map(|t| t.timestamp_micros())
    );
    db.close().await;
}
