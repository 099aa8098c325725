//! NASDAQ 일봉 증분 로더 CLI.

use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use nasdaq_collector::{modules, CollectorConfig};
use nasdaq_core::{init_logging, parse_date, LogConfig, LogFormat};
use nasdaq_data::Database;

#[derive(Parser)]
#[command(name = "nasdaq-collector")]
#[command(about = "NASDAQ daily price incremental loader", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// SQLite 파일 경로
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// 모든 심볼에 적용할 시작일 (YYYY-MM-DD, 커서 무시)
    #[arg(long, global = true, value_parser = parse_start_date)]
    start_date: Option<NaiveDate>,

    /// 처리할 최대 심볼 수
    #[arg(long, global = true)]
    limit: Option<usize>,

    /// 동시 조회 수
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// 로그 형식 (pretty, json, compact)
    #[arg(long, global = true, default_value = "pretty")]
    log_format: LogFormat,

    /// 결과를 JSON으로 stdout에 출력
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// 전체 심볼 증분 동기화 (기본 동작)
    Sync,

    /// 워터마크와 저장된 행 수 출력
    Status,
}

fn parse_start_date(value: &str) -> Result<NaiveDate, String> {
    parse_date(value).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 로깅 초기화
    init_logging(LogConfig::new(&cli.log_level).with_format(cli.log_format))
        .map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;

    // 설정 로드 (CLI 플래그가 환경변수보다 우선)
    let mut config = CollectorConfig::from_env()?;
    if let Some(path) = cli.database {
        config.database_path = path;
    }
    if cli.start_date.is_some() {
        config.price_sync.start_date = cli.start_date;
    }
    if cli.limit.is_some() {
        config.price_sync.symbol_limit = cli.limit;
    }
    if let Some(concurrency) = cli.concurrency {
        config.price_sync.concurrency = concurrency;
    }
    tracing::debug!(database = %config.database_path.display(), "설정 로드 완료");

    match cli.command.unwrap_or(Commands::Sync) {
        Commands::Sync => {
            tracing::info!("NASDAQ 로더 시작");
            let report = nasdaq_collector::run(&config).await?;
            report.log_summary("일봉 동기화");

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }
        Commands::Status => {
            let db = Database::open(&config.database())
                .await
                .context("데이터베이스 열기 실패")?;
            let status = modules::sync_status(&db).await;
            db.close().await;
            let status = status?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                status.log();
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "nasdaq-collector",
            "sync",
            "--limit",
            "5",
            "--start-date",
            "2020-01-01",
            "--concurrency",
            "4",
        ])
        .unwrap();

        assert!(matches!(cli.command, Some(Commands::Sync)));
        assert_eq!(cli.limit, Some(5));
        assert_eq!(cli.start_date, NaiveDate::from_ymd_opt(2020, 1, 1));
        assert_eq!(cli.concurrency, Some(4));
    }

    #[test]
    fn test_flags_before_subcommand_and_default_command() {
        let cli = Cli::try_parse_from(["nasdaq-collector", "--limit", "5", "sync"]).unwrap();
        assert_eq!(cli.limit, Some(5));

        let cli = Cli::try_parse_from(["nasdaq-collector", "--database", "x.db"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.database, Some(PathBuf::from("x.db")));
    }

    #[test]
    fn test_bad_start_date_rejected() {
        assert!(Cli::try_parse_from(["nasdaq-collector", "sync", "--start-date", "01/02/2020"]).is_err());
    }
}
