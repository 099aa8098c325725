//! SQLite 연결 풀과 마이그레이션.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use tracing::{debug, info};

use super::{MetadataRepository, PriceRepository};
use crate::error::{DataError, Result};

/// 데이터베이스 설정.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// SQLite 파일 경로
    pub path: PathBuf,
    /// 풀의 최대 연결 수
    pub max_connections: u32,
    /// 잠금 대기 시간 (초)
    pub busy_timeout_secs: u64,
}

impl DatabaseConfig {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ..Default::default()
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("nasdaq_prices.db"),
            max_connections: 4,
            busy_timeout_secs: 5,
        }
    }
}

/// 데이터베이스 연결 풀 래퍼.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// SQLite 파일을 열고 (없으면 생성) 마이그레이션을 실행합니다.
    ///
    /// WAL 저널과 `synchronous=NORMAL`을 사용합니다.
    pub async fn open(config: &DatabaseConfig) -> Result<Self> {
        let path = &config.path;
        info!(path = %path.display(), "데이터베이스 연결");

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                DataError::ConnectionError(format!("{}: {}", parent.display(), e))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(config.busy_timeout_secs));

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// 인메모리 데이터베이스 (테스트용).
    ///
    /// 연결이 닫히면 데이터가 사라지므로 연결 하나를 계속 유지합니다.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| DataError::ConfigError(e.to_string()))?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// 내부 연결 풀을 반환합니다.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// 스키마 마이그레이션 실행.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        debug!("마이그레이션 완료");
        Ok(())
    }

    /// 일봉 저장소.
    pub fn prices(&self) -> PriceRepository {
        PriceRepository::new(self.pool.clone())
    }

    /// 메타데이터 저장소.
    pub fn metadata(&self) -> MetadataRepository {
        MetadataRepository::new(self.pool.clone())
    }

    /// 연결 풀 종료.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
