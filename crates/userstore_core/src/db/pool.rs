//! Pooled connection bootstrap for SQLite.
//!
//! # Responsibility
//! - Build file or in-memory connection pools.
//! - Configure per-connection pragmas required by the store.
//! - Apply schema migrations before handing the pool out.
//!
//! # Invariants
//! - Pooled connections have `foreign_keys=ON`.
//! - A returned pool points at a fully migrated schema.
//! - The in-memory pool holds exactly one connection for its whole lifetime,
//!   so every checkout sees the same database.

use super::migrations::apply_migrations;
use super::DbResult;
use crate::config::StoreConfig;
use log::{error, info, warn};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::time::{Duration, Instant};

/// Process-wide pool handle. Cloning shares the same pool.
pub type ConnectionPool = r2d2::Pool<SqliteConnectionManager>;

const POOL_CHECKOUT_TIMEOUT: Duration = Duration::from_secs(30);

/// Opens a pool over the configured database file and applies migrations.
///
/// # Side effects
/// - Creates missing parent directories of `database_path`.
/// - Emits `db_open` logging events with duration and status.
///
/// # Errors
/// - Returns `DbError` when the file cannot be opened, pragmas fail, or the
///   schema is newer than this build supports. Callers at process start
///   should treat this as fatal.
pub fn open_pool(config: &StoreConfig) -> DbResult<ConnectionPool> {
    let started_at = Instant::now();
    info!(
        "event=db_open module=db status=start mode=file pool_max_size={}",
        config.pool_max_size
    );

    let result = build_file_pool(config);
    log_open_result("file", started_at, &result);
    result
}

/// Opens a single-connection in-memory pool and applies migrations.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_pool_in_memory() -> DbResult<ConnectionPool> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=memory");

    let result = build_memory_pool();
    log_open_result("memory", started_at, &result);
    result
}

/// Releases pooled connections at shutdown.
///
/// Failures cannot surface here; outstanding checkouts are closed when their
/// guards drop.
pub fn close_pool(pool: ConnectionPool) {
    let state = pool.state();
    if state.connections != state.idle_connections {
        warn!(
            "event=db_close module=db status=busy connections={} idle={}",
            state.connections, state.idle_connections
        );
    }
    drop(pool);
    info!("event=db_close module=db status=ok");
}

fn build_file_pool(config: &StoreConfig) -> DbResult<ConnectionPool> {
    config.validate()?;

    if let Some(parent) = config.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let busy_timeout = config.busy_timeout();
    let manager = SqliteConnectionManager::file(&config.database_path)
        .with_init(move |conn| configure_file_connection(conn, busy_timeout));

    let pool = r2d2::Pool::builder()
        .max_size(config.pool_max_size)
        .min_idle(Some(1))
        .connection_timeout(POOL_CHECKOUT_TIMEOUT)
        .build(manager)?;
    migrate(&pool)?;
    Ok(pool)
}

fn build_memory_pool() -> DbResult<ConnectionPool> {
    let manager = SqliteConnectionManager::memory()
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));

    let pool = r2d2::Pool::builder()
        .max_size(1)
        .min_idle(Some(1))
        .idle_timeout(None)
        .max_lifetime(None)
        .connection_timeout(POOL_CHECKOUT_TIMEOUT)
        .build(manager)?;
    migrate(&pool)?;
    Ok(pool)
}

fn configure_file_connection(conn: &mut Connection, busy_timeout: Duration) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(busy_timeout)?;
    // journal_mode reports the active mode as a row. The first pooled
    // connection switches the file to WAL; later ones find it already set.
    let _mode: String = conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
    Ok(())
}

fn migrate(pool: &ConnectionPool) -> DbResult<()> {
    let mut conn = pool.get()?;
    apply_migrations(&mut conn)
}

fn log_open_result(mode: &str, started_at: Instant, result: &DbResult<ConnectionPool>) {
    match result {
        Ok(_) => info!(
            "event=db_open module=db status=ok mode={} duration_ms={}",
            mode,
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
            mode,
            started_at.elapsed().as_millis(),
            err
        ),
    }
}
