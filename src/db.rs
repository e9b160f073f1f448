// ==========================================
// 酒店客房预订管理系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免"部分模块外键开启/部分不开启"
// - 统一 busy_timeout，多窗口/多进程同时写库时减少偶发 busy 错误
// - 提供有界重试助手，吸收连接陈旧/短暂 busy 类故障
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 短暂存储故障的最大重试次数
///
/// 说明：
/// - 仅适用于 SQLITE_BUSY / SQLITE_LOCKED 一类可恢复故障
/// - 校验类错误（冲突/重复房间等）永不重试，由调用方修正后重新提交
pub const MAX_BUSY_RETRIES: u32 = 3;

/// 当前代码所期望的 schema_version
///
/// 说明：
/// - 这里的版本号用于**提示/告警**（不做自动迁移），避免静默在旧库上运行导致隐性错误。
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启（reservation_room 依赖级联删除）
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 判断错误是否为可重试的短暂存储故障
pub fn is_transient_error(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::DatabaseBusy
                || e.code == rusqlite::ErrorCode::DatabaseLocked
    )
}

/// 有界重试助手
///
/// 对短暂的 busy/locked 故障重试至多 `MAX_BUSY_RETRIES` 次，
/// 其余错误原样返回。重试策略是注入式包装，不是模块级全局状态。
pub fn with_busy_retry<T, F>(mut op: F) -> rusqlite::Result<T>
where
    F: FnMut() -> rusqlite::Result<T>,
{
    let mut attempts = 0;
    loop {
        match op() {
            Ok(v) => return Ok(v),
            Err(e) if is_transient_error(&e) && attempts < MAX_BUSY_RETRIES => {
                attempts += 1;
                tracing::warn!("存储短暂故障，第{}次重试: {}", attempts, e);
            }
            Err(e) => return Err(e),
        }
    }
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
