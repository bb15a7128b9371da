// ==========================================
// 企业培训管理系统 - SQLite 连接初始化与建表
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键、busy_timeout）
// - ensure_schema 幂等建表,供应用启动与测试共用
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 时间字段统一存储格式（办公地本地时间）
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    user_id          TEXT PRIMARY KEY,
    username         TEXT NOT NULL UNIQUE,
    email            TEXT NOT NULL UNIQUE,
    full_name        TEXT NOT NULL,
    role             TEXT NOT NULL DEFAULT 'employee',
    is_active        INTEGER NOT NULL DEFAULT 1,
    office_location  TEXT,
    department       TEXT,
    created_at       TEXT NOT NULL,
    updated_at       TEXT
);

CREATE TABLE IF NOT EXISTS trainings (
    training_id          TEXT PRIMARY KEY,
    title                TEXT NOT NULL,
    description          TEXT,
    category             TEXT NOT NULL,
    level                TEXT NOT NULL DEFAULT 'beginner',
    status               TEXT NOT NULL DEFAULT 'draft',
    location             TEXT NOT NULL,
    max_participants     INTEGER NOT NULL DEFAULT 30,
    current_participants INTEGER NOT NULL DEFAULT 0,
    start_date           TEXT NOT NULL,
    end_date             TEXT NOT NULL,
    duration_hours       REAL NOT NULL,
    credits_required     INTEGER NOT NULL DEFAULT 1,
    cost                 REAL NOT NULL DEFAULT 0,
    instructor           TEXT,
    prerequisites        TEXT,
    learning_objectives  TEXT,
    created_by           TEXT NOT NULL REFERENCES users(user_id),
    created_at           TEXT NOT NULL,
    updated_at           TEXT
);

CREATE INDEX IF NOT EXISTS idx_trainings_status ON trainings(status);
CREATE INDEX IF NOT EXISTS idx_trainings_start ON trainings(start_date);

CREATE TABLE IF NOT EXISTS registrations (
    registration_id      TEXT PRIMARY KEY,
    user_id              TEXT NOT NULL REFERENCES users(user_id),
    training_id          TEXT NOT NULL REFERENCES trainings(training_id),
    status               TEXT NOT NULL DEFAULT 'pending',
    registration_date    TEXT NOT NULL,
    confirmed_date       TEXT,
    cancelled_date       TEXT,
    cancellation_reason  TEXT,
    notes                TEXT,
    special_requirements TEXT,
    is_active            INTEGER NOT NULL DEFAULT 1,
    updated_at           TEXT
);

CREATE INDEX IF NOT EXISTS idx_registrations_user_status ON registrations(user_id, status);
CREATE INDEX IF NOT EXISTS idx_registrations_training ON registrations(training_id, status);
CREATE UNIQUE INDEX IF NOT EXISTS uq_registrations_active
    ON registrations(user_id, training_id) WHERE is_active = 1;

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id    TEXT NOT NULL DEFAULT 'global',
    key         TEXT NOT NULL,
    value       TEXT NOT NULL,
    updated_at  TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (scope_id, key)
);

CREATE TABLE IF NOT EXISTS schema_version (
    version     INTEGER PRIMARY KEY,
    applied_at  TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
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

/// 幂等建表并登记 schema_version
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
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

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
