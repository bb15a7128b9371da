// ==========================================
// 企业培训管理系统 - 接口耗时与 SQL 统计
// ==========================================
// 职责: 每次 API 调用结束时输出耗时、SQL 语句数、慢 SQL 数（target = "perf"）
// 开关:
// - TRAINING_MGMT_PERF_SQL=1/0 显式开关,未设置时仅 Debug 构建开启
// - TRAINING_MGMT_SLOW_SQL_MS 慢 SQL 阈值（毫秒,默认 Debug 50 / Release 200）
// ==========================================

use rusqlite::Connection;
use std::cell::Cell;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

pub const ENV_PERF_SQL: &str = "TRAINING_MGMT_PERF_SQL";
pub const ENV_SLOW_SQL_MS: &str = "TRAINING_MGMT_SLOW_SQL_MS";

/// 日志中 SQL 文本的最大字符数
const SQL_LOG_MAX_CHARS: usize = 300;

static SQL_STATS_ENABLED: AtomicBool = AtomicBool::new(false);
static SLOW_SQL_MS: AtomicU64 = AtomicU64::new(0);

/// 当前线程的累计计数（Guard 按差值统计）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct SqlCounters {
    statements: u64,
    slow: u64,
}

thread_local! {
    static ACTIVE_GUARDS: Cell<u32> = const { Cell::new(0) };
    static COUNTERS: Cell<SqlCounters> = const {
        Cell::new(SqlCounters { statements: 0, slow: 0 })
    };
}

fn env_flag(name: &str) -> Option<bool> {
    let v = std::env::var(name).ok()?;
    Some(matches!(
        v.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    ))
}

fn inside_guard() -> bool {
    ACTIVE_GUARDS.with(|g| g.get() > 0)
}

fn bump(update: impl FnOnce(&mut SqlCounters)) {
    COUNTERS.with(|c| {
        let mut counters = c.get();
        update(&mut counters);
        c.set(counters);
    });
}

/// SQL 单行化并按字符截断
fn compact_sql(sql: &str) -> String {
    let single_line = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    match single_line.char_indices().nth(SQL_LOG_MAX_CHARS) {
        Some((cut, _)) => format!("{}…", &single_line[..cut]),
        None => single_line,
    }
}

/// 为连接挂载语句计数与慢 SQL 告警
pub fn install_sqlite_tracing(conn: &mut Connection) {
    let enabled = env_flag(ENV_PERF_SQL).unwrap_or(cfg!(debug_assertions));
    SQL_STATS_ENABLED.store(enabled, Ordering::Relaxed);

    if !enabled {
        conn.trace(None);
        conn.profile(None);
        return;
    }

    let default_ms = if cfg!(debug_assertions) { 50 } else { 200 };
    let slow_ms = std::env::var(ENV_SLOW_SQL_MS)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default_ms);
    SLOW_SQL_MS.store(slow_ms, Ordering::Relaxed);

    conn.trace(Some(on_statement));
    conn.profile(Some(on_statement_done));
}

fn on_statement(_sql: &str) {
    if SQL_STATS_ENABLED.load(Ordering::Relaxed) && inside_guard() {
        bump(|c| c.statements = c.statements.saturating_add(1));
    }
}

fn on_statement_done(sql: &str, duration: Duration) {
    if !SQL_STATS_ENABLED.load(Ordering::Relaxed) {
        return;
    }

    let threshold = SLOW_SQL_MS.load(Ordering::Relaxed);
    let elapsed_ms = duration.as_millis() as u64;
    if threshold == 0 || elapsed_ms < threshold {
        return;
    }

    tracing::warn!(
        target: "slow_sql",
        elapsed_ms,
        threshold_ms = threshold,
        sql = %compact_sql(sql),
        "慢 SQL"
    );
    if inside_guard() {
        bump(|c| c.slow = c.slow.saturating_add(1));
    }
}

/// API 调用统计 Guard: drop 时输出本次调用的耗时与 SQL 计数
pub struct PerfGuard {
    op: &'static str,
    started: Instant,
    baseline: SqlCounters,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        ACTIVE_GUARDS.with(|g| g.set(g.get().saturating_add(1)));
        Self {
            op,
            started: Instant::now(),
            baseline: COUNTERS.with(|c| c.get()),
        }
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let now = COUNTERS.with(|c| c.get());
        tracing::info!(
            target: "perf",
            op = self.op,
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            sql_count = now.statements.saturating_sub(self.baseline.statements),
            slow_sql_count = now.slow.saturating_sub(self.baseline.slow),
            "done"
        );
        ACTIVE_GUARDS.with(|g| g.set(g.get().saturating_sub(1)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_sql() {
        assert_eq!(
            compact_sql("SELECT *\n  FROM registrations\n WHERE is_active = 1"),
            "SELECT * FROM registrations WHERE is_active = 1"
        );
        let long = "培".repeat(SQL_LOG_MAX_CHARS + 5);
        let compacted = compact_sql(&long);
        assert_eq!(compacted.chars().count(), SQL_LOG_MAX_CHARS + 1);
        assert!(compacted.ends_with('…'));
    }

    #[test]
    fn test_guard_counts_statements_outside_nesting() {
        assert!(!inside_guard());
        {
            let _outer = PerfGuard::new("test.outer");
            let _inner = PerfGuard::new("test.inner");
            assert!(inside_guard());
        }
        assert!(!inside_guard());
    }
}
