// ==========================================
// 企业培训管理系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、写入
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::conflict_config_trait::ConflictConfigReader;
use crate::db::open_sqlite_connection;
use crate::engine::conflict::{
    TravelRoute, TravelTimeTable, DEFAULT_LOCALE, DEFAULT_OVERLAP_BUFFER_MINUTES,
    DEFAULT_SAME_DAY_THRESHOLD, DEFAULT_TRAVEL_BUFFER_HOURS, MAX_OVERLAP_BUFFER_MINUTES,
    MAX_TRAVEL_HOURS,
};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::HashMap;
use std::error::Error;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 写入 global scope 配置（存在则覆盖）
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 写入办公地差旅时间表
    pub fn set_office_travel_times(&self, table: &TravelTimeTable) -> Result<(), Box<dyn Error>> {
        let raw = serde_json::to_string(&table.routes())?;
        self.set_config_value(config_keys::OFFICE_TRAVEL_TIMES, &raw)
    }

    /// 获取所有配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        let json_value = json!(config_map);
        Ok(serde_json::to_string(&json_value)?)
    }
}

// ==========================================
// ConflictConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ConflictConfigReader for ConfigManager {
    async fn get_overlap_buffer_minutes(&self) -> Result<i64, Box<dyn Error>> {
        let default = DEFAULT_OVERLAP_BUFFER_MINUTES.to_string();
        let value = self.get_config_or_default(config_keys::OVERLAP_BUFFER_MINUTES, &default)?;
        Ok(parse_in_range(
            config_keys::OVERLAP_BUFFER_MINUTES,
            &value,
            DEFAULT_OVERLAP_BUFFER_MINUTES,
            |m: &i64| (0..=MAX_OVERLAP_BUFFER_MINUTES).contains(m),
        ))
    }

    async fn get_travel_buffer_hours(&self) -> Result<f64, Box<dyn Error>> {
        let default = DEFAULT_TRAVEL_BUFFER_HOURS.to_string();
        let value = self.get_config_or_default(config_keys::TRAVEL_BUFFER_HOURS, &default)?;
        Ok(parse_in_range(
            config_keys::TRAVEL_BUFFER_HOURS,
            &value,
            DEFAULT_TRAVEL_BUFFER_HOURS,
            is_valid_hours,
        ))
    }

    async fn get_same_day_warning_threshold(&self) -> Result<usize, Box<dyn Error>> {
        let default = DEFAULT_SAME_DAY_THRESHOLD.to_string();
        let value =
            self.get_config_or_default(config_keys::SAME_DAY_WARNING_THRESHOLD, &default)?;
        Ok(parse_in_range(
            config_keys::SAME_DAY_WARNING_THRESHOLD,
            &value,
            DEFAULT_SAME_DAY_THRESHOLD,
            |n: &usize| *n >= 1,
        ))
    }

    async fn get_office_travel_times(&self) -> Result<TravelTimeTable, Box<dyn Error>> {
        let raw = match self.get_config_value(config_keys::OFFICE_TRAVEL_TIMES)? {
            Some(v) => v,
            None => return Ok(TravelTimeTable::default_offices()),
        };

        match serde_json::from_str::<Vec<TravelRoute>>(&raw) {
            Ok(routes) => {
                let (valid, rejected): (Vec<TravelRoute>, Vec<TravelRoute>) =
                    routes.into_iter().partition(|r| is_valid_hours(&r.hours));
                for route in &rejected {
                    tracing::warn!(
                        config_key = config_keys::OFFICE_TRAVEL_TIMES,
                        from = %route.from,
                        to = %route.to,
                        hours = route.hours,
                        "差旅时间超出范围，忽略该路线"
                    );
                }
                Ok(TravelTimeTable::from_routes(valid))
            }
            Err(e) => {
                tracing::warn!(
                    config_key = config_keys::OFFICE_TRAVEL_TIMES,
                    raw_value = %raw,
                    error = %e,
                    "差旅时间表配置格式错误，使用默认三地时间表"
                );
                Ok(TravelTimeTable::default_offices())
            }
        }
    }

    async fn get_message_locale(&self) -> Result<String, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::MESSAGE_LOCALE, DEFAULT_LOCALE)?;
        let value = value.trim();
        if value.is_empty() {
            Ok(DEFAULT_LOCALE.to_string())
        } else {
            Ok(value.to_string())
        }
    }
}

/// 差旅小时数: 有限、非负、不超过 24 小时
fn is_valid_hours(hours: &f64) -> bool {
    hours.is_finite() && (0.0..=MAX_TRAVEL_HOURS).contains(hours)
}

/// 解析数值配置,无法解析或超出范围时回退默认值
fn parse_in_range<T>(key: &str, raw: &str, default: T, valid: impl Fn(&T) -> bool) -> T
where
    T: FromStr,
{
    match raw.trim().parse::<T>() {
        Ok(v) if valid(&v) => v,
        _ => {
            tracing::warn!(
                config_key = key,
                raw_value = %raw,
                "配置值无效或超出范围，使用默认值"
            );
            default
        }
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 时间重叠
    pub const OVERLAP_BUFFER_MINUTES: &str = "overlap_buffer_minutes";

    // 差旅
    pub const TRAVEL_BUFFER_HOURS: &str = "travel_buffer_hours";
    pub const OFFICE_TRAVEL_TIMES: &str = "office_travel_times"; // JSON 路线列表

    // 同日负荷
    pub const SAME_DAY_WARNING_THRESHOLD: &str = "same_day_warning_threshold";

    // 消息
    pub const MESSAGE_LOCALE: &str = "message_locale";
}
