// ==========================================
// 企业培训管理系统 - 冲突规则参数
// ==========================================
// 职责: 缓冲时长、同日负荷阈值、办公地差旅时间表
// 来源: config_kv（见 config::ConflictConfigReader）,缺省值如下
// ==========================================

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 默认重叠缓冲（分钟）
pub const DEFAULT_OVERLAP_BUFFER_MINUTES: i64 = 30;

/// 默认差旅附加缓冲（小时）
pub const DEFAULT_TRAVEL_BUFFER_HOURS: f64 = 1.0;

/// 默认同日负荷告警阈值（同日其它已确认培训数）
pub const DEFAULT_SAME_DAY_THRESHOLD: usize = 2;

/// 默认消息语言
pub const DEFAULT_LOCALE: &str = "en";

/// 重叠缓冲上限（分钟,24 小时）
pub const MAX_OVERLAP_BUFFER_MINUTES: i64 = 24 * 60;

/// 差旅时间与差旅缓冲上限（小时）
pub const MAX_TRAVEL_HOURS: f64 = 24.0;

// ==========================================
// TravelRoute - 单条差旅时间配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelRoute {
    pub from: String,
    pub to: String,
    pub hours: f64,
}

impl TravelRoute {
    pub fn new(from: impl Into<String>, to: impl Into<String>, hours: f64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            hours,
        }
    }
}

// ==========================================
// TravelTimeTable - 办公地最短差旅时间表
// ==========================================
// 查找: 先 (A,B) 再 (B,A);未配置的组合视为 0（不检查）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TravelTimeTable {
    routes: HashMap<(String, String), f64>,
}

impl TravelTimeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 默认三地办公室时间表（NYC / Boston / Dallas）
    pub fn default_offices() -> Self {
        Self::from_routes(vec![
            TravelRoute::new("NYC", "Boston", 4.0),
            TravelRoute::new("NYC", "Dallas", 6.0),
            TravelRoute::new("Boston", "Dallas", 8.0),
        ])
    }

    /// 由路线列表构造,后出现的同向路线覆盖先出现的
    pub fn from_routes(routes: Vec<TravelRoute>) -> Self {
        let mut table = Self::new();
        for route in routes {
            table.insert(route.from, route.to, route.hours);
        }
        table
    }

    pub fn insert(&mut self, from: impl Into<String>, to: impl Into<String>, hours: f64) {
        self.routes.insert((from.into(), to.into()), hours);
    }

    /// 查询两地最短差旅时间（小时）
    pub fn lookup(&self, a: &str, b: &str) -> f64 {
        self.routes
            .get(&(a.to_string(), b.to_string()))
            .or_else(|| self.routes.get(&(b.to_string(), a.to_string())))
            .copied()
            .unwrap_or(0.0)
    }

    /// 导出为有序路线列表（用于配置回写/展示）
    pub fn routes(&self) -> Vec<TravelRoute> {
        let mut routes: Vec<TravelRoute> = self
            .routes
            .iter()
            .map(|((from, to), hours)| TravelRoute::new(from.clone(), to.clone(), *hours))
            .collect();
        routes.sort_by(|a, b| (&a.from, &a.to).cmp(&(&b.from, &b.to)));
        routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

// ==========================================
// ConflictRuleConfig - 冲突规则参数集
// ==========================================
// 不可变: 构造后在多个检查间共享
#[derive(Debug, Clone, PartialEq)]
pub struct ConflictRuleConfig {
    pub overlap_buffer_minutes: i64,
    pub travel_buffer_hours: f64,
    pub same_day_threshold: usize,
    pub travel_times: TravelTimeTable,
    pub locale: String,
}

impl Default for ConflictRuleConfig {
    fn default() -> Self {
        Self {
            overlap_buffer_minutes: DEFAULT_OVERLAP_BUFFER_MINUTES,
            travel_buffer_hours: DEFAULT_TRAVEL_BUFFER_HOURS,
            same_day_threshold: DEFAULT_SAME_DAY_THRESHOLD,
            travel_times: TravelTimeTable::default_offices(),
            locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

impl ConflictRuleConfig {
    /// 重叠缓冲;超出 Duration 表示范围时为 None
    pub fn overlap_buffer(&self) -> Option<Duration> {
        Duration::try_minutes(self.overlap_buffer_minutes)
    }

    /// 所需最短间隔 = 差旅时间 + 差旅缓冲;溢出时为 None
    pub fn required_travel_gap(&self, travel_time_hours: f64) -> Option<Duration> {
        hours_to_duration(travel_time_hours)?
            .checked_add(&hours_to_duration(self.travel_buffer_hours)?)
    }
}

/// 小时数转 Duration（按秒四舍五入）;非有限值或越界时为 None
fn hours_to_duration(hours: f64) -> Option<Duration> {
    let seconds = (hours * 3600.0).round();
    if !seconds.is_finite() || seconds.abs() >= i64::MAX as f64 {
        return None;
    }
    Duration::try_seconds(seconds as i64)
}
