// ==========================================
// 企业培训管理系统 - 冲突规则配置读取 Trait
// ==========================================
// 职责: 定义冲突检测所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::engine::conflict::{ConflictRuleConfig, TravelTimeTable};
use async_trait::async_trait;
use std::error::Error;

// ==========================================
// ConflictConfigReader Trait
// ==========================================
// 用途: 冲突检测引擎所需的规则参数
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ConflictConfigReader: Send + Sync {
    /// 获取重叠缓冲（分钟）
    ///
    /// # 默认值
    /// - 30
    async fn get_overlap_buffer_minutes(&self) -> Result<i64, Box<dyn Error>>;

    /// 获取差旅附加缓冲（小时）
    ///
    /// # 默认值
    /// - 1.0
    async fn get_travel_buffer_hours(&self) -> Result<f64, Box<dyn Error>>;

    /// 获取同日负荷告警阈值
    ///
    /// # 默认值
    /// - 2
    async fn get_same_day_warning_threshold(&self) -> Result<usize, Box<dyn Error>>;

    /// 获取办公地差旅时间表
    ///
    /// # 说明
    /// 配置格式为 JSON: [{"from": "NYC", "to": "Boston", "hours": 4.0}, ...]
    ///
    /// # 默认值
    /// - NYC-Boston 4h, NYC-Dallas 6h, Boston-Dallas 8h
    async fn get_office_travel_times(&self) -> Result<TravelTimeTable, Box<dyn Error>>;

    /// 获取冲突消息语言
    ///
    /// # 默认值
    /// - "en"
    async fn get_message_locale(&self) -> Result<String, Box<dyn Error>>;

    /// 组装完整的冲突规则参数
    async fn load_rule_config(&self) -> Result<ConflictRuleConfig, Box<dyn Error>> {
        // 逐条读取,错误值不跨 await 存活（Box<dyn Error> 非 Send）
        let overlap_buffer_minutes = self.get_overlap_buffer_minutes().await?;
        let travel_buffer_hours = self.get_travel_buffer_hours().await?;
        let same_day_threshold = self.get_same_day_warning_threshold().await?;
        let travel_times = self.get_office_travel_times().await?;
        let locale = self.get_message_locale().await?;

        Ok(ConflictRuleConfig {
            overlap_buffer_minutes,
            travel_buffer_hours,
            same_day_threshold,
            travel_times,
            locale,
        })
    }
}
