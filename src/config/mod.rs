// ==========================================
// 企业培训管理系统 - 配置层
// ==========================================
// 职责: 系统配置管理（冲突规则参数、消息语言）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod conflict_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use conflict_config_trait::ConflictConfigReader;
