// ==========================================
// 企业培训管理系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 培训排期与报名冲突检测后端
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 冲突检测与状态流转
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// SQL 性能追踪
pub mod perf;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    ConflictKind, RegistrationStatus, Severity, TrainingCategory, TrainingLevel, TrainingStatus,
    UserRole,
};

// 领域实体
pub use domain::{
    CapacityInfo, ConfirmedCommitment, NewTraining, NewUser, Registration, TimeInterval, Training,
    TrainingRef, TrainingUpdate, User,
};

// 引擎
pub use engine::{ConflictDetector, ConflictFinding, ConflictReport, ConflictRuleConfig};

// API
pub use api::{ApiError, ConflictApi, RegistrationApi, TrainingApi, UserApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "企业培训管理系统";

// 数据库版本
pub const DB_VERSION: &str = "v1";
