// ==========================================
// 企业培训管理系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod registration;
pub mod training;
pub mod types;
pub mod user;

// 重导出核心类型
pub use registration::{CapacityInfo, ConfirmedCommitment, Registration};
pub use training::{NewTraining, TimeInterval, Training, TrainingRef, TrainingUpdate};
pub use types::{
    ConflictKind, RegistrationStatus, Severity, TrainingCategory, TrainingLevel, TrainingStatus,
    UserRole,
};
pub use user::{NewUser, User};
