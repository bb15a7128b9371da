// ==========================================
// 企业培训管理系统 - 引擎层
// ==========================================
// 职责: 实现业务规则引擎,不拼 SQL
// 红线: Engine 不拼 SQL, 所有冲突必须输出 message
// ==========================================

pub mod conflict;
pub mod lifecycle;

// 重导出核心引擎
pub use conflict::{
    ConflictDetail, ConflictDetector, ConflictFinding, ConflictReport, ConflictRuleConfig,
    TravelRoute, TravelTimeTable,
};
pub use lifecycle::{
    is_open_for_registration, transition_registration, transition_training, LifecycleError,
};
