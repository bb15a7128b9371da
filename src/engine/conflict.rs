// ==========================================
// 企业培训管理系统 - 排期冲突检测引擎
// ==========================================
// 职责: 判定候选培训与用户已确认行程之间的冲突
// 输入: 候选培训快照 + 已确认行程快照 + 规则参数
// 输出: 冲突报告（error 阻断报名,warning 仅提示）
// ==========================================
// 红线: Engine 不拼 SQL,数据由 ScheduleStore 一次性提供
// ==========================================

mod core;
mod report;
mod rules;

#[cfg(test)]
mod tests;

pub use core::ConflictDetector;
pub use report::{
    ConflictDetail, ConflictFinding, ConflictReport, ConflictingTraining, SameDayTraining,
    TrainingBrief,
};
pub use rules::{
    ConflictRuleConfig, TravelRoute, TravelTimeTable, DEFAULT_LOCALE,
    DEFAULT_OVERLAP_BUFFER_MINUTES, DEFAULT_SAME_DAY_THRESHOLD, DEFAULT_TRAVEL_BUFFER_HOURS,
    MAX_OVERLAP_BUFFER_MINUTES, MAX_TRAVEL_HOURS,
};
