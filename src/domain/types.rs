// ==========================================
// 企业培训管理系统 - 领域类型定义
// ==========================================
// 职责: 用户角色、培训/报名状态、冲突类型与严重级别
// 序列化格式: snake_case (与数据库、对外 JSON 一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 用户角色 (User Role)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Employee,         // 普通员工
    KnowledgeManager, // 知识管理员
    Admin,            // 管理员
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl UserRole {
    /// 从字符串解析角色（未知值按普通员工处理）
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "admin" => UserRole::Admin,
            "knowledge_manager" => UserRole::KnowledgeManager,
            _ => UserRole::Employee,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            UserRole::Employee => "employee",
            UserRole::KnowledgeManager => "knowledge_manager",
            UserRole::Admin => "admin",
        }
    }
}

// ==========================================
// 培训类别 (Training Category)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingCategory {
    Technical,  // 技术
    SoftSkills, // 软技能
    Compliance, // 合规
    Leadership, // 领导力
    Safety,     // 安全
}

impl fmt::Display for TrainingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl TrainingCategory {
    /// 从字符串解析培训类别
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "technical" => Some(TrainingCategory::Technical),
            "soft_skills" => Some(TrainingCategory::SoftSkills),
            "compliance" => Some(TrainingCategory::Compliance),
            "leadership" => Some(TrainingCategory::Leadership),
            "safety" => Some(TrainingCategory::Safety),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            TrainingCategory::Technical => "technical",
            TrainingCategory::SoftSkills => "soft_skills",
            TrainingCategory::Compliance => "compliance",
            TrainingCategory::Leadership => "leadership",
            TrainingCategory::Safety => "safety",
        }
    }
}

// ==========================================
// 培训难度 (Training Level)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl fmt::Display for TrainingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl TrainingLevel {
    /// 从字符串解析难度（未知值按入门处理）
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "intermediate" => TrainingLevel::Intermediate,
            "advanced" => TrainingLevel::Advanced,
            "expert" => TrainingLevel::Expert,
            _ => TrainingLevel::Beginner,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            TrainingLevel::Beginner => "beginner",
            TrainingLevel::Intermediate => "intermediate",
            TrainingLevel::Advanced => "advanced",
            TrainingLevel::Expert => "expert",
        }
    }
}

// ==========================================
// 培训状态 (Training Status)
// ==========================================
// 生命周期: draft → published → completed / cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingStatus {
    Draft,     // 草稿
    Published, // 已发布（开放报名）
    Cancelled, // 已取消
    Completed, // 已结束
}

impl fmt::Display for TrainingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl TrainingStatus {
    /// 从字符串解析状态（未知值按草稿处理）
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "published" => TrainingStatus::Published,
            "cancelled" => TrainingStatus::Cancelled,
            "completed" => TrainingStatus::Completed,
            _ => TrainingStatus::Draft,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            TrainingStatus::Draft => "draft",
            TrainingStatus::Published => "published",
            TrainingStatus::Cancelled => "cancelled",
            TrainingStatus::Completed => "completed",
        }
    }
}

// ==========================================
// 报名状态 (Registration Status)
// ==========================================
// 生命周期: pending → confirmed / cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Pending,    // 待确认
    Confirmed,  // 已确认
    Waitlisted, // 候补
    Cancelled,  // 已取消
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl RegistrationStatus {
    /// 从字符串解析状态（未知值按待确认处理）
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "confirmed" => RegistrationStatus::Confirmed,
            "waitlisted" => RegistrationStatus::Waitlisted,
            "cancelled" => RegistrationStatus::Cancelled,
            _ => RegistrationStatus::Pending,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Pending => "pending",
            RegistrationStatus::Confirmed => "confirmed",
            RegistrationStatus::Waitlisted => "waitlisted",
            RegistrationStatus::Cancelled => "cancelled",
        }
    }
}

// ==========================================
// 冲突严重级别 (Severity)
// ==========================================
// error: 阻断报名; warning: 仅提示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

// ==========================================
// 冲突类型 (Conflict Kind)
// ==========================================
// 对外 JSON 的 type 字段取值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    TrainingNotFound,
    DuplicateRegistration,
    ScheduleOverlap,
    TravelTimeConflict,
    #[serde(rename = "same_day_multiple_trainings")]
    SameDayMultiple,
    TrainingFull,
}

impl ConflictKind {
    /// 对外 JSON 使用的类型标识
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictKind::TrainingNotFound => "training_not_found",
            ConflictKind::DuplicateRegistration => "duplicate_registration",
            ConflictKind::ScheduleOverlap => "schedule_overlap",
            ConflictKind::TravelTimeConflict => "travel_time_conflict",
            ConflictKind::SameDayMultiple => "same_day_multiple_trainings",
            ConflictKind::TrainingFull => "training_full",
        }
    }

    /// 该类型冲突的固定严重级别
    pub fn severity(&self) -> Severity {
        match self {
            ConflictKind::TravelTimeConflict | ConflictKind::SameDayMultiple => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
