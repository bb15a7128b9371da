// ==========================================
// 企业培训管理系统 - 报名领域模型
// ==========================================
// 职责: 报名记录、已确认行程快照、容量信息
// ==========================================

use crate::domain::training::TrainingRef;
use crate::domain::types::RegistrationStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Registration - 报名记录
// ==========================================
// 对齐: registrations 表
// 约束: 同一 (user_id, training_id) 最多一条 is_active 记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    // ===== 主键 =====
    pub registration_id: String,
    pub user_id: String,
    pub training_id: String,

    // ===== 状态 =====
    pub status: RegistrationStatus,
    pub registration_date: DateTime<Utc>,
    pub confirmed_date: Option<DateTime<Utc>>,
    pub cancelled_date: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,

    // ===== 备注 =====
    pub notes: Option<String>,
    pub special_requirements: Option<String>,

    // ===== 管理字段 =====
    pub is_active: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Registration {
    /// 创建一条待确认的新报名
    pub fn new_pending(
        user_id: impl Into<String>,
        training_id: impl Into<String>,
        notes: Option<String>,
        special_requirements: Option<String>,
    ) -> Self {
        Self {
            registration_id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            training_id: training_id.into(),
            status: RegistrationStatus::Pending,
            registration_date: Utc::now(),
            confirmed_date: None,
            cancelled_date: None,
            cancellation_reason: None,
            notes,
            special_requirements,
            is_active: true,
            updated_at: None,
        }
    }
}

// ==========================================
// ConfirmedCommitment - 已确认行程
// ==========================================
// 每次冲突检查时从已确认报名新建,检查结束即丢弃
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmedCommitment {
    pub training: TrainingRef,
}

impl ConfirmedCommitment {
    pub fn new(training: TrainingRef) -> Self {
        Self { training }
    }
}

// ==========================================
// CapacityInfo - 容量信息
// ==========================================
// 满员口径: confirmed_registrations >= max_participants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityInfo {
    pub max_participants: i32,
    pub current_participants: i32,
    pub confirmed_registrations: i32,
    pub active_registrations: i32,
    pub available_spots: i32,
    pub is_full: bool,
}

impl CapacityInfo {
    /// 由计数结果构造,派生 available_spots / is_full
    pub fn from_counts(
        max_participants: i32,
        current_participants: i32,
        confirmed_registrations: i32,
        active_registrations: i32,
    ) -> Self {
        Self {
            max_participants,
            current_participants,
            confirmed_registrations,
            active_registrations,
            available_spots: max_participants - confirmed_registrations,
            is_full: confirmed_registrations >= max_participants,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_full_boundary() {
        let info = CapacityInfo::from_counts(2, 2, 1, 2);
        assert!(!info.is_full);
        assert_eq!(info.available_spots, 1);

        let info = CapacityInfo::from_counts(2, 2, 2, 2);
        assert!(info.is_full);
        assert_eq!(info.available_spots, 0);
    }

    #[test]
    fn test_new_pending_registration() {
        let reg = Registration::new_pending("U1", "T1", Some("note".to_string()), None);
        assert_eq!(reg.status, RegistrationStatus::Pending);
        assert!(reg.is_active);
        assert!(!reg.registration_id.is_empty());
    }
}
