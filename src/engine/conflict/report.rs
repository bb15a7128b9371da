// ==========================================
// 企业培训管理系统 - 冲突报告
// ==========================================
// 对外 JSON:
// {"has_conflicts": bool, "conflicts": [{"type", ...明细字段, "message", "severity"}]}
// 顺序: 检测顺序（重复/重叠 → 差旅 → 同日负荷）,不按严重级别排序
// ==========================================

use crate::domain::training::TrainingRef;
use crate::domain::types::{ConflictKind, Severity};
use crate::i18n::{t_locale, t_locale_with_args};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// 明细载荷
// ==========================================

/// 重复报名命中的培训
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingBrief {
    pub id: String,
    pub title: String,
    pub start_date: NaiveDateTime,
}

/// 发生冲突的已确认培训
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictingTraining {
    pub id: String,
    pub title: String,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub location: String,
}

impl From<&TrainingRef> for ConflictingTraining {
    fn from(t: &TrainingRef) -> Self {
        Self {
            id: t.id.clone(),
            title: t.title.clone(),
            start_date: t.start(),
            end_date: t.end(),
            location: t.location.clone(),
        }
    }
}

/// 同日培训条目（时间为 HH:MM）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SameDayTraining {
    pub id: String,
    pub title: String,
    pub start_time: String,
    pub end_time: String,
}

impl From<&TrainingRef> for SameDayTraining {
    fn from(t: &TrainingRef) -> Self {
        Self {
            id: t.id.clone(),
            title: t.title.clone(),
            start_time: t.start().format("%H:%M").to_string(),
            end_time: t.end().format("%H:%M").to_string(),
        }
    }
}

// ==========================================
// ConflictDetail - 按类型区分的冲突明细
// ==========================================
// 封闭枚举: 新增规则时编译期强制覆盖所有分支
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConflictDetail {
    TrainingNotFound,
    DuplicateRegistration {
        training: TrainingBrief,
    },
    ScheduleOverlap {
        conflicting_training: ConflictingTraining,
    },
    TravelTimeConflict {
        travel_time_hours: f64,
        from_location: String,
        to_location: String,
        conflicting_training: ConflictingTraining,
    },
    #[serde(rename = "same_day_multiple_trainings")]
    SameDayMultiple {
        training_date: NaiveDate,
        count: usize,
        existing_trainings: Vec<SameDayTraining>,
    },
    TrainingFull,
}

impl ConflictDetail {
    pub fn kind(&self) -> ConflictKind {
        match self {
            ConflictDetail::TrainingNotFound => ConflictKind::TrainingNotFound,
            ConflictDetail::DuplicateRegistration { .. } => ConflictKind::DuplicateRegistration,
            ConflictDetail::ScheduleOverlap { .. } => ConflictKind::ScheduleOverlap,
            ConflictDetail::TravelTimeConflict { .. } => ConflictKind::TravelTimeConflict,
            ConflictDetail::SameDayMultiple { .. } => ConflictKind::SameDayMultiple,
            ConflictDetail::TrainingFull => ConflictKind::TrainingFull,
        }
    }

    /// 明细所引用的已确认培训ID（没有则为 None）
    pub fn referenced_training_id(&self) -> Option<&str> {
        match self {
            ConflictDetail::DuplicateRegistration { training } => Some(training.id.as_str()),
            ConflictDetail::ScheduleOverlap {
                conflicting_training,
            }
            | ConflictDetail::TravelTimeConflict {
                conflicting_training,
                ..
            } => Some(conflicting_training.id.as_str()),
            _ => None,
        }
    }
}

// ==========================================
// ConflictFinding - 单条冲突
// ==========================================
// 创建后不可变
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictFinding {
    #[serde(flatten)]
    pub detail: ConflictDetail,
    pub message: String,
    pub severity: Severity,
}

impl ConflictFinding {
    fn build(detail: ConflictDetail, message: String) -> Self {
        let severity = detail.kind().severity();
        Self {
            detail,
            message,
            severity,
        }
    }

    /// 目标培训不存在（冲突检测口径）
    pub fn training_not_found(locale: &str) -> Self {
        Self::build(
            ConflictDetail::TrainingNotFound,
            t_locale("conflict.training_not_found", locale),
        )
    }

    /// 目标培训不存在（报名前置校验口径）
    pub fn prerequisite_training_not_found(locale: &str) -> Self {
        Self::build(
            ConflictDetail::TrainingNotFound,
            t_locale("prerequisite.training_not_found", locale),
        )
    }

    pub fn duplicate_registration(existing: &TrainingRef, locale: &str) -> Self {
        Self::build(
            ConflictDetail::DuplicateRegistration {
                training: TrainingBrief {
                    id: existing.id.clone(),
                    title: existing.title.clone(),
                    start_date: existing.start(),
                },
            },
            t_locale("conflict.duplicate_registration", locale),
        )
    }

    pub fn schedule_overlap(existing: &TrainingRef, locale: &str) -> Self {
        Self::build(
            ConflictDetail::ScheduleOverlap {
                conflicting_training: ConflictingTraining::from(existing),
            },
            t_locale("conflict.schedule_overlap", locale),
        )
    }

    pub fn travel_time_conflict(
        candidate: &TrainingRef,
        existing: &TrainingRef,
        travel_time_hours: f64,
        locale: &str,
    ) -> Self {
        let message = t_locale_with_args(
            "conflict.travel_time_conflict",
            locale,
            &[
                ("from", candidate.location.as_str()),
                ("to", existing.location.as_str()),
            ],
        );
        Self::build(
            ConflictDetail::TravelTimeConflict {
                travel_time_hours,
                from_location: candidate.location.clone(),
                to_location: existing.location.clone(),
                conflicting_training: ConflictingTraining::from(existing),
            },
            message,
        )
    }

    pub fn same_day_multiple(
        training_date: NaiveDate,
        same_day: &[&TrainingRef],
        locale: &str,
    ) -> Self {
        let count = same_day.len();
        let message = t_locale_with_args(
            "conflict.same_day_multiple_trainings",
            locale,
            &[("count", count.to_string().as_str())],
        );
        Self::build(
            ConflictDetail::SameDayMultiple {
                training_date,
                count,
                existing_trainings: same_day.iter().map(|t| SameDayTraining::from(*t)).collect(),
            },
            message,
        )
    }

    pub fn training_full(locale: &str) -> Self {
        Self::build(
            ConflictDetail::TrainingFull,
            t_locale("prerequisite.training_full", locale),
        )
    }

    pub fn kind(&self) -> ConflictKind {
        self.detail.kind()
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

// ==========================================
// ConflictReport - 冲突报告
// ==========================================
// 每次请求新建,不持久化
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictReport {
    pub has_conflicts: bool,
    #[serde(rename = "conflicts")]
    pub findings: Vec<ConflictFinding>,
}

impl ConflictReport {
    /// 由检测顺序的冲突列表构造报告
    pub fn from_findings(findings: Vec<ConflictFinding>) -> Self {
        Self {
            has_conflicts: !findings.is_empty(),
            findings,
        }
    }

    pub fn empty() -> Self {
        Self::from_findings(Vec::new())
    }

    /// 是否存在 error 级别冲突
    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(ConflictFinding::is_error)
    }

    /// 按类型筛选
    pub fn of_kind(&self, kind: ConflictKind) -> Vec<&ConflictFinding> {
        self.findings.iter().filter(|f| f.kind() == kind).collect()
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }
}
