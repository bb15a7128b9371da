// ==========================================
// 企业培训管理系统 - 培训领域模型
// ==========================================
// 职责: 培训主数据、排期区间、冲突计算用快照
// 时间口径: start_date/end_date 为办公地本地时间 (NaiveDateTime)
// ==========================================

use crate::domain::types::{TrainingCategory, TrainingLevel, TrainingStatus};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// TimeInterval - 排期区间
// ==========================================
// 约定: start <= end 由上游保证,此处不校验
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeInterval {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// 开始时间所在的日历日期
    pub fn start_date(&self) -> NaiveDate {
        self.start.date()
    }
}

// ==========================================
// TrainingRef - 冲突计算用培训快照
// ==========================================
// 只读: 引擎不修改任何快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRef {
    pub id: String,
    pub title: String,
    pub location: String,
    pub interval: TimeInterval,
}

impl TrainingRef {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        location: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            location: location.into(),
            interval: TimeInterval::new(start, end),
        }
    }

    pub fn start(&self) -> NaiveDateTime {
        self.interval.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.interval.end
    }
}

// ==========================================
// Training - 培训主数据
// ==========================================
// 对齐: trainings 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Training {
    // ===== 主键 =====
    pub training_id: String,

    // ===== 基本信息 =====
    pub title: String,
    pub description: Option<String>,
    pub category: TrainingCategory,
    pub level: TrainingLevel,
    pub status: TrainingStatus,

    // ===== 场地与容量 =====
    pub location: String,
    pub max_participants: i32,
    pub current_participants: i32,

    // ===== 排期 =====
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub duration_hours: f64,

    // ===== 学分与费用 =====
    pub credits_required: i32,
    pub cost: f64,

    // ===== 元数据 =====
    pub instructor: Option<String>,
    pub prerequisites: Option<String>,
    pub learning_objectives: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Training {
    /// 剩余名额（按 current_participants 计数）
    pub fn available_spots(&self) -> i32 {
        self.max_participants - self.current_participants
    }

    /// 生成冲突计算用快照
    pub fn to_ref(&self) -> TrainingRef {
        TrainingRef::new(
            self.training_id.clone(),
            self.title.clone(),
            self.location.clone(),
            self.start_date,
            self.end_date,
        )
    }
}

// ==========================================
// NewTraining - 创建培训入参
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTraining {
    pub title: String,
    pub description: Option<String>,
    pub category: TrainingCategory,
    pub level: TrainingLevel,
    pub location: String,
    pub max_participants: i32,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub duration_hours: f64,
    pub credits_required: i32,
    pub cost: f64,
    pub instructor: Option<String>,
    pub prerequisites: Option<String>,
    pub learning_objectives: Option<String>,
}

impl NewTraining {
    /// 以默认值构造（max_participants=30, credits_required=1, cost=0）
    pub fn new(
        title: impl Into<String>,
        category: TrainingCategory,
        location: impl Into<String>,
        start_date: NaiveDateTime,
        end_date: NaiveDateTime,
    ) -> Self {
        let duration_hours = (end_date - start_date).num_minutes() as f64 / 60.0;
        Self {
            title: title.into(),
            description: None,
            category,
            level: TrainingLevel::Beginner,
            location: location.into(),
            max_participants: 30,
            start_date,
            end_date,
            duration_hours,
            credits_required: 1,
            cost: 0.0,
            instructor: None,
            prerequisites: None,
            learning_objectives: None,
        }
    }
}

// ==========================================
// TrainingUpdate - 培训部分更新入参
// ==========================================
// None 字段保持原值
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<TrainingCategory>,
    pub level: Option<TrainingLevel>,
    pub location: Option<String>,
    pub max_participants: Option<i32>,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    pub duration_hours: Option<f64>,
    pub credits_required: Option<i32>,
    pub cost: Option<f64>,
    pub instructor: Option<String>,
    pub prerequisites: Option<String>,
    pub learning_objectives: Option<String>,
}

impl TrainingUpdate {
    /// 将更新应用到培训记录上
    pub fn apply_to(&self, training: &mut Training) {
        if let Some(v) = &self.title {
            training.title = v.clone();
        }
        if let Some(v) = &self.description {
            training.description = Some(v.clone());
        }
        if let Some(v) = self.category {
            training.category = v;
        }
        if let Some(v) = self.level {
            training.level = v;
        }
        if let Some(v) = &self.location {
            training.location = v.clone();
        }
        if let Some(v) = self.max_participants {
            training.max_participants = v;
        }
        if let Some(v) = self.start_date {
            training.start_date = v;
        }
        if let Some(v) = self.end_date {
            training.end_date = v;
        }
        if let Some(v) = self.duration_hours {
            training.duration_hours = v;
        }
        if let Some(v) = self.credits_required {
            training.credits_required = v;
        }
        if let Some(v) = self.cost {
            training.cost = v;
        }
        if let Some(v) = &self.instructor {
            training.instructor = Some(v.clone());
        }
        if let Some(v) = &self.prerequisites {
            training.prerequisites = Some(v.clone());
        }
        if let Some(v) = &self.learning_objectives {
            training.learning_objectives = Some(v.clone());
        }
    }
}
