// ==========================================
// 企业培训管理系统 - 排期数据源 Trait
// ==========================================
// 职责: 为冲突检测提供只读快照（候选培训、已确认行程、容量）
// 红线: 不含业务规则,只做数据读取
// ==========================================

use crate::domain::registration::{CapacityInfo, ConfirmedCommitment};
use crate::domain::training::TrainingRef;
use crate::repository::error::RepositoryResult;
use crate::repository::{RegistrationRepository, TrainingRepository};
use std::sync::Arc;

// ==========================================
// ScheduleStore Trait
// ==========================================
// 用途: ConflictApi 的唯一数据来源
// 实现者: SqliteScheduleStore（使用 rusqlite）
pub trait ScheduleStore: Send + Sync {
    /// 查询候选培训快照
    ///
    /// # 返回
    /// - Ok(None): 培训不存在
    fn get_training(&self, training_id: &str) -> RepositoryResult<Option<TrainingRef>>;

    /// 查询用户已确认行程（按开始时间升序,保证同日列表稳定）
    fn get_confirmed_commitments(&self, user_id: &str)
        -> RepositoryResult<Vec<ConfirmedCommitment>>;

    /// 查询培训容量
    ///
    /// # 返回
    /// - Ok(None): 培训不存在
    fn get_capacity(&self, training_id: &str) -> RepositoryResult<Option<CapacityInfo>>;
}

// ==========================================
// SqliteScheduleStore - 基于仓储的实现
// ==========================================
#[derive(Clone)]
pub struct SqliteScheduleStore {
    training_repo: Arc<TrainingRepository>,
    registration_repo: Arc<RegistrationRepository>,
}

impl SqliteScheduleStore {
    pub fn new(
        training_repo: Arc<TrainingRepository>,
        registration_repo: Arc<RegistrationRepository>,
    ) -> Self {
        Self {
            training_repo,
            registration_repo,
        }
    }
}

impl ScheduleStore for SqliteScheduleStore {
    fn get_training(&self, training_id: &str) -> RepositoryResult<Option<TrainingRef>> {
        self.training_repo.find_ref_by_id(training_id)
    }

    fn get_confirmed_commitments(
        &self,
        user_id: &str,
    ) -> RepositoryResult<Vec<ConfirmedCommitment>> {
        self.registration_repo.find_confirmed_commitments(user_id)
    }

    fn get_capacity(&self, training_id: &str) -> RepositoryResult<Option<CapacityInfo>> {
        self.registration_repo.find_capacity(training_id)
    }
}
