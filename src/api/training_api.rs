// ==========================================
// 企业培训管理系统 - 培训 API
// ==========================================
// 职责: 培训创建/编辑/发布/结束/取消/删除,培训与容量查询
// 权限: 所有写操作仅限管理员;读操作开放
// ==========================================

use std::sync::Arc;
use tracing::info;

use crate::api::access::AccessGuard;
use crate::api::error::{ApiError, ApiResult};
use crate::domain::registration::CapacityInfo;
use crate::domain::training::{NewTraining, Training, TrainingUpdate};
use crate::domain::types::TrainingStatus;
use crate::engine::lifecycle::transition_training;
use crate::repository::{RegistrationRepository, TrainingRepository};

// ==========================================
// TrainingApi - 培训 API
// ==========================================
pub struct TrainingApi {
    training_repo: Arc<TrainingRepository>,
    registration_repo: Arc<RegistrationRepository>,
    access: Arc<AccessGuard>,
}

impl TrainingApi {
    /// 创建新的 TrainingApi 实例
    pub fn new(
        training_repo: Arc<TrainingRepository>,
        registration_repo: Arc<RegistrationRepository>,
        access: Arc<AccessGuard>,
    ) -> Self {
        Self {
            training_repo,
            registration_repo,
            access,
        }
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 查询培训详情
    pub fn get_training(&self, training_id: &str) -> ApiResult<Training> {
        self.load(training_id)
    }

    /// 按状态列出培训（None 为全部）
    pub fn list_trainings(&self, status: Option<TrainingStatus>) -> ApiResult<Vec<Training>> {
        Ok(self.training_repo.list(status)?)
    }

    /// 查询培训容量
    pub fn get_capacity(&self, training_id: &str) -> ApiResult<CapacityInfo> {
        self.registration_repo
            .find_capacity(training_id)?
            .ok_or_else(|| training_not_found(training_id))
    }

    // ==========================================
    // 写操作
    // ==========================================

    /// 创建培训（草稿状态）
    ///
    /// # 参数
    /// - operator_id: 操作人（管理员）
    /// - new_training: 培训入参
    pub fn create_training(
        &self,
        operator_id: &str,
        new_training: NewTraining,
    ) -> ApiResult<Training> {
        let operator = self.access.require_admin(operator_id, "创建培训")?;

        if new_training.title.trim().is_empty() {
            return Err(ApiError::InvalidInput("培训标题不能为空".to_string()));
        }
        if new_training.location.trim().is_empty() {
            return Err(ApiError::InvalidInput("培训地点不能为空".to_string()));
        }
        validate_schedule(&new_training.start_date, &new_training.end_date)?;
        validate_max_participants(new_training.max_participants)?;

        let training = self.training_repo.create(&new_training, &operator.user_id)?;
        info!(
            training_id = %training.training_id,
            operator_id = %operator_id,
            title = %training.title,
            "培训已创建"
        );
        Ok(training)
    }

    /// 部分更新培训
    pub fn update_training(
        &self,
        operator_id: &str,
        training_id: &str,
        update: TrainingUpdate,
    ) -> ApiResult<Training> {
        self.access.require_admin(operator_id, "编辑培训")?;
        let mut training = self.load(training_id)?;

        if matches!(
            training.status,
            TrainingStatus::Cancelled | TrainingStatus::Completed
        ) {
            return Err(ApiError::BusinessRuleViolation(format!(
                "培训状态为{},不可编辑",
                training.status
            )));
        }

        update.apply_to(&mut training);
        if training.title.trim().is_empty() {
            return Err(ApiError::InvalidInput("培训标题不能为空".to_string()));
        }
        if training.location.trim().is_empty() {
            return Err(ApiError::InvalidInput("培训地点不能为空".to_string()));
        }
        validate_schedule(&training.start_date, &training.end_date)?;
        validate_max_participants(training.max_participants)?;

        self.training_repo.update(&training)?;
        info!(training_id = %training_id, operator_id = %operator_id, "培训已更新");
        Ok(training)
    }

    /// 发布培训（开放报名）
    pub fn publish_training(&self, operator_id: &str, training_id: &str) -> ApiResult<Training> {
        self.change_status(operator_id, training_id, TrainingStatus::Published, "发布培训")
    }

    /// 结束培训
    pub fn complete_training(&self, operator_id: &str, training_id: &str) -> ApiResult<Training> {
        self.change_status(operator_id, training_id, TrainingStatus::Completed, "结束培训")
    }

    /// 取消培训
    pub fn cancel_training(&self, operator_id: &str, training_id: &str) -> ApiResult<Training> {
        self.change_status(operator_id, training_id, TrainingStatus::Cancelled, "取消培训")
    }

    /// 删除培训（存在报名记录时拒绝）
    pub fn delete_training(&self, operator_id: &str, training_id: &str) -> ApiResult<()> {
        self.access.require_admin(operator_id, "删除培训")?;
        self.training_repo.delete(training_id)?;
        info!(training_id = %training_id, operator_id = %operator_id, "培训已删除");
        Ok(())
    }

    // ==========================================
    // 内部方法
    // ==========================================

    fn load(&self, training_id: &str) -> ApiResult<Training> {
        self.training_repo
            .find_by_id(training_id)?
            .ok_or_else(|| training_not_found(training_id))
    }

    fn change_status(
        &self,
        operator_id: &str,
        training_id: &str,
        to: TrainingStatus,
        action: &str,
    ) -> ApiResult<Training> {
        self.access.require_admin(operator_id, action)?;
        let mut training = self.load(training_id)?;

        let from = training.status;
        training.status = transition_training(from, to)?;
        self.training_repo.update_status(training_id, training.status)?;

        info!(
            training_id = %training_id,
            operator_id = %operator_id,
            from = %from,
            to = %to,
            "培训状态已变更"
        );
        Ok(training)
    }
}

fn training_not_found(training_id: &str) -> ApiError {
    ApiError::NotFound(format!("培训(id={})不存在", training_id))
}

fn validate_schedule(
    start: &chrono::NaiveDateTime,
    end: &chrono::NaiveDateTime,
) -> ApiResult<()> {
    if end <= start {
        return Err(ApiError::InvalidInput(format!(
            "结束时间必须晚于开始时间: start={}, end={}",
            start, end
        )));
    }
    Ok(())
}

fn validate_max_participants(max_participants: i32) -> ApiResult<()> {
    if max_participants < 1 {
        return Err(ApiError::InvalidInput(format!(
            "最大人数必须至少为1: {}",
            max_participants
        )));
    }
    Ok(())
}
