// ==========================================
// 企业培训管理系统 - 报名 API
// ==========================================
// 职责: 报名工作流（前置校验 + 冲突检测 + 写入）、确认、取消、查询
// 流程: 前置校验与冲突检测相互独立,仅在响应层合并
// ==========================================

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::access::AccessGuard;
use crate::api::conflict_api::ConflictApi;
use crate::api::error::{ApiError, ApiResult};
use crate::domain::registration::Registration;
use crate::domain::types::{ConflictKind, RegistrationStatus};
use crate::engine::conflict::ConflictFinding;
use crate::engine::lifecycle::{is_open_for_registration, transition_registration};
use crate::i18n::t_locale;
use crate::repository::{RegistrationRepository, TrainingRepository};

// ==========================================
// RegistrationOutcome - 报名结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationOutcome {
    Registered,       // 已提交,待确认
    ConflictDetected, // 存在排期冲突,未写入
}

/// 报名响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationResponse {
    pub status: RegistrationOutcome,
    pub message: String,
    pub registration: Option<Registration>,
    pub conflicts: Vec<ConflictFinding>,
}

// ==========================================
// RegistrationApi - 报名 API
// ==========================================
pub struct RegistrationApi {
    training_repo: Arc<TrainingRepository>,
    registration_repo: Arc<RegistrationRepository>,
    conflict_api: Arc<ConflictApi>,
    access: Arc<AccessGuard>,
}

impl RegistrationApi {
    /// 创建新的 RegistrationApi 实例
    pub fn new(
        training_repo: Arc<TrainingRepository>,
        registration_repo: Arc<RegistrationRepository>,
        conflict_api: Arc<ConflictApi>,
        access: Arc<AccessGuard>,
    ) -> Self {
        Self {
            training_repo,
            registration_repo,
            conflict_api,
            access,
        }
    }

    /// 报名培训
    ///
    /// # 参数
    /// - user_id: 报名用户（即操作人）
    /// - training_id: 培训ID
    /// - notes / special_requirements: 报名备注
    ///
    /// # 返回
    /// - Ok(Registered): 已创建待确认报名,报名人数 +1
    /// - Ok(ConflictDetected): 存在排期冲突（含已确认的重复报名）,未创建报名
    /// - Err(TrainingFull): 培训已满员
    /// - Err(NotFound / BusinessRuleViolation): 培训不存在、未发布或已有待确认报名
    pub fn register_for_training(
        &self,
        user_id: &str,
        training_id: &str,
        notes: Option<String>,
        special_requirements: Option<String>,
    ) -> ApiResult<RegistrationResponse> {
        let _perf = crate::perf::PerfGuard::new("api.register_for_training");
        self.access.active_user(user_id)?;

        let training = self
            .training_repo
            .find_by_id(training_id)?
            .ok_or_else(|| ApiError::NotFound(format!("培训(id={})不存在", training_id)))?;
        if !is_open_for_registration(training.status) {
            return Err(ApiError::BusinessRuleViolation(format!(
                "培训未开放报名: status={}",
                training.status
            )));
        }

        // 1. 前置校验
        let issues = self
            .conflict_api
            .validate_prerequisites(user_id, training_id)?;
        if let Some(issue) = issues.iter().find(|f| f.is_error()) {
            return Err(match issue.kind() {
                ConflictKind::TrainingFull => ApiError::TrainingFull {
                    training_id: training_id.to_string(),
                },
                _ => ApiError::NotFound(issue.message.clone()),
            });
        }

        // 2. 冲突检测
        let locale = self.conflict_api.detector().config().locale.clone();
        let report = self.conflict_api.check_conflicts(user_id, training_id)?;
        if report.has_conflicts {
            warn!(
                user_id = %user_id,
                training_id = %training_id,
                conflicts = report.len(),
                "报名存在排期冲突,未写入"
            );
            return Ok(RegistrationResponse {
                status: RegistrationOutcome::ConflictDetected,
                message: t_locale("registration.conflict_detected", &locale),
                registration: None,
                conflicts: report.findings,
            });
        }

        // 3. 待确认/候补中的重复报名（已确认的重复报名由冲突检测给出）
        if let Some(existing) = self.registration_repo.find_active(user_id, training_id)? {
            return Err(ApiError::BusinessRuleViolation(format!(
                "已有该培训的有效报名: registration_id={}, status={}",
                existing.registration_id, existing.status
            )));
        }

        // 4. 写入
        let registration =
            Registration::new_pending(user_id, training_id, notes, special_requirements);
        self.registration_repo.insert_with_increment(&registration)?;

        info!(
            registration_id = %registration.registration_id,
            user_id = %user_id,
            training_id = %training_id,
            "报名已提交"
        );
        Ok(RegistrationResponse {
            status: RegistrationOutcome::Registered,
            message: t_locale("registration.registered", &locale),
            registration: Some(registration),
            conflicts: Vec::new(),
        })
    }

    /// 确认报名（管理员）
    pub fn confirm_registration(
        &self,
        operator_id: &str,
        registration_id: &str,
    ) -> ApiResult<Registration> {
        self.access.require_admin(operator_id, "确认报名")?;
        let registration = self.load(registration_id)?;

        transition_registration(registration.status, RegistrationStatus::Confirmed)?;
        self.registration_repo
            .confirm(registration_id, registration.status)?;

        info!(
            registration_id = %registration_id,
            operator_id = %operator_id,
            "报名已确认"
        );
        self.load(registration_id)
    }

    /// 取消报名（本人或管理员）
    pub fn cancel_registration(
        &self,
        operator_id: &str,
        registration_id: &str,
        reason: Option<String>,
    ) -> ApiResult<Registration> {
        let registration = self.load(registration_id)?;
        self.access
            .require_owner_or_admin(operator_id, &registration.user_id, "取消报名")?;

        transition_registration(registration.status, RegistrationStatus::Cancelled)?;
        self.registration_repo.cancel_with_decrement(
            registration_id,
            registration.status,
            reason.as_deref(),
        )?;

        info!(
            registration_id = %registration_id,
            operator_id = %operator_id,
            "报名已取消"
        );
        self.load(registration_id)
    }

    /// 查询报名（本人或管理员）
    pub fn get_registration(
        &self,
        operator_id: &str,
        registration_id: &str,
    ) -> ApiResult<Registration> {
        let registration = self.load(registration_id)?;
        self.access
            .require_owner_or_admin(operator_id, &registration.user_id, "查看报名")?;
        Ok(registration)
    }

    /// 列出用户全部报名（本人或管理员）
    pub fn list_user_registrations(
        &self,
        operator_id: &str,
        user_id: &str,
    ) -> ApiResult<Vec<Registration>> {
        self.access
            .require_owner_or_admin(operator_id, user_id, "查看报名")?;
        Ok(self.registration_repo.list_by_user(user_id)?)
    }

    fn load(&self, registration_id: &str) -> ApiResult<Registration> {
        self.registration_repo
            .find_by_id(registration_id)?
            .ok_or_else(|| ApiError::NotFound(format!("报名(id={})不存在", registration_id)))
    }
}
