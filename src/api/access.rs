// ==========================================
// 企业培训管理系统 - 操作人权限校验
// ==========================================
// 规则: 管理操作要求操作人存在、启用且角色为 admin
//       报名相关读写要求操作人为报名本人或管理员
// 注: 身份认证不在本系统范围内,调用方传入的 operator_id 视为已认证
// ==========================================

use std::sync::Arc;
use tracing::warn;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::user::User;
use crate::repository::UserRepository;

pub struct AccessGuard {
    user_repo: Arc<UserRepository>,
}

impl AccessGuard {
    pub fn new(user_repo: Arc<UserRepository>) -> Self {
        Self { user_repo }
    }

    /// 查询启用状态的操作人
    pub fn active_user(&self, user_id: &str) -> ApiResult<User> {
        let user = self
            .user_repo
            .find_by_id(user_id)?
            .ok_or_else(|| ApiError::NotFound(format!("用户(id={})不存在", user_id)))?;
        if !user.is_active {
            return Err(ApiError::PermissionDenied(format!(
                "用户(id={})已停用",
                user_id
            )));
        }
        Ok(user)
    }

    /// 要求操作人为管理员
    pub fn require_admin(&self, operator_id: &str, action: &str) -> ApiResult<User> {
        let user = self.active_user(operator_id)?;
        if !user.is_admin() {
            warn!(operator_id = %operator_id, action = %action, "非管理员尝试管理操作");
            return Err(ApiError::PermissionDenied(format!(
                "{}需要管理员权限",
                action
            )));
        }
        Ok(user)
    }

    /// 要求操作人为资源所有者或管理员
    pub fn require_owner_or_admin(
        &self,
        operator_id: &str,
        owner_id: &str,
        action: &str,
    ) -> ApiResult<User> {
        let user = self.active_user(operator_id)?;
        if user.user_id != owner_id && !user.is_admin() {
            warn!(operator_id = %operator_id, owner_id = %owner_id, action = %action, "越权操作");
            return Err(ApiError::PermissionDenied(format!(
                "{}仅限本人或管理员",
                action
            )));
        }
        Ok(user)
    }
}
