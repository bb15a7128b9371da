// ==========================================
// 企业培训管理系统 - 用户 API
// ==========================================
// 职责: 用户注册、查询、停用
// 注: 密码与登录令牌不在本系统范围内
// ==========================================

use std::sync::Arc;
use tracing::info;

use crate::api::access::AccessGuard;
use crate::api::error::{ApiError, ApiResult};
use crate::domain::user::{NewUser, User};
use crate::repository::UserRepository;

pub struct UserApi {
    user_repo: Arc<UserRepository>,
    access: Arc<AccessGuard>,
}

impl UserApi {
    pub fn new(user_repo: Arc<UserRepository>, access: Arc<AccessGuard>) -> Self {
        Self { user_repo, access }
    }

    /// 创建用户
    ///
    /// # 返回
    /// - Err(InvalidInput): 用户名/姓名为空或邮箱格式不合法
    /// - Err(BusinessRuleViolation): 用户名或邮箱已被占用
    pub fn create_user(&self, new_user: NewUser) -> ApiResult<User> {
        if new_user.username.trim().is_empty() {
            return Err(ApiError::InvalidInput("用户名不能为空".to_string()));
        }
        if new_user.full_name.trim().is_empty() {
            return Err(ApiError::InvalidInput("姓名不能为空".to_string()));
        }
        if !is_plausible_email(&new_user.email) {
            return Err(ApiError::InvalidInput(format!(
                "邮箱格式不合法: {}",
                new_user.email
            )));
        }

        if self
            .user_repo
            .exists_username_or_email(&new_user.username, &new_user.email)?
        {
            return Err(ApiError::BusinessRuleViolation(
                "用户名或邮箱已被注册".to_string(),
            ));
        }

        let user = self.user_repo.create(&new_user)?;
        info!(user_id = %user.user_id, username = %user.username, role = %user.role, "用户已创建");
        Ok(user)
    }

    /// 查询用户
    pub fn get_user(&self, user_id: &str) -> ApiResult<User> {
        self.user_repo
            .find_by_id(user_id)?
            .ok_or_else(|| ApiError::NotFound(format!("用户(id={})不存在", user_id)))
    }

    /// 停用用户（管理员）
    pub fn deactivate_user(&self, operator_id: &str, user_id: &str) -> ApiResult<User> {
        self.access.require_admin(operator_id, "停用用户")?;
        if operator_id == user_id {
            return Err(ApiError::BusinessRuleViolation(
                "不可停用自己的账号".to_string(),
            ));
        }
        self.user_repo.deactivate(user_id)?;
        info!(user_id = %user_id, operator_id = %operator_id, "用户已停用");
        self.get_user(user_id)
    }
}

/// 邮箱基本格式校验: local@domain.tld
fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}
