// ==========================================
// 企业培训管理系统 - 用户领域模型
// ==========================================
// 注: 认证与密码散列不在本系统范围内
// ==========================================

use crate::domain::types::UserRole;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// User - 用户
// ==========================================
// 对齐: users 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
    pub is_active: bool,
    pub office_location: Option<String>,
    pub department: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// 是否为可执行管理操作的管理员
    pub fn is_admin(&self) -> bool {
        self.is_active && self.role == UserRole::Admin
    }
}

// ==========================================
// NewUser - 创建用户入参
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
    pub office_location: Option<String>,
    pub department: Option<String>,
}

impl NewUser {
    pub fn employee(
        username: impl Into<String>,
        email: impl Into<String>,
        full_name: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            full_name: full_name.into(),
            role: UserRole::Employee,
            office_location: None,
            department: None,
        }
    }
}
