// ==========================================
// 企业培训管理系统 - 用户数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::types::UserRole;
use crate::domain::user::{NewUser, User};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_codec::{fmt_utc, parse_utc, parse_utc_opt};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const USER_COLUMNS: &str = r#"
    user_id, username, email, full_name, role, is_active,
    office_location, department, created_at, updated_at
"#;

// ==========================================
// UserRepository - 用户仓储
// ==========================================
pub struct UserRepository {
    conn: Arc<Mutex<Connection>>,
}

impl UserRepository {
    /// 创建新的 UserRepository 实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 创建用户
    ///
    /// # 返回
    /// 新建的用户记录（user_id 为 uuid v4）
    pub fn create(&self, new_user: &NewUser) -> RepositoryResult<User> {
        let user = User {
            user_id: uuid::Uuid::new_v4().to_string(),
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            full_name: new_user.full_name.clone(),
            role: new_user.role,
            is_active: true,
            office_location: new_user.office_location.clone(),
            department: new_user.department.clone(),
            created_at: Utc::now(),
            updated_at: None,
        };

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO users (
                user_id, username, email, full_name, role, is_active,
                office_location, department, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?7, ?8)
            "#,
            params![
                user.user_id,
                user.username,
                user.email,
                user.full_name,
                user.role.to_db_str(),
                user.office_location,
                user.department,
                fmt_utc(&user.created_at),
            ],
        )?;
        Ok(user)
    }

    /// 按ID查询
    pub fn find_by_id(&self, user_id: &str) -> RepositoryResult<Option<User>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM users WHERE user_id = ?1", USER_COLUMNS);
        let user = conn
            .query_row(&sql, params![user_id], map_user_row)
            .optional()?;
        Ok(user)
    }

    /// 按用户名查询
    pub fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM users WHERE username = ?1", USER_COLUMNS);
        let user = conn
            .query_row(&sql, params![username], map_user_row)
            .optional()?;
        Ok(user)
    }

    /// 用户名或邮箱是否已被占用
    pub fn exists_username_or_email(&self, username: &str, email: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE username = ?1 OR email = ?2",
            params![username, email],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// 停用用户
    ///
    /// # 返回
    /// - Ok(()): 已停用
    /// - Err(NotFound): 用户不存在
    pub fn deactivate(&self, user_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE users SET is_active = 0, updated_at = ?2 WHERE user_id = ?1",
            params![user_id, fmt_utc(&Utc::now())],
        )?;
        if rows == 0 {
            return Err(RepositoryError::not_found("User", user_id));
        }
        Ok(())
    }
}

fn map_user_row(row: &Row) -> rusqlite::Result<User> {
    let role: String = row.get(4)?;
    let created_at: String = row.get(8)?;
    Ok(User {
        user_id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        full_name: row.get(3)?,
        role: UserRole::from_str(&role),
        is_active: row.get::<_, i64>(5)? != 0,
        office_location: row.get(6)?,
        department: row.get(7)?,
        created_at: parse_utc(8, &created_at)?,
        updated_at: parse_utc_opt(9, row.get(9)?)?,
    })
}
