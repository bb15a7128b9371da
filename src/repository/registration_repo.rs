// ==========================================
// 企业培训管理系统 - 报名数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑（状态流转校验在 engine::lifecycle）
// 约束: 报名人数 current_participants 与报名写入在同一事务内维护
// ==========================================

use crate::domain::registration::{CapacityInfo, ConfirmedCommitment, Registration};
use crate::domain::types::RegistrationStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_codec::{fmt_utc, parse_utc, parse_utc_opt};
use crate::repository::training_repo::map_training_ref_row;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};
use tracing::debug;

const REGISTRATION_COLUMNS: &str = r#"
    registration_id, user_id, training_id, status,
    registration_date, confirmed_date, cancelled_date, cancellation_reason,
    notes, special_requirements, is_active, updated_at
"#;

// ==========================================
// RegistrationRepository - 报名仓储
// ==========================================
pub struct RegistrationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RegistrationRepository {
    /// 创建新的 RegistrationRepository 实例
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

    // ==========================================
    // 写操作
    // ==========================================

    /// 写入新报名并将培训报名人数 +1（同一事务）
    ///
    /// # 返回
    /// - Err(BusinessRuleViolation): 同一用户对同一培训已有有效报名
    /// - Err(NotFound): 培训不存在
    pub fn insert_with_increment(&self, registration: &Registration) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let existing: Option<String> = tx
            .query_row(
                r#"
                SELECT registration_id FROM registrations
                WHERE user_id = ?1 AND training_id = ?2 AND is_active = 1
                LIMIT 1
                "#,
                params![registration.user_id, registration.training_id],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(existing_id) = existing {
            return Err(RepositoryError::BusinessRuleViolation(format!(
                "用户已有该培训的有效报名: registration_id={}",
                existing_id
            )));
        }

        tx.execute(
            r#"
            INSERT INTO registrations (
                registration_id, user_id, training_id, status,
                registration_date, notes, special_requirements, is_active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1)
            "#,
            params![
                registration.registration_id,
                registration.user_id,
                registration.training_id,
                registration.status.to_db_str(),
                fmt_utc(&registration.registration_date),
                registration.notes,
                registration.special_requirements,
            ],
        )?;

        let rows = tx.execute(
            r#"
            UPDATE trainings
            SET current_participants = current_participants + 1
            WHERE training_id = ?1
            "#,
            params![registration.training_id],
        )?;
        if rows == 0 {
            return Err(RepositoryError::not_found(
                "Training",
                &registration.training_id,
            ));
        }

        tx.commit()?;
        debug!(
            registration_id = %registration.registration_id,
            training_id = %registration.training_id,
            "报名已写入,报名人数+1"
        );
        Ok(())
    }

    /// 确认报名
    ///
    /// # 参数
    /// - `expected`: 期望的当前状态（防止并发覆盖）
    pub fn confirm(
        &self,
        registration_id: &str,
        expected: RegistrationStatus,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let now = fmt_utc(&Utc::now());
        let rows = conn.execute(
            r#"
            UPDATE registrations
            SET status = ?2, confirmed_date = ?3, updated_at = ?3
            WHERE registration_id = ?1 AND status = ?4
            "#,
            params![
                registration_id,
                RegistrationStatus::Confirmed.to_db_str(),
                now,
                expected.to_db_str(),
            ],
        )?;
        if rows == 0 {
            return Err(RepositoryError::InvalidStateTransition {
                from: expected.to_string(),
                to: RegistrationStatus::Confirmed.to_string(),
            });
        }
        Ok(())
    }

    /// 取消报名并将培训报名人数 -1（同一事务,人数不低于 0）
    pub fn cancel_with_decrement(
        &self,
        registration_id: &str,
        expected: RegistrationStatus,
        reason: Option<&str>,
    ) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let now = fmt_utc(&Utc::now());

        let training_id: String = tx
            .query_row(
                "SELECT training_id FROM registrations WHERE registration_id = ?1",
                params![registration_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| RepositoryError::not_found("Registration", registration_id))?;

        let rows = tx.execute(
            r#"
            UPDATE registrations
            SET status = ?2, cancelled_date = ?3, cancellation_reason = ?4,
                is_active = 0, updated_at = ?3
            WHERE registration_id = ?1 AND status = ?5
            "#,
            params![
                registration_id,
                RegistrationStatus::Cancelled.to_db_str(),
                now,
                reason,
                expected.to_db_str(),
            ],
        )?;
        if rows == 0 {
            return Err(RepositoryError::InvalidStateTransition {
                from: expected.to_string(),
                to: RegistrationStatus::Cancelled.to_string(),
            });
        }

        tx.execute(
            r#"
            UPDATE trainings
            SET current_participants = MAX(current_participants - 1, 0)
            WHERE training_id = ?1
            "#,
            params![training_id],
        )?;

        tx.commit()?;
        debug!(
            registration_id = %registration_id,
            training_id = %training_id,
            "报名已取消,报名人数-1"
        );
        Ok(())
    }

    // ==========================================
    // 读操作
    // ==========================================

    /// 按ID查询
    pub fn find_by_id(&self, registration_id: &str) -> RepositoryResult<Option<Registration>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM registrations WHERE registration_id = ?1",
            REGISTRATION_COLUMNS
        );
        let registration = conn
            .query_row(&sql, params![registration_id], map_registration_row)
            .optional()?;
        Ok(registration)
    }

    /// 查询用户对某培训的有效报名
    pub fn find_active(
        &self,
        user_id: &str,
        training_id: &str,
    ) -> RepositoryResult<Option<Registration>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {} FROM registrations
            WHERE user_id = ?1 AND training_id = ?2 AND is_active = 1
            "#,
            REGISTRATION_COLUMNS
        );
        let registration = conn
            .query_row(&sql, params![user_id, training_id], map_registration_row)
            .optional()?;
        Ok(registration)
    }

    /// 列出用户全部报名（按报名时间倒序）
    pub fn list_by_user(&self, user_id: &str) -> RepositoryResult<Vec<Registration>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {} FROM registrations
            WHERE user_id = ?1
            ORDER BY registration_date DESC, registration_id ASC
            "#,
            REGISTRATION_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let registrations = stmt
            .query_map(params![user_id], map_registration_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(registrations)
    }

    /// 查询用户已确认行程快照（按开始时间升序）
    pub fn find_confirmed_commitments(
        &self,
        user_id: &str,
    ) -> RepositoryResult<Vec<ConfirmedCommitment>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT t.training_id, t.title, t.location, t.start_date, t.end_date
            FROM registrations r
            JOIN trainings t ON t.training_id = r.training_id
            WHERE r.user_id = ?1 AND r.status = ?2
            ORDER BY t.start_date ASC, t.training_id ASC
            "#,
        )?;
        let commitments = stmt
            .query_map(
                params![user_id, RegistrationStatus::Confirmed.to_db_str()],
                map_training_ref_row,
            )?
            .map(|r| r.map(ConfirmedCommitment::new))
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(commitments)
    }

    /// 查询培训容量信息
    ///
    /// # 返回
    /// - Ok(None): 培训不存在
    pub fn find_capacity(&self, training_id: &str) -> RepositoryResult<Option<CapacityInfo>> {
        let conn = self.get_conn()?;
        let capacity = conn
            .query_row(
                r#"
                SELECT
                    t.max_participants,
                    t.current_participants,
                    (SELECT COUNT(*) FROM registrations r
                     WHERE r.training_id = t.training_id AND r.status = ?2),
                    (SELECT COUNT(*) FROM registrations r
                     WHERE r.training_id = t.training_id AND r.is_active = 1)
                FROM trainings t
                WHERE t.training_id = ?1
                "#,
                params![training_id, RegistrationStatus::Confirmed.to_db_str()],
                |row| {
                    Ok(CapacityInfo::from_counts(
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                    ))
                },
            )
            .optional()?;
        Ok(capacity)
    }
}

fn map_registration_row(row: &Row) -> SqliteResult<Registration> {
    let status_str: String = row.get(3)?;
    let registration_date_str: String = row.get(4)?;
    Ok(Registration {
        registration_id: row.get(0)?,
        user_id: row.get(1)?,
        training_id: row.get(2)?,
        status: RegistrationStatus::from_str(&status_str),
        registration_date: parse_utc(4, &registration_date_str)?,
        confirmed_date: parse_utc_opt(5, row.get(5)?)?,
        cancelled_date: parse_utc_opt(6, row.get(6)?)?,
        cancellation_reason: row.get(7)?,
        notes: row.get(8)?,
        special_requirements: row.get(9)?,
        is_active: row.get::<_, i64>(10)? != 0,
        updated_at: parse_utc_opt(11, row.get(11)?)?,
    })
}
