// ==========================================
// 企业培训管理系统 - 培训数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑（状态流转校验在 engine::lifecycle）
// ==========================================

use crate::domain::training::{NewTraining, Training, TrainingRef};
use crate::domain::types::{TrainingCategory, TrainingLevel, TrainingStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_codec::{fmt_local, fmt_utc, parse_local, parse_utc, parse_utc_opt};
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const TRAINING_COLUMNS: &str = r#"
    training_id, title, description, category, level, status,
    location, max_participants, current_participants,
    start_date, end_date, duration_hours,
    credits_required, cost,
    instructor, prerequisites, learning_objectives,
    created_by, created_at, updated_at
"#;

// ==========================================
// TrainingRepository - 培训仓储
// ==========================================
pub struct TrainingRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TrainingRepository {
    /// 创建新的 TrainingRepository 实例
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

    /// 创建培训（状态为 draft）
    ///
    /// # 参数
    /// - `new_training`: 培训入参
    /// - `created_by`: 创建人用户ID
    pub fn create(&self, new_training: &NewTraining, created_by: &str) -> RepositoryResult<Training> {
        let training = Training {
            training_id: uuid::Uuid::new_v4().to_string(),
            title: new_training.title.clone(),
            description: new_training.description.clone(),
            category: new_training.category,
            level: new_training.level,
            status: TrainingStatus::Draft,
            location: new_training.location.clone(),
            max_participants: new_training.max_participants,
            current_participants: 0,
            start_date: new_training.start_date,
            end_date: new_training.end_date,
            duration_hours: new_training.duration_hours,
            credits_required: new_training.credits_required,
            cost: new_training.cost,
            instructor: new_training.instructor.clone(),
            prerequisites: new_training.prerequisites.clone(),
            learning_objectives: new_training.learning_objectives.clone(),
            created_by: created_by.to_string(),
            created_at: Utc::now(),
            updated_at: None,
        };

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO trainings (
                training_id, title, description, category, level, status,
                location, max_participants, current_participants,
                start_date, end_date, duration_hours,
                credits_required, cost,
                instructor, prerequisites, learning_objectives,
                created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
            "#,
            params![
                training.training_id,
                training.title,
                training.description,
                training.category.to_db_str(),
                training.level.to_db_str(),
                training.status.to_db_str(),
                training.location,
                training.max_participants,
                fmt_local(&training.start_date),
                fmt_local(&training.end_date),
                training.duration_hours,
                training.credits_required,
                training.cost,
                training.instructor,
                training.prerequisites,
                training.learning_objectives,
                training.created_by,
                fmt_utc(&training.created_at),
            ],
        )?;
        Ok(training)
    }

    /// 按ID查询
    ///
    /// # 返回
    /// - Ok(Some(Training)): 找到培训
    /// - Ok(None): 未找到
    /// - Err: 数据库错误
    pub fn find_by_id(&self, training_id: &str) -> RepositoryResult<Option<Training>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM trainings WHERE training_id = ?1",
            TRAINING_COLUMNS
        );
        let training = conn
            .query_row(&sql, params![training_id], map_training_row)
            .optional()?;
        Ok(training)
    }

    /// 按ID查询冲突计算用快照
    pub fn find_ref_by_id(&self, training_id: &str) -> RepositoryResult<Option<TrainingRef>> {
        let conn = self.get_conn()?;
        let training_ref = conn
            .query_row(
                r#"
                SELECT training_id, title, location, start_date, end_date
                FROM trainings
                WHERE training_id = ?1
                "#,
                params![training_id],
                map_training_ref_row,
            )
            .optional()?;
        Ok(training_ref)
    }

    /// 按状态列出培训（按开始时间升序）
    ///
    /// # 参数
    /// - `status`: None 表示全部
    pub fn list(&self, status: Option<TrainingStatus>) -> RepositoryResult<Vec<Training>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {}
            FROM trainings
            WHERE (?1 IS NULL OR status = ?1)
            ORDER BY start_date ASC, training_id ASC
            "#,
            TRAINING_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let trainings = stmt
            .query_map(params![status.map(|s| s.to_db_str())], map_training_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(trainings)
    }

    /// 保存可编辑字段（不含状态与报名人数）
    pub fn update(&self, training: &Training) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            UPDATE trainings SET
                title = ?2, description = ?3, category = ?4, level = ?5,
                location = ?6, max_participants = ?7,
                start_date = ?8, end_date = ?9, duration_hours = ?10,
                credits_required = ?11, cost = ?12,
                instructor = ?13, prerequisites = ?14, learning_objectives = ?15,
                updated_at = ?16
            WHERE training_id = ?1
            "#,
            params![
                training.training_id,
                training.title,
                training.description,
                training.category.to_db_str(),
                training.level.to_db_str(),
                training.location,
                training.max_participants,
                fmt_local(&training.start_date),
                fmt_local(&training.end_date),
                training.duration_hours,
                training.credits_required,
                training.cost,
                training.instructor,
                training.prerequisites,
                training.learning_objectives,
                fmt_utc(&Utc::now()),
            ],
        )?;
        if rows == 0 {
            return Err(RepositoryError::not_found("Training", &training.training_id));
        }
        Ok(())
    }

    /// 更新培训状态
    pub fn update_status(&self, training_id: &str, status: TrainingStatus) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE trainings SET status = ?2, updated_at = ?3 WHERE training_id = ?1",
            params![training_id, status.to_db_str(), fmt_utc(&Utc::now())],
        )?;
        if rows == 0 {
            return Err(RepositoryError::not_found("Training", training_id));
        }
        Ok(())
    }

    /// 删除培训（存在任何报名记录时拒绝）
    pub fn delete(&self, training_id: &str) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let registrations: i64 = tx.query_row(
            "SELECT COUNT(*) FROM registrations WHERE training_id = ?1",
            params![training_id],
            |row| row.get(0),
        )?;
        if registrations > 0 {
            return Err(RepositoryError::BusinessRuleViolation(format!(
                "培训存在{}条报名记录,不可删除",
                registrations
            )));
        }

        let rows = tx.execute(
            "DELETE FROM trainings WHERE training_id = ?1",
            params![training_id],
        )?;
        if rows == 0 {
            return Err(RepositoryError::not_found("Training", training_id));
        }

        tx.commit()?;
        Ok(())
    }
}

// ==========================================
// 行映射
// ==========================================

fn map_training_row(row: &Row) -> SqliteResult<Training> {
    let category_str: String = row.get(3)?;
    let level_str: String = row.get(4)?;
    let status_str: String = row.get(5)?;
    let start_str: String = row.get(9)?;
    let end_str: String = row.get(10)?;
    let created_at_str: String = row.get(18)?;

    let category = TrainingCategory::from_str(&category_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            Type::Text,
            format!("未知培训类别: {}", category_str).into(),
        )
    })?;

    Ok(Training {
        training_id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        category,
        level: TrainingLevel::from_str(&level_str),
        status: TrainingStatus::from_str(&status_str),
        location: row.get(6)?,
        max_participants: row.get(7)?,
        current_participants: row.get(8)?,
        start_date: parse_local(9, &start_str)?,
        end_date: parse_local(10, &end_str)?,
        duration_hours: row.get(11)?,
        credits_required: row.get(12)?,
        cost: row.get(13)?,
        instructor: row.get(14)?,
        prerequisites: row.get(15)?,
        learning_objectives: row.get(16)?,
        created_by: row.get(17)?,
        created_at: parse_utc(18, &created_at_str)?,
        updated_at: parse_utc_opt(19, row.get(19)?)?,
    })
}

/// 映射 (training_id, title, location, start_date, end_date) 列
pub(crate) fn map_training_ref_row(row: &Row) -> SqliteResult<TrainingRef> {
    let start_str: String = row.get(3)?;
    let end_str: String = row.get(4)?;
    Ok(TrainingRef::new(
        row.get::<_, String>(0)?,
        row.get::<_, String>(1)?,
        row.get::<_, String>(2)?,
        parse_local(3, &start_str)?,
        parse_local(4, &end_str)?,
    ))
}
