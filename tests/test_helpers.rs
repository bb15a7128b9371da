// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use std::error::Error;
use tempfile::NamedTempFile;

use training_mgmt::app::AppState;
use training_mgmt::domain::types::{TrainingCategory, UserRole};
use training_mgmt::domain::{NewTraining, NewUser, Training, User};

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    training_mgmt::logging::init_test();

    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时文件路径不是合法 UTF-8")?
        .to_string();

    let conn = training_mgmt::db::open_sqlite_connection(&db_path)?;
    training_mgmt::db::ensure_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 创建临时数据库并初始化 AppState
pub async fn create_test_state() -> (NamedTempFile, AppState) {
    let (temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let state = AppState::new(db_path)
        .await
        .expect("Failed to create AppState");
    (temp_file, state)
}

/// 2024-03 月内的时间点
pub fn dt(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, day)
        .expect("valid date")
        .and_hms_opt(hour, minute, 0)
        .expect("valid time")
}

/// 创建管理员
pub fn seed_admin(state: &AppState) -> User {
    let mut new_user = NewUser::employee("admin", "admin@corp.example", "系统管理员");
    new_user.role = UserRole::Admin;
    state
        .user_api
        .create_user(new_user)
        .expect("Failed to create admin")
}

/// 创建普通员工
pub fn seed_employee(state: &AppState, username: &str) -> User {
    let new_user = NewUser::employee(
        username,
        format!("{}@corp.example", username),
        format!("员工 {}", username),
    );
    state
        .user_api
        .create_user(new_user)
        .expect("Failed to create employee")
}

/// 创建并发布培训
pub fn seed_published_training(
    state: &AppState,
    admin: &User,
    title: &str,
    location: &str,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Training {
    seed_published_training_with_capacity(state, admin, title, location, start, end, 30)
}

/// 创建并发布指定容量的培训
pub fn seed_published_training_with_capacity(
    state: &AppState,
    admin: &User,
    title: &str,
    location: &str,
    start: NaiveDateTime,
    end: NaiveDateTime,
    max_participants: i32,
) -> Training {
    let mut new_training = NewTraining::new(title, TrainingCategory::Technical, location, start, end);
    new_training.max_participants = max_participants;

    let training = state
        .training_api
        .create_training(&admin.user_id, new_training)
        .expect("Failed to create training");
    state
        .training_api
        .publish_training(&admin.user_id, &training.training_id)
        .expect("Failed to publish training")
}

/// 报名并由管理员确认,返回报名ID
pub fn register_and_confirm(
    state: &AppState,
    admin: &User,
    user: &User,
    training: &Training,
) -> String {
    let response = state
        .registration_api
        .register_for_training(&user.user_id, &training.training_id, None, None)
        .expect("Failed to register");
    let registration = response.registration.expect("Registration should be created");
    state
        .registration_api
        .confirm_registration(&admin.user_id, &registration.registration_id)
        .expect("Failed to confirm registration");
    registration.registration_id
}
