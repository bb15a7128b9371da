// ==========================================
// 企业培训管理系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use crate::api::{AccessGuard, ConflictApi, RegistrationApi, TrainingApi, UserApi};
use crate::config::{ConfigManager, ConflictConfigReader};
use crate::engine::conflict::{ConflictDetector, ConflictRuleConfig};
use crate::repository::{
    RegistrationRepository, SqliteScheduleStore, TrainingRepository, UserRepository,
};

/// 数据库路径环境变量
pub const ENV_DB_PATH: &str = "TRAINING_MGMT_DB_PATH";

/// 应用状态
///
/// 包含所有API实例和共享资源,所有仓储共用一个连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 生效的冲突规则参数
    pub rule_config: ConflictRuleConfig,

    /// 冲突检测API
    pub conflict_api: Arc<ConflictApi>,

    /// 培训API
    pub training_api: Arc<TrainingApi>,

    /// 报名API
    pub registration_api: Arc<RegistrationApi>,

    /// 用户API
    pub user_api: Arc<UserApi>,

    /// 配置管理器（用于调整规则参数）
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 说明
    /// 1. 打开共享连接并确保表结构
    /// 2. 从 config_kv 加载冲突规则参数
    /// 3. 创建所有API实例
    pub async fn new(db_path: String) -> Result<Self, String> {
        tracing::info!(db_path = %db_path, "初始化AppState");

        let mut conn = crate::db::open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        crate::db::ensure_schema(&conn).map_err(|e| format!("无法初始化表结构: {}", e))?;
        crate::perf::install_sqlite_tracing(&mut conn);
        let conn = Arc::new(Mutex::new(conn));

        Self::from_connection(db_path, conn).await
    }

    /// 从已有连接创建（连接需已完成建表）
    pub async fn from_connection(
        db_path: String,
        conn: Arc<Mutex<Connection>>,
    ) -> Result<Self, String> {
        // ==========================================
        // 初始化Repository层
        // ==========================================
        let user_repo = Arc::new(UserRepository::from_connection(conn.clone()));
        let training_repo = Arc::new(TrainingRepository::from_connection(conn.clone()));
        let registration_repo = Arc::new(RegistrationRepository::from_connection(conn.clone()));

        // ==========================================
        // 加载规则参数
        // ==========================================
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let rule_config = config_manager
            .load_rule_config()
            .await
            .map_err(|e| format!("无法加载冲突规则配置: {}", e))?;
        tracing::info!(
            overlap_buffer_minutes = rule_config.overlap_buffer_minutes,
            travel_buffer_hours = rule_config.travel_buffer_hours,
            same_day_threshold = rule_config.same_day_threshold,
            travel_routes = rule_config.travel_times.len(),
            locale = %rule_config.locale,
            "冲突规则参数已加载"
        );

        // ==========================================
        // 创建API实例
        // ==========================================
        let access = Arc::new(AccessGuard::new(user_repo.clone()));
        let store = Arc::new(SqliteScheduleStore::new(
            training_repo.clone(),
            registration_repo.clone(),
        ));
        let conflict_api = Arc::new(ConflictApi::new(
            store,
            ConflictDetector::new(rule_config.clone()),
        ));
        let training_api = Arc::new(TrainingApi::new(
            training_repo.clone(),
            registration_repo.clone(),
            access.clone(),
        ));
        let registration_api = Arc::new(RegistrationApi::new(
            training_repo,
            registration_repo,
            conflict_api.clone(),
            access.clone(),
        ));
        let user_api = Arc::new(UserApi::new(user_repo, access));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            rule_config,
            conflict_api,
            training_api,
            registration_api,
            user_api,
            config_manager,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 TRAINING_MGMT_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(ENV_DB_PATH) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./training_mgmt.db");

    if let Some(data_dir) = dirs::data_dir() {
        #[cfg(debug_assertions)]
        let dir = data_dir.join("training-mgmt-dev");

        #[cfg(not(debug_assertions))]
        let dir = data_dir.join("training-mgmt");

        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("training_mgmt.db");
        }
    }

    path.to_string_lossy().to_string()
}
