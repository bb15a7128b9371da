// ==========================================
// 企业培训管理系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供 CLI / 上层服务调用
// ==========================================

pub mod access;
pub mod conflict_api;
pub mod error;
pub mod registration_api;
pub mod training_api;
pub mod user_api;

// 重导出核心类型
pub use access::AccessGuard;
pub use conflict_api::ConflictApi;
pub use error::{ApiError, ApiResult};
pub use registration_api::{RegistrationApi, RegistrationOutcome, RegistrationResponse};
pub use training_api::TrainingApi;
pub use user_api::UserApi;
