// ==========================================
// 企业培训管理系统 - 状态流转规则
// ==========================================
// 培训: draft → published → completed / cancelled;draft → cancelled
// 报名: pending → confirmed / cancelled;confirmed → cancelled;
//       waitlisted → confirmed / cancelled
// ==========================================
// 红线: cancelled / completed 为终态
// ==========================================

use crate::domain::types::{RegistrationStatus, TrainingStatus};
use thiserror::Error;

/// 状态流转错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("培训已发布")]
    AlreadyPublished,

    #[error("无效的状态转换: from={from} to={to}")]
    InvalidTransition { from: String, to: String },
}

impl LifecycleError {
    fn invalid(from: impl ToString, to: impl ToString) -> Self {
        LifecycleError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

/// 校验培训状态流转
///
/// # 返回
/// - `Ok(to)`: 允许流转
/// - `Err(AlreadyPublished)`: 重复发布
/// - `Err(InvalidTransition)`: 其它非法流转
pub fn transition_training(
    from: TrainingStatus,
    to: TrainingStatus,
) -> Result<TrainingStatus, LifecycleError> {
    use TrainingStatus::*;

    match (from, to) {
        (Published, Published) => Err(LifecycleError::AlreadyPublished),
        (Draft, Published) | (Draft, Cancelled) | (Published, Completed) | (Published, Cancelled) => {
            Ok(to)
        }
        _ => Err(LifecycleError::invalid(from, to)),
    }
}

/// 校验报名状态流转
pub fn transition_registration(
    from: RegistrationStatus,
    to: RegistrationStatus,
) -> Result<RegistrationStatus, LifecycleError> {
    use RegistrationStatus::*;

    match (from, to) {
        (Pending, Confirmed)
        | (Pending, Cancelled)
        | (Confirmed, Cancelled)
        | (Waitlisted, Confirmed)
        | (Waitlisted, Cancelled) => Ok(to),
        _ => Err(LifecycleError::invalid(from, to)),
    }
}

/// 培训是否开放报名
pub fn is_open_for_registration(status: TrainingStatus) -> bool {
    status == TrainingStatus::Published
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_training_transitions() {
        assert_eq!(
            transition_training(TrainingStatus::Draft, TrainingStatus::Published),
            Ok(TrainingStatus::Published)
        );
        assert!(transition_training(TrainingStatus::Draft, TrainingStatus::Cancelled).is_ok());
        assert!(transition_training(TrainingStatus::Published, TrainingStatus::Completed).is_ok());
        assert!(transition_training(TrainingStatus::Published, TrainingStatus::Cancelled).is_ok());
    }

    #[test]
    fn test_publish_twice_rejected() {
        assert_eq!(
            transition_training(TrainingStatus::Published, TrainingStatus::Published),
            Err(LifecycleError::AlreadyPublished)
        );
    }

    #[test]
    fn test_terminal_training_states() {
        let err = transition_training(TrainingStatus::Cancelled, TrainingStatus::Published)
            .unwrap_err();
        assert_eq!(
            err,
            LifecycleError::InvalidTransition {
                from: "cancelled".to_string(),
                to: "published".to_string(),
            }
        );
        assert!(transition_training(TrainingStatus::Completed, TrainingStatus::Cancelled).is_err());
        assert!(transition_training(TrainingStatus::Draft, TrainingStatus::Completed).is_err());
    }

    #[test]
    fn test_registration_transitions() {
        use RegistrationStatus::*;

        assert!(transition_registration(Pending, Confirmed).is_ok());
        assert!(transition_registration(Pending, Cancelled).is_ok());
        assert!(transition_registration(Confirmed, Cancelled).is_ok());
        assert!(transition_registration(Waitlisted, Confirmed).is_ok());

        assert!(transition_registration(Cancelled, Confirmed).is_err());
        assert!(transition_registration(Confirmed, Pending).is_err());
        assert!(transition_registration(Cancelled, Cancelled).is_err());
    }

    #[test]
    fn test_open_for_registration() {
        assert!(is_open_for_registration(TrainingStatus::Published));
        assert!(!is_open_for_registration(TrainingStatus::Draft));
        assert!(!is_open_for_registration(TrainingStatus::Completed));
    }
}
