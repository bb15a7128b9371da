// ==========================================
// 企业培训管理系统 - 冲突检测 API
// ==========================================
// 职责: 冲突报告组装（取数 → 规则引擎 → 原样返回）、报名前置校验
// 约束: 每次调用只取一次候选培训、一次已确认行程,规则内部不再取数
// ==========================================

use std::sync::Arc;
use tracing::{debug, info};

use crate::api::error::{ApiError, ApiResult};
use crate::engine::conflict::{ConflictDetector, ConflictFinding, ConflictReport};
use crate::repository::schedule_store::ScheduleStore;

// ==========================================
// ConflictApi - 冲突检测 API
// ==========================================
pub struct ConflictApi {
    store: Arc<dyn ScheduleStore>,
    detector: ConflictDetector,
}

impl ConflictApi {
    /// 创建新的 ConflictApi 实例
    ///
    /// # 参数
    /// - store: 排期数据源
    /// - detector: 冲突检测引擎（已注入规则参数）
    pub fn new(store: Arc<dyn ScheduleStore>, detector: ConflictDetector) -> Self {
        Self { store, detector }
    }

    pub fn detector(&self) -> &ConflictDetector {
        &self.detector
    }

    /// 检测用户报名某培训的排期冲突
    ///
    /// # 参数
    /// - user_id: 用户ID
    /// - training_id: 候选培训ID
    ///
    /// # 返回
    /// - Ok(ConflictReport): 冲突报告（培训不存在时仅含 training_not_found）
    /// - Err(ApiError): 入参为空或数据访问失败
    pub fn check_conflicts(&self, user_id: &str, training_id: &str) -> ApiResult<ConflictReport> {
        validate_ids(user_id, training_id)?;
        let _perf = crate::perf::PerfGuard::new("api.check_conflicts");

        let candidate = self.store.get_training(training_id)?;
        let report = match candidate {
            Some(ref training) => {
                let commitments = self.store.get_confirmed_commitments(user_id)?;
                debug!(
                    user_id = %user_id,
                    training_id = %training_id,
                    commitments = commitments.len(),
                    "已加载已确认行程快照"
                );
                self.detector
                    .detect_conflicts(user_id, Some(training), &commitments)
            }
            None => self.detector.detect_conflicts(user_id, None, &[]),
        };

        Ok(report)
    }

    /// 报名前置校验（培训存在性 + 容量）
    ///
    /// # 返回
    /// - Ok(Vec<ConflictFinding>): 问题列表,空表示可报名
    pub fn validate_prerequisites(
        &self,
        user_id: &str,
        training_id: &str,
    ) -> ApiResult<Vec<ConflictFinding>> {
        validate_ids(user_id, training_id)?;
        let _perf = crate::perf::PerfGuard::new("api.validate_prerequisites");

        let capacity = self.store.get_capacity(training_id)?;
        let issues = self.detector.check_prerequisites(capacity.as_ref());

        info!(
            user_id = %user_id,
            training_id = %training_id,
            issues = issues.len(),
            "报名前置校验完成"
        );
        Ok(issues)
    }
}

fn validate_ids(user_id: &str, training_id: &str) -> ApiResult<()> {
    if user_id.trim().is_empty() {
        return Err(ApiError::InvalidInput("用户ID不能为空".to_string()));
    }
    if training_id.trim().is_empty() {
        return Err(ApiError::InvalidInput("培训ID不能为空".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::registration::{CapacityInfo, ConfirmedCommitment};
    use crate::domain::training::TrainingRef;
    use crate::domain::types::ConflictKind;
    use crate::repository::error::RepositoryResult;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 内存数据源,记录取数次数
    #[derive(Default)]
    struct CountingStore {
        trainings: HashMap<String, TrainingRef>,
        commitments: HashMap<String, Vec<ConfirmedCommitment>>,
        capacities: HashMap<String, CapacityInfo>,
        training_fetches: AtomicUsize,
        commitment_fetches: AtomicUsize,
    }

    impl ScheduleStore for CountingStore {
        fn get_training(&self, training_id: &str) -> RepositoryResult<Option<TrainingRef>> {
            self.training_fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.trainings.get(training_id).cloned())
        }

        fn get_confirmed_commitments(
            &self,
            user_id: &str,
        ) -> RepositoryResult<Vec<ConfirmedCommitment>> {
            self.commitment_fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.commitments.get(user_id).cloned().unwrap_or_default())
        }

        fn get_capacity(&self, training_id: &str) -> RepositoryResult<Option<CapacityInfo>> {
            Ok(self.capacities.get(training_id).cloned())
        }
    }

    fn training(id: &str, location: &str, start_hour: u32, end_hour: u32) -> TrainingRef {
        let day = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        TrainingRef::new(
            id,
            id,
            location,
            day.and_hms_opt(start_hour, 0, 0).unwrap(),
            day.and_hms_opt(end_hour, 0, 0).unwrap(),
        )
    }

    fn build_store() -> Arc<CountingStore> {
        let mut store = CountingStore::default();
        store
            .trainings
            .insert("T1".to_string(), training("T1", "NYC", 9, 12));
        store.commitments.insert(
            "U1".to_string(),
            vec![
                ConfirmedCommitment::new(training("T2", "Boston", 13, 15)),
                ConfirmedCommitment::new(training("T3", "NYC", 16, 17)),
                ConfirmedCommitment::new(training("T4", "NYC", 18, 19)),
            ],
        );
        store
            .capacities
            .insert("T1".to_string(), CapacityInfo::from_counts(1, 1, 1, 1));
        Arc::new(store)
    }

    #[test]
    fn test_check_conflicts_fetches_once() {
        let store = build_store();
        let api = ConflictApi::new(store.clone(), ConflictDetector::default());

        let report = api.check_conflicts("U1", "T1").unwrap();

        assert_eq!(store.training_fetches.load(Ordering::SeqCst), 1);
        assert_eq!(store.commitment_fetches.load(Ordering::SeqCst), 1);
        let kinds: Vec<ConflictKind> = report.findings.iter().map(|f| f.kind()).collect();
        assert_eq!(
            kinds,
            vec![ConflictKind::TravelTimeConflict, ConflictKind::SameDayMultiple]
        );
    }

    #[test]
    fn test_missing_training_skips_commitment_fetch() {
        let store = build_store();
        let api = ConflictApi::new(store.clone(), ConflictDetector::default());

        let report = api.check_conflicts("U1", "NOPE").unwrap();

        assert_eq!(report.len(), 1);
        assert_eq!(report.findings[0].kind(), ConflictKind::TrainingNotFound);
        assert_eq!(store.commitment_fetches.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_validate_prerequisites_independent() {
        let store = build_store();
        let api = ConflictApi::new(store, ConflictDetector::default());

        let issues = api.validate_prerequisites("U1", "T1").unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind(), ConflictKind::TrainingFull);

        let first = api.check_conflicts("U1", "T1").unwrap();
        let second = api.check_conflicts("U1", "T1").unwrap();
        assert_eq!(first, second);
        assert!(first.of_kind(ConflictKind::TrainingFull).is_empty());

        let missing = api.validate_prerequisites("U1", "NOPE").unwrap();
        assert_eq!(missing[0].kind(), ConflictKind::TrainingNotFound);
    }

    #[test]
    fn test_blank_ids_rejected() {
        let api = ConflictApi::new(build_store(), ConflictDetector::default());
        assert!(matches!(
            api.check_conflicts(" ", "T1"),
            Err(ApiError::InvalidInput(_))
        ));
        assert!(matches!(
            api.validate_prerequisites("U1", ""),
            Err(ApiError::InvalidInput(_))
        ));
    }
}
