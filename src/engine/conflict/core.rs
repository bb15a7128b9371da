// ==========================================
// 企业培训管理系统 - 排期冲突检测引擎
// ==========================================
// 输入: 用户ID + 候选培训快照 + 已确认行程快照
// 输出: 按检测顺序排列的冲突报告
// ==========================================
// 规则:
// A. 重复报名: 候选培训ID已在已确认行程中（error）,该行程不再参与 B/C
// B. 时间重叠: 候选区间两端各扩 30 分钟后与行程开区间相交（error）
// C. 差旅时间: 同日、异地、且一方严格先于另一方结束时,间隔 < 差旅时间 + 1 小时（warning）
// D. 同日负荷: 同日其它已确认培训 >= 2（warning,仅一条）
// ==========================================
// 红线: 纯计算,无 I/O,不修改任何输入
// 红线: 候选培训不存在时仅返回 training_not_found,其余规则不执行
// ==========================================

use crate::domain::registration::{CapacityInfo, ConfirmedCommitment};
use crate::domain::training::{TimeInterval, TrainingRef};
use tracing::{debug, info};

use super::report::{ConflictFinding, ConflictReport};
use super::rules::ConflictRuleConfig;

// ==========================================
// ConflictDetector - 冲突检测引擎
// ==========================================
// 无共享可变状态: 可按次构造,也可在线程间共享同一实例
#[derive(Debug, Clone, Default)]
pub struct ConflictDetector {
    config: ConflictRuleConfig,
}

impl ConflictDetector {
    /// 创建新的冲突检测引擎
    ///
    /// # 参数
    /// - `config`: 规则参数（缓冲时长、阈值、差旅时间表）
    pub fn new(config: ConflictRuleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConflictRuleConfig {
        &self.config
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 检测候选培训与用户已确认行程之间的冲突
    ///
    /// # 参数
    /// - `user_id`: 用户ID（仅用于日志）
    /// - `candidate`: 候选培训;None 表示培训不存在
    /// - `commitments`: 用户已确认行程快照
    ///
    /// # 返回
    /// 冲突报告（重复/重叠 → 差旅 → 同日负荷）
    pub fn detect_conflicts(
        &self,
        user_id: &str,
        candidate: Option<&TrainingRef>,
        commitments: &[ConfirmedCommitment],
    ) -> ConflictReport {
        let locale = self.config.locale.as_str();

        let candidate = match candidate {
            Some(t) => t,
            None => {
                info!(user_id = %user_id, "候选培训不存在,跳过其余冲突规则");
                return ConflictReport::from_findings(vec![ConflictFinding::training_not_found(
                    locale,
                )]);
            }
        };

        debug!(
            user_id = %user_id,
            training_id = %candidate.id,
            commitments = commitments.len(),
            "开始检测排期冲突"
        );

        let mut findings = Vec::new();

        // 1. 重复报名 + 时间重叠
        for commitment in commitments {
            let existing = &commitment.training;

            if existing.id == candidate.id {
                findings.push(ConflictFinding::duplicate_registration(existing, locale));
                continue;
            }

            if self.overlaps_with_buffer(&candidate.interval, &existing.interval) {
                debug!(
                    training_id = %candidate.id,
                    conflicting_id = %existing.id,
                    "时间重叠"
                );
                findings.push(ConflictFinding::schedule_overlap(existing, locale));
            }
        }

        // 2. 差旅时间
        for commitment in commitments {
            let existing = &commitment.training;
            if existing.id == candidate.id {
                continue;
            }

            if let Some(travel_time_hours) = self.insufficient_travel_time(candidate, existing) {
                debug!(
                    training_id = %candidate.id,
                    conflicting_id = %existing.id,
                    from = %candidate.location,
                    to = %existing.location,
                    travel_time_hours,
                    "差旅时间不足"
                );
                findings.push(ConflictFinding::travel_time_conflict(
                    candidate,
                    existing,
                    travel_time_hours,
                    locale,
                ));
            }
        }

        // 3. 同日负荷
        if let Some(finding) = self.check_same_day_load(candidate, commitments) {
            findings.push(finding);
        }

        let report = ConflictReport::from_findings(findings);
        info!(
            user_id = %user_id,
            training_id = %candidate.id,
            conflicts = report.len(),
            has_errors = report.has_errors(),
            "排期冲突检测完成"
        );
        report
    }

    /// 报名前置校验: 培训存在性 + 容量
    ///
    /// # 参数
    /// - `capacity`: 培训容量信息;None 表示培训不存在
    ///
    /// # 返回
    /// 前置校验问题列表（与冲突检测相互独立）
    pub fn check_prerequisites(&self, capacity: Option<&CapacityInfo>) -> Vec<ConflictFinding> {
        let locale = self.config.locale.as_str();

        let capacity = match capacity {
            Some(c) => c,
            None => return vec![ConflictFinding::prerequisite_training_not_found(locale)],
        };

        let mut issues = Vec::new();
        if capacity.is_full {
            debug!(
                max_participants = capacity.max_participants,
                confirmed = capacity.confirmed_registrations,
                "培训已满员"
            );
            issues.push(ConflictFinding::training_full(locale));
        }
        issues
    }

    // ==========================================
    // 规则判定
    // ==========================================

    /// 规则B: 候选区间两端各扩缓冲后,与已有区间是否相交（端点相接不算）
    pub fn overlaps_with_buffer(&self, candidate: &TimeInterval, existing: &TimeInterval) -> bool {
        // 缓冲或扩展后的端点越界时不判定为重叠
        let Some(buffer) = self.config.overlap_buffer() else {
            return false;
        };
        let (Some(adjusted_start), Some(adjusted_end)) = (
            candidate.start.checked_sub_signed(buffer),
            candidate.end.checked_add_signed(buffer),
        ) else {
            return false;
        };

        adjusted_start < existing.end && adjusted_end > existing.start
    }

    /// 规则C: 差旅时间不足时返回所需差旅小时数
    ///
    /// # 返回
    /// - `Some(hours)`: 同日异地,一方严格先结束,且间隔不足
    /// - `None`: 同地/未配置路线/跨日/区间相交或相接/间隔充足
    pub fn insufficient_travel_time(
        &self,
        candidate: &TrainingRef,
        existing: &TrainingRef,
    ) -> Option<f64> {
        if candidate.location == existing.location {
            return None;
        }

        let travel_time_hours = self
            .config
            .travel_times
            .lookup(&candidate.location, &existing.location);
        if travel_time_hours <= 0.0 {
            return None;
        }

        let a = &candidate.interval;
        let b = &existing.interval;
        if a.start_date() != b.start_date() {
            return None;
        }

        let gap = if a.end < b.start {
            b.start - a.end
        } else if b.end < a.start {
            a.start - b.end
        } else {
            return None;
        };

        match self.config.required_travel_gap(travel_time_hours) {
            Some(required) if gap < required => Some(travel_time_hours),
            _ => None,
        }
    }

    /// 规则D: 同日其它已确认培训数达到阈值时生成一条告警
    ///
    /// 列表按开始时间排序,与是否实际冲突无关
    pub fn check_same_day_load(
        &self,
        candidate: &TrainingRef,
        commitments: &[ConfirmedCommitment],
    ) -> Option<ConflictFinding> {
        let target_date = candidate.interval.start_date();

        let mut same_day: Vec<&TrainingRef> = commitments
            .iter()
            .map(|c| &c.training)
            .filter(|t| t.id != candidate.id && t.interval.start_date() == target_date)
            .collect();

        if same_day.len() < self.config.same_day_threshold {
            return None;
        }

        same_day.sort_by(|x, y| x.start().cmp(&y.start()).then_with(|| x.id.cmp(&y.id)));

        debug!(
            training_id = %candidate.id,
            date = %target_date,
            count = same_day.len(),
            "同日培训过多"
        );

        Some(ConflictFinding::same_day_multiple(
            target_date,
            &same_day,
            self.config.locale.as_str(),
        ))
    }
}
