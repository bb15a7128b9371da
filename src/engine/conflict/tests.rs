use super::*;
use crate::domain::registration::{CapacityInfo, ConfirmedCommitment};
use crate::domain::training::TrainingRef;
use crate::domain::types::{ConflictKind, Severity};
use chrono::{NaiveDate, NaiveDateTime};

// ==========================================
// 测试辅助函数
// ==========================================

fn dt(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

/// 创建测试用培训快照（2024-03-day）
fn training(
    id: &str,
    location: &str,
    day: u32,
    start: (u32, u32),
    end: (u32, u32),
) -> TrainingRef {
    TrainingRef::new(
        id,
        format!("Training {}", id),
        location,
        dt(day, start.0, start.1),
        dt(day, end.0, end.1),
    )
}

fn commitments(trainings: &[TrainingRef]) -> Vec<ConfirmedCommitment> {
    trainings
        .iter()
        .cloned()
        .map(ConfirmedCommitment::new)
        .collect()
}

fn detector() -> ConflictDetector {
    ConflictDetector::default()
}

// ==========================================
// 基本行为
// ==========================================

#[test]
fn test_no_commitments_yields_empty_report() {
    let candidate = training("T1", "NYC", 4, (9, 0), (17, 0));
    let report = detector().detect_conflicts("U1", Some(&candidate), &[]);

    assert!(!report.has_conflicts);
    assert!(report.findings.is_empty());
}

#[test]
fn test_missing_candidate_short_circuits() {
    let existing = commitments(&[
        training("T2", "NYC", 4, (9, 0), (10, 0)),
        training("T3", "NYC", 4, (11, 0), (12, 0)),
    ]);
    let report = detector().detect_conflicts("U1", None, &existing);

    assert!(report.has_conflicts);
    assert_eq!(report.len(), 1);
    assert_eq!(report.findings[0].kind(), ConflictKind::TrainingNotFound);
    assert_eq!(report.findings[0].severity, Severity::Error);
    assert_eq!(report.findings[0].message, "Target training not found");
}

// ==========================================
// 规则A: 重复报名
// ==========================================

#[test]
fn test_duplicate_registration_suppresses_overlap_and_travel() {
    let candidate = training("T1", "NYC", 4, (9, 0), (12, 0));
    let existing = commitments(&[candidate.clone()]);

    let report = detector().detect_conflicts("U1", Some(&candidate), &existing);

    assert_eq!(report.len(), 1);
    let finding = &report.findings[0];
    assert_eq!(finding.kind(), ConflictKind::DuplicateRegistration);
    assert_eq!(finding.message, "Already registered for this training");
    match &finding.detail {
        ConflictDetail::DuplicateRegistration { training } => {
            assert_eq!(training.id, "T1");
            assert_eq!(training.start_date, dt(4, 9, 0));
        }
        other => panic!("unexpected detail: {:?}", other),
    }
    assert!(report.of_kind(ConflictKind::ScheduleOverlap).is_empty());
    assert!(report.of_kind(ConflictKind::TravelTimeConflict).is_empty());
}

// ==========================================
// 规则B: 时间重叠（含缓冲）
// ==========================================

#[test]
fn test_overlap_within_buffer_fires() {
    let candidate = training("T1", "NYC", 4, (10, 0), (11, 0));
    let existing = commitments(&[training("T2", "NYC", 4, (11, 25), (12, 0))]);

    let report = detector().detect_conflicts("U1", Some(&candidate), &existing);

    let overlaps = report.of_kind(ConflictKind::ScheduleOverlap);
    assert_eq!(overlaps.len(), 1);
    assert_eq!(overlaps[0].detail.referenced_training_id(), Some("T2"));
    assert_eq!(overlaps[0].message, "Time conflict with existing training");
    assert!(report.has_errors());
}

#[test]
fn test_gap_beyond_buffer_does_not_overlap() {
    let candidate = training("T1", "NYC", 4, (10, 0), (11, 0));
    let existing = commitments(&[training("T2", "NYC", 4, (11, 31), (12, 0))]);

    let report = detector().detect_conflicts("U1", Some(&candidate), &existing);

    assert!(!report.has_conflicts);
}

#[test]
fn test_buffer_touching_exactly_is_not_overlap() {
    // 缓冲后端点恰好相接: 11:00 + 30min == 11:30
    let candidate = training("T1", "NYC", 4, (10, 0), (11, 0));
    let existing = commitments(&[
        training("T2", "NYC", 4, (11, 30), (12, 0)),
        training("T3", "NYC", 4, (8, 0), (9, 30)),
    ]);

    let report = detector().detect_conflicts("U1", Some(&candidate), &existing);

    assert!(report.of_kind(ConflictKind::ScheduleOverlap).is_empty());
}

#[test]
fn test_overlap_ignores_location() {
    let candidate = training("T1", "NYC", 4, (10, 0), (12, 0));
    let existing = commitments(&[training("T2", "Chicago", 4, (11, 0), (13, 0))]);

    let report = detector().detect_conflicts("U1", Some(&candidate), &existing);

    assert_eq!(report.of_kind(ConflictKind::ScheduleOverlap).len(), 1);
    assert!(report.of_kind(ConflictKind::TravelTimeConflict).is_empty());
}

#[test]
fn test_overlap_across_midnight() {
    let candidate = TrainingRef::new("T1", "Night shift", "NYC", dt(4, 22, 0), dt(5, 2, 0));
    let existing = commitments(&[training("T2", "NYC", 5, (1, 0), (3, 0))]);

    let report = detector().detect_conflicts("U1", Some(&candidate), &existing);

    assert_eq!(report.of_kind(ConflictKind::ScheduleOverlap).len(), 1);
}

// ==========================================
// 规则C: 差旅时间
// ==========================================

#[test]
fn test_travel_time_insufficient_same_day() {
    let candidate = training("T1", "NYC", 4, (9, 0), (12, 0));
    let existing = commitments(&[training("T2", "Boston", 4, (13, 0), (17, 0))]);

    let report = detector().detect_conflicts("U1", Some(&candidate), &existing);

    assert!(report.of_kind(ConflictKind::ScheduleOverlap).is_empty());
    let travel = report.of_kind(ConflictKind::TravelTimeConflict);
    assert_eq!(travel.len(), 1);
    assert_eq!(travel[0].severity, Severity::Warning);
    assert_eq!(
        travel[0].message,
        "Insufficient travel time between NYC and Boston"
    );
    match &travel[0].detail {
        ConflictDetail::TravelTimeConflict {
            travel_time_hours,
            from_location,
            to_location,
            conflicting_training,
        } => {
            assert_eq!(*travel_time_hours, 4.0);
            assert_eq!(from_location, "NYC");
            assert_eq!(to_location, "Boston");
            assert_eq!(conflicting_training.id, "T2");
            assert_eq!(conflicting_training.location, "Boston");
        }
        other => panic!("unexpected detail: {:?}", other),
    }
    assert!(!report.has_errors());
}

#[test]
fn test_travel_time_checked_in_both_directions() {
    // 已有行程在前,候选在后
    let candidate = training("T1", "Dallas", 4, (15, 0), (17, 0));
    let existing = commitments(&[training("T2", "NYC", 4, (8, 0), (10, 0))]);

    let report = detector().detect_conflicts("U1", Some(&candidate), &existing);

    // 间隔 5h < 6h + 1h
    assert_eq!(report.of_kind(ConflictKind::TravelTimeConflict).len(), 1);
}

#[test]
fn test_travel_time_sufficient_gap() {
    let candidate = training("T1", "NYC", 4, (7, 0), (8, 0));
    let existing = commitments(&[training("T2", "Boston", 4, (13, 0), (17, 0))]);

    let report = detector().detect_conflicts("U1", Some(&candidate), &existing);

    // 间隔恰好 5h,不小于所需间隔
    assert!(!report.has_conflicts);
}

#[test]
fn test_travel_time_different_days_not_checked() {
    let candidate = training("T1", "NYC", 4, (21, 0), (23, 0));
    let existing = commitments(&[training("T2", "Boston", 5, (6, 0), (8, 0))]);

    let report = detector().detect_conflicts("U1", Some(&candidate), &existing);

    assert!(report.of_kind(ConflictKind::TravelTimeConflict).is_empty());
}

#[test]
fn test_travel_time_undefined_pair_skipped() {
    let candidate = training("T1", "NYC", 4, (9, 0), (12, 0));
    let existing = commitments(&[training("T2", "Chicago", 4, (13, 0), (17, 0))]);

    let report = detector().detect_conflicts("U1", Some(&candidate), &existing);

    assert!(!report.has_conflicts);
}

#[test]
fn test_travel_time_uses_injected_table() {
    let config = ConflictRuleConfig {
        travel_times: TravelTimeTable::from_routes(vec![TravelRoute::new(
            "Chicago", "NYC", 2.5,
        )]),
        ..ConflictRuleConfig::default()
    };
    let detector = ConflictDetector::new(config);
    let candidate = training("T1", "NYC", 4, (9, 0), (12, 0));
    let existing = commitments(&[training("T2", "Chicago", 4, (14, 0), (17, 0))]);

    let report = detector.detect_conflicts("U1", Some(&candidate), &existing);

    let travel = report.of_kind(ConflictKind::TravelTimeConflict);
    assert_eq!(travel.len(), 1);
    match &travel[0].detail {
        ConflictDetail::TravelTimeConflict {
            travel_time_hours, ..
        } => assert_eq!(*travel_time_hours, 2.5),
        other => panic!("unexpected detail: {:?}", other),
    }

    // 默认三地路线在注入表中不存在
    let boston = commitments(&[training("T3", "Boston", 4, (13, 0), (17, 0))]);
    let report = detector.detect_conflicts("U1", Some(&candidate), &boston);
    assert!(!report.has_conflicts);
}

#[test]
fn test_overlap_and_travel_can_both_fire() {
    let candidate = training("T1", "NYC", 4, (9, 0), (12, 0));
    let existing = commitments(&[training("T2", "Boston", 4, (12, 10), (15, 0))]);

    let report = detector().detect_conflicts("U1", Some(&candidate), &existing);

    // 顺序: 重叠在前,差旅在后
    let kinds: Vec<ConflictKind> = report.findings.iter().map(|f| f.kind()).collect();
    assert_eq!(
        kinds,
        vec![ConflictKind::ScheduleOverlap, ConflictKind::TravelTimeConflict]
    );
}

#[test]
fn test_intersecting_intervals_have_no_travel_finding() {
    let candidate = training("T1", "NYC", 4, (9, 0), (12, 0));
    let existing = commitments(&[training("T2", "Boston", 4, (11, 0), (15, 0))]);

    let report = detector().detect_conflicts("U1", Some(&candidate), &existing);

    assert_eq!(report.of_kind(ConflictKind::ScheduleOverlap).len(), 1);
    assert!(report.of_kind(ConflictKind::TravelTimeConflict).is_empty());
}

// ==========================================
// 规则D: 同日负荷
// ==========================================

#[test]
fn test_single_same_day_commitment_below_threshold() {
    let candidate = training("T1", "NYC", 4, (16, 0), (17, 0));
    let existing = commitments(&[training("T2", "NYC", 4, (8, 0), (9, 0))]);

    let report = detector().detect_conflicts("U1", Some(&candidate), &existing);

    assert!(report.of_kind(ConflictKind::SameDayMultiple).is_empty());
}

#[test]
fn test_same_day_multiple_lists_sorted_trainings() {
    let candidate = training("T1", "NYC", 4, (16, 0), (17, 0));
    let existing = commitments(&[
        training("T3", "NYC", 4, (12, 0), (13, 0)),
        training("T2", "NYC", 4, (8, 0), (9, 0)),
        training("T4", "NYC", 5, (8, 0), (9, 0)),
    ]);

    let report = detector().detect_conflicts("U1", Some(&candidate), &existing);

    assert_eq!(report.len(), 1);
    let finding = &report.findings[0];
    assert_eq!(finding.severity, Severity::Warning);
    assert_eq!(finding.message, "Already have 2 training(s) on this day");
    match &finding.detail {
        ConflictDetail::SameDayMultiple {
            training_date,
            count,
            existing_trainings,
        } => {
            assert_eq!(*training_date, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
            assert_eq!(*count, 2);
            assert_eq!(existing_trainings.len(), 2);
            assert_eq!(existing_trainings[0].id, "T2");
            assert_eq!(existing_trainings[0].start_time, "08:00");
            assert_eq!(existing_trainings[0].end_time, "09:00");
            assert_eq!(existing_trainings[1].id, "T3");
        }
        other => panic!("unexpected detail: {:?}", other),
    }
}

#[test]
fn test_same_day_excludes_candidate_itself() {
    let candidate = training("T1", "NYC", 4, (16, 0), (17, 0));
    let existing = commitments(&[
        candidate.clone(),
        training("T2", "NYC", 4, (8, 0), (9, 0)),
    ]);

    let report = detector().detect_conflicts("U1", Some(&candidate), &existing);

    assert_eq!(report.len(), 1);
    assert_eq!(report.findings[0].kind(), ConflictKind::DuplicateRegistration);
}

#[test]
fn test_same_day_threshold_is_configurable() {
    let config = ConflictRuleConfig {
        same_day_threshold: 1,
        ..ConflictRuleConfig::default()
    };
    let candidate = training("T1", "NYC", 4, (16, 0), (17, 0));
    let existing = commitments(&[training("T2", "NYC", 4, (8, 0), (9, 0))]);

    let report = ConflictDetector::new(config).detect_conflicts("U1", Some(&candidate), &existing);

    assert_eq!(report.of_kind(ConflictKind::SameDayMultiple).len(), 1);
}

// ==========================================
// 报名前置校验
// ==========================================

#[test]
fn test_prerequisites_training_not_found() {
    let issues = detector().check_prerequisites(None);

    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].kind(), ConflictKind::TrainingNotFound);
    assert_eq!(issues[0].message, "Training not found");
}

#[test]
fn test_prerequisites_training_full() {
    let full = CapacityInfo::from_counts(10, 10, 10, 10);
    let issues = detector().check_prerequisites(Some(&full));

    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].kind(), ConflictKind::TrainingFull);
    assert_eq!(issues[0].message, "Training is at full capacity");
    assert_eq!(issues[0].severity, Severity::Error);

    let open = CapacityInfo::from_counts(10, 12, 9, 12);
    assert!(detector().check_prerequisites(Some(&open)).is_empty());
}

#[test]
fn test_prerequisites_independent_of_conflicts() {
    let detector = detector();
    let candidate = training("T1", "NYC", 4, (9, 0), (12, 0));
    let existing = commitments(&[candidate.clone()]);
    let full = CapacityInfo::from_counts(1, 1, 1, 1);

    let before = detector.check_prerequisites(Some(&full));
    let report = detector.detect_conflicts("U1", Some(&candidate), &existing);
    let after = detector.check_prerequisites(Some(&full));

    assert_eq!(report.findings[0].kind(), ConflictKind::DuplicateRegistration);
    assert_eq!(before, after);
    assert_eq!(after[0].kind(), ConflictKind::TrainingFull);
}

// ==========================================
// 幂等与对外格式
// ==========================================

#[test]
fn test_detection_is_idempotent() {
    let detector = detector();
    let candidate = training("T1", "NYC", 4, (9, 0), (12, 0));
    let existing = commitments(&[
        training("T2", "Boston", 4, (13, 0), (17, 0)),
        training("T3", "NYC", 4, (11, 0), (11, 45)),
        training("T4", "Dallas", 4, (7, 0), (8, 0)),
    ]);

    let first = detector.detect_conflicts("U1", Some(&candidate), &existing);
    let second = detector.detect_conflicts("U1", Some(&candidate), &existing);

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_report_json_shape() {
    let candidate = training("T1", "NYC", 4, (9, 0), (12, 0));
    let existing = commitments(&[training("T2", "Boston", 4, (13, 0), (17, 0))]);

    let report = detector().detect_conflicts("U1", Some(&candidate), &existing);
    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(value["has_conflicts"], true);
    let conflict = &value["conflicts"][0];
    assert_eq!(conflict["type"], "travel_time_conflict");
    assert_eq!(conflict["severity"], "warning");
    assert_eq!(conflict["travel_time_hours"], 4.0);
    assert_eq!(conflict["from_location"], "NYC");
    assert_eq!(conflict["to_location"], "Boston");
    assert_eq!(conflict["conflicting_training"]["id"], "T2");
    assert_eq!(
        conflict["conflicting_training"]["start_date"],
        "2024-03-04T13:00:00"
    );

    let empty = serde_json::to_value(ConflictReport::empty()).unwrap();
    assert_eq!(empty["has_conflicts"], false);
    assert_eq!(empty["conflicts"].as_array().map(|a| a.len()), Some(0));
}

#[test]
fn test_same_day_json_type_name() {
    let candidate = training("T1", "NYC", 4, (16, 0), (17, 0));
    let existing = commitments(&[
        training("T2", "NYC", 4, (8, 0), (9, 0)),
        training("T3", "NYC", 4, (10, 0), (11, 0)),
    ]);

    let report = detector().detect_conflicts("U1", Some(&candidate), &existing);
    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(value["conflicts"][0]["type"], "same_day_multiple_trainings");
    assert_eq!(value["conflicts"][0]["training_date"], "2024-03-04");
    assert_eq!(value["conflicts"][0]["count"], 2);
}

// ==========================================
// 越界参数
// ==========================================

#[test]
fn test_unrepresentable_buffers_do_not_panic() {
    let config = ConflictRuleConfig {
        overlap_buffer_minutes: 1_000_000_000_000,
        travel_buffer_hours: 1e13,
        ..ConflictRuleConfig::default()
    };
    let detector = ConflictDetector::new(config);

    let candidate = training("T1", "Boston", 4, (13, 0), (15, 0));
    let existing = commitments(&[training("T2", "NYC", 4, (8, 0), (10, 0))]);

    let report = detector.detect_conflicts("U1", Some(&candidate), &existing);
    assert!(report.of_kind(ConflictKind::ScheduleOverlap).is_empty());
    assert!(report.of_kind(ConflictKind::TravelTimeConflict).is_empty());
}
