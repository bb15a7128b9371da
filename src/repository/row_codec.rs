// ==========================================
// 企业培训管理系统 - 行字段编解码
// ==========================================
// 排期时间: 办公地本地时间,TEXT "%Y-%m-%d %H:%M:%S"
// 审计时间: UTC,TEXT RFC3339
// ==========================================

use crate::db::DATETIME_FORMAT;
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::types::Type;

pub(crate) fn fmt_local(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

pub(crate) fn fmt_utc(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

pub(crate) fn parse_local(idx: usize, s: &str) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn parse_utc(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn parse_utc_opt(idx: usize, s: Option<String>) -> rusqlite::Result<Option<DateTime<Utc>>> {
    s.map(|v| parse_utc(idx, &v)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_local_format_is_sortable_text() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap();
        assert_eq!(fmt_local(&dt), "2024-03-04 09:05:00");
        assert_eq!(parse_local(0, "2024-03-04 09:05:00").unwrap(), dt);
    }

    #[test]
    fn test_bad_text_is_conversion_failure() {
        let err = parse_local(7, "not a date").unwrap_err();
        assert!(matches!(
            err,
            rusqlite::Error::FromSqlConversionFailure(7, Type::Text, _)
        ));
        assert!(parse_utc_opt(3, None).unwrap().is_none());
    }
}
