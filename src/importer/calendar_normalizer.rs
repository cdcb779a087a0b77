// ==========================================
// 机加工排产看板 - 日历约束规范化
// ==========================================
// 职责: 配置中的假日/故障项 → Holiday / MachineBreakdown
// 不可解析或区间非正的项降级为 warning 并忽略
// ==========================================

use crate::config::{BreakdownEntry, HolidayEntry};
use crate::domain::calendar::{Holiday, MachineBreakdown};
use crate::domain::issue::{Issue, IssueCode};
use crate::domain::schedule::TimeInterval;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::importer_trait::DataCleaner as DataCleanerTrait;
use serde_json::Value;
use tracing::warn;

/// 日历规范化结果
#[derive(Debug, Clone, Default)]
pub struct NormalizedCalendar {
    pub holidays: Vec<Holiday>,
    pub breakdowns: Vec<MachineBreakdown>,
    pub issues: Vec<Issue>,
}

pub fn normalize_calendar(
    cleaner: &DataCleaner,
    holidays: &[HolidayEntry],
    breakdowns: &[BreakdownEntry],
) -> NormalizedCalendar {
    let mut result = NormalizedCalendar::default();

    for (index, entry) in holidays.iter().enumerate() {
        let reason = reason_or(&entry.reason, "Holiday");
        match interval_of(cleaner, &entry.start_date_time, &entry.end_date_time) {
            Some(interval) => result.holidays.push(Holiday { reason, interval }),
            None => {
                warn!(index, reason = %reason, "假日配置项时间无效,已忽略");
                result
                    .issues
                    .push(invalid_entry("holiday", index, &entry.id, &reason));
            }
        }
    }

    for (index, entry) in breakdowns.iter().enumerate() {
        let reason = reason_or(&entry.reason, "maintenance");
        match interval_of(cleaner, &entry.start_date_time, &entry.end_date_time) {
            Some(interval) => result.breakdowns.push(MachineBreakdown {
                reason,
                machines: entry
                    .machines
                    .iter()
                    .map(|m| cleaner.normalize_machine_lane(Some(m)))
                    .collect(),
                interval,
            }),
            None => {
                warn!(index, reason = %reason, "故障配置项时间无效,已忽略");
                result
                    .issues
                    .push(invalid_entry("breakdown", index, &entry.id, &reason));
            }
        }
    }

    result
}

fn interval_of(
    cleaner: &DataCleaner,
    start: &Option<Value>,
    end: &Option<Value>,
) -> Option<TimeInterval> {
    let start = start.as_ref().and_then(|v| cleaner.parse_timestamp(v))?;
    let end = end.as_ref().and_then(|v| cleaner.parse_timestamp(v))?;
    let interval = TimeInterval::new(start, end);
    interval.is_positive().then_some(interval)
}

fn reason_or(reason: &Option<String>, fallback: &str) -> String {
    reason
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

fn invalid_entry(kind: &str, index: usize, id: &Option<String>, reason: &str) -> Issue {
    let entity = id
        .clone()
        .unwrap_or_else(|| format!("{}s[{}]", kind, index));
    Issue::new(
        IssueCode::InvalidCalendarEntry,
        format!("{} {} ({}) has invalid start/end and is ignored.", kind, entity, reason),
    )
    .with_refs([entity])
}
