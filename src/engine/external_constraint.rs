// ==========================================
// 机加工排产看板 - 外部约束校验引擎
// ==========================================
// 职责: 机床故障 / 假日 / 调机时间窗 / 交期 / 重复行
// 输入: 有效排产行 + 日历约束 + 调机时间窗
// ==========================================

use crate::config::SetupWindow;
use crate::domain::calendar::{Holiday, MachineBreakdown};
use crate::domain::issue::{Issue, IssueCode};
use crate::domain::schedule::{ScheduleRow, TimeInterval};
use crate::domain::types::ProfileMode;
use chrono::NaiveDateTime;
use std::collections::HashSet;
use tracing::{debug, warn};

/// 重复行签名: (part, batch, op, machine, run_start, run_end)
type RowSignature = (String, String, u32, String, NaiveDateTime, NaiveDateTime);

const TIME_FMT: &str = "%Y-%m-%d %H:%M";

/// 解析配置中的调机时间窗
///
/// # 返回
/// - 空串: (None, None) 不限制
/// - 合法: (Some(window), None)
/// - 非法: (None, Some(invalid_setup_window 警告)),时间窗校验关闭
pub fn resolve_setup_window(raw: &str) -> (Option<SetupWindow>, Option<Issue>) {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return (None, None);
    }
    match SetupWindow::parse(trimmed) {
        Some(window) => (Some(window), None),
        None => {
            warn!(setup_window = %raw, "调机时间窗格式无效,跳过时间窗校验");
            let issue = Issue::new(
                IssueCode::InvalidSetupWindow,
                format!(
                    "Setup window '{}' is not in HH:MM-HH:MM form; setup window check skipped.",
                    raw
                ),
            );
            (None, Some(issue))
        }
    }
}

pub struct ExternalConstraintChecker<'a> {
    holidays: &'a [Holiday],
    breakdowns: &'a [MachineBreakdown],
    setup_window: Option<SetupWindow>,
    profile_mode: ProfileMode,
}

impl<'a> ExternalConstraintChecker<'a> {
    pub fn new(
        holidays: &'a [Holiday],
        breakdowns: &'a [MachineBreakdown],
        setup_window: Option<SetupWindow>,
        profile_mode: ProfileMode,
    ) -> Self {
        Self {
            holidays,
            breakdowns,
            setup_window,
            profile_mode,
        }
    }

    /// 逐行校验外部约束
    pub fn check(&self, rows: &[ScheduleRow]) -> Vec<Issue> {
        let mut issues = Vec::new();
        let mut signatures: HashSet<RowSignature> = HashSet::new();

        for row in rows {
            let row_ref = row.display_ref();

            if self.profile_mode.checks_setup() {
                self.check_setup(row, &row_ref, &mut issues);
            }
            self.check_due_date(row, &row_ref, &mut issues);
            self.check_breakdowns(row, &row_ref, &mut issues);
            self.check_holidays(row, &row_ref, &mut issues);

            let signature = (
                row.part.clone(),
                row.batch.clone(),
                row.operation_seq,
                row.machine.clone(),
                row.run.start,
                row.run.end,
            );
            if !signatures.insert(signature) {
                issues.push(
                    Issue::new(
                        IssueCode::DuplicateRowSignature,
                        format!("{} duplicated with identical machine/time window.", row_ref),
                    )
                    .with_refs([row_ref.as_str()]),
                );
            }
        }

        debug!(
            rows = rows.len(),
            holidays = self.holidays.len(),
            breakdowns = self.breakdowns.len(),
            issues = issues.len(),
            "外部约束校验完成"
        );
        issues
    }

    /// 调机结束晚于本行开工 + 调机时间窗
    fn check_setup(&self, row: &ScheduleRow, row_ref: &str, issues: &mut Vec<Issue>) {
        if row.setup.end > row.run.start {
            issues.push(
                Issue::new(
                    IssueCode::MachineSetupRunOverlap,
                    format!("{} setup overlaps run window.", row_ref),
                )
                .with_rule("Setup vs Run")
                .with_refs([row_ref])
                .with_window(TimeInterval::new(row.setup.start, row.run.end)),
            );
        }

        let Some(window) = self.setup_window else {
            return;
        };
        if !row.has_setup() {
            return;
        }
        if !window.contains(row.setup.start) || !window.contains(row.setup.end) {
            issues.push(
                Issue::new(
                    IssueCode::SetupWindowViolation,
                    format!("{} setup ({}) outside {}.", row_ref, row.setup, window),
                )
                .with_refs([row_ref])
                .with_window(row.setup),
            );
        }
    }

    fn check_due_date(&self, row: &ScheduleRow, row_ref: &str, issues: &mut Vec<Issue>) {
        let Some(due) = row.due_date else {
            return;
        };
        if row.run.end > due {
            issues.push(
                Issue::new(
                    IssueCode::DueDateMissed,
                    format!(
                        "{} ends {} after due {}.",
                        row_ref,
                        row.run.end.format(TIME_FMT),
                        due.format(TIME_FMT)
                    ),
                )
                .with_refs([row_ref])
                .with_window(row.run),
            );
        }
    }

    fn check_breakdowns(&self, row: &ScheduleRow, row_ref: &str, issues: &mut Vec<Issue>) {
        for breakdown in self.breakdowns.iter().filter(|b| b.affects(&row.machine)) {
            if !breakdown.interval.overlaps(&row.setup) && !breakdown.interval.overlaps(&row.run) {
                continue;
            }
            issues.push(
                Issue::new(
                    IssueCode::MachineBreakdownConflict,
                    format!(
                        "{} overlaps {} breakdown ({}).",
                        row_ref, row.machine, breakdown.reason
                    ),
                )
                .with_refs([row_ref, row.machine.as_str()])
                .with_window(breakdown.interval),
            );
        }
    }

    fn check_holidays(&self, row: &ScheduleRow, row_ref: &str, issues: &mut Vec<Issue>) {
        for holiday in self.holidays {
            if !holiday.interval.overlaps(&row.setup) && !holiday.interval.overlaps(&row.run) {
                continue;
            }
            issues.push(
                Issue::new(
                    IssueCode::HolidayConflict,
                    format!("{} overlaps holiday period ({}).", row_ref, holiday.reason),
                )
                .with_refs([row_ref])
                .with_window(holiday.interval),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::HandleMode;
    use chrono::{Duration, NaiveDate};

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn create_test_row(setup_start: NaiveDateTime, setup_minutes: i64, run_minutes: i64) -> ScheduleRow {
        let setup_end = setup_start + Duration::minutes(setup_minutes);
        ScheduleRow {
            row_index: 0,
            part: "PN1".to_string(),
            batch: "B01".to_string(),
            operation_seq: 1,
            machine: "VMC 1".to_string(),
            setup_person: "Bob".to_string(),
            production_person: "Alice".to_string(),
            handle_mode: HandleMode::Single,
            setup: TimeInterval::new(setup_start, setup_end),
            run: TimeInterval::new(setup_end, setup_end + Duration::minutes(run_minutes)),
            due_date: None,
            batch_qty: 0,
            order_qty: 0,
            status: "OK".to_string(),
        }
    }

    fn checker<'a>(
        holidays: &'a [Holiday],
        breakdowns: &'a [MachineBreakdown],
        mode: ProfileMode,
    ) -> ExternalConstraintChecker<'a> {
        ExternalConstraintChecker::new(holidays, breakdowns, SetupWindow::parse("06:00-22:00"), mode)
    }

    fn codes(issues: &[Issue]) -> Vec<IssueCode> {
        issues.iter().map(|i| i.code).collect()
    }

    #[test]
    fn test_clean_row_has_no_issues() {
        let issues = checker(&[], &[], ProfileMode::Advanced).check(&[create_test_row(at(22, 8, 0), 30, 60)]);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_setup_window_violation() {
        // 05:30 开始调机,早于窗口
        let issues = checker(&[], &[], ProfileMode::Advanced).check(&[create_test_row(at(22, 5, 30), 60, 60)]);
        assert_eq!(codes(&issues), vec![IssueCode::SetupWindowViolation]);

        // basic 档位跳过
        let issues = checker(&[], &[], ProfileMode::Basic).check(&[create_test_row(at(22, 5, 30), 60, 60)]);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_setup_overlapping_own_run() {
        let mut row = create_test_row(at(22, 8, 0), 30, 60);
        row.run.start = at(22, 8, 15);
        let issues = checker(&[], &[], ProfileMode::Advanced).check(&[row]);
        assert_eq!(codes(&issues), vec![IssueCode::MachineSetupRunOverlap]);
        assert_eq!(issues[0].rule, "Setup vs Run");
    }

    #[test]
    fn test_due_date_missed_is_warning() {
        let mut row = create_test_row(at(22, 8, 0), 30, 60);
        row.due_date = Some(at(22, 9, 0));
        let issues = checker(&[], &[], ProfileMode::Advanced).check(&[row]);
        assert_eq!(codes(&issues), vec![IssueCode::DueDateMissed]);
        assert!(!issues[0].is_critical());
    }

    #[test]
    fn test_breakdown_scoped_to_machine() {
        let breakdowns = vec![
            MachineBreakdown {
                reason: "spindle".to_string(),
                machines: vec!["VMC 1".to_string()],
                interval: TimeInterval::new(at(22, 9, 0), at(22, 10, 0)),
            },
            MachineBreakdown {
                reason: "coolant".to_string(),
                machines: vec!["VMC 2".to_string()],
                interval: TimeInterval::new(at(22, 8, 0), at(22, 12, 0)),
            },
        ];
        let issues = checker(&[], &breakdowns, ProfileMode::Advanced).check(&[create_test_row(at(22, 8, 0), 30, 60)]);
        assert_eq!(codes(&issues), vec![IssueCode::MachineBreakdownConflict]);
        assert_eq!(issues[0].entity_refs, vec!["PN1/B01/OP1", "VMC 1"]);
        assert!(issues[0].message.contains("spindle"));
    }

    #[test]
    fn test_holiday_and_duplicate() {
        let holidays = vec![Holiday {
            reason: "Holiday".to_string(),
            interval: TimeInterval::new(at(23, 0, 0), at(24, 0, 0)),
        }];
        let row = create_test_row(at(23, 8, 0), 30, 60);
        let issues = checker(&holidays, &[], ProfileMode::Advanced).check(&[row.clone(), row]);
        assert_eq!(
            codes(&issues),
            vec![
                IssueCode::HolidayConflict,
                IssueCode::HolidayConflict,
                IssueCode::DuplicateRowSignature,
            ]
        );
    }

    #[test]
    fn test_resolve_setup_window() {
        assert!(matches!(resolve_setup_window(""), (None, None)));
        assert!(matches!(resolve_setup_window("06:00-22:00"), (Some(_), None)));
        let (window, issue) = resolve_setup_window("all day");
        assert!(window.is_none());
        assert_eq!(issue.unwrap().code, IssueCode::InvalidSetupWindow);
    }
}
