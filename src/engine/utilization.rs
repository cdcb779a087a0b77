// ==========================================
// 机加工排产看板 - 资源利用率指标
// ==========================================
// 职责: 机床利用率 / 人员利用率
// 口径:
// - 统计区间 = 有效行的最早开始 .. 最晚结束,按分钟步进
// - 机床可用分钟: 生产时段内、非假日、该机床无故障,10 个机床通道逐一累计
// - 人员可用分钟: 调机时间窗内、非假日,乘以参与人数
// - 生产时段未配置时沿用调机时间窗; 时段无法解析时视为全天开放
// 说明: 指标只用于展示,不影响质量评分
// ==========================================

use crate::config::SetupWindow;
use crate::domain::calendar::{Holiday, MachineBreakdown};
use crate::domain::schedule::ScheduleRow;
use crate::domain::types::ProfileMode;
use crate::importer::UNASSIGNED_PERSON;
use chrono::{Duration, NaiveDateTime};
use std::collections::BTreeMap;
use tracing::debug;

/// 看板上的机床通道数 ("VMC 1" .. "VMC 10")
pub const MACHINE_LANE_COUNT: u32 = 10;

/// 机床利用率在综合利用率中的权重
const MACHINE_WEIGHT: f64 = 0.65;
const PERSON_WEIGHT: f64 = 0.35;

pub fn machine_lanes() -> Vec<String> {
    (1..=MACHINE_LANE_COUNT).map(|n| format!("VMC {}", n)).collect()
}

/// 利用率原始统计
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UtilizationStats {
    pub run_minutes: f64,
    pub available_machine_minutes: f64,
    pub person_active_minutes: f64,
    pub available_person_minutes: f64,

    /// 参与统计的人员数 (至少 1)
    pub person_count: usize,
}

/// 统计输入的日历与时段
pub struct UtilizationCalendar<'a> {
    pub holidays: &'a [Holiday],
    pub breakdowns: &'a [MachineBreakdown],

    /// None = 调机时间窗不限制
    pub setup_window: Option<SetupWindow>,

    /// 原始生产时段配置
    pub production_windows: &'a [String],
    pub profile_mode: ProfileMode,
}

impl UtilizationStats {
    pub fn collect(rows: &[ScheduleRow], calendar: &UtilizationCalendar<'_>) -> Self {
        let mut stats = UtilizationStats::default();
        let mut person_minutes: BTreeMap<&str, f64> = BTreeMap::new();
        let mut range: Option<(NaiveDateTime, NaiveDateTime)> = None;

        for row in rows {
            let first = row.setup.start.min(row.run.start);
            let last = row.setup.end.max(row.run.end);
            range = Some(match range {
                Some((start, end)) => (start.min(first), end.max(last)),
                None => (first, last),
            });

            let run_minutes = minutes(row.run.duration_ms());
            stats.run_minutes += run_minutes;

            let setup_counts = calendar.profile_mode.checks_setup()
                && !row.setup_person.is_empty()
                && row.setup_person != UNASSIGNED_PERSON;
            if setup_counts {
                *person_minutes.entry(row.setup_person.as_str()).or_default() +=
                    minutes(row.setup.duration_ms());
            }
            *person_minutes.entry(row.production_person.as_str()).or_default() += run_minutes;
        }

        stats.person_active_minutes = person_minutes.values().sum();
        stats.person_count = person_minutes.len().max(1);

        if let Some((start, end)) = range {
            let production = resolve_production_windows(calendar);
            let lanes = machine_lanes();
            let mut cursor = start;
            while cursor < end {
                let holiday = calendar
                    .holidays
                    .iter()
                    .any(|h| h.interval.start <= cursor && cursor < h.interval.end);

                if !holiday && window_open(calendar.setup_window.as_ref(), cursor) {
                    stats.available_person_minutes += stats.person_count as f64;
                }

                let production_open = production.iter().any(|w| window_open(w.as_ref(), cursor));
                if production_open && !holiday {
                    let down = lanes
                        .iter()
                        .filter(|lane| {
                            calendar.breakdowns.iter().any(|b| {
                                b.affects(lane) && b.interval.start <= cursor && cursor < b.interval.end
                            })
                        })
                        .count();
                    stats.available_machine_minutes += (lanes.len() - down) as f64;
                }

                cursor += Duration::minutes(1);
            }

            debug!(
                range_start = %start,
                range_end = %end,
                available_machine_minutes = stats.available_machine_minutes,
                available_person_minutes = stats.available_person_minutes,
                persons = stats.person_count,
                "利用率可用分钟统计完成"
            );
        }

        stats
    }

    pub fn machine_utilization_pct(&self) -> f64 {
        ratio_pct(self.run_minutes, self.available_machine_minutes)
    }

    pub fn person_utilization_pct(&self) -> f64 {
        ratio_pct(self.person_active_minutes, self.available_person_minutes)
    }

    /// 综合利用率 = 0.65 × 机床 + 0.35 × 人员
    pub fn utilization(&self) -> f64 {
        (self.machine_utilization_pct() * MACHINE_WEIGHT + self.person_utilization_pct() * PERSON_WEIGHT)
            .clamp(0.0, 100.0)
    }
}

/// 生产时段: 去空白后的非空配置; 全部为空时沿用调机时间窗
///
/// 元素为 None 表示该时段不限制
fn resolve_production_windows(calendar: &UtilizationCalendar<'_>) -> Vec<Option<SetupWindow>> {
    let configured: Vec<&str> = calendar
        .production_windows
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .collect();
    if configured.is_empty() {
        return vec![calendar.setup_window];
    }
    configured
        .into_iter()
        .map(|raw| {
            let parsed = SetupWindow::parse(raw);
            if parsed.is_none() {
                debug!(production_window = %raw, "生产时段无法解析,按全天开放统计");
            }
            parsed
        })
        .collect()
}

fn window_open(window: Option<&SetupWindow>, at: NaiveDateTime) -> bool {
    window.map_or(true, |w| w.contains(at))
}

fn ratio_pct(used: f64, available: f64) -> f64 {
    if available <= 0.0 {
        return 0.0;
    }
    (used / available * 100.0).clamp(0.0, 100.0)
}

fn minutes(ms: i64) -> f64 {
    (ms.max(0) as f64) / 60_000.0
}
