// ==========================================
// 机加工排产看板 - 交付与流转指标
// ==========================================
// 职责: 准时率 / 平均延误 / 件级流转效率 / 平均排队间隔 / 指标块组装
// 说明: 指标只用于展示,不影响质量评分
// ==========================================

use crate::domain::piece::{PieceEvent, PieceKey};
use crate::domain::report::QualityKpi;
use crate::domain::schedule::ScheduleRow;
use crate::engine::utilization::UtilizationStats;
use std::collections::BTreeMap;

/// 指标原始统计
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowStats {
    pub due_rows: usize,
    pub on_time_rows: usize,
    pub late_rows: usize,
    pub total_lateness_minutes: f64,
    pub active_piece_minutes: f64,
    pub queue_minutes: f64,
    pub queue_gaps: usize,
}

impl FlowStats {
    pub fn collect(rows: &[ScheduleRow], pieces: &[PieceEvent]) -> Self {
        let mut stats = FlowStats::default();

        for row in rows {
            let Some(due) = row.due_date else {
                continue;
            };
            stats.due_rows += 1;
            if row.run.end > due {
                stats.late_rows += 1;
                stats.total_lateness_minutes += minutes((row.run.end - due).num_milliseconds());
            } else {
                stats.on_time_rows += 1;
            }
        }

        let mut groups: BTreeMap<PieceKey, Vec<&PieceEvent>> = BTreeMap::new();
        for piece in pieces {
            groups.entry(piece.piece_key()).or_default().push(piece);
        }
        for mut group in groups.into_values() {
            group.sort_by_key(|e| e.operation_seq);
            stats.active_piece_minutes += group
                .iter()
                .map(|e| minutes(e.interval.duration_ms()))
                .sum::<f64>();
            for pair in group.windows(2) {
                let (prev, curr) = (pair[0], pair[1]);
                if curr.interval.start > prev.interval.end {
                    stats.queue_minutes += minutes((curr.interval.start - prev.interval.end).num_milliseconds());
                    stats.queue_gaps += 1;
                }
            }
        }

        stats
    }

    pub fn on_time_pct(&self) -> f64 {
        if self.due_rows == 0 {
            return 100.0;
        }
        clamp_pct(self.on_time_rows as f64 / self.due_rows as f64 * 100.0)
    }

    pub fn avg_lateness_minutes(&self) -> f64 {
        if self.late_rows == 0 {
            return 0.0;
        }
        self.total_lateness_minutes / self.late_rows as f64
    }

    pub fn flow_efficiency_pct(&self) -> f64 {
        let total = self.active_piece_minutes + self.queue_minutes;
        if total <= 0.0 {
            return 100.0;
        }
        clamp_pct(self.active_piece_minutes / total * 100.0)
    }

    pub fn avg_queue_gap_hours(&self) -> f64 {
        if self.queue_gaps == 0 {
            return 0.0;
        }
        self.queue_minutes / self.queue_gaps as f64 / 60.0
    }

    /// 组装指标块
    ///
    /// - delivery = 准时率 − min(40, 平均延误分钟 / 30)
    /// - flow = 流转效率 − min(30, 平均排队小时 × 1.5)
    /// - utilization 取自利用率统计
    pub fn to_kpi(&self, feasibility: u32, utilization: &UtilizationStats) -> QualityKpi {
        let on_time_pct = self.on_time_pct();
        let avg_lateness_minutes = self.avg_lateness_minutes();
        let flow_efficiency_pct = self.flow_efficiency_pct();
        let avg_queue_gap_hours = self.avg_queue_gap_hours();

        QualityKpi {
            feasibility: f64::from(feasibility),
            delivery: clamp_pct(on_time_pct - (avg_lateness_minutes / 30.0).min(40.0)),
            utilization: utilization.utilization(),
            flow: clamp_pct(flow_efficiency_pct - (avg_queue_gap_hours * 1.5).min(30.0)),
            machine_utilization_pct: utilization.machine_utilization_pct(),
            person_utilization_pct: utilization.person_utilization_pct(),
            on_time_pct,
            avg_lateness_minutes,
            flow_efficiency_pct,
            avg_queue_gap_hours,
        }
    }
}

fn minutes(ms: i64) -> f64 {
    (ms.max(0) as f64) / 60_000.0
}

fn clamp_pct(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}
