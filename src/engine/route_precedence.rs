// ==========================================
// 机加工排产看板 - 工艺路线与先后顺序校验
// ==========================================
// 职责:
// 1. 批次级: 工序号连续性 (缺号) + 按开工时间的工序顺序
// 2. 件级: 同一件的工序号严格递增且开始时间不倒退
// ==========================================

use crate::domain::issue::{Issue, IssueCode};
use crate::domain::piece::{PieceEvent, PieceKey};
use crate::domain::schedule::ScheduleRow;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// (part, batch) 复合键
pub type BatchKey = (String, String);

pub struct RoutePrecedenceChecker {
    // 无状态
}

impl RoutePrecedenceChecker {
    pub fn new() -> Self {
        Self {}
    }

    /// 批次级路线校验
    pub fn check_batches(&self, rows: &[ScheduleRow]) -> Vec<Issue> {
        let groups = group_by_batch(rows);
        let mut issues = Vec::new();

        for ((part, batch), batch_rows) in &groups {
            let key = format!("{}::{}", part, batch);
            self.check_completeness(&key, batch_rows, &mut issues);
            self.check_order(&key, batch_rows, &mut issues);
        }

        debug!(batches = groups.len(), issues = issues.len(), "批次路线校验完成");
        issues
    }

    /// 在最小与最大工序号之间,每个缺失的工序号报告一次
    fn check_completeness(&self, key: &str, rows: &[&ScheduleRow], issues: &mut Vec<Issue>) {
        let present: BTreeSet<u32> = rows.iter().map(|r| r.operation_seq).collect();
        let (Some(&min_op), Some(&max_op)) = (present.iter().next(), present.iter().next_back()) else {
            return;
        };

        for op in min_op..=max_op {
            if present.contains(&op) {
                continue;
            }
            issues.push(
                Issue::new(
                    IssueCode::FailedOperations,
                    format!("{} missing required OP{}.", key, op),
                )
                .with_refs([key]),
            );
        }
    }

    /// 按开工时间扫描,工序号低于已开工的最大工序号即为顺序违规
    fn check_order(&self, key: &str, rows: &[&ScheduleRow], issues: &mut Vec<Issue>) {
        let mut by_start: Vec<&ScheduleRow> = rows.to_vec();
        by_start.sort_by_key(|r| r.run.start);

        let mut max_seen = 0u32;
        for row in by_start {
            if row.operation_seq < max_seen {
                issues.push(
                    Issue::new(
                        IssueCode::OperationOrderViolation,
                        format!(
                            "{} has OP{} starting after higher operation already started.",
                            key, row.operation_seq
                        ),
                    )
                    .with_refs([row.display_ref()])
                    .with_window(row.run),
                );
            }
            max_seen = max_seen.max(row.operation_seq);
        }
    }

    /// 件级先后顺序校验
    ///
    /// 同一件按工序号排序,相邻两道工序:
    /// 后道开始早于前道开始,或工序号未严格递增 → piece_precedence_violation
    pub fn check_pieces(&self, events: &[PieceEvent]) -> Vec<Issue> {
        let mut groups: BTreeMap<PieceKey, Vec<&PieceEvent>> = BTreeMap::new();
        for event in events {
            groups.entry(event.piece_key()).or_default().push(event);
        }

        let mut issues = Vec::new();
        for (key, mut group) in groups {
            group.sort_by_key(|e| e.operation_seq);
            for pair in group.windows(2) {
                let (prev, curr) = (pair[0], pair[1]);
                if curr.interval.start < prev.interval.start || curr.operation_seq <= prev.operation_seq {
                    let window = prev
                        .interval
                        .intersection(&curr.interval)
                        .unwrap_or_else(|| prev.interval.span(&curr.interval));
                    issues.push(
                        Issue::new(
                            IssueCode::PiecePrecedenceViolation,
                            format!(
                                "{} violates OP precedence between OP{} and OP{}.",
                                key, prev.operation_seq, curr.operation_seq
                            ),
                        )
                        .with_refs([prev.id.as_str(), curr.id.as_str()])
                        .with_window(window),
                    );
                }
            }
        }

        debug!(pieces = events.len(), issues = issues.len(), "件级先后顺序校验完成");
        issues
    }
}

impl Default for RoutePrecedenceChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// (part, batch) → 行列表 (保持输入顺序)
pub fn group_by_batch(rows: &[ScheduleRow]) -> BTreeMap<BatchKey, Vec<&ScheduleRow>> {
    let mut groups: BTreeMap<BatchKey, Vec<&ScheduleRow>> = BTreeMap::new();
    for row in rows {
        groups
            .entry((row.part.clone(), row.batch.clone()))
            .or_default()
            .push(row);
    }
    groups
}
