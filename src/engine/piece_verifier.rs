// ==========================================
// 机加工排产看板 - 件级时间线独立校验
// ==========================================
// 职责: 不依赖排产行,单独校验一条件级时间线
// 1. 同一机床: 件与件不能重叠
// 2. 同一件: 工序不能倒序并发
// 3. 同一人员 (未携带人员的件记为 Unassigned): 看机模式与产能
// ==========================================

use crate::domain::issue::{Issue, IssueCode};
use crate::domain::piece::{PieceEvent, PieceKey};
use crate::domain::types::{HandleMode, IntervalKind};
use crate::engine::interval_index::{IntervalEntry, ResourceIndex};
use crate::engine::operator_capacity::OperatorCapacityAnalyzer;
use crate::engine::scorer::IssueCollector;
use crate::importer::UNASSIGNED_PERSON;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// 件级时间线校验结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieceVerificationReport {
    /// 无 critical 问题
    pub is_valid: bool,
    pub issues: Vec<Issue>,
}

pub struct PieceFlowVerifier {
    // 无状态
}

impl PieceFlowVerifier {
    pub fn new() -> Self {
        Self {}
    }

    pub fn verify(&self, events: &[PieceEvent]) -> PieceVerificationReport {
        let mut collector = IssueCollector::new();
        collector.extend(self.check_machines(events));
        collector.extend(self.check_precedence(events));
        collector.extend(OperatorCapacityAnalyzer::new().find_operator_violations(&person_index(events)));

        let issues = collector.into_issues();
        let is_valid = !issues.iter().any(Issue::is_critical);
        info!(pieces = events.len(), issues = issues.len(), is_valid, "件级时间线校验完成");

        PieceVerificationReport { is_valid, issues }
    }

    /// 同机床相邻件重叠
    fn check_machines(&self, events: &[PieceEvent]) -> Vec<Issue> {
        let mut by_machine: BTreeMap<&str, Vec<&PieceEvent>> = BTreeMap::new();
        for event in events {
            by_machine.entry(event.machine.as_str()).or_default().push(event);
        }

        let mut issues = Vec::new();
        for (machine, mut group) in by_machine {
            group.sort_by_key(|e| e.interval.start);
            for pair in group.windows(2) {
                let (prev, curr) = (pair[0], pair[1]);
                let Some(window) = prev.interval.intersection(&curr.interval) else {
                    continue;
                };
                issues.push(
                    Issue::new(
                        IssueCode::PieceMachineOverlap,
                        format!("{} overlap between {} and {}.", machine, prev.id, curr.id),
                    )
                    .with_refs([prev.id.as_str(), curr.id.as_str(), machine])
                    .with_window(window),
                );
            }
        }
        issues
    }

    /// 同一件按开始时间排序: 后开始的工序号不大于前一道且在前一道结束前开始
    fn check_precedence(&self, events: &[PieceEvent]) -> Vec<Issue> {
        let mut by_piece: BTreeMap<PieceKey, Vec<&PieceEvent>> = BTreeMap::new();
        for event in events {
            by_piece.entry(event.piece_key()).or_default().push(event);
        }

        let mut issues = Vec::new();
        for (key, mut group) in by_piece {
            group.sort_by_key(|e| e.interval.start);
            for pair in group.windows(2) {
                let (prev, curr) = (pair[0], pair[1]);
                if curr.operation_seq > prev.operation_seq || curr.interval.start >= prev.interval.end {
                    continue;
                }
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
        issues
    }
}

impl Default for PieceFlowVerifier {
    fn default() -> Self {
        Self::new()
    }
}

/// 人员 → 件级生产区间 (未携带人员的件归入 "Unassigned")
fn person_index(events: &[PieceEvent]) -> ResourceIndex {
    let mut index: ResourceIndex = BTreeMap::new();
    for event in events {
        let person = event
            .person
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(UNASSIGNED_PERSON);
        let handle_mode = event.handle_mode.unwrap_or(HandleMode::Single);
        index.entry(person.to_string()).or_default().push(IntervalEntry {
            interval: event.interval,
            kind: IntervalKind::Run,
            owner: event.id.clone(),
            machine: event.machine.clone(),
            handle_mode,
            units: handle_mode.run_units(),
        });
    }
    index
}

/// 函数式入口
pub fn verify_piece_flow(events: &[PieceEvent]) -> PieceVerificationReport {
    PieceFlowVerifier::new().verify(events)
}
