// ==========================================
// 机加工排产看板 - 机床冲突检测引擎
// ==========================================
// 职责: 同一机床上调机/生产区间两两重叠检测
// 红线: 一台机床同一时刻只能承担一个区间
// ==========================================
// 算法: 按开始时间排序扫描,维护仍未结束的区间集合
//       当前区间与集合内每个区间比较,长区间覆盖多个后续区间时各自成对报告
// ==========================================

use crate::domain::issue::{Issue, IssueCode};
use crate::engine::interval_index::{IntervalEntry, ResourceIndex};
use tracing::debug;

pub struct MachineConflictDetector {
    // 无状态
}

impl MachineConflictDetector {
    pub fn new() -> Self {
        Self {}
    }

    /// 检测所有机床的区间重叠
    ///
    /// # 返回
    /// - 同类型重叠 → machine_overlap
    /// - 调机与生产重叠 → machine_setup_run_overlap
    pub fn find_machine_overlaps(&self, index: &ResourceIndex) -> Vec<Issue> {
        let mut issues = Vec::new();
        for (machine, entries) in index {
            let before = issues.len();
            self.scan_machine(machine, entries, &mut issues);
            if issues.len() > before {
                debug!(
                    machine = %machine,
                    entries = entries.len(),
                    conflicts = issues.len() - before,
                    "机床存在区间重叠"
                );
            }
        }
        issues
    }

    fn scan_machine(&self, machine: &str, entries: &[IntervalEntry], issues: &mut Vec<Issue>) {
        let mut sorted: Vec<&IntervalEntry> = entries.iter().collect();
        sorted.sort_by_key(|entry| entry.interval.start);

        let mut active: Vec<&IntervalEntry> = Vec::new();
        for current in sorted {
            active.retain(|open| open.interval.end > current.interval.start);
            for open in &active {
                if let Some(window) = open.interval.intersection(&current.interval) {
                    issues.push(self.overlap_issue(machine, open, current, window));
                }
            }
            active.push(current);
        }
    }

    fn overlap_issue(
        &self,
        machine: &str,
        earlier: &IntervalEntry,
        later: &IntervalEntry,
        window: crate::domain::schedule::TimeInterval,
    ) -> Issue {
        let code = if earlier.kind == later.kind {
            IssueCode::MachineOverlap
        } else {
            IssueCode::MachineSetupRunOverlap
        };
        Issue::new(
            code,
            format!(
                "{} overlap between {} ({}) and {} ({}).",
                machine, earlier.owner, earlier.kind, later.owner, later.kind
            ),
        )
        .with_refs([earlier.owner.as_str(), later.owner.as_str(), machine])
        .with_window(window)
    }
}

impl Default for MachineConflictDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schedule::TimeInterval;
    use crate::domain::types::{HandleMode, IntervalKind};
    use chrono::{NaiveDate, NaiveDateTime};
    use std::collections::BTreeMap;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 22)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn create_test_entry(owner: &str, kind: IntervalKind, start: NaiveDateTime, end: NaiveDateTime) -> IntervalEntry {
        IntervalEntry {
            interval: TimeInterval::new(start, end),
            kind,
            owner: owner.to_string(),
            machine: "VMC 1".to_string(),
            handle_mode: HandleMode::Single,
            units: 2,
        }
    }

    fn index_of(entries: Vec<IntervalEntry>) -> ResourceIndex {
        let mut index = BTreeMap::new();
        index.insert("VMC 1".to_string(), entries);
        index
    }

    #[test]
    fn test_run_overlap_reported_once() {
        let index = index_of(vec![
            create_test_entry("A", IntervalKind::Run, at(10, 0), at(11, 0)),
            create_test_entry("B", IntervalKind::Run, at(10, 30), at(11, 30)),
        ]);
        let issues = MachineConflictDetector::new().find_machine_overlaps(&index);

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, IssueCode::MachineOverlap);
        assert_eq!(issues[0].entity_refs, vec!["A", "B", "VMC 1"]);
        let window = issues[0].time_window.unwrap();
        assert_eq!(window.start, at(10, 30));
        assert_eq!(window.end, at(11, 0));
    }

    #[test]
    fn test_back_to_back_not_overlapping() {
        let index = index_of(vec![
            create_test_entry("A", IntervalKind::Setup, at(9, 0), at(10, 0)),
            create_test_entry("A", IntervalKind::Run, at(10, 0), at(11, 0)),
            create_test_entry("B", IntervalKind::Run, at(11, 0), at(12, 0)),
        ]);
        assert!(MachineConflictDetector::new()
            .find_machine_overlaps(&index)
            .is_empty());
    }

    #[test]
    fn test_long_interval_reports_every_pair() {
        // A 覆盖 B 与 C,B 与 C 互不重叠
        let index = index_of(vec![
            create_test_entry("A", IntervalKind::Run, at(8, 0), at(12, 0)),
            create_test_entry("B", IntervalKind::Run, at(9, 0), at(9, 30)),
            create_test_entry("C", IntervalKind::Setup, at(10, 0), at(10, 30)),
        ]);
        let issues = MachineConflictDetector::new().find_machine_overlaps(&index);

        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].code, IssueCode::MachineOverlap);
        assert_eq!(issues[0].entity_refs[..2], ["A".to_string(), "B".to_string()]);
        assert_eq!(issues[1].code, IssueCode::MachineSetupRunOverlap);
        assert_eq!(issues[1].entity_refs[..2], ["A".to_string(), "C".to_string()]);
    }
}
