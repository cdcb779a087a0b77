// ==========================================
// 机加工排产看板 - 人员产能校验引擎
// ==========================================
// 职责: 按人员做事件点扫描,校验调机/生产并发与看机能力
// ==========================================
// 产能口径:
// - 调机 = 2 单位; 生产 double = 1 单位, single = 2 单位; 上限 2
// - 调机期间不能同时调机或生产
// - single 生产不能与任何其他生产并发
// ==========================================

use crate::domain::issue::{Issue, IssueCode};
use crate::domain::schedule::TimeInterval;
use crate::domain::types::{HandleMode, IntervalKind};
use crate::engine::interval_index::{IntervalEntry, ResourceIndex, PERSON_UNIT_CAP};
use chrono::NaiveDateTime;
use serde_json::json;
use std::collections::HashSet;
use tracing::debug;

/// 违规类别 (去重键的一部分)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ViolationKind {
    SetupOverlap,
    SetupRunOverlap,
    SingleModeOverlap,
    CapacityExceeded,
}

/// 去重键: (类别, 分段开始, 前两个参与者)
type ViolationKey = (ViolationKind, NaiveDateTime, String, String);

pub struct OperatorCapacityAnalyzer {
    // 无状态
}

impl OperatorCapacityAnalyzer {
    pub fn new() -> Self {
        Self {}
    }

    /// 检测所有人员的产能违规
    pub fn find_operator_violations(&self, index: &ResourceIndex) -> Vec<Issue> {
        let mut issues = Vec::new();
        for (person, entries) in index {
            if entries.len() < 2 {
                continue;
            }
            let before = issues.len();
            self.sweep_person(person, entries, &mut issues);
            if issues.len() > before {
                debug!(
                    person = %person,
                    entries = entries.len(),
                    violations = issues.len() - before,
                    "人员产能违规"
                );
            }
        }
        issues
    }

    /// 单人员事件点扫描
    ///
    /// 分段 = 相邻的去重边界点; 活动集合按输入顺序排列
    fn sweep_person(&self, person: &str, entries: &[IntervalEntry], issues: &mut Vec<Issue>) {
        let mut points: Vec<NaiveDateTime> = entries
            .iter()
            .flat_map(|e| [e.interval.start, e.interval.end])
            .collect();
        points.sort();
        points.dedup();

        // 按开始时间排序的入口顺序; 活动集合保存原始下标
        let mut by_start: Vec<usize> = (0..entries.len()).collect();
        by_start.sort_by_key(|&i| entries[i].interval.start);

        let mut next = 0;
        let mut active: Vec<usize> = Vec::new();
        let mut seen: HashSet<ViolationKey> = HashSet::new();

        for pair in points.windows(2) {
            let segment = TimeInterval::new(pair[0], pair[1]);

            while next < by_start.len() && entries[by_start[next]].interval.start <= segment.start {
                active.push(by_start[next]);
                next += 1;
            }
            active.retain(|&i| entries[i].interval.end > segment.start);
            if active.len() < 2 {
                continue;
            }
            active.sort_unstable();

            let setups: Vec<&IntervalEntry> = active
                .iter()
                .map(|&i| &entries[i])
                .filter(|e| e.kind == IntervalKind::Setup)
                .collect();
            let runs: Vec<&IntervalEntry> = active
                .iter()
                .map(|&i| &entries[i])
                .filter(|e| e.kind == IntervalKind::Run)
                .collect();

            let mut emit = |kind: ViolationKind, a: &str, b: &str, issue: Issue| {
                let key = (kind, segment.start, a.to_string(), b.to_string());
                if seen.insert(key) {
                    issues.push(issue);
                }
            };

            // 1. 两个调机并发
            if setups.len() >= 2 {
                let (a, b) = (setups[0], setups[1]);
                emit(
                    ViolationKind::SetupOverlap,
                    &a.owner,
                    &b.owner,
                    Issue::new(
                        IssueCode::OperatorSetupOverlap,
                        format!("{} setup overlap between {} and {}.", person, a.owner, b.owner),
                    )
                    .with_refs([a.owner.as_str(), b.owner.as_str(), person])
                    .with_window(segment),
                );
            }

            // 2. 调机与生产并发
            if let (Some(a), Some(b)) = (setups.first(), runs.first()) {
                emit(
                    ViolationKind::SetupRunOverlap,
                    &a.owner,
                    &b.owner,
                    Issue::new(
                        IssueCode::OperatorOverlap,
                        format!("{} setup/run overlap between {} and {}.", person, a.owner, b.owner),
                    )
                    .with_refs([a.owner.as_str(), b.owner.as_str(), person])
                    .with_window(segment),
                );
            }

            // 3. 多个生产并发
            if runs.len() >= 2 {
                let refs = unique_refs(&runs, 3);
                let first = refs.first().cloned().unwrap_or_default();
                let second = refs.get(1).cloned().unwrap_or_default();
                let mut entity_refs = refs.clone();
                entity_refs.push(person.to_string());

                let run_units: u32 = runs.iter().map(|e| e.units).sum();
                if runs.iter().any(|e| e.handle_mode == HandleMode::Single) {
                    emit(
                        ViolationKind::SingleModeOverlap,
                        &first,
                        &second,
                        Issue::new(
                            IssueCode::PersonSingleModeOverlap,
                            format!(
                                "{} has SINGLE MACHINE run overlapping another run assignment.",
                                person
                            ),
                        )
                        .with_refs(entity_refs)
                        .with_window(segment)
                        .with_evidence(json!({
                            "activeRuns": runs
                                .iter()
                                .map(|e| json!({"ref": e.owner, "handleMode": e.handle_mode}))
                                .collect::<Vec<_>>(),
                        })),
                    );
                } else if run_units > PERSON_UNIT_CAP {
                    emit(
                        ViolationKind::CapacityExceeded,
                        &first,
                        &second,
                        Issue::new(
                            IssueCode::PersonRunCapacityExceeded,
                            format!(
                                "{} run capacity exceeded (used {}, max {}).",
                                person, run_units, PERSON_UNIT_CAP
                            ),
                        )
                        .with_refs(entity_refs)
                        .with_window(segment)
                        .with_evidence(json!({
                            "runUnits": run_units,
                            "activeRuns": runs
                                .iter()
                                .map(|e| json!({"ref": e.owner, "units": e.units, "handleMode": e.handle_mode}))
                                .collect::<Vec<_>>(),
                        })),
                    );
                }
            }
        }
    }
}

impl Default for OperatorCapacityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// 前 limit 个不重复的行引用 (保持顺序)
fn unique_refs(entries: &[&IntervalEntry], limit: usize) -> Vec<String> {
    let mut refs: Vec<String> = Vec::new();
    for entry in entries {
        if refs.len() >= limit {
            break;
        }
        if !refs.contains(&entry.owner) {
            refs.push(entry.owner.clone());
        }
    }
    refs
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 22)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn run(owner: &str, mode: HandleMode, start: NaiveDateTime, end: NaiveDateTime) -> IntervalEntry {
        IntervalEntry {
            interval: TimeInterval::new(start, end),
            kind: IntervalKind::Run,
            owner: owner.to_string(),
            machine: "VMC 1".to_string(),
            handle_mode: mode,
            units: mode.run_units(),
        }
    }

    fn setup(owner: &str, start: NaiveDateTime, end: NaiveDateTime) -> IntervalEntry {
        IntervalEntry {
            interval: TimeInterval::new(start, end),
            kind: IntervalKind::Setup,
            owner: owner.to_string(),
            machine: "VMC 1".to_string(),
            handle_mode: HandleMode::Single,
            units: 2,
        }
    }

    fn analyze(entries: Vec<IntervalEntry>) -> Vec<Issue> {
        let mut index = BTreeMap::new();
        index.insert("Alice".to_string(), entries);
        OperatorCapacityAnalyzer::new().find_operator_violations(&index)
    }

    #[test]
    fn test_two_double_runs_within_capacity() {
        let issues = analyze(vec![
            run("A", HandleMode::Double, at(8, 0), at(10, 0)),
            run("B", HandleMode::Double, at(9, 0), at(11, 0)),
        ]);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_single_mode_overlap() {
        let issues = analyze(vec![
            run("A", HandleMode::Single, at(8, 0), at(10, 0)),
            run("B", HandleMode::Double, at(9, 0), at(11, 0)),
        ]);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, IssueCode::PersonSingleModeOverlap);
        assert_eq!(issues[0].entity_refs, vec!["A", "B", "Alice"]);
        let window = issues[0].time_window.unwrap();
        assert_eq!((window.start, window.end), (at(9, 0), at(10, 0)));
    }

    #[test]
    fn test_three_double_runs_exceed_capacity() {
        let issues = analyze(vec![
            run("A", HandleMode::Double, at(8, 0), at(10, 0)),
            run("B", HandleMode::Double, at(8, 0), at(10, 0)),
            run("C", HandleMode::Double, at(8, 0), at(10, 0)),
        ]);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, IssueCode::PersonRunCapacityExceeded);
        assert_eq!(issues[0].evidence.as_ref().unwrap()["runUnits"], 3);
        assert_eq!(issues[0].entity_refs.len(), 4);
    }

    #[test]
    fn test_setup_conflicts() {
        let issues = analyze(vec![
            setup("A", at(8, 0), at(9, 0)),
            setup("B", at(8, 30), at(9, 30)),
            run("C", HandleMode::Double, at(8, 45), at(10, 0)),
        ]);
        let codes: Vec<IssueCode> = issues.iter().map(|i| i.code).collect();
        // [08:30,08:45) 两个调机; [08:45,09:00) 两个调机 + 生产; [09:00,09:30) 调机 + 生产
        assert_eq!(
            codes,
            vec![
                IssueCode::OperatorSetupOverlap,
                IssueCode::OperatorSetupOverlap,
                IssueCode::OperatorOverlap,
                IssueCode::OperatorOverlap,
            ]
        );
        assert_eq!(issues[2].entity_refs, vec!["A", "C", "Alice"]);
        assert_eq!(issues[3].entity_refs, vec!["B", "C", "Alice"]);
    }

    #[test]
    fn test_back_to_back_runs_allowed() {
        let issues = analyze(vec![
            run("A", HandleMode::Single, at(8, 0), at(9, 0)),
            run("B", HandleMode::Single, at(9, 0), at(10, 0)),
        ]);
        assert!(issues.is_empty());
    }
}
