// ==========================================
// 机加工排产看板 - 问题汇总与评分
// ==========================================
// 职责: 问题去重收集 + 严重度加权评分 + 状态判定 + 汇总
// 评分: max(0, 100 − 12×critical − 4×warning − 1×info)
// 状态: 有 critical → BAD; 否则有 warning → WARNING; 否则 GOOD
// ==========================================

use crate::domain::issue::{Issue, IssueKey};
use crate::domain::report::ReportSummary;
use crate::domain::types::{QualityStatus, Severity};
use std::collections::HashSet;
use tracing::debug;

// ==========================================
// IssueCollector - 去重收集器
// ==========================================
// 完全相同 (代码/实体/时间窗/消息) 的问题只保留首个
#[derive(Debug, Default)]
pub struct IssueCollector {
    issues: Vec<Issue>,
    seen: HashSet<IssueKey>,
    duplicates: usize,
}

impl IssueCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: Issue) {
        if self.seen.insert(issue.dedup_key()) {
            self.issues.push(issue);
        } else {
            self.duplicates += 1;
        }
    }

    pub fn extend<I: IntoIterator<Item = Issue>>(&mut self, issues: I) {
        for issue in issues {
            self.push(issue);
        }
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn into_issues(self) -> Vec<Issue> {
        if self.duplicates > 0 {
            debug!(kept = self.issues.len(), collapsed = self.duplicates, "重复问题已折叠");
        }
        self.issues
    }
}

// ==========================================
// QualityScorer - 评分器
// ==========================================
pub struct QualityScorer {
    // 无状态
}

impl QualityScorer {
    pub fn new() -> Self {
        Self {}
    }

    pub fn summarize(&self, issues: &[Issue]) -> ReportSummary {
        let mut summary = ReportSummary::default();
        for issue in issues {
            match issue.severity {
                Severity::Critical => summary.critical += 1,
                Severity::Warning => summary.warning += 1,
                Severity::Info => summary.info += 1,
            }
            *summary
                .by_code
                .entry(issue.code.as_str().to_string())
                .or_insert(0) += 1;
        }
        summary.total = issues.len();
        summary.validation_failures = summary.critical;
        summary
    }

    pub fn score(&self, summary: &ReportSummary) -> u32 {
        let penalty = summary.critical as u64 * u64::from(Severity::Critical.penalty())
            + summary.warning as u64 * u64::from(Severity::Warning.penalty())
            + summary.info as u64 * u64::from(Severity::Info.penalty());
        100u64.saturating_sub(penalty) as u32
    }

    pub fn status(&self, summary: &ReportSummary) -> QualityStatus {
        if summary.critical > 0 {
            QualityStatus::Bad
        } else if summary.warning > 0 {
            QualityStatus::Warning
        } else {
            QualityStatus::Good
        }
    }
}

impl Default for QualityScorer {
    fn default() -> Self {
        Self::new()
    }
}
