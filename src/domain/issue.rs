// ==========================================
// 机加工排产看板 - 质量问题领域模型
// ==========================================
// 职责: 问题代码表 (代码 / 规则名 / 严重度) + Issue 实体
// ==========================================

use crate::domain::schedule::TimeInterval;
use crate::domain::types::Severity;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// IssueCode - 问题代码
// ==========================================
// 序列化为 snake_case 机读代码,下游按代码统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    // ===== 规范化 =====
    TimestampParseError,
    NegativeDuration,
    InvalidIdentifier,

    // ===== 机床 =====
    MachineOverlap,
    MachineSetupRunOverlap,

    // ===== 人员 =====
    OperatorSetupOverlap,
    OperatorOverlap,
    PersonSingleModeOverlap,
    PersonRunCapacityExceeded,

    // ===== 工艺路线 =====
    FailedOperations,
    OperationOrderViolation,
    PiecePrecedenceViolation,
    PieceMachineOverlap,

    // ===== 数量 =====
    QuantityMismatch,

    // ===== 外部约束 =====
    MachineBreakdownConflict,
    HolidayConflict,
    SetupWindowViolation,
    DueDateMissed,
    DuplicateRowSignature,

    // ===== 输入质量 =====
    InvalidCalendarEntry,
    InvalidSetupWindow,
    PieceTimelineRowRejected,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::TimestampParseError => "timestamp_parse_error",
            IssueCode::NegativeDuration => "negative_duration",
            IssueCode::InvalidIdentifier => "invalid_identifier",
            IssueCode::MachineOverlap => "machine_overlap",
            IssueCode::MachineSetupRunOverlap => "machine_setup_run_overlap",
            IssueCode::OperatorSetupOverlap => "operator_setup_overlap",
            IssueCode::OperatorOverlap => "operator_overlap",
            IssueCode::PersonSingleModeOverlap => "person_single_mode_overlap",
            IssueCode::PersonRunCapacityExceeded => "person_run_capacity_exceeded",
            IssueCode::FailedOperations => "failed_operations",
            IssueCode::OperationOrderViolation => "operation_order_violation",
            IssueCode::PiecePrecedenceViolation => "piece_precedence_violation",
            IssueCode::PieceMachineOverlap => "piece_machine_overlap",
            IssueCode::QuantityMismatch => "quantity_mismatch",
            IssueCode::MachineBreakdownConflict => "machine_breakdown_conflict",
            IssueCode::HolidayConflict => "holiday_conflict",
            IssueCode::SetupWindowViolation => "setup_window_violation",
            IssueCode::DueDateMissed => "due_date_missed",
            IssueCode::DuplicateRowSignature => "duplicate_row_signature",
            IssueCode::InvalidCalendarEntry => "invalid_calendar_entry",
            IssueCode::InvalidSetupWindow => "invalid_setup_window",
            IssueCode::PieceTimelineRowRejected => "piece_timeline_row_rejected",
        }
    }

    /// 默认规则名 (展示用)
    pub fn rule(&self) -> &'static str {
        match self {
            IssueCode::TimestampParseError => "Timestamp Parse",
            IssueCode::NegativeDuration => "Duration Validity",
            IssueCode::InvalidIdentifier => "Identifier Validity",
            IssueCode::MachineOverlap => "Machine Overlap",
            IssueCode::MachineSetupRunOverlap => "Machine Setup/Run Overlap",
            IssueCode::OperatorSetupOverlap => "Operator Setup Overlap",
            IssueCode::OperatorOverlap => "Operator Setup/Run Overlap",
            IssueCode::PersonSingleModeOverlap => "Single Machine Exclusivity",
            IssueCode::PersonRunCapacityExceeded => "Double Machine Capacity",
            IssueCode::FailedOperations => "Route Completeness",
            IssueCode::OperationOrderViolation => "Operation Order",
            IssueCode::PiecePrecedenceViolation => "Piece Precedence",
            IssueCode::PieceMachineOverlap => "Piece Machine Overlap",
            IssueCode::QuantityMismatch => "Quantity Integrity",
            IssueCode::MachineBreakdownConflict => "Breakdown Conflict",
            IssueCode::HolidayConflict => "Holiday Conflict",
            IssueCode::SetupWindowViolation => "Setup Window",
            IssueCode::DueDateMissed => "Due Date",
            IssueCode::DuplicateRowSignature => "Duplicate Row",
            IssueCode::InvalidCalendarEntry => "Calendar Entry",
            IssueCode::InvalidSetupWindow => "Setup Window Format",
            IssueCode::PieceTimelineRowRejected => "Piece Timeline Row",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            IssueCode::DueDateMissed
            | IssueCode::DuplicateRowSignature
            | IssueCode::InvalidCalendarEntry
            | IssueCode::InvalidSetupWindow => Severity::Warning,
            IssueCode::PieceTimelineRowRejected => Severity::Info,
            _ => Severity::Critical,
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// Issue - 质量问题
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub code: IssueCode,
    pub rule: String,
    pub severity: Severity,
    pub message: String,

    /// 引用的实体 (行引用 / 机床 / 人员 / 件号)
    pub entity_refs: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_window: Option<TimeInterval>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<serde_json::Value>,
}

impl Issue {
    /// 按代码表填充默认规则名与严重度
    pub fn new(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            code,
            rule: code.rule().to_string(),
            severity: code.severity(),
            message: message.into(),
            entity_refs: Vec::new(),
            time_window: None,
            evidence: None,
        }
    }

    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = rule.into();
        self
    }

    pub fn with_refs<I, S>(mut self, refs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entity_refs = refs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_window(mut self, window: TimeInterval) -> Self {
        self.time_window = Some(window);
        self
    }

    pub fn with_evidence(mut self, evidence: serde_json::Value) -> Self {
        self.evidence = Some(evidence);
        self
    }

    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }

    /// 去重键: (代码, 实体, 时间窗, 消息)
    pub fn dedup_key(&self) -> IssueKey {
        IssueKey {
            code: self.code,
            entity_refs: self.entity_refs.clone(),
            time_window: self.time_window,
            message: self.message.clone(),
        }
    }
}

/// 问题去重复合键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IssueKey {
    code: IssueCode,
    entity_refs: Vec<String>,
    time_window: Option<TimeInterval>,
    message: String,
}
