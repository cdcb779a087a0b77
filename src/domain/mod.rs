// ==========================================
// 机加工排产看板 - 领域层
// ==========================================
// 职责: 排产行 / 件级事件 / 日历约束 / 质量问题 / 报告
// 所有实体按次构建,评估结束即丢弃
// ==========================================

pub mod calendar;
pub mod issue;
pub mod piece;
pub mod report;
pub mod schedule;
pub mod types;

pub use calendar::{Holiday, MachineBreakdown};
pub use issue::{Issue, IssueCode, IssueKey};
pub use piece::{piece_event_id, PieceEvent, PieceFlow, PieceKey};
pub use report::{QualityKpi, QualityReport, ReportParameters, ReportSummary};
pub use schedule::{format_row_ref, ScheduleRow, TimeInterval};
pub use types::{HandleMode, IntervalKind, ProfileMode, QualityStatus, Severity};
