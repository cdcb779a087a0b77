// ==========================================
// 机加工排产看板 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 行级错误不会中断评估,统一转换为 Issue 并剔除该行
// ==========================================

use crate::domain::issue::{Issue, IssueCode};
use crate::domain::schedule::TimeInterval;
use crate::domain::types::IntervalKind;
use thiserror::Error;

/// 排产行剔除原因
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowRejection {
    #[error("{row_ref} has invalid setup/run timestamps.")]
    InvalidTimestamps { row_ref: String },

    #[error("{row_ref} has invalid {field} '{value}'.")]
    InvalidIdentifier {
        row_ref: String,
        field: &'static str,
        value: String,
    },

    #[error("{row_ref} has non-positive {segment} duration.")]
    NonPositiveDuration {
        row_ref: String,
        segment: IntervalKind,
        window: TimeInterval,
    },
}

impl RowRejection {
    pub fn code(&self) -> IssueCode {
        match self {
            RowRejection::InvalidTimestamps { .. } => IssueCode::TimestampParseError,
            RowRejection::InvalidIdentifier { .. } => IssueCode::InvalidIdentifier,
            RowRejection::NonPositiveDuration { .. } => IssueCode::NegativeDuration,
        }
    }

    pub fn row_ref(&self) -> &str {
        match self {
            RowRejection::InvalidTimestamps { row_ref }
            | RowRejection::InvalidIdentifier { row_ref, .. }
            | RowRejection::NonPositiveDuration { row_ref, .. } => row_ref,
        }
    }

    /// 转换为质量问题
    pub fn into_issue(self) -> Issue {
        let issue = Issue::new(self.code(), self.to_string()).with_refs([self.row_ref()]);
        match self {
            RowRejection::NonPositiveDuration { window, .. } => issue.with_window(window),
            _ => issue,
        }
    }
}

/// 件级时间线行剔除原因
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PieceRowRejection {
    #[error("pieceTimeline[{row_index}] has invalid start/end timestamps.")]
    InvalidTimestamps { row_index: usize },

    #[error("pieceTimeline[{row_index}] has non-positive duration.")]
    NonPositiveDuration { row_index: usize },

    #[error("pieceTimeline[{row_index}] has invalid {field} '{value}'.")]
    InvalidIdentifier {
        row_index: usize,
        field: &'static str,
        value: String,
    },
}

impl PieceRowRejection {
    pub fn row_index(&self) -> usize {
        match self {
            PieceRowRejection::InvalidTimestamps { row_index }
            | PieceRowRejection::NonPositiveDuration { row_index }
            | PieceRowRejection::InvalidIdentifier { row_index, .. } => *row_index,
        }
    }

    pub fn into_issue(self) -> Issue {
        Issue::new(IssueCode::PieceTimelineRowRejected, self.to_string())
            .with_refs([format!("pieceTimeline[{}]", self.row_index())])
    }
}
