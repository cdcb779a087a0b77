// ==========================================
// 机加工排产看板 - 件级事件领域模型
// ==========================================
// 职责: 单件 (piece) 在某工序上的加工区间
// 来源: 推导 (批次区间均分) 或 权威件级时间线
// ==========================================

use crate::domain::schedule::TimeInterval;
use crate::domain::types::HandleMode;
use serde::{Deserialize, Serialize};

// ==========================================
// PieceEvent - 件级事件
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieceEvent {
    /// "{part}-{batch}-op{op}-p{piece}"
    pub id: String,
    pub part: String,
    pub batch: String,

    /// 件号 (1 起)
    pub piece: u32,
    pub operation_seq: u32,
    pub machine: String,

    #[serde(flatten)]
    pub interval: TimeInterval,

    pub status: String,

    /// 操作人员 (仅权威时间线携带)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle_mode: Option<HandleMode>,
}

impl PieceEvent {
    pub fn piece_key(&self) -> PieceKey {
        PieceKey {
            part: self.part.clone(),
            batch: self.batch.clone(),
            piece: self.piece,
        }
    }
}

/// 件级事件标识
pub fn piece_event_id(part: &str, batch: &str, operation_seq: u32, piece: u32) -> String {
    format!("{}-{}-op{}-p{}", part, batch, operation_seq, piece)
}

// ==========================================
// PieceKey - (part, batch, piece) 复合键
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PieceKey {
    pub part: String,
    pub batch: String,
    pub piece: u32,
}

impl std::fmt::Display for PieceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}|{}|{}", self.part, self.batch, self.piece)
    }
}

// ==========================================
// PieceFlow - 件级重建结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieceFlow {
    pub events: Vec<PieceEvent>,

    /// true = 件级时间为估算值 (由批次区间均分得到)
    pub is_approximate: bool,
}
