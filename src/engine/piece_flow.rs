// ==========================================
// 机加工排产看板 - 件级流转重建引擎
// ==========================================
// 职责: 批次生产区间 → 件级子区间; 或直接采用权威件级时间线
// 输入: 有效排产行 + 可选权威时间线
// 输出: PieceFlow (is_approximate 标记估算)
// ==========================================

use crate::domain::piece::{piece_event_id, PieceEvent, PieceFlow};
use crate::domain::schedule::{ScheduleRow, TimeInterval};
use crate::importer::normalize_machine_lane;
use chrono::Duration;
use tracing::{debug, info};

/// 单件参考最短时长 (毫秒); 切分时只用于诊断日志
pub const MIN_PIECE_MS: i64 = 60_000;

// ==========================================
// PieceFlowReconstructor - 件级重建引擎
// ==========================================
pub struct PieceFlowReconstructor {
    // 无状态
}

impl PieceFlowReconstructor {
    pub fn new() -> Self {
        Self {}
    }

    /// 重建件级流转
    ///
    /// # 参数
    /// - `rows`: 有效排产行
    /// - `authoritative`: 权威件级时间线 (None = 未提供)
    ///
    /// # 返回
    /// - 提供了权威时间线: 原样采用, is_approximate = false
    /// - 否则按数量均分生产区间, is_approximate = true
    pub fn reconstruct(&self, rows: &[ScheduleRow], authoritative: Option<&[PieceEvent]>) -> PieceFlow {
        if let Some(events) = authoritative {
            info!(pieces = events.len(), "采用权威件级时间线");
            return PieceFlow {
                events: events.to_vec(),
                is_approximate: false,
            };
        }

        let events: Vec<PieceEvent> = rows.iter().flat_map(|row| self.slice_row(row)).collect();
        info!(rows = rows.len(), pieces = events.len(), "件级时间由批次区间估算");

        PieceFlow {
            events,
            is_approximate: true,
        }
    }

    /// 把一行生产区间切成 Q 段
    ///
    /// 第 k 段起点 = t0 + 总时长 × (k-1) / Q,按纳秒取整; 最后一段结束时间等于 t1
    /// 不施加 MIN_PIECE_MS 下限: 区间短于 Q 分钟时下限会把后续件推出 t1,
    /// 因此总是按纳秒均分,各件首尾相接且落在 [t0, t1) 内。
    /// 只要总时长 ≥ Q 纳秒,每件时长都为正。
    pub fn slice_row(&self, row: &ScheduleRow) -> Vec<PieceEvent> {
        let qty = row.piece_quantity();
        let t0 = row.run.start;
        let t1 = row.run.end;
        let total_ns: i128 = row
            .run
            .duration()
            .num_nanoseconds()
            .map(i128::from)
            .unwrap_or_else(|| i128::from(row.run.duration_ms()) * 1_000_000);

        if total_ns < i128::from(qty) * i128::from(MIN_PIECE_MS) * 1_000_000 {
            debug!(
                row_ref = %row.display_ref(),
                qty,
                run_ms = row.run.duration_ms(),
                "生产区间短于每件 60 秒,按均分切"
            );
        }

        // 第 k 个切分点 (k = 0..=qty)
        let boundary = |k: u32| {
            let offset = total_ns * i128::from(k) / i128::from(qty);
            i64::try_from(offset)
                .map(|ns| t0 + Duration::nanoseconds(ns))
                .unwrap_or(t1)
                .min(t1)
        };

        (1..=qty)
            .map(|piece| {
                let start = boundary(piece - 1);
                let end = if piece == qty { t1 } else { boundary(piece) };
                PieceEvent {
                    id: piece_event_id(&row.part, &row.batch, row.operation_seq, piece),
                    part: row.part.clone(),
                    batch: row.batch.clone(),
                    piece,
                    operation_seq: row.operation_seq,
                    machine: row.machine.clone(),
                    interval: TimeInterval::new(start, end),
                    status: row.status.clone(),
                    person: None,
                    handle_mode: None,
                }
            })
            .collect()
    }
}

impl Default for PieceFlowReconstructor {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// PieceFlowFilter - 件级视图筛选
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PieceFlowFilter {
    /// None 或 "ALL" 表示不限
    pub part: Option<String>,
    pub piece_from: Option<u32>,
    pub piece_to: Option<u32>,
    pub operation_seq: Option<u32>,

    /// 按通道名比较 ("VMC2" 与 "VMC 2" 等价)
    pub machine: Option<String>,
    pub batch: Option<String>,
}

impl PieceFlowFilter {
    pub fn matches(&self, event: &PieceEvent) -> bool {
        let part_ok = match self.part.as_deref().map(str::trim) {
            None | Some("") | Some("ALL") => true,
            Some(part) => event.part == part,
        };
        let piece_ok = event.piece >= self.piece_from.unwrap_or(1)
            && event.piece <= self.piece_to.unwrap_or(u32::MAX);
        let op_ok = self
            .operation_seq
            .map_or(true, |op| event.operation_seq == op);
        let machine_ok = match self.machine.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(machine) => normalize_machine_lane(&event.machine) == normalize_machine_lane(machine),
        };
        let batch_ok = match self.batch.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(batch) => event.batch == batch,
        };
        part_ok && piece_ok && op_ok && machine_ok && batch_ok
    }

    pub fn apply<'a>(&self, events: &'a [PieceEvent]) -> Vec<&'a PieceEvent> {
        events.iter().filter(|event| self.matches(event)).collect()
    }
}
