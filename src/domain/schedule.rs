// ==========================================
// 机加工排产看板 - 排产行领域模型
// ==========================================
// 职责: 时间区间 + 规范化后的排产行 (一行 = 一个机床工序分配)
// ==========================================

use crate::domain::types::HandleMode;
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// TimeInterval - 半开区间 [start, end)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeInterval {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn duration_ms(&self) -> i64 {
        self.duration().num_milliseconds()
    }

    /// 区间长度严格为正
    pub fn is_positive(&self) -> bool {
        self.end > self.start
    }

    /// 半开区间重叠: 首尾相接不算重叠
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// 重叠部分; 不重叠时返回 None
    pub fn intersection(&self, other: &TimeInterval) -> Option<TimeInterval> {
        if !self.overlaps(other) {
            return None;
        }
        Some(TimeInterval {
            start: self.start.max(other.start),
            end: self.end.min(other.end),
        })
    }

    /// 覆盖两个区间的最小区间
    pub fn span(&self, other: &TimeInterval) -> TimeInterval {
        TimeInterval {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// 时刻是否落在区间内 (含开始,不含结束)
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at < self.end
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.start.format("%Y-%m-%d %H:%M"),
            self.end.format("%Y-%m-%d %H:%M")
        )
    }
}

// ==========================================
// ScheduleRow - 规范化排产行
// ==========================================
// 只有通过时间戳与时长校验的行才会构造成 ScheduleRow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRow {
    /// 源数据中的行号 (0 起)
    pub row_index: usize,

    pub part: String,
    pub batch: String,
    pub operation_seq: u32,

    /// 已归一化的机床通道名 (如 "VMC 1")
    pub machine: String,

    pub setup_person: String,
    pub production_person: String,
    pub handle_mode: HandleMode,

    pub setup: TimeInterval,
    pub run: TimeInterval,

    pub due_date: Option<NaiveDateTime>,

    /// 批次数量 (0 = 未填)
    pub batch_qty: i64,

    /// 订单数量 (0 = 未填)
    pub order_qty: i64,

    pub status: String,
}

impl ScheduleRow {
    /// 展示引用: "{part}/{batch}/OP{op}"
    pub fn display_ref(&self) -> String {
        format_row_ref(&self.part, &self.batch, self.operation_seq)
    }

    /// 调机段长度是否为零 (basic 档位允许)
    pub fn has_setup(&self) -> bool {
        self.setup.is_positive()
    }

    /// 件级重建使用的数量: 批次数量 > 订单数量 > 1
    pub fn piece_quantity(&self) -> u32 {
        let qty = if self.batch_qty > 0 {
            self.batch_qty
        } else if self.order_qty > 0 {
            self.order_qty
        } else {
            1
        };
        u32::try_from(qty.max(1)).unwrap_or(u32::MAX)
    }
}

/// 行引用格式,未通过规范化的行也使用同一格式
pub fn format_row_ref(part: &str, batch: &str, operation_seq: impl fmt::Display) -> String {
    format!("{}/{}/OP{}", part, batch, operation_seq)
}
