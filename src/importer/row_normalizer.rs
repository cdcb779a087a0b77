// ==========================================
// 机加工排产看板 - 排产行规范化
// ==========================================
// 职责: 原始记录 → ScheduleRow (别名解析 + 清洗 + 行级校验)
// 输出: 有效行 + 剔除原因 (剔除行仍计入 operationRows)
// ==========================================

use crate::domain::schedule::{format_row_ref, ScheduleRow, TimeInterval};
use crate::domain::types::{HandleMode, IntervalKind, ProfileMode};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::RowRejection;
use crate::importer::field_mapper::{FieldMapper, RawScheduleRow};
use crate::importer::importer_trait::{
    DataCleaner as DataCleanerTrait, FieldMapper as FieldMapperTrait, RawRecord,
};
use chrono::FixedOffset;
use serde_json::Value;
use tracing::{debug, info};

/// 人员缺省值; 该占位人员不参与人员产能校验
pub const UNASSIGNED_PERSON: &str = "Unassigned";
pub const UNKNOWN_PART: &str = "UNKNOWN";
pub const DEFAULT_STATUS: &str = "OK";

/// 规范化结果
#[derive(Debug, Clone, Default)]
pub struct NormalizedRows {
    pub rows: Vec<ScheduleRow>,
    pub rejections: Vec<RowRejection>,
    pub input_rows: usize,
}

pub struct RowNormalizer {
    mapper: FieldMapper,
    cleaner: DataCleaner,
    profile_mode: ProfileMode,
}

impl RowNormalizer {
    pub fn new(plant_offset: FixedOffset, profile_mode: ProfileMode) -> Self {
        Self {
            mapper: FieldMapper,
            cleaner: DataCleaner::new(plant_offset),
            profile_mode,
        }
    }

    pub fn cleaner(&self) -> &DataCleaner {
        &self.cleaner
    }

    /// 批量规范化
    pub fn normalize(&self, records: &[RawRecord]) -> NormalizedRows {
        let mut result = NormalizedRows {
            input_rows: records.len(),
            ..Default::default()
        };

        for (index, record) in records.iter().enumerate() {
            match self.normalize_row(record, index) {
                Ok(row) => result.rows.push(row),
                Err(rejection) => {
                    debug!(row_index = index, reason = %rejection, "排产行剔除");
                    result.rejections.push(rejection);
                }
            }
        }

        info!(
            input_rows = result.input_rows,
            valid_rows = result.rows.len(),
            rejected_rows = result.rejections.len(),
            profile_mode = %self.profile_mode,
            "排产行规范化完成"
        );

        result
    }

    /// 规范化单行
    ///
    /// # 校验顺序
    /// 1. 调机/生产四个时间戳必须可解析
    /// 2. 工序号若填写必须为正整数
    /// 3. 调机时长 > 0 (basic 档位允许 = 0), 生产时长 > 0
    pub fn normalize_row(&self, record: &RawRecord, row_index: usize) -> Result<ScheduleRow, RowRejection> {
        let raw = self.mapper.map_schedule_row(record, row_index);

        let part = raw.part.clone().unwrap_or_else(|| UNKNOWN_PART.to_string());
        let batch = raw
            .batch
            .clone()
            .unwrap_or_else(|| format!("B-{}", row_index + 1));
        let op_text = raw
            .operation_seq
            .as_ref()
            .map(value_text)
            .unwrap_or_else(|| "1".to_string());
        let row_ref = format_row_ref(&part, &batch, &op_text);

        // 1. 时间戳
        let (setup_start, setup_end, run_start, run_end) = match (
            self.timestamp(&raw.setup_start),
            self.timestamp(&raw.setup_end),
            self.timestamp(&raw.run_start),
            self.timestamp(&raw.run_end),
        ) {
            (Some(a), Some(b), Some(c), Some(d)) => (a, b, c, d),
            _ => return Err(RowRejection::InvalidTimestamps { row_ref }),
        };

        // 2. 工序号
        let operation_seq = match &raw.operation_seq {
            None => 1,
            Some(value) => self.cleaner.parse_positive_int(value).ok_or_else(|| {
                RowRejection::InvalidIdentifier {
                    row_ref: row_ref.clone(),
                    field: "operation sequence",
                    value: op_text.clone(),
                }
            })?,
        };

        // 3. 时长
        let setup = TimeInterval::new(setup_start, setup_end);
        let run = TimeInterval::new(run_start, run_end);
        let setup_invalid = match self.profile_mode {
            ProfileMode::Advanced => !setup.is_positive(),
            ProfileMode::Basic => setup.end < setup.start,
        };
        if setup_invalid || !run.is_positive() {
            return Err(RowRejection::NonPositiveDuration {
                row_ref,
                segment: if setup_invalid {
                    IntervalKind::Setup
                } else {
                    IntervalKind::Run
                },
                window: TimeInterval::new(setup_start, run_end),
            });
        }

        Ok(self.build_row(raw, part, batch, operation_seq, setup, run))
    }

    fn build_row(
        &self,
        raw: RawScheduleRow,
        part: String,
        batch: String,
        operation_seq: u32,
        setup: TimeInterval,
        run: TimeInterval,
    ) -> ScheduleRow {
        ScheduleRow {
            row_index: raw.row_index,
            part,
            batch,
            operation_seq,
            machine: self.cleaner.normalize_machine_lane(raw.machine.as_deref()),
            setup_person: raw
                .setup_person
                .unwrap_or_else(|| UNASSIGNED_PERSON.to_string()),
            production_person: raw
                .production_person
                .unwrap_or_else(|| UNASSIGNED_PERSON.to_string()),
            handle_mode: raw
                .handle_mode
                .as_deref()
                .map(HandleMode::from_text)
                .unwrap_or_default(),
            setup,
            run,
            due_date: self.timestamp(&raw.due_date),
            batch_qty: self.cleaner.parse_quantity(raw.batch_qty.as_ref()),
            order_qty: self.cleaner.parse_quantity(raw.order_qty.as_ref()),
            status: raw.status.unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        }
    }

    fn timestamp(&self, value: &Option<Value>) -> Option<chrono::NaiveDateTime> {
        value.as_ref().and_then(|v| self.cleaner.parse_timestamp(v))
    }
}

/// 原始值的展示文本
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}
