// ==========================================
// 机加工排产看板 - 权威件级时间线规范化
// ==========================================
// 职责: 外部导入的件级时间线 → PieceEvent
// 规则: 区间不可解析/非正、件号或工序号非正整数的行被剔除
// ==========================================

use crate::domain::piece::{piece_event_id, PieceEvent};
use crate::domain::schedule::TimeInterval;
use crate::domain::types::HandleMode;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::PieceRowRejection;
use crate::importer::field_mapper::FieldMapper;
use crate::importer::importer_trait::{
    DataCleaner as DataCleanerTrait, FieldMapper as FieldMapperTrait, RawRecord,
};
use crate::importer::row_normalizer::{value_text, DEFAULT_STATUS, UNKNOWN_PART};
use tracing::debug;

/// 时间线规范化结果
#[derive(Debug, Clone, Default)]
pub struct NormalizedTimeline {
    pub events: Vec<PieceEvent>,
    pub rejections: Vec<PieceRowRejection>,
}

pub struct PieceTimelineNormalizer<'a> {
    mapper: FieldMapper,
    cleaner: &'a DataCleaner,
}

impl<'a> PieceTimelineNormalizer<'a> {
    pub fn new(cleaner: &'a DataCleaner) -> Self {
        Self {
            mapper: FieldMapper,
            cleaner,
        }
    }

    pub fn normalize(&self, records: &[RawRecord]) -> NormalizedTimeline {
        let mut result = NormalizedTimeline::default();
        for (index, record) in records.iter().enumerate() {
            match self.normalize_row(record, index) {
                Ok(event) => result.events.push(event),
                Err(rejection) => result.rejections.push(rejection),
            }
        }
        debug!(
            timeline_rows = records.len(),
            accepted = result.events.len(),
            rejected = result.rejections.len(),
            "件级时间线规范化完成"
        );
        result
    }

    pub fn normalize_row(
        &self,
        record: &RawRecord,
        row_index: usize,
    ) -> Result<PieceEvent, PieceRowRejection> {
        let raw = self.mapper.map_piece_row(record, row_index);

        let start = raw.start.as_ref().and_then(|v| self.cleaner.parse_timestamp(v));
        let end = raw.end.as_ref().and_then(|v| self.cleaner.parse_timestamp(v));
        let interval = match (start, end) {
            (Some(start), Some(end)) => TimeInterval::new(start, end),
            _ => return Err(PieceRowRejection::InvalidTimestamps { row_index }),
        };
        if !interval.is_positive() {
            return Err(PieceRowRejection::NonPositiveDuration { row_index });
        }

        // 件号必须显式给出
        let piece = raw
            .piece
            .as_ref()
            .and_then(|v| self.cleaner.parse_positive_int(v))
            .ok_or_else(|| PieceRowRejection::InvalidIdentifier {
                row_index,
                field: "piece",
                value: raw.piece.as_ref().map(value_text).unwrap_or_default(),
            })?;

        let operation_seq = match &raw.operation_seq {
            None => 1,
            Some(value) => self.cleaner.parse_positive_int(value).ok_or_else(|| {
                PieceRowRejection::InvalidIdentifier {
                    row_index,
                    field: "operation sequence",
                    value: value_text(value),
                }
            })?,
        };

        let part = raw.part.unwrap_or_else(|| UNKNOWN_PART.to_string());
        let batch = raw.batch.unwrap_or_else(|| format!("B-{}", row_index + 1));
        let id = raw
            .id
            .unwrap_or_else(|| piece_event_id(&part, &batch, operation_seq, piece));

        Ok(PieceEvent {
            id,
            part,
            batch,
            piece,
            operation_seq,
            machine: self.cleaner.normalize_machine_lane(raw.machine.as_deref()),
            interval,
            status: raw.status.unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            person: raw.person,
            handle_mode: raw.handle_mode.as_deref().map(HandleMode::from_text),
        })
    }
}
