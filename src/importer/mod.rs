// ==========================================
// 机加工排产看板 - 导入适配层 (Normalizer)
// ==========================================
// 职责: 松散键值记录 → 强类型内部结构
// 别名解析只在本层出现,校验引擎只看到 ScheduleRow / PieceEvent
// ==========================================

pub mod calendar_normalizer;
pub mod data_cleaner;
pub mod error;
pub mod field_mapper;
pub mod importer_trait;
pub mod piece_timeline;
pub mod row_normalizer;

pub use calendar_normalizer::{normalize_calendar, NormalizedCalendar};
pub use data_cleaner::{normalize_machine_lane, DataCleaner, DEFAULT_MACHINE_LANE};
pub use error::{PieceRowRejection, RowRejection};
pub use field_mapper::{FieldMapper, RawPieceRow, RawScheduleRow};
pub use importer_trait::RawRecord;
pub use piece_timeline::{NormalizedTimeline, PieceTimelineNormalizer};
pub use row_normalizer::{NormalizedRows, RowNormalizer, UNASSIGNED_PERSON};
