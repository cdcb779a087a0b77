// ==========================================
// 机加工排产看板 - 导入适配 Trait
// ==========================================
// 职责: 定义原始记录 → 规范字段的接口（不包含实现）
// ==========================================

use chrono::NaiveDateTime;
use serde_json::{Map, Value};

use crate::importer::field_mapper::{RawPieceRow, RawScheduleRow};

/// 原始记录: 一行松散键值
pub type RawRecord = Map<String, Value>;

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 别名解析,把多套历史字段名映射到同一原始行结构
// 实现者: FieldMapper
pub trait FieldMapper {
    /// 映射一行排产记录
    ///
    /// # 参数
    /// - record: 原始记录
    /// - row_index: 源数据行号 (0 起),用于默认批次号
    fn map_schedule_row(&self, record: &RawRecord, row_index: usize) -> RawScheduleRow;

    /// 映射一行权威件级时间线记录
    fn map_piece_row(&self, record: &RawRecord, row_index: usize) -> RawPieceRow;
}

// ==========================================
// DataCleaner Trait
// ==========================================
// 用途: 值级清洗 (时间戳 / 机床通道 / 数量 / 序号)
// 实现者: DataCleaner
pub trait DataCleaner {
    /// 解析时间戳; 失败返回 None,不报错
    fn parse_timestamp(&self, value: &Value) -> Option<NaiveDateTime>;

    /// 机床名归一化为通道名 (如 "VMC01" → "VMC 1")
    fn normalize_machine_lane(&self, raw: Option<&str>) -> String;

    /// 解析数量: 有限正数四舍五入,否则 0
    fn parse_quantity(&self, value: Option<&Value>) -> i64;

    /// 解析正整数序号; 非正整数返回 None
    fn parse_positive_int(&self, value: &Value) -> Option<u32>;
}
