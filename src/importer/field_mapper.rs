// ==========================================
// 机加工排产看板 - 字段映射器实现
// ==========================================
// 职责: 源字段 → 标准字段 (别名解析)
// 规则: 按别名顺序取第一个"有值"的字段
//       null / 空白串 / 数值 0 / false 视为无值
// ==========================================

use crate::importer::importer_trait::{FieldMapper as FieldMapperTrait, RawRecord};
use serde_json::Value;

/// 别名映射后的排产行 (值未清洗)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawScheduleRow {
    pub row_index: usize,
    pub part: Option<String>,
    pub batch: Option<String>,
    pub operation_seq: Option<Value>,
    pub machine: Option<String>,
    pub setup_person: Option<String>,
    pub production_person: Option<String>,
    pub handle_mode: Option<String>,
    pub setup_start: Option<Value>,
    pub setup_end: Option<Value>,
    pub run_start: Option<Value>,
    pub run_end: Option<Value>,
    pub due_date: Option<Value>,
    pub batch_qty: Option<Value>,
    pub order_qty: Option<Value>,
    pub status: Option<String>,
}

/// 别名映射后的件级时间线行 (值未清洗)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPieceRow {
    pub row_index: usize,
    pub id: Option<String>,
    pub part: Option<String>,
    pub batch: Option<String>,
    pub piece: Option<Value>,
    pub operation_seq: Option<Value>,
    pub machine: Option<String>,
    pub start: Option<Value>,
    pub end: Option<Value>,
    pub status: Option<String>,
    pub person: Option<String>,
    pub handle_mode: Option<String>,
}

pub struct FieldMapper;

impl FieldMapperTrait for FieldMapper {
    fn map_schedule_row(&self, record: &RawRecord, row_index: usize) -> RawScheduleRow {
        RawScheduleRow {
            row_index,

            // 标识
            part: self.get_string(record, "part"),
            batch: self.get_string(record, "batch"),
            operation_seq: self.get_value(record, "operation_seq"),

            // 资源
            machine: self.get_string(record, "machine"),
            setup_person: self.get_string(record, "setup_person"),
            production_person: self.get_string(record, "production_person"),
            handle_mode: self.get_string(record, "handle_mode"),

            // 时间
            setup_start: self.get_value(record, "setup_start"),
            setup_end: self.get_value(record, "setup_end"),
            run_start: self.get_value(record, "run_start"),
            run_end: self.get_value(record, "run_end"),
            due_date: self.get_value(record, "due_date"),

            // 数量
            batch_qty: self.get_value(record, "batch_qty"),
            order_qty: self.get_value(record, "order_qty"),

            status: self.get_string(record, "status"),
        }
    }

    fn map_piece_row(&self, record: &RawRecord, row_index: usize) -> RawPieceRow {
        RawPieceRow {
            row_index,
            id: self.get_string(record, "piece.id"),
            part: self.get_string(record, "piece.part"),
            batch: self.get_string(record, "piece.batch"),
            piece: self.get_value(record, "piece.piece"),
            operation_seq: self.get_value(record, "piece.operation_seq"),
            machine: self.get_string(record, "piece.machine"),
            start: self.get_value(record, "piece.start"),
            end: self.get_value(record, "piece.end"),
            status: self.get_string(record, "piece.status"),
            person: self.get_string(record, "piece.person"),
            handle_mode: self.get_string(record, "piece.handle_mode"),
        }
    }
}

impl FieldMapper {
    /// 标准字段 → 源字段别名 (优先级从高到低)
    fn aliases(key: &str) -> &'static [&'static str] {
        match key {
            // ===== 排产行 =====
            "part" => &["partNumber", "partnumber", "part_number"],
            "batch" => &["batchId", "batch_id"],
            "operation_seq" => &["operationSeq", "operation_seq"],
            "machine" => &["machine"],
            "setup_person" => &[
                "setupPersonName",
                "setupPerson",
                "setup_person_name",
                "setup_person",
                "person",
                "operator",
            ],
            "production_person" => &[
                "productionPersonName",
                "productionPerson",
                "production_person_name",
                "production_person",
                "person",
                "operator",
            ],
            "handle_mode" => &[
                "handleMode",
                "handle_mode",
                "HandleMode",
                "HandleMachines",
                "handleMachines",
            ],
            "setup_start" => &["setupStart", "setup_start"],
            "setup_end" => &["setupEnd", "setup_end"],
            "run_start" => &["runStart", "run_start"],
            "run_end" => &["runEnd", "run_end"],
            "due_date" => &["dueDate", "due_date"],
            "batch_qty" => &["batchQty", "batch_qty"],
            "order_qty" => &["orderQty", "order_quantity", "orderQuantity"],
            "status" => &["status"],

            // ===== 件级时间线 =====
            "piece.id" => &["id"],
            "piece.part" => &["partNumber", "part"],
            "piece.batch" => &["batchId", "batch"],
            "piece.piece" => &["piece"],
            "piece.operation_seq" => &["operationSeq", "operation"],
            "piece.machine" => &["machine"],
            "piece.start" => &["runStart", "start"],
            "piece.end" => &["runEnd", "end"],
            "piece.status" => &["status"],
            "piece.person" => &["person", "operator"],
            "piece.handle_mode" => &["handleMode", "handle_mode"],

            _ => &[],
        }
    }

    /// 取第一个有值的别名字段
    fn get_value(&self, record: &RawRecord, key: &str) -> Option<Value> {
        Self::aliases(key)
            .iter()
            .filter_map(|alias| record.get(*alias))
            .find(|value| is_present(value))
            .cloned()
    }

    /// 取字符串字段（TRIM,数值转为文本）
    fn get_string(&self, record: &RawRecord, key: &str) -> Option<String> {
        self.get_value(record, key).and_then(|value| {
            let text = match value {
                Value::String(s) => s.trim().to_string(),
                other => other.to_string(),
            };
            if text.is_empty() {
                None
            } else {
                Some(text)
            }
        })
    }
}

/// 字段是否有值
pub(crate) fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
