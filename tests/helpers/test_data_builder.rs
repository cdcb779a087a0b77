// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

#![allow(dead_code)]

use schedule_quality::config::QualityConfig;
use schedule_quality::importer::RawRecord;
use serde_json::{json, Map, Value};

/// 2026-02-22 的 "HH:MM" → 本地时间文本
pub fn at(hm: &str) -> String {
    format!("2026-02-22 {}", hm)
}

/// 指定日期 + "HH:MM"
pub fn on(day: u32, hm: &str) -> String {
    format!("2026-02-{:02} {}", day, hm)
}

fn into_record(value: Value) -> RawRecord {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

// ==========================================
// 排产行构建器
// ==========================================

pub struct RowBuilder {
    fields: Map<String, Value>,
}

impl RowBuilder {
    pub fn new(part: &str, batch: &str, op: u32) -> Self {
        let mut fields = Map::new();
        fields.insert("partNumber".to_string(), json!(part));
        fields.insert("batchId".to_string(), json!(batch));
        fields.insert("operationSeq".to_string(), json!(op));
        fields.insert("machine".to_string(), json!("VMC 1"));
        Self { fields }
    }

    fn set(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    pub fn machine(self, machine: &str) -> Self {
        self.set("machine", json!(machine))
    }

    pub fn setup(self, start: &str, end: &str) -> Self {
        self.set("setupStart", json!(start)).set("setupEnd", json!(end))
    }

    pub fn run(self, start: &str, end: &str) -> Self {
        self.set("runStart", json!(start)).set("runEnd", json!(end))
    }

    /// 调机 [setup_start, run_start) + 生产 [run_start, run_end)
    pub fn window(self, setup_start: &str, run_start: &str, run_end: &str) -> Self {
        self.setup(setup_start, run_start).run(run_start, run_end)
    }

    pub fn setup_person(self, person: &str) -> Self {
        self.set("setupPersonName", json!(person))
    }

    pub fn production_person(self, person: &str) -> Self {
        self.set("productionPersonName", json!(person))
    }

    /// 同一人负责本行调机与生产
    pub fn crew(self, person: &str) -> Self {
        self.setup_person(person).production_person(person)
    }

    pub fn handle_mode(self, mode: &str) -> Self {
        self.set("handleMode", json!(mode))
    }

    pub fn due(self, due: &str) -> Self {
        self.set("dueDate", json!(due))
    }

    pub fn batch_qty(self, qty: i64) -> Self {
        self.set("batchQty", json!(qty))
    }

    pub fn order_qty(self, qty: i64) -> Self {
        self.set("orderQty", json!(qty))
    }

    pub fn field(self, key: &str, value: Value) -> Self {
        self.set(key, value)
    }

    pub fn build(self) -> RawRecord {
        self.fields
    }
}

// ==========================================
// 件级时间线构建器
// ==========================================

pub fn piece_row(batch: &str, piece: u32, op: u32, machine: &str, start: &str, end: &str) -> RawRecord {
    into_record(json!({
        "part": "PN1",
        "batch": batch,
        "piece": piece,
        "operationSeq": op,
        "machine": machine,
        "start": start,
        "end": end,
    }))
}

pub fn piece_row_with_person(
    batch: &str,
    piece: u32,
    machine: &str,
    start: &str,
    end: &str,
    person: &str,
    mode: &str,
) -> RawRecord {
    let mut record = piece_row(batch, piece, 1, machine, start, end);
    record.insert("person".to_string(), json!(person));
    record.insert("handleMode".to_string(), json!(mode));
    record
}

// ==========================================
// 配置
// ==========================================

pub fn default_config() -> QualityConfig {
    QualityConfig::default()
}

pub fn config_from(value: Value) -> QualityConfig {
    QualityConfig::from_json_value(value).unwrap()
}
