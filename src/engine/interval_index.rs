// ==========================================
// 机加工排产看板 - 资源区间索引
// ==========================================
// 职责: 按机床 / 按人员汇集调机与生产区间
// 每次评估构建一次,仅在本次评估内使用
// ==========================================

use crate::domain::schedule::{ScheduleRow, TimeInterval};
use crate::domain::types::{HandleMode, IntervalKind};
use std::collections::BTreeMap;
use tracing::debug;

/// 调机占用的人员产能单位
pub const SETUP_UNITS: u32 = 2;

/// 人员同时占用的产能上限
pub const PERSON_UNIT_CAP: u32 = 2;

/// 资源上的一个占用区间
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalEntry {
    pub interval: TimeInterval,
    pub kind: IntervalKind,

    /// 所属行引用 "{part}/{batch}/OP{op}"
    pub owner: String,
    pub machine: String,
    pub handle_mode: HandleMode,
    pub units: u32,
}

pub type ResourceIndex = BTreeMap<String, Vec<IntervalEntry>>;

fn setup_entry(row: &ScheduleRow, owner: &str) -> IntervalEntry {
    IntervalEntry {
        interval: row.setup,
        kind: IntervalKind::Setup,
        owner: owner.to_string(),
        machine: row.machine.clone(),
        handle_mode: HandleMode::Single,
        units: SETUP_UNITS,
    }
}

fn run_entry(row: &ScheduleRow, owner: &str) -> IntervalEntry {
    IntervalEntry {
        interval: row.run,
        kind: IntervalKind::Run,
        owner: owner.to_string(),
        machine: row.machine.clone(),
        handle_mode: row.handle_mode,
        units: row.handle_mode.run_units(),
    }
}

/// 机床 → 区间列表 (按输入顺序: 每行先调机后生产)
///
/// 零时长调机 (basic 档位) 不入索引
pub fn build_machine_index(rows: &[ScheduleRow]) -> ResourceIndex {
    let mut index: ResourceIndex = BTreeMap::new();
    for row in rows {
        let owner = row.display_ref();
        let bucket = index.entry(row.machine.clone()).or_default();
        if row.has_setup() {
            bucket.push(setup_entry(row, &owner));
        }
        bucket.push(run_entry(row, &owner));
    }
    debug!(machines = index.len(), "机床区间索引构建完成");
    index
}

/// 人员 → 区间列表
///
/// 调机区间归调机人员,生产区间归生产人员
///
/// 未填写人员的行归入 "Unassigned" 桶,与具名人员同样参与产能校验
pub fn build_operator_index(rows: &[ScheduleRow]) -> ResourceIndex {
    let mut index: ResourceIndex = BTreeMap::new();
    for row in rows {
        let owner = row.display_ref();
        if row.has_setup() {
            index
                .entry(row.setup_person.clone())
                .or_default()
                .push(setup_entry(row, &owner));
        }
        index
            .entry(row.production_person.clone())
            .or_default()
            .push(run_entry(row, &owner));
    }
    debug!(persons = index.len(), "人员区间索引构建完成");
    index
}
