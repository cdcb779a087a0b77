// ==========================================
// 机加工排产看板 - 质量报告
// ==========================================

use crate::domain::issue::Issue;
use crate::domain::types::{ProfileMode, QualityStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// QualityReport - 排产质量报告
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    pub status: QualityStatus,

    /// 0..=100
    pub score: u32,

    pub kpi: QualityKpi,

    /// 按检出顺序排列
    pub issues: Vec<Issue>,

    pub parameters: ReportParameters,
    pub summary: ReportSummary,
}

/// 回显的输入参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportParameters {
    pub setup_window: String,

    /// 配置中的条目数 (含无效条目)
    pub breakdown_count: usize,
    pub holiday_count: usize,

    /// 通过规范化、参与校验的条目数
    pub valid_breakdown_count: usize,
    pub valid_holiday_count: usize,

    /// 输入行数 (含被剔除的行)
    pub operation_rows: usize,
    pub piece_rows: usize,

    /// 件级时间为估算值
    pub piece_timing_estimated: bool,
    pub profile_mode: ProfileMode,
}

/// 问题汇总
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total: usize,
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
    pub by_code: BTreeMap<String, usize>,

    /// 与 critical 相同,保留给下游兼容
    pub validation_failures: usize,
}

/// 交付/利用率/流转指标 (仅展示,不参与评分)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityKpi {
    pub feasibility: f64,
    pub delivery: f64,
    pub utilization: f64,
    pub flow: f64,
    pub machine_utilization_pct: f64,
    pub person_utilization_pct: f64,
    pub on_time_pct: f64,
    pub avg_lateness_minutes: f64,
    pub flow_efficiency_pct: f64,
    pub avg_queue_gap_hours: f64,
}

impl Default for QualityKpi {
    fn default() -> Self {
        Self {
            feasibility: 100.0,
            delivery: 100.0,
            utilization: 0.0,
            flow: 100.0,
            machine_utilization_pct: 0.0,
            person_utilization_pct: 0.0,
            on_time_pct: 100.0,
            avg_lateness_minutes: 0.0,
            flow_efficiency_pct: 100.0,
            avg_queue_gap_hours: 0.0,
        }
    }
}
