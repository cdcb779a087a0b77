// ==========================================
// 机加工排产看板 - 外部日历约束
// ==========================================
// 职责: 假日 (不分机床) 与 机床故障 (限定机床范围)
// ==========================================

use crate::domain::schedule::TimeInterval;
use serde::{Deserialize, Serialize};

/// 假日停产区间
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holiday {
    pub reason: String,
    pub interval: TimeInterval,
}

/// 机床故障区间
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineBreakdown {
    pub reason: String,

    /// 受影响的机床通道名 (已归一化)
    pub machines: Vec<String>,
    pub interval: TimeInterval,
}

impl MachineBreakdown {
    pub fn affects(&self, machine: &str) -> bool {
        self.machines.iter().any(|m| m == machine)
    }
}
