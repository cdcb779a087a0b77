// ==========================================
// 机加工排产看板 - 领域类型定义
// ==========================================
// 职责: 搬运模式 / 严重度 / 质量状态 / 区间类型 / 校验档位
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 搬运模式 (Handling Mode)
// ==========================================
// 注意: single = 人员可同时看两台机床; double = 人员只能看一台
// (业务口径,与字面相反)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleMode {
    Single,
    Double,
}

impl HandleMode {
    /// 从原始文本解析: 包含 "double" (不区分大小写) 即为 Double,否则 Single
    pub fn from_text(raw: &str) -> Self {
        if raw.trim().to_lowercase().contains("double") {
            HandleMode::Double
        } else {
            HandleMode::Single
        }
    }

    /// 生产段占用的人员产能单位
    pub fn run_units(&self) -> u32 {
        match self {
            HandleMode::Double => 1,
            HandleMode::Single => 2,
        }
    }
}

impl Default for HandleMode {
    fn default() -> Self {
        HandleMode::Single
    }
}

impl fmt::Display for HandleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleMode::Single => write!(f, "single"),
            HandleMode::Double => write!(f, "double"),
        }
    }
}

// ==========================================
// 问题严重度 (Severity)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical, // 可行性破坏
    Warning,  // 交付风险
    Info,     // 提示
}

impl Severity {
    /// 评分扣分权重
    pub fn penalty(&self) -> u32 {
        match self {
            Severity::Critical => 12,
            Severity::Warning => 4,
            Severity::Info => 1,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Critical => write!(f, "critical"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

// ==========================================
// 质量状态 (Quality Status)
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QualityStatus {
    Good,
    Warning,
    Bad,
}

impl fmt::Display for QualityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityStatus::Good => write!(f, "GOOD"),
            QualityStatus::Warning => write!(f, "WARNING"),
            QualityStatus::Bad => write!(f, "BAD"),
        }
    }
}

// ==========================================
// 区间类型 (Interval Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalKind {
    Setup, // 调机
    Run,   // 生产
}

impl fmt::Display for IntervalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntervalKind::Setup => write!(f, "setup"),
            IntervalKind::Run => write!(f, "run"),
        }
    }
}

// ==========================================
// 校验档位 (Profile Mode)
// ==========================================
// basic: 无调机步骤,跳过调机时长/调机窗口/调机与生产重叠校验
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileMode {
    Advanced,
    Basic,
}

impl ProfileMode {
    pub fn checks_setup(&self) -> bool {
        matches!(self, ProfileMode::Advanced)
    }
}

impl Default for ProfileMode {
    fn default() -> Self {
        ProfileMode::Advanced
    }
}

impl fmt::Display for ProfileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileMode::Advanced => write!(f, "advanced"),
            ProfileMode::Basic => write!(f, "basic"),
        }
    }
}
