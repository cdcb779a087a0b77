// ==========================================
// 机加工排产看板 - 数据清洗器实现
// ==========================================
// 职责: 时间戳解析 / 机床通道归一化 / 数量与序号解析
// 约束: 清洗失败一律降级为 None / 默认值,不抛错
// ==========================================

use crate::importer::importer_trait::DataCleaner as DataCleanerTrait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// 缺省机床通道
pub const DEFAULT_MACHINE_LANE: &str = "VMC 1";

/// 本地时间格式 (按顺序尝试)
const LOCAL_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const LOCAL_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

pub struct DataCleaner {
    /// 工厂时区: 带时区/纪元毫秒的输入换算到此偏移
    plant_offset: FixedOffset,
}

impl DataCleaner {
    pub fn new(plant_offset: FixedOffset) -> Self {
        Self { plant_offset }
    }

    /// 解析时间戳文本
    fn parse_text(&self, raw: &str) -> Option<NaiveDateTime> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(dt.with_timezone(&self.plant_offset).naive_local());
        }

        for fmt in LOCAL_DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
                return Some(dt);
            }
        }

        LOCAL_DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
            .and_then(|date| date.and_hms_opt(0, 0, 0))
    }

    /// 纪元毫秒 → 工厂本地时间
    fn from_epoch_millis(&self, millis: i64) -> Option<NaiveDateTime> {
        DateTime::<Utc>::from_timestamp_millis(millis)
            .map(|dt| dt.with_timezone(&self.plant_offset).naive_local())
    }
}

impl DataCleanerTrait for DataCleaner {
    fn parse_timestamp(&self, value: &Value) -> Option<NaiveDateTime> {
        match value {
            Value::Number(n) => {
                let millis = n.as_i64().or_else(|| {
                    n.as_f64()
                        .filter(|f| f.is_finite())
                        .map(|f| f.trunc() as i64)
                })?;
                self.from_epoch_millis(millis)
            }
            Value::String(s) => self.parse_text(s).or_else(|| {
                // 兼容本地化格式 "2/22/2026, 6:00:00 AM": 去掉第一个逗号重试
                if s.contains(',') {
                    self.parse_text(&s.replacen(',', "", 1))
                } else {
                    None
                }
            }),
            _ => None,
        }
    }

    fn normalize_machine_lane(&self, raw: Option<&str>) -> String {
        normalize_machine_lane(raw.unwrap_or(""))
    }

    fn parse_quantity(&self, value: Option<&Value>) -> i64 {
        let qty = match value {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        match qty {
            Some(q) if q.is_finite() && q > 0.0 => q.round() as i64,
            _ => 0,
        }
    }

    fn parse_positive_int(&self, value: &Value) -> Option<u32> {
        let number = match value {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        if number.is_finite() && number >= 1.0 && number.fract() == 0.0 && number <= u32::MAX as f64 {
            Some(number as u32)
        } else {
            None
        }
    }
}

/// 机床名归一化
///
/// 规则:
/// 1. 空值 → "VMC 1"
/// 2. 去空白大写后形如 VMC0*N (N 为 1~2 位数字) → "VMC N"
/// 3. 其他名称原样保留 (TRIM)
pub fn normalize_machine_lane(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DEFAULT_MACHINE_LANE.to_string();
    }

    let compact: String = trimmed
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();

    if let Some(digits) = compact.strip_prefix("VMC") {
        if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
            let significant = digits.trim_start_matches('0');
            if significant.is_empty() {
                return "VMC 0".to_string();
            }
            if significant.len() <= 2 {
                if let Ok(n) = significant.parse::<u32>() {
                    return format!("VMC {}", n);
                }
            }
        }
    }

    trimmed.to_string()
}
