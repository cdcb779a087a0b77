// ==========================================
// 机加工排产看板 - 质量评估配置快照
// ==========================================
// 职责: 调机时间窗 / 生产时段 / 假日 / 机床故障 / 校验档位 / 工厂时区
// 约束: 单次评估期间只读
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::setup_window::DEFAULT_SETUP_WINDOW;
use crate::domain::types::ProfileMode;
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

// ==========================================
// 配置键 (JSON 字段名 + 环境变量名)
// ==========================================
pub mod config_keys {
    pub const SETUP_WINDOW: &str = "setupWindow";
    pub const HOLIDAYS: &str = "holidays";
    pub const BREAKDOWNS: &str = "breakdowns";
    pub const PROFILE_MODE: &str = "profileMode";
    pub const PLANT_UTC_OFFSET_MINUTES: &str = "plantUtcOffsetMinutes";
    pub const PRODUCTION_WINDOWS: &str = "productionWindows";

    pub const ENV_SETUP_WINDOW: &str = "SCHEDULE_QUALITY_SETUP_WINDOW";
    pub const ENV_PROFILE_MODE: &str = "SCHEDULE_QUALITY_PROFILE";
}

/// 工厂时区偏移上限 (±18 小时)
const MAX_UTC_OFFSET_MINUTES: i32 = 18 * 60;

/// 假日配置项 (原始形态,时间未解析)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolidayEntry {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default, alias = "start")]
    pub start_date_time: Option<serde_json::Value>,

    #[serde(default, alias = "end")]
    pub end_date_time: Option<serde_json::Value>,

    #[serde(default)]
    pub reason: Option<String>,
}

/// 机床故障配置项 (原始形态)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownEntry {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub machines: Vec<String>,

    #[serde(default, alias = "start")]
    pub start_date_time: Option<serde_json::Value>,

    #[serde(default, alias = "end")]
    pub end_date_time: Option<serde_json::Value>,

    #[serde(default)]
    pub reason: Option<String>,
}

// ==========================================
// QualityConfig - 配置快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityConfig {
    /// "HH:MM-HH:MM"; 空串表示不限制
    #[serde(default = "default_setup_window")]
    pub setup_window: String,

    #[serde(default)]
    pub holidays: Vec<HolidayEntry>,

    #[serde(default)]
    pub breakdowns: Vec<BreakdownEntry>,

    #[serde(default)]
    pub profile_mode: ProfileMode,

    /// 无时区时间戳按工厂本地时间解释; 带时区时间戳换算到该偏移
    #[serde(default)]
    pub plant_utc_offset_minutes: i32,

    /// 机床生产时段 "HH:MM-HH:MM",仅用于利用率指标; 为空时沿用调机时间窗
    #[serde(default)]
    pub production_windows: Vec<String>,
}

fn default_setup_window() -> String {
    DEFAULT_SETUP_WINDOW.to_string()
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            setup_window: default_setup_window(),
            holidays: Vec::new(),
            breakdowns: Vec::new(),
            profile_mode: ProfileMode::default(),
            plant_utc_offset_minutes: 0,
            production_windows: Vec::new(),
        }
    }
}

impl QualityConfig {
    /// 从 JSON 文本加载并校验
    pub fn from_json_str(raw: &str) -> ConfigResult<Self> {
        let config: QualityConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 值加载并校验
    pub fn from_json_value(value: serde_json::Value) -> ConfigResult<Self> {
        let config: QualityConfig = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载
    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        debug!(path = %path.display(), bytes = raw.len(), "读取质量评估配置");
        Self::from_json_str(&raw)
    }

    /// 校验配置
    ///
    /// # 验证规则
    /// 1. 工厂时区偏移在 ±18 小时内
    ///
    /// 调机窗口格式错误不视为配置错误,由评估降级为 warning
    pub fn validate(&self) -> ConfigResult<()> {
        if self.plant_utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(ConfigError::InvalidValue {
                key: config_keys::PLANT_UTC_OFFSET_MINUTES.to_string(),
                message: format!(
                    "{} 超出范围 [-{}, {}]",
                    self.plant_utc_offset_minutes, MAX_UTC_OFFSET_MINUTES, MAX_UTC_OFFSET_MINUTES
                ),
            });
        }
        Ok(())
    }

    /// 工厂时区
    pub fn plant_offset(&self) -> ConfigResult<FixedOffset> {
        FixedOffset::east_opt(self.plant_utc_offset_minutes * 60).ok_or_else(|| {
            ConfigError::InvalidValue {
                key: config_keys::PLANT_UTC_OFFSET_MINUTES.to_string(),
                message: format!("无效时区偏移: {}", self.plant_utc_offset_minutes),
            }
        })
    }

    /// 应用环境变量覆盖
    pub fn apply_env_overrides(&mut self) -> ConfigResult<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// 应用覆盖 (lookup 返回变量值)
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(window) = lookup(config_keys::ENV_SETUP_WINDOW) {
            debug!(setup_window = %window, "环境变量覆盖调机时间窗");
            self.setup_window = window.trim().to_string();
        }

        if let Some(mode) = lookup(config_keys::ENV_PROFILE_MODE) {
            self.profile_mode = match mode.trim().to_lowercase().as_str() {
                "basic" => ProfileMode::Basic,
                "advanced" => ProfileMode::Advanced,
                other => {
                    warn!(profile_mode = %other, "未知校验档位");
                    return Err(ConfigError::InvalidValue {
                        key: config_keys::ENV_PROFILE_MODE.to_string(),
                        message: format!("未知校验档位: {}（仅支持 basic/advanced）", other),
                    });
                }
            };
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_from_empty_object() {
        let config = QualityConfig::from_json_str("{}").unwrap();
        assert_eq!(config.setup_window, "06:00-22:00");
        assert_eq!(config.profile_mode, ProfileMode::Advanced);
        assert!(config.holidays.is_empty());
        assert_eq!(config.plant_utc_offset_minutes, 0);
        assert!(config.production_windows.is_empty());
    }

    #[test]
    fn test_parse_production_windows() {
        let config =
            QualityConfig::from_json_str(r#"{"productionWindows": ["06:00-14:00", "14:00-22:00"]}"#).unwrap();
        assert_eq!(config.production_windows.len(), 2);
        assert_eq!(config.setup_window, "06:00-22:00");
    }

    #[test]
    fn test_parse_calendar_entries() {
        let raw = r#"{
            "setupWindow": "07:00-19:00",
            "profileMode": "basic",
            "holidays": [{"id": "H1", "startDateTime": "2026-02-23T00:00", "endDateTime": "2026-02-24T00:00", "reason": "Spring"}],
            "breakdowns": [{"machines": ["VMC 2"], "start": "2026-02-22T08:00", "end": "2026-02-22T10:00"}]
        }"#;
        let config = QualityConfig::from_json_str(raw).unwrap();
        assert_eq!(config.setup_window, "07:00-19:00");
        assert_eq!(config.profile_mode, ProfileMode::Basic);
        assert_eq!(config.holidays.len(), 1);
        assert_eq!(config.holidays[0].reason.as_deref(), Some("Spring"));
        assert_eq!(config.breakdowns[0].machines, vec!["VMC 2".to_string()]);
        assert!(config.breakdowns[0].start_date_time.is_some());
    }

    #[test]
    fn test_invalid_offset_rejected() {
        let err = QualityConfig::from_json_str(r#"{"plantUtcOffsetMinutes": 5000}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_wrong_field_type_rejected() {
        let err = QualityConfig::from_json_str(r#"{"holidays": "none"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_overrides() {
        let mut vars = HashMap::new();
        vars.insert(config_keys::ENV_SETUP_WINDOW, " 05:00-23:00 ".to_string());
        vars.insert(config_keys::ENV_PROFILE_MODE, "BASIC".to_string());

        let mut config = QualityConfig::default();
        config
            .apply_overrides_from(|key| vars.get(key).cloned())
            .unwrap();
        assert_eq!(config.setup_window, "05:00-23:00");
        assert_eq!(config.profile_mode, ProfileMode::Basic);

        let mut config = QualityConfig::default();
        let err = config
            .apply_overrides_from(|key| {
                (key == config_keys::ENV_PROFILE_MODE).then(|| "turbo".to_string())
            })
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
