// ==========================================
// 机加工排产看板 - 配置层
// ==========================================
// 职责: 评估配置快照的加载 / 校验 / 环境变量覆盖
// 来源: JSON 文件或调用方传入的 JSON 值
// ==========================================

pub mod error;
pub mod quality_config;
pub mod setup_window;

pub use error::{ConfigError, ConfigResult};
pub use quality_config::{config_keys, BreakdownEntry, HolidayEntry, QualityConfig};
pub use setup_window::{SetupWindow, DEFAULT_SETUP_WINDOW};
