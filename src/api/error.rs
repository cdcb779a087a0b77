// ==========================================
// 机加工排产看板 - API层错误类型
// ==========================================
// 职责: 调用边界上的结构性错误 (载荷形状 / 配置类型)
// 说明: 排产数据本身的问题不是错误,一律降级为报告中的 issue
// ==========================================

use crate::config::ConfigError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 调用载荷错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ==========================================
    // 配置错误
    // ==========================================
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_converts() {
        let err: ApiError = ConfigError::InvalidValue {
            key: "plantUtcOffsetMinutes".to_string(),
            message: "out of range".to_string(),
        }
        .into();
        assert!(matches!(err, ApiError::Config(_)));
        assert!(err.to_string().starts_with("配置错误"));
    }

    #[test]
    fn test_payload_errors_display() {
        let err = ApiError::ValidationError("rows[2]: 必须是对象".to_string());
        assert_eq!(err.to_string(), "数据验证失败: rows[2]: 必须是对象");
    }
}
