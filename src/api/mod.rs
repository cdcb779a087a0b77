// ==========================================
// 机加工排产看板 - API 层
// ==========================================
// 职责: 提供排产质量接口,供 CLI 与上层调用
// ==========================================

pub mod error;
pub mod quality_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use quality_api::{EvaluationRequest, QualityApi};
