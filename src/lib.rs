// ==========================================
// 机加工排产看板 - 排产质量校验核心库
// ==========================================
// 职责: 对一份排产计划做可行性校验并输出质量报告
// 系统定位: 只读校验 (不修改、不生成排产)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 导入层 - 松散记录规范化
pub mod importer;

// 引擎层 - 校验规则与评分
pub mod engine;

// 配置层 - 评估配置快照
pub mod config;

// API 层 - 业务接口
pub mod api;

// 命令行
pub mod cli;

// 日志系统
pub mod logging;

// 性能统计
pub mod perf;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{HandleMode, IntervalKind, ProfileMode, QualityStatus, Severity};

// 领域实体
pub use domain::{
    Holiday, Issue, IssueCode, MachineBreakdown, PieceEvent, PieceFlow, PieceKey, QualityKpi,
    QualityReport, ReportParameters, ReportSummary, ScheduleRow, TimeInterval,
};

// 配置
pub use config::{ConfigError, QualityConfig, SetupWindow};

// 引擎
pub use engine::{
    verify_piece_flow, PieceFlowFilter, PieceFlowReconstructor, PieceVerificationReport,
    QualityEvaluator,
};

// API
pub use api::{ApiError, ApiResult, EvaluationRequest, QualityApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "机加工排产质量校验";
