// ==========================================
// 机加工排产看板 - 排产质量 API
// ==========================================
// 职责: 排产质量评估 / 件级重建查询 / 件级时间线独立校验
// 红线: 排产数据问题进入报告,只有载荷结构错误返回 Err
// ==========================================

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::config::QualityConfig;
use crate::domain::piece::PieceFlow;
use crate::domain::report::QualityReport;
use crate::engine::evaluator::QualityEvaluator;
use crate::engine::piece_flow::PieceFlowFilter;
use crate::engine::piece_verifier::{PieceFlowVerifier, PieceVerificationReport};
use crate::importer::{DataCleaner, PieceTimelineNormalizer, RawRecord};
use crate::perf::PerfGuard;

// ==========================================
// EvaluationRequest - 评估请求
// ==========================================
/// 载荷形状: `{ "rows": [...], "config": {...}, "pieceTimeline": [...] }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest {
    pub rows: Vec<RawRecord>,
    pub config: QualityConfig,

    /// 权威件级时间线 (空 = 未提供,件级时间由批次区间估算)
    #[serde(default)]
    pub piece_timeline: Vec<RawRecord>,
}

impl EvaluationRequest {
    pub fn new(rows: Vec<RawRecord>, config: QualityConfig) -> Self {
        Self {
            rows,
            config,
            piece_timeline: Vec::new(),
        }
    }

    pub fn with_piece_timeline(mut self, piece_timeline: Vec<RawRecord>) -> Self {
        self.piece_timeline = piece_timeline;
        self
    }

    /// 从松散 JSON 载荷构建请求
    ///
    /// # 验证规则
    /// 1. 载荷必须为对象且包含 config
    /// 2. rows 必须为数组,且每个元素为对象
    /// 3. pieceTimeline 可缺省; 提供时同 rows 规则
    pub fn from_json(payload: &Value) -> ApiResult<Self> {
        let obj = payload
            .as_object()
            .ok_or_else(|| ApiError::InvalidInput("评估载荷必须是 JSON 对象".to_string()))?;

        let config_value = obj
            .get("config")
            .filter(|v| !v.is_null())
            .ok_or_else(|| ApiError::InvalidInput("缺少 config".to_string()))?;
        if !config_value.is_object() {
            return Err(ApiError::InvalidInput("config 必须是 JSON 对象".to_string()));
        }
        let config = QualityConfig::from_json_value(config_value.clone())?;

        let rows = records_of(obj.get("rows"), "rows")?
            .ok_or_else(|| ApiError::InvalidInput("缺少 rows".to_string()))?;
        let piece_timeline = records_of(obj.get("pieceTimeline"), "pieceTimeline")?.unwrap_or_default();

        Ok(Self {
            rows,
            config,
            piece_timeline,
        })
    }
}

/// 数组字段 → 记录列表 (None = 字段缺省或为 null)
fn records_of(value: Option<&Value>, field: &str) -> ApiResult<Option<Vec<RawRecord>>> {
    let items = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(ApiError::InvalidInput(format!("{} 必须是数组", field))),
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(map) => Ok(map.clone()),
            _ => Err(ApiError::ValidationError(format!(
                "{}[{}] 必须是 JSON 对象",
                field, index
            ))),
        })
        .collect::<ApiResult<Vec<_>>>()
        .map(Some)
}

// ==========================================
// QualityApi - 排产质量 API
// ==========================================
pub struct QualityApi {
    // 无状态
}

impl QualityApi {
    pub fn new() -> Self {
        Self {}
    }

    /// 评估一份排产
    ///
    /// # 返回
    /// - Ok(QualityReport): 质量报告 (含所有降级问题)
    /// - Err(ApiError::Config): 配置值无效
    pub fn evaluate(&self, request: &EvaluationRequest) -> ApiResult<QualityReport> {
        let _perf = PerfGuard::new("api_evaluate");
        request.config.validate()?;

        let report = QualityEvaluator::new(&request.config)
            .evaluate(&request.rows, &request.piece_timeline)?;

        info!(
            rows = request.rows.len(),
            piece_timeline_rows = request.piece_timeline.len(),
            score = report.score,
            status = ?report.status,
            "排产质量评估请求完成"
        );
        Ok(report)
    }

    /// 评估松散 JSON 载荷
    pub fn evaluate_json(&self, payload: &Value) -> ApiResult<QualityReport> {
        let request = EvaluationRequest::from_json(payload).map_err(|e| {
            warn!(error = %e, "评估载荷结构无效");
            e
        })?;
        self.evaluate(&request)
    }

    /// 件级重建 + 视图筛选
    pub fn reconstruct_pieces(
        &self,
        request: &EvaluationRequest,
        filter: &PieceFlowFilter,
    ) -> ApiResult<PieceFlow> {
        request.config.validate()?;
        let flow = QualityEvaluator::new(&request.config)
            .reconstruct(&request.rows, &request.piece_timeline)?;

        let events: Vec<_> = filter.apply(&flow.events).into_iter().cloned().collect();
        info!(
            total_pieces = flow.events.len(),
            matched_pieces = events.len(),
            estimated = flow.is_approximate,
            "件级重建查询完成"
        );

        Ok(PieceFlow {
            events,
            is_approximate: flow.is_approximate,
        })
    }

    /// 单独校验一条件级时间线
    ///
    /// 时间线中被剔除的行以 info 问题列在报告最前面,不影响 is_valid
    pub fn verify_piece_timeline(
        &self,
        timeline: &[RawRecord],
        config: &QualityConfig,
    ) -> ApiResult<PieceVerificationReport> {
        let _perf = PerfGuard::new("api_verify_piece_timeline");
        config.validate()?;
        let cleaner = DataCleaner::new(config.plant_offset()?);
        let normalized = PieceTimelineNormalizer::new(&cleaner).normalize(timeline);

        let verification = PieceFlowVerifier::new().verify(&normalized.events);
        let mut issues: Vec<_> = normalized
            .rejections
            .into_iter()
            .map(|rejection| rejection.into_issue())
            .collect();
        issues.extend(verification.issues);

        Ok(PieceVerificationReport {
            is_valid: verification.is_valid,
            issues,
        })
    }
}

impl Default for QualityApi {
    fn default() -> Self {
        Self::new()
    }
}
