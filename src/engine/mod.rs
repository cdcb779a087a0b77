// ==========================================
// 机加工排产看板 - 引擎层
// ==========================================
// 职责: 件级重建 + 各项校验规则 + 评分
// 红线: 引擎只读输入,所有规则必须输出可定位的 issue
// ==========================================

pub mod evaluator;
pub mod external_constraint;
pub mod flow_kpi;
pub mod interval_index;
pub mod machine_conflict;
pub mod operator_capacity;
pub mod piece_flow;
pub mod piece_verifier;
pub mod quantity_integrity;
pub mod route_precedence;
pub mod scorer;
pub mod utilization;

// 重导出核心引擎
pub use evaluator::{PreparedSchedule, QualityEvaluator};
pub use external_constraint::{resolve_setup_window, ExternalConstraintChecker};
pub use flow_kpi::FlowStats;
pub use interval_index::{build_machine_index, build_operator_index, IntervalEntry, ResourceIndex};
pub use machine_conflict::MachineConflictDetector;
pub use operator_capacity::OperatorCapacityAnalyzer;
pub use piece_flow::{PieceFlowFilter, PieceFlowReconstructor, MIN_PIECE_MS};
pub use piece_verifier::{verify_piece_flow, PieceFlowVerifier, PieceVerificationReport};
pub use quantity_integrity::QuantityIntegrityChecker;
pub use route_precedence::{group_by_batch, BatchKey, RoutePrecedenceChecker};
pub use scorer::{IssueCollector, QualityScorer};
pub use utilization::{machine_lanes, UtilizationCalendar, UtilizationStats, MACHINE_LANE_COUNT};
