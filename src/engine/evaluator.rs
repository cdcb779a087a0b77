// ==========================================
// 机加工排产看板 - 排产质量评估编排器
// ==========================================
// 用途: 协调规范化与各校验引擎的执行顺序
// 流程:
// 1. 规范化: 排产行 / 日历约束 / 调机时间窗 / 权威件级时间线
// 2. 件级重建
// 3. 资源索引 → 机床冲突 / 人员产能
// 4. 路线 (批次 + 件级) / 数量 / 外部约束
// 5. 去重 → 评分 → 利用率/交付/流转指标 → 报告
// ==========================================
// 红线: 输入数据问题只降级为 issue,不中断评估
// ==========================================

use crate::config::{ConfigResult, QualityConfig, SetupWindow};
use crate::domain::calendar::{Holiday, MachineBreakdown};
use crate::domain::issue::Issue;
use crate::domain::piece::{PieceEvent, PieceFlow};
use crate::domain::report::{QualityReport, ReportParameters};
use crate::domain::schedule::ScheduleRow;
use crate::engine::external_constraint::{resolve_setup_window, ExternalConstraintChecker};
use crate::engine::flow_kpi::FlowStats;
use crate::engine::interval_index::{build_machine_index, build_operator_index};
use crate::engine::machine_conflict::MachineConflictDetector;
use crate::engine::operator_capacity::OperatorCapacityAnalyzer;
use crate::engine::piece_flow::PieceFlowReconstructor;
use crate::engine::quantity_integrity::QuantityIntegrityChecker;
use crate::engine::route_precedence::RoutePrecedenceChecker;
use crate::engine::scorer::{IssueCollector, QualityScorer};
use crate::engine::utilization::{UtilizationCalendar, UtilizationStats};
use crate::importer::{normalize_calendar, PieceTimelineNormalizer, RawRecord, RowNormalizer};
use crate::perf::PerfGuard;
use tracing::{debug, info};

// ==========================================
// PreparedSchedule - 规范化后的评估输入
// ==========================================
#[derive(Debug, Clone)]
pub struct PreparedSchedule {
    pub rows: Vec<ScheduleRow>,
    pub input_rows: usize,
    pub holidays: Vec<Holiday>,
    pub breakdowns: Vec<MachineBreakdown>,
    pub setup_window: Option<SetupWindow>,

    /// None = 未提供权威时间线
    pub timeline: Option<Vec<PieceEvent>>,

    /// 规范化阶段产生的问题 (剔除行 / 无效日历项 / 无效时间窗)
    pub issues: Vec<Issue>,
}

// ==========================================
// QualityEvaluator - 排产质量评估器
// ==========================================
pub struct QualityEvaluator<'c> {
    config: &'c QualityConfig,
    reconstructor: PieceFlowReconstructor,
    machine: MachineConflictDetector,
    operator: OperatorCapacityAnalyzer,
    route: RoutePrecedenceChecker,
    quantity: QuantityIntegrityChecker,
    scorer: QualityScorer,
}

impl<'c> QualityEvaluator<'c> {
    /// 创建评估器
    ///
    /// # 参数
    /// - config: 配置快照,评估期间只读
    pub fn new(config: &'c QualityConfig) -> Self {
        Self {
            config,
            reconstructor: PieceFlowReconstructor::new(),
            machine: MachineConflictDetector::new(),
            operator: OperatorCapacityAnalyzer::new(),
            route: RoutePrecedenceChecker::new(),
            quantity: QuantityIntegrityChecker::new(),
            scorer: QualityScorer::new(),
        }
    }

    /// 规范化全部输入
    ///
    /// # 参数
    /// - rows: 原始排产行
    /// - piece_timeline: 原始权威件级时间线 (空 = 未提供)
    ///
    /// # 错误
    /// 仅当配置中的工厂时区偏移无效时返回错误
    pub fn prepare(&self, rows: &[RawRecord], piece_timeline: &[RawRecord]) -> ConfigResult<PreparedSchedule> {
        let _perf = PerfGuard::new("prepare_schedule");
        let offset = self.config.plant_offset()?;

        let normalizer = RowNormalizer::new(offset, self.config.profile_mode);
        let normalized = normalizer.normalize(rows);
        let mut issues: Vec<Issue> = normalized
            .rejections
            .into_iter()
            .map(|rejection| rejection.into_issue())
            .collect();

        let calendar = normalize_calendar(
            normalizer.cleaner(),
            &self.config.holidays,
            &self.config.breakdowns,
        );
        issues.extend(calendar.issues);

        let (setup_window, window_issue) = resolve_setup_window(&self.config.setup_window);
        issues.extend(window_issue);

        let timeline = if piece_timeline.is_empty() {
            None
        } else {
            let normalized_timeline = PieceTimelineNormalizer::new(normalizer.cleaner()).normalize(piece_timeline);
            issues.extend(
                normalized_timeline
                    .rejections
                    .into_iter()
                    .map(|rejection| rejection.into_issue()),
            );
            Some(normalized_timeline.events)
        };

        debug!(
            valid_rows = normalized.rows.len(),
            holidays = calendar.holidays.len(),
            breakdowns = calendar.breakdowns.len(),
            setup_window = ?setup_window.map(|w| w.to_string()),
            authoritative_pieces = ?timeline.as_ref().map(Vec::len),
            normalization_issues = issues.len(),
            "评估输入规范化完成"
        );

        Ok(PreparedSchedule {
            rows: normalized.rows,
            input_rows: normalized.input_rows,
            holidays: calendar.holidays,
            breakdowns: calendar.breakdowns,
            setup_window,
            timeline,
            issues,
        })
    }

    /// 件级重建 (不做校验)
    pub fn reconstruct(&self, rows: &[RawRecord], piece_timeline: &[RawRecord]) -> ConfigResult<PieceFlow> {
        let prepared = self.prepare(rows, piece_timeline)?;
        Ok(self
            .reconstructor
            .reconstruct(&prepared.rows, prepared.timeline.as_deref()))
    }

    /// 执行一次完整评估
    ///
    /// 同一输入多次评估得到相同报告
    pub fn evaluate(&self, rows: &[RawRecord], piece_timeline: &[RawRecord]) -> ConfigResult<QualityReport> {
        let _perf = PerfGuard::new("evaluate_schedule_quality");
        let prepared = self.prepare(rows, piece_timeline)?;
        Ok(self.evaluate_prepared(prepared))
    }

    /// 对规范化后的输入执行校验与评分
    pub fn evaluate_prepared(&self, prepared: PreparedSchedule) -> QualityReport {
        let PreparedSchedule {
            rows,
            input_rows,
            holidays,
            breakdowns,
            setup_window,
            timeline,
            issues: normalization_issues,
        } = prepared;

        let mut collector = IssueCollector::new();
        collector.extend(normalization_issues);

        // ===== 件级重建 =====
        let flow = self.reconstructor.reconstruct(&rows, timeline.as_deref());

        // ===== 资源冲突 =====
        {
            let _perf = PerfGuard::new("resource_conflicts");
            let machine_index = build_machine_index(&rows);
            collector.extend(self.machine.find_machine_overlaps(&machine_index));
            let operator_index = build_operator_index(&rows);
            collector.extend(self.operator.find_operator_violations(&operator_index));
        }

        // ===== 路线 / 数量 / 外部约束 =====
        collector.extend(self.route.check_batches(&rows));
        collector.extend(self.route.check_pieces(&flow.events));
        collector.extend(self.quantity.check(&rows));
        let external = ExternalConstraintChecker::new(
            &holidays,
            &breakdowns,
            setup_window,
            self.config.profile_mode,
        );
        collector.extend(external.check(&rows));

        // ===== 评分与报告 =====
        let issues = collector.into_issues();
        let summary = self.scorer.summarize(&issues);
        let score = self.scorer.score(&summary);
        let status = self.scorer.status(&summary);
        let utilization = UtilizationStats::collect(
            &rows,
            &UtilizationCalendar {
                holidays: &holidays,
                breakdowns: &breakdowns,
                setup_window,
                production_windows: &self.config.production_windows,
                profile_mode: self.config.profile_mode,
            },
        );
        let kpi = FlowStats::collect(&rows, &flow.events).to_kpi(score, &utilization);

        info!(
            operation_rows = input_rows,
            valid_rows = rows.len(),
            piece_rows = flow.events.len(),
            critical = summary.critical,
            warning = summary.warning,
            info = summary.info,
            score,
            status = ?status,
            "排产质量评估完成"
        );

        QualityReport {
            status,
            score,
            kpi,
            issues,
            parameters: ReportParameters {
                setup_window: self.config.setup_window.clone(),
                breakdown_count: self.config.breakdowns.len(),
                holiday_count: self.config.holidays.len(),
                valid_breakdown_count: breakdowns.len(),
                valid_holiday_count: holidays.len(),
                operation_rows: input_rows,
                piece_rows: flow.events.len(),
                piece_timing_estimated: flow.is_approximate,
                profile_mode: self.config.profile_mode,
            },
            summary,
        }
    }
}
