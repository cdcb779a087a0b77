// ==========================================
// 件级流转重建集成测试
// ==========================================
// 职责: 批次区间均分 / 权威时间线 / 视图筛选
// ==========================================

mod helpers;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use helpers::test_data_builder::*;
use proptest::prelude::*;
use schedule_quality::api::{EvaluationRequest, QualityApi};
use schedule_quality::domain::types::{HandleMode, QualityStatus};
use schedule_quality::domain::{IssueCode, ScheduleRow, TimeInterval};
use schedule_quality::engine::{PieceFlowFilter, PieceFlowReconstructor, QualityEvaluator};

fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 2, 22)
        .unwrap()
        .and_hms_opt(6, 0, 0)
        .unwrap()
}

fn create_test_row(offset_minutes: i64, run_ms: i64, qty: i64) -> ScheduleRow {
    let start = base_time() + Duration::minutes(offset_minutes);
    ScheduleRow {
        row_index: 0,
        part: "PN1".to_string(),
        batch: "B01".to_string(),
        operation_seq: 1,
        machine: "VMC 1".to_string(),
        setup_person: "Unassigned".to_string(),
        production_person: "Unassigned".to_string(),
        handle_mode: HandleMode::Single,
        setup: TimeInterval::new(start - Duration::minutes(30), start),
        run: TimeInterval::new(start, start + Duration::milliseconds(run_ms)),
        due_date: None,
        batch_qty: qty,
        order_qty: 0,
        status: "OK".to_string(),
    }
}

proptest! {
    #[test]
    fn prop_slices_cover_run_without_gaps(
        offset in 0i64..10_000,
        run_minutes in 1i64..5_000,
        qty in 1i64..400,
    ) {
        let row = create_test_row(offset, run_minutes * 60_000, qty);
        let events = PieceFlowReconstructor::new().slice_row(&row);

        prop_assert_eq!(events.len(), qty as usize);
        prop_assert_eq!(events[0].interval.start, row.run.start);
        prop_assert_eq!(events[events.len() - 1].interval.end, row.run.end);

        for (index, event) in events.iter().enumerate() {
            prop_assert_eq!(event.piece as usize, index + 1);
            prop_assert!(event.interval.start <= event.interval.end);
            prop_assert!(row.run.contains(event.interval.start) || event.interval.start == row.run.end);
        }
        for pair in events.windows(2) {
            prop_assert_eq!(pair[0].interval.end, pair[1].interval.start);
        }
    }
}

#[test]
fn test_short_run_still_splits_evenly() {
    // 10 件共 5 分钟: 每件 30 秒,不足 60 秒仍按均分切
    let row = create_test_row(0, 5 * 60_000, 10);
    let events = PieceFlowReconstructor::new().slice_row(&row);
    assert_eq!(events.len(), 10);
    assert_eq!(events[0].interval.duration_ms(), 30_000);
    assert_eq!(events[9].interval.end, row.run.end);
}

#[test]
fn test_estimated_flow_marks_approximate() {
    let rows = vec![RowBuilder::new("PN1", "B01", 1)
        .window(&at("08:00"), &at("08:30"), &at("09:30"))
        .batch_qty(4)
        .build()];
    let config = default_config();
    let flow = QualityEvaluator::new(&config).reconstruct(&rows, &[]).unwrap();

    assert!(flow.is_approximate);
    let ids: Vec<&str> = flow.events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["PN1-B01-op1-p1", "PN1-B01-op1-p2", "PN1-B01-op1-p3", "PN1-B01-op1-p4"]
    );
    assert_eq!(flow.events[1].interval.duration_ms(), 15 * 60_000);
}

#[test]
fn test_authoritative_timeline_used_for_precedence() {
    let rows = vec![
        RowBuilder::new("PN1", "B01", 1)
            .window(&at("08:00"), &at("08:30"), &at("09:30"))
            .build(),
        RowBuilder::new("PN1", "B01", 2)
            .machine("VMC 2")
            .window(&at("09:00"), &at("09:30"), &at("10:30"))
            .build(),
    ];
    // OP2 在 OP1 之前开工; 第三行区间倒置,被剔除
    let timeline = vec![
        piece_row("B01", 1, 1, "VMC 1", &at("09:00"), &at("09:30")),
        piece_row("B01", 1, 2, "VMC 2", &at("08:45"), &at("09:15")),
        piece_row("B01", 2, 1, "VMC 1", &at("10:00"), &at("09:00")),
    ];
    let config = default_config();
    let report = QualityEvaluator::new(&config).evaluate(&rows, &timeline).unwrap();

    assert!(!report.parameters.piece_timing_estimated);
    assert_eq!(report.parameters.piece_rows, 2);

    let rejected: Vec<_> = report
        .issues
        .iter()
        .filter(|i| i.code == IssueCode::PieceTimelineRowRejected)
        .collect();
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].entity_refs, vec!["pieceTimeline[2]"]);

    let precedence: Vec<_> = report
        .issues
        .iter()
        .filter(|i| i.code == IssueCode::PiecePrecedenceViolation)
        .collect();
    assert_eq!(precedence.len(), 1);
    assert_eq!(report.status, QualityStatus::Bad);
}

#[test]
fn test_rejected_timeline_rows_only_cost_info() {
    let rows = vec![RowBuilder::new("PN1", "B01", 1)
        .window(&at("08:00"), &at("08:30"), &at("09:30"))
        .build()];
    let timeline = vec![
        piece_row("B01", 1, 1, "VMC 1", &at("08:30"), &at("09:30")),
        piece_row("B01", 2, 1, "VMC 1", "not a time", &at("09:30")),
    ];
    let config = default_config();
    let report = QualityEvaluator::new(&config).evaluate(&rows, &timeline).unwrap();

    assert_eq!(report.status, QualityStatus::Good);
    assert_eq!(report.score, 99);
    assert_eq!(report.summary.info, 1);
}

#[test]
fn test_reconstruct_pieces_with_filter() {
    let rows = vec![
        RowBuilder::new("PN1", "B01", 1)
            .machine("VMC2")
            .window(&at("08:00"), &at("08:30"), &at("09:30"))
            .batch_qty(3)
            .build(),
        RowBuilder::new("PN1", "B01", 2)
            .machine("VMC 3")
            .window(&at("09:00"), &at("09:30"), &at("10:30"))
            .batch_qty(3)
            .build(),
        RowBuilder::new("PN2", "B01", 1)
            .machine("VMC 2")
            .window(&at("10:00"), &at("10:30"), &at("11:30"))
            .batch_qty(2)
            .build(),
    ];
    let request = EvaluationRequest::new(rows, default_config());
    let api = QualityApi::new();

    let all = api
        .reconstruct_pieces(&request, &PieceFlowFilter::default())
        .unwrap();
    assert_eq!(all.events.len(), 8);

    let filter = PieceFlowFilter {
        part: Some("PN1".to_string()),
        machine: Some("VMC 02".to_string()),
        piece_from: Some(2),
        ..Default::default()
    };
    let filtered = api.reconstruct_pieces(&request, &filter).unwrap();
    let ids: Vec<&str> = filtered.events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["PN1-B01-op1-p2", "PN1-B01-op1-p3"]);

    let all_parts = PieceFlowFilter {
        part: Some("ALL".to_string()),
        operation_seq: Some(1),
        ..Default::default()
    };
    assert_eq!(api.reconstruct_pieces(&request, &all_parts).unwrap().events.len(), 5);
}
