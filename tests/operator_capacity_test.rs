// ==========================================
// 人员产能校验集成测试
// ==========================================
// 职责: 调机独占 / 看机模式 / 产能上限 的端到端场景
// ==========================================

mod helpers;

use helpers::test_data_builder::*;
use schedule_quality::domain::types::QualityStatus;
use schedule_quality::domain::IssueCode;
use schedule_quality::engine::QualityEvaluator;
use schedule_quality::importer::RawRecord;
use schedule_quality::QualityReport;

fn evaluate(rows: &[RawRecord]) -> QualityReport {
    let config = default_config();
    QualityEvaluator::new(&config).evaluate(rows, &[]).unwrap()
}

fn codes(report: &QualityReport) -> Vec<IssueCode> {
    report.issues.iter().map(|i| i.code).collect()
}

/// 每行调机由独立调机员完成,只考察生产人员
fn run_row(part: &str, machine: &str, person: &str, mode: &str, run_start: &str, run_end: &str) -> RawRecord {
    RowBuilder::new(part, "B01", 1)
        .machine(machine)
        .setup(&at("07:00"), run_start)
        .run(run_start, run_end)
        .setup_person(&format!("Setter {}", part))
        .production_person(person)
        .handle_mode(mode)
        .build()
}

#[test]
fn test_two_double_runs_within_capacity() {
    let rows = vec![
        run_row("PN1", "VMC 1", "Alice", "double", &at("08:30"), &at("09:30")),
        run_row("PN2", "VMC 2", "Alice", "Double Machine", &at("08:30"), &at("09:30")),
    ];
    let report = evaluate(&rows);
    assert!(report.issues.is_empty());
    assert_eq!(report.status, QualityStatus::Good);
}

#[test]
fn test_three_double_runs_exceed_capacity() {
    let rows = vec![
        run_row("PN1", "VMC 1", "Alice", "double", &at("08:30"), &at("09:30")),
        run_row("PN2", "VMC 2", "Alice", "double", &at("08:30"), &at("09:30")),
        run_row("PN3", "VMC 3", "Alice", "double", &at("08:30"), &at("09:30")),
    ];
    let report = evaluate(&rows);
    assert_eq!(codes(&report), vec![IssueCode::PersonRunCapacityExceeded]);

    let issue = &report.issues[0];
    assert!(issue.entity_refs.contains(&"Alice".to_string()));
    assert_eq!(issue.evidence.as_ref().unwrap()["runUnits"], 3);
}

#[test]
fn test_single_run_cannot_share_operator() {
    let rows = vec![
        run_row("PN1", "VMC 1", "Alice", "single", &at("08:30"), &at("09:30")),
        run_row("PN2", "VMC 2", "Alice", "double", &at("09:00"), &at("10:00")),
    ];
    let report = evaluate(&rows);
    assert_eq!(codes(&report), vec![IssueCode::PersonSingleModeOverlap]);

    let window = report.issues[0].time_window.unwrap();
    assert_eq!(window.start.format("%H:%M").to_string(), "09:00");
    assert_eq!(window.end.format("%H:%M").to_string(), "09:30");
}

#[test]
fn test_back_to_back_single_runs_are_fine() {
    let rows = vec![
        run_row("PN1", "VMC 1", "Alice", "single", &at("08:30"), &at("09:30")),
        run_row("PN2", "VMC 2", "Alice", "single", &at("09:30"), &at("10:30")),
    ];
    assert!(evaluate(&rows).issues.is_empty());
}

#[test]
fn test_parallel_setups_by_same_person() {
    let rows = vec![
        RowBuilder::new("PN1", "B01", 1)
            .machine("VMC 1")
            .window(&at("08:00"), &at("08:30"), &at("09:30"))
            .setup_person("Bob")
            .production_person("Alice")
            .build(),
        RowBuilder::new("PN2", "B01", 1)
            .machine("VMC 2")
            .window(&at("08:15"), &at("08:45"), &at("09:45"))
            .setup_person("Bob")
            .production_person("Carol")
            .build(),
    ];
    let report = evaluate(&rows);
    assert_eq!(codes(&report), vec![IssueCode::OperatorSetupOverlap]);
}

#[test]
fn test_setup_while_running_production() {
    let rows = vec![
        RowBuilder::new("PN1", "B01", 1)
            .machine("VMC 1")
            .window(&at("08:00"), &at("08:30"), &at("09:30"))
            .setup_person("Bob")
            .build(),
        RowBuilder::new("PN2", "B01", 1)
            .machine("VMC 2")
            .window(&at("07:00"), &at("08:00"), &at("09:00"))
            .production_person("Bob")
            .handle_mode("double")
            .build(),
    ];
    let report = evaluate(&rows);
    assert_eq!(codes(&report), vec![IssueCode::OperatorOverlap]);
    assert_eq!(
        report.issues[0].entity_refs,
        vec!["PN1/B01/OP1", "PN2/B01/OP1", "Bob"]
    );
}

#[test]
fn test_unassigned_operator_is_still_checked() {
    // 未填写人员的两行共用 Unassigned: 调机并发 + SINGLE 生产并发
    let rows = vec![
        RowBuilder::new("PN1", "B01", 1)
            .machine("VMC 1")
            .window(&at("08:00"), &at("08:30"), &at("09:30"))
            .build(),
        RowBuilder::new("PN2", "B01", 1)
            .machine("VMC 2")
            .window(&at("08:00"), &at("08:30"), &at("09:30"))
            .build(),
    ];
    let report = evaluate(&rows);
    assert_eq!(
        codes(&report),
        vec![IssueCode::OperatorSetupOverlap, IssueCode::PersonSingleModeOverlap]
    );
    assert!(report
        .issues
        .iter()
        .all(|i| i.entity_refs.contains(&"Unassigned".to_string())));
    assert_eq!(report.status, QualityStatus::Bad);
}

#[test]
fn test_explicit_unassigned_name_is_same_bucket() {
    let rows = vec![
        run_row("PN1", "VMC 1", "Unassigned", "single", &at("08:30"), &at("09:30")),
        RowBuilder::new("PN2", "B01", 1)
            .machine("VMC 2")
            .setup(&at("07:00"), &at("08:30"))
            .run(&at("08:30"), &at("09:30"))
            .setup_person("Setter PN2")
            .build(),
    ];
    assert_eq!(codes(&evaluate(&rows)), vec![IssueCode::PersonSingleModeOverlap]);
}
