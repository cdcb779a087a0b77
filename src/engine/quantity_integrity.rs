// ==========================================
// 机加工排产看板 - 数量守恒校验
// ==========================================
// 职责: 同一零件的批次数量之和必须等于订单数量
// 口径: 订单数量取该零件首个非零值; 批次数量取该批次首个非零值
// ==========================================

use crate::domain::issue::{Issue, IssueCode};
use crate::domain::schedule::ScheduleRow;
use serde_json::json;
use std::collections::BTreeMap;
use tracing::debug;

/// 零件数量台账
#[derive(Debug, Default)]
struct PartLedger {
    expected_qty: Option<i64>,

    /// (batch, qty) 按首次出现顺序
    batches: Vec<(String, i64)>,
}

pub struct QuantityIntegrityChecker {
    // 无状态
}

impl QuantityIntegrityChecker {
    pub fn new() -> Self {
        Self {}
    }

    pub fn check(&self, rows: &[ScheduleRow]) -> Vec<Issue> {
        let mut ledgers: BTreeMap<&str, PartLedger> = BTreeMap::new();

        for row in rows {
            let ledger = ledgers.entry(row.part.as_str()).or_default();
            if row.order_qty > 0 && ledger.expected_qty.is_none() {
                ledger.expected_qty = Some(row.order_qty);
            }
            if row.batch_qty > 0 && !ledger.batches.iter().any(|(b, _)| b == &row.batch) {
                ledger.batches.push((row.batch.clone(), row.batch_qty));
            }
        }

        let mut issues = Vec::new();
        for (part, ledger) in &ledgers {
            let Some(expected_qty) = ledger.expected_qty else {
                continue;
            };
            if ledger.batches.is_empty() {
                continue;
            }

            let actual_qty: i64 = ledger.batches.iter().map(|(_, qty)| qty).sum();
            if actual_qty == expected_qty {
                continue;
            }

            debug!(part = %part, expected_qty, actual_qty, "批次数量与订单数量不一致");
            issues.push(
                Issue::new(
                    IssueCode::QuantityMismatch,
                    format!(
                        "{} batch split total {} != order quantity {}.",
                        part, actual_qty, expected_qty
                    ),
                )
                .with_refs([*part])
                .with_evidence(json!({
                    "expectedQty": expected_qty,
                    "actualQty": actual_qty,
                    "batches": ledger
                        .batches
                        .iter()
                        .map(|(batch, qty)| json!({"batch": batch, "qty": qty}))
                        .collect::<Vec<_>>(),
                })),
            );
        }

        issues
    }
}

impl Default for QuantityIntegrityChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schedule::TimeInterval;
    use crate::domain::types::HandleMode;
    use chrono::{Duration, NaiveDate};

    fn create_test_row(part: &str, batch: &str, op: u32, batch_qty: i64, order_qty: i64) -> ScheduleRow {
        let t = NaiveDate::from_ymd_opt(2026, 2, 22)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        ScheduleRow {
            row_index: 0,
            part: part.to_string(),
            batch: batch.to_string(),
            operation_seq: op,
            machine: "VMC 1".to_string(),
            setup_person: "Unassigned".to_string(),
            production_person: "Unassigned".to_string(),
            handle_mode: HandleMode::Single,
            setup: TimeInterval::new(t, t + Duration::minutes(10)),
            run: TimeInterval::new(t + Duration::minutes(10), t + Duration::hours(1)),
            due_date: None,
            batch_qty,
            order_qty,
            status: "OK".to_string(),
        }
    }

    #[test]
    fn test_mismatch_reports_totals() {
        let rows = vec![
            create_test_row("PN1", "B01", 1, 40, 100),
            create_test_row("PN1", "B01", 2, 40, 100),
            create_test_row("PN1", "B02", 1, 40, 100),
        ];
        let issues = QuantityIntegrityChecker::new().check(&rows);
        assert_eq!(issues.len(), 1);
        let evidence = issues[0].evidence.as_ref().unwrap();
        assert_eq!(evidence["expectedQty"], 100);
        assert_eq!(evidence["actualQty"], 80);
        assert_eq!(evidence["batches"].as_array().unwrap().len(), 2);
        assert_eq!(issues[0].entity_refs, vec!["PN1"]);
    }

    #[test]
    fn test_balanced_and_unknown_order_skipped() {
        let rows = vec![
            create_test_row("PN1", "B01", 1, 60, 100),
            create_test_row("PN1", "B02", 1, 40, 0),
            // 无订单数量: 不校验
            create_test_row("PN2", "B01", 1, 10, 0),
        ];
        assert!(QuantityIntegrityChecker::new().check(&rows).is_empty());
    }
}
