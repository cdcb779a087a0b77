use std::cell::Cell;
use std::time::Instant;

thread_local! {
    static PERF_DEPTH: Cell<u32> = Cell::new(0);
}

/// 当前线程上仍未结束的 PerfGuard 层数
pub fn active_depth() -> u32 {
    PERF_DEPTH.with(|d| d.get())
}

/// 性能统计 Guard：离开作用域时记录 elapsed_ms 与嵌套层级
///
/// 使用方式：
/// ```ignore
/// let _perf = schedule_quality::perf::PerfGuard::new("evaluate_schedule_quality");
/// // do work...
/// ```
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
    depth: u32,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        let depth = PERF_DEPTH.with(|d| {
            let next = d.get().saturating_add(1);
            d.set(next);
            next
        });
        Self {
            op,
            start: Instant::now(),
            depth,
        }
    }

    pub fn op(&self) -> &'static str {
        self.op
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let elapsed_ms = self.start.elapsed().as_millis() as u64;
        let elapsed_us = self.start.elapsed().as_micros() as u64;

        tracing::info!(
            target: "perf",
            op = self.op,
            depth = self.depth,
            elapsed_ms,
            elapsed_us,
            "done"
        );

        PERF_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}
