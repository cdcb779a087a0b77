// ==========================================
// 机加工排产看板 - 日志
// ==========================================
// 职责: tracing-subscriber 装配 (文本 / JSON 两种输出)
// 级别由 RUST_LOG 控制,perf 目标单独可调
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// 初始化日志系统
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器（默认: info）
///   例如: RUST_LOG=debug 或 RUST_LOG=schedule_quality=trace,perf=info
///
/// # 示例
/// ```no_run
/// use schedule_quality::logging;
/// logging::init();
/// ```
pub fn init() {
    init_with_format(LogFormat::Text);
}

/// 按指定格式初始化日志系统
///
/// 日志写到 stderr,stdout 只留给报告输出
pub fn init_with_format(format: LogFormat) {
    // 从环境变量读取日志级别，默认为 info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// 测试用日志: 本 crate 输出 debug,perf 计时降到 warn
///
/// 可重复调用,已初始化时忽略
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("schedule_quality=debug,perf=warn"))
        .with_test_writer()
        .try_init();
}
