// ==========================================
// 机加工排产看板 - 命令行入口
// ==========================================
// 子命令: evaluate / pieces / verify-pieces
// 报告输出到 stdout,日志输出到 stderr
// ==========================================

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, GlobalOpts};
pub use commands::{load_request, run, EXIT_REJECTED};
