// ==========================================
// 机加工排产看板 - 质量校验命令行
// ==========================================

use clap::Parser;
use schedule_quality::cli::{self, Cli};
use schedule_quality::logging;
use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    logging::init_with_format(cli.global.log_format.into());

    tracing::info!(version = schedule_quality::VERSION, "{} 启动", schedule_quality::APP_NAME);
    cli::run(cli)
}
