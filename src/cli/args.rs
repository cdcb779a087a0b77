//! 命令行参数定义 (clap derive)

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::engine::PieceFlowFilter;
use crate::logging::LogFormat;

#[derive(Parser, Debug)]
#[command(name = "schedule-quality")]
#[command(author, version, about = "机加工排产质量校验与件级流转重建")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(Args, Clone, Debug)]
pub struct GlobalOpts {
    /// 日志格式 (日志写到 stderr)
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub log_format: LogFormatArg,

    /// 输出格式化的 JSON
    #[arg(long, global = true)]
    pub pretty: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormatArg {
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 评估一份排产,输出质量报告 (BAD 时退出码为 2)
    Evaluate(ScheduleInput),

    /// 件级流转重建,按条件筛选后输出
    Pieces(PiecesArgs),

    /// 单独校验一条件级时间线 (无效时退出码为 2)
    VerifyPieces(VerifyPiecesArgs),
}

/// 排产输入文件
#[derive(Args, Clone, Debug)]
pub struct ScheduleInput {
    /// 排产行 JSON 数组,或 {rows, config, pieceTimeline} 载荷
    #[arg(long, short = 'i')]
    pub input: PathBuf,

    /// 配置 JSON 文件 (覆盖载荷中的 config)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// 权威件级时间线 JSON 数组
    #[arg(long)]
    pub pieces: Option<PathBuf>,
}

#[derive(Args, Clone, Debug)]
pub struct PiecesArgs {
    #[command(flatten)]
    pub schedule: ScheduleInput,

    /// 零件号 ("ALL" 不限)
    #[arg(long)]
    pub part: Option<String>,

    #[arg(long)]
    pub batch: Option<String>,

    /// 机床 ("VMC2" 与 "VMC 2" 等价)
    #[arg(long)]
    pub machine: Option<String>,

    /// 工序号
    #[arg(long)]
    pub op: Option<u32>,

    /// 件号下限 (含)
    #[arg(long)]
    pub from: Option<u32>,

    /// 件号上限 (含)
    #[arg(long)]
    pub to: Option<u32>,
}

impl PiecesArgs {
    pub fn filter(&self) -> PieceFlowFilter {
        PieceFlowFilter {
            part: self.part.clone(),
            piece_from: self.from,
            piece_to: self.to,
            operation_seq: self.op,
            machine: self.machine.clone(),
            batch: self.batch.clone(),
        }
    }
}

#[derive(Args, Clone, Debug)]
pub struct VerifyPiecesArgs {
    /// 件级时间线 JSON 数组
    #[arg(long, short = 'i')]
    pub input: PathBuf,

    /// 配置 JSON 文件 (仅使用 plantUtcOffsetMinutes)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_pieces_filter() {
        let cli = Cli::parse_from([
            "schedule-quality",
            "pieces",
            "--input",
            "rows.json",
            "--part",
            "PN1",
            "--machine",
            "VMC2",
            "--from",
            "2",
        ]);
        let Commands::Pieces(args) = cli.command else {
            panic!("expected pieces subcommand");
        };
        let filter = args.filter();
        assert_eq!(filter.part.as_deref(), Some("PN1"));
        assert_eq!(filter.machine.as_deref(), Some("VMC2"));
        assert_eq!(filter.piece_from, Some(2));
        assert_eq!(filter.piece_to, None);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["schedule-quality", "evaluate", "-i", "rows.json", "--pretty"]);
        assert!(cli.global.pretty);
        assert_eq!(cli.global.log_format, LogFormatArg::Text);
    }
}
