//! 子命令实现

use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, info};

use crate::api::{EvaluationRequest, QualityApi};
use crate::cli::args::{Cli, Commands, GlobalOpts, PiecesArgs, ScheduleInput, VerifyPiecesArgs};
use crate::config::QualityConfig;
use crate::domain::types::QualityStatus;
use crate::importer::RawRecord;

/// 报告状态为 BAD / 时间线无效时的退出码
pub const EXIT_REJECTED: u8 = 2;

pub fn run(cli: Cli) -> Result<ExitCode> {
    let api = QualityApi::new();
    match cli.command {
        Commands::Evaluate(input) => evaluate(&api, &input, &cli.global),
        Commands::Pieces(args) => pieces(&api, &args, &cli.global),
        Commands::VerifyPieces(args) => verify_pieces(&api, &args, &cli.global),
    }
}

fn evaluate(api: &QualityApi, input: &ScheduleInput, global: &GlobalOpts) -> Result<ExitCode> {
    let request = load_request(input)?;
    let report = api.evaluate(&request).context("排产质量评估失败")?;
    print_json(&report, global.pretty)?;

    Ok(if report.status == QualityStatus::Bad {
        ExitCode::from(EXIT_REJECTED)
    } else {
        ExitCode::SUCCESS
    })
}

fn pieces(api: &QualityApi, args: &PiecesArgs, global: &GlobalOpts) -> Result<ExitCode> {
    let request = load_request(&args.schedule)?;
    let flow = api
        .reconstruct_pieces(&request, &args.filter())
        .context("件级流转重建失败")?;
    print_json(&flow, global.pretty)?;
    Ok(ExitCode::SUCCESS)
}

fn verify_pieces(api: &QualityApi, args: &VerifyPiecesArgs, global: &GlobalOpts) -> Result<ExitCode> {
    let timeline = records_from(read_json(&args.input)?, "pieceTimeline")?;
    let config = match &args.config {
        Some(path) => QualityConfig::from_path(path)
            .with_context(|| format!("加载配置失败: {}", path.display()))?,
        None => QualityConfig::default(),
    };

    let report = api
        .verify_piece_timeline(&timeline, &config)
        .context("件级时间线校验失败")?;
    print_json(&report, global.pretty)?;

    Ok(if report.is_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_REJECTED)
    })
}

/// 组装评估请求
///
/// # 规则
/// 1. 输入为数组: 视为排产行,配置取 --config 或缺省
/// 2. 输入为对象: 视为完整载荷; --config / --pieces 覆盖对应字段
/// 3. 最后应用环境变量覆盖
pub fn load_request(input: &ScheduleInput) -> Result<EvaluationRequest> {
    let mut payload = match read_json(&input.input)? {
        Value::Array(rows) => {
            let mut obj = Map::new();
            obj.insert("rows".to_string(), Value::Array(rows));
            obj
        }
        Value::Object(obj) => obj,
        _ => bail!("{}: 输入必须是 JSON 数组或对象", input.input.display()),
    };

    if let Some(path) = &input.config {
        payload.insert("config".to_string(), read_json(path)?);
    }
    payload.entry("config".to_string()).or_insert_with(|| json!({}));

    if let Some(path) = &input.pieces {
        payload.insert("pieceTimeline".to_string(), read_json(path)?);
    }

    let mut request = EvaluationRequest::from_json(&Value::Object(payload))
        .with_context(|| format!("输入载荷无效: {}", input.input.display()))?;
    request
        .config
        .apply_env_overrides()
        .context("环境变量覆盖配置失败")?;

    debug!(
        rows = request.rows.len(),
        piece_timeline_rows = request.piece_timeline.len(),
        setup_window = %request.config.setup_window,
        profile_mode = %request.config.profile_mode,
        "评估请求已加载"
    );
    Ok(request)
}

fn read_json(path: &Path) -> Result<Value> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("读取文件失败: {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("JSON 解析失败: {}", path.display()))?;
    info!(path = %path.display(), bytes = raw.len(), "已读取输入文件");
    Ok(value)
}

fn records_from(value: Value, field: &str) -> Result<Vec<RawRecord>> {
    let Value::Array(items) = value else {
        bail!("{} 必须是 JSON 数组", field);
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(map) => Ok(map),
            _ => bail!("{}[{}] 必须是 JSON 对象", field, index),
        })
        .collect()
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", text);
    Ok(())
}
