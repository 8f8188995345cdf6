// ==========================================
// OpenSILEX 事件导入 - 命令行入口
// ==========================================
// 用法:
//   silex-event-import validate <file.csv> [--move] [--creator URI] [--db PATH]
//   silex-event-import import   <file.csv> [--move] [--creator URI] [--db PATH]
//
// validate: 输出 JSON 校验报告（不落库）
// import:   先校验取得令牌，再以令牌提交（复用已解析的草稿）
// 退出码: 0 = 成功；1 = 存在校验错误；2 = 参数错误
// ==========================================

use silex_event_import::api::{CsvValidationResponse, EventImportApi};
use silex_event_import::db::get_default_db_path;
use silex_event_import::domain::{EventKind, ResponseStatus};
use silex_event_import::logging;
use std::error::Error;

const DEFAULT_CREATOR: &str = "http://www.opensilex.org/users/admin";

const USAGE: &str = "用法: silex-event-import <validate|import> <file.csv> [--move] [--creator URI] [--db PATH]";

#[derive(Debug)]
struct CliArgs {
    command: String,
    file: String,
    kind: EventKind,
    creator: String,
    db_path: String,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<CliArgs, String> {
    let mut positional = Vec::new();
    let mut kind = EventKind::Event;
    let mut creator = DEFAULT_CREATOR.to_string();
    let mut db_path = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--move" => kind = EventKind::Move,
            "--creator" => creator = args.next().ok_or("--creator 缺少参数")?,
            "--db" => db_path = Some(args.next().ok_or("--db 缺少参数")?),
            other if other.starts_with("--") => return Err(format!("未知选项: {}", other)),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let command = positional.next().ok_or(USAGE)?;
    if command != "validate" && command != "import" {
        return Err(format!("未知命令: {}\n{}", command, USAGE));
    }
    let file = positional.next().ok_or(USAGE)?;

    Ok(CliArgs {
        command,
        file,
        kind,
        creator,
        db_path: db_path.unwrap_or_else(get_default_db_path),
    })
}

async fn validate(
    api: &EventImportApi,
    kind: EventKind,
    content: &[u8],
    creator: &str,
) -> Result<CsvValidationResponse, Box<dyn Error>> {
    let response = match kind {
        EventKind::Event => api.validate_event_csv(content, creator).await?,
        EventKind::Move => api.validate_move_csv(content, creator).await?,
    };
    Ok(response)
}

async fn import(
    api: &EventImportApi,
    kind: EventKind,
    content: &[u8],
    creator: &str,
    token: Option<&str>,
) -> Result<CsvValidationResponse, Box<dyn Error>> {
    let response = match kind {
        EventKind::Event => api.import_event_csv(content, creator, token).await?,
        EventKind::Move => api.import_move_csv(content, creator, token).await?,
    };
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    logging::init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(a) => a,
        Err(msg) => {
            eprintln!("{}", msg);
            std::process::exit(2);
        }
    };

    tracing::info!(
        version = silex_event_import::VERSION,
        db_path = %args.db_path,
        command = %args.command,
        kind = %args.kind,
        "{}",
        silex_event_import::APP_NAME
    );

    let content = std::fs::read(&args.file)?;
    let api = EventImportApi::new(&args.db_path).await?;

    let mut response = validate(&api, args.kind, &content, &args.creator).await?;

    if args.command == "import" && response.status == ResponseStatus::Ok {
        let token = response.body.validation_token.clone();
        response = import(&api, args.kind, &content, &args.creator, token.as_deref()).await?;
    }

    println!("{}", serde_json::to_string_pretty(&response)?);

    if response.status == ResponseStatus::BadRequest {
        std::process::exit(1);
    }
    Ok(())
}
