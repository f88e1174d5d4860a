// ==========================================
// 商品表格导入器 - 命令行入口
// ==========================================
// 命令: login / logout / headers / map / import / status / history
// 错误: 全部在此转换为用户可见消息（anyhow 仅用于入口层）
// ==========================================

mod cli;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Command, ImportArgs, LoginArgs, MapArgs, SourceArgs, StatusArgs};
use product_sheet_importer::app::AppState;
use product_sheet_importer::client::{spreadsheet_id_from_url, GoogleSheetsSource, SubmissionService};
use product_sheet_importer::config::ImporterConfig;
use product_sheet_importer::domain::{ColumnMapping, ImportSummary, JobState, JobStatusReport, LogicalField, Session};
use product_sheet_importer::importer::{
    inspect_headers, resolve_column, suggest_mapping, FileRowSource, ImportError, PreparedImport,
    RowSource, SheetRef,
};
use product_sheet_importer::logging;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.log_json);

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            match err.downcast_ref::<ImportError>() {
                Some(import_err) => {
                    eprintln!("error: {}", import_err.user_message());
                    if import_err.is_retryable() {
                        eprintln!("hint: the failure may be temporary, run the command again to retry");
                    }
                }
                None => eprintln!("error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = ImporterConfig::from_env()?;
    if let Some(path) = &cli.db_path {
        config.db_path = path.display().to_string();
    }

    tracing::debug!(version = product_sheet_importer::VERSION, db_path = %config.db_path, "启动");
    let state = AppState::new(config)?;

    match cli.command {
        Command::Login(args) => run_login(&state, args),
        Command::Logout => run_logout(&state),
        Command::Headers(args) => run_headers(&state, args).await,
        Command::Map(args) => run_map(&state, args).await,
        Command::Import(args) => run_import(&state, args).await,
        Command::Status(args) => run_status(&state, args).await,
        Command::History => run_history(&state),
    }
}

// ==========================================
// 数据源解析
// ==========================================

/// http(s) 链接 → Google Sheets；其它 → 本地文件
fn open_source(config: &ImporterConfig, args: &SourceArgs) -> Result<(Box<dyn RowSource>, SheetRef), ImportError> {
    let source = args.source.trim();
    if source.starts_with("http://") || source.starts_with("https://") {
        let spreadsheet_id = spreadsheet_id_from_url(source)?;
        let token = args
            .access_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ImportError::AuthFailed(
                    "a Google access token is required (--access-token or GOOGLE_ACCESS_TOKEN)".to_string(),
                )
            })?;
        let sheets: Box<dyn RowSource> = Box::new(GoogleSheetsSource::new(
            &config.sheets_base_url,
            token,
            config.http_timeout(),
        )?);
        return Ok((sheets, SheetRef::new(spreadsheet_id, args.sheet.clone())));
    }

    let file: Box<dyn RowSource> = Box::new(FileRowSource);
    Ok((file, SheetRef::from_file(source, args.sheet.clone())))
}

/// 历史中显示的表格名称（文件取文件名）
fn default_sheet_name(args: &SourceArgs) -> Option<String> {
    if args.source.starts_with("http://") || args.source.starts_with("https://") {
        return args.sheet.clone();
    }
    Path::new(&args.source)
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
}

// ==========================================
// 命令实现
// ==========================================

fn run_login(state: &AppState, args: LoginArgs) -> anyhow::Result<ExitCode> {
    let session = state.login(&args.account_id, &args.api_token)?;
    println!("Logged in as account {}", session.account_id);
    Ok(ExitCode::SUCCESS)
}

fn run_logout(state: &AppState) -> anyhow::Result<ExitCode> {
    state.logout()?;
    println!("Logged out successfully");
    Ok(ExitCode::SUCCESS)
}

async fn run_headers(state: &AppState, args: SourceArgs) -> anyhow::Result<ExitCode> {
    let (source, sheet) = open_source(&state.config, &args)?;
    let rows = source.fetch_rows(&sheet).await?;
    let header_row = rows.first().ok_or(ImportError::NoData)?;
    let headers = inspect_headers(header_row);

    println!("Columns in {}:", sheet.spreadsheet_id);
    for header in &headers {
        println!("  {}  {}", header.column, header.name);
    }

    println!();
    println!("Suggested mapping:");
    print_mapping(&suggest_mapping(&headers));
    Ok(ExitCode::SUCCESS)
}

async fn run_map(state: &AppState, args: MapArgs) -> anyhow::Result<ExitCode> {
    let (source, sheet) = open_source(&state.config, &args.source)?;

    let mut mapping = if args.suggest {
        let rows = source.fetch_rows(&sheet).await?;
        let header_row = rows.first().ok_or(ImportError::NoData)?;
        suggest_mapping(&inspect_headers(header_row))
    } else {
        state
            .store
            .load_mapping(&sheet.spreadsheet_id)
            .map_err(ImportError::from)?
            .unwrap_or_default()
    };

    let overrides = [
        (LogicalField::Sku, &args.sku),
        (LogicalField::Name, &args.name),
        (LogicalField::Brand, &args.brand),
        (LogicalField::Category, &args.category),
        (LogicalField::ImageUrl, &args.image_url),
        (LogicalField::BasePrice, &args.base_price),
        (LogicalField::Cost, &args.cost),
        (LogicalField::Msrp, &args.msrp),
    ];
    for (field, value) in overrides {
        if let Some(raw) = value {
            // 空字符串表示取消映射
            mapping.set(field, resolve_column(raw)?);
        }
    }

    state.save_mapping(&sheet.spreadsheet_id, &mapping)?;
    println!("Mapping saved for {}:", sheet.spreadsheet_id);
    print_mapping(&mapping);

    if let Err(err) = mapping.ensure_required() {
        println!();
        println!("warning: {}", err);
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_import(state: &AppState, args: ImportArgs) -> anyhow::Result<ExitCode> {
    let session = state.require_session()?;
    let (source, sheet) = open_source(&state.config, &args.source)?;
    let mapping = state.require_mapping(&sheet.spreadsheet_id)?;
    let submission = state.submission_service()?;

    let mut orchestrator = state.orchestrator(session.clone(), Arc::clone(&submission));
    orchestrator.set_mapping(mapping)?;

    let summary = match orchestrator.prepare_import(source.as_ref(), &sheet).await? {
        PreparedImport::Rejected { total_rows, errors } => {
            eprintln!("Found {} validation errors in {} rows:", errors.len(), total_rows);
            for error in &errors {
                eprintln!("  {}", error);
            }
            orchestrator.acknowledge_errors()?;
            eprintln!();
            eprintln!("{}", ImportError::ValidationFailed { count: errors.len() });
            return Ok(ExitCode::FAILURE);
        }
        PreparedImport::Ready(summary) => summary,
    };

    print_summary(&summary);

    if summary.valid_products == 0 {
        orchestrator.confirm(false).await?;
        println!("No products to import");
        return Ok(ExitCode::SUCCESS);
    }

    let accepted = args.yes || prompt_confirmation(summary.valid_products)?;
    let Some(ticket) = orchestrator.confirm(accepted).await? else {
        println!("Import cancelled");
        return Ok(ExitCode::SUCCESS);
    };

    let name = args.name.clone().or_else(|| default_sheet_name(&args.source));
    state.record_submission(&sheet, name, summary.valid_products, &ticket)?;
    println!(
        "Import started: {} products queued as job {}",
        summary.valid_products, ticket.job_id
    );

    if args.watch {
        return watch_job(state, submission, session, ticket.job_id).await;
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_status(state: &AppState, args: StatusArgs) -> anyhow::Result<ExitCode> {
    let session = state.require_session()?;
    let submission = state.submission_service()?;

    if args.watch {
        return watch_job(state, submission, session, args.job_id).await;
    }

    let report = submission.poll_status(&session, &args.job_id).await?;
    state.update_job_status(&args.job_id, report.status)?;
    print_report(&args.job_id, &report);
    Ok(ExitCode::SUCCESS)
}

fn run_history(state: &AppState) -> anyhow::Result<ExitCode> {
    let history = state.store.list_history().map_err(ImportError::from)?;
    if history.is_empty() {
        println!("No import history yet");
        return Ok(ExitCode::SUCCESS);
    }

    for entry in history {
        println!(
            "{}  {:>5} products  {:<10}  {}{}",
            entry.imported_at.format("%Y-%m-%d %H:%M"),
            entry.total_products,
            entry.status.as_str(),
            entry.spreadsheet_name.as_deref().unwrap_or(&entry.spreadsheet_id),
            entry
                .job_id
                .as_deref()
                .map(|id| format!("  (job {})", id))
                .unwrap_or_default(),
        );
    }
    Ok(ExitCode::SUCCESS)
}

/// 轮询任务直到终态；Ctrl-C 取消轮询（不影响远端任务）
async fn watch_job(
    state: &AppState,
    submission: Arc<dyn SubmissionService>,
    session: Session,
    job_id: String,
) -> anyhow::Result<ExitCode> {
    let poller = state.poller(submission);
    println!("Waiting for job {} (Ctrl-C stops watching)...", job_id);

    let handle = poller.spawn(session, job_id.clone());
    let canceller = handle.canceller();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            canceller.cancel();
        }
    });

    match handle.wait().await {
        Ok(report) => {
            state.update_job_status(&job_id, report.status)?;
            print_report(&job_id, &report);
            Ok(ExitCode::SUCCESS)
        }
        Err(err @ ImportError::JobFailed { .. }) => {
            state.update_job_status(&job_id, JobState::Failed)?;
            Err(err.into())
        }
        Err(ImportError::PollCancelled(_)) => {
            println!("Stopped watching job {}; run `status {}` to check it later", job_id, job_id);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => Err(err.into()),
    }
}

// ==========================================
// 输出
// ==========================================

fn print_mapping(mapping: &ColumnMapping) {
    for field in LogicalField::ALL {
        let column = mapping
            .get(field)
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        let marker = if field.is_required() { "*" } else { " " };
        println!("  {}{:<11} {}", marker, field.label(), column);
    }
}

fn print_summary(summary: &ImportSummary) {
    println!("Import summary:");
    println!("  Total rows:      {}", summary.total_rows);
    println!("  Valid products:  {}", summary.valid_products);
    println!("  With category:   {}", summary.with_category);
    println!("  With image:      {}", summary.with_image);
    println!("  With price:      {}", summary.with_price);

    if !summary.sample_products.is_empty() {
        println!("Sample products:");
        for product in &summary.sample_products {
            let price = product
                .base_price
                .map(|p| format!("  {:.2}", p))
                .unwrap_or_default();
            println!("  {}  {}  ({}){}", product.sku, product.name, product.brand, price);
        }
    }
}

fn print_report(job_id: &str, report: &JobStatusReport) {
    println!(
        "Job {}: {} ({} succeeded, {} failed)",
        job_id,
        report.status.as_str(),
        report.successes,
        report.failures
    );
    for error in &report.errors {
        println!("  {}", error);
    }
}

fn prompt_confirmation(count: usize) -> anyhow::Result<bool> {
    print!("Import {} products? [y/N] ", count);
    io::stdout().flush().context("failed to write prompt")?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
