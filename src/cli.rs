// ==========================================
// 商品表格导入器 - 命令行参数定义
// ==========================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "product-sheet-importer",
    version,
    about = "Map spreadsheet columns to product fields, validate rows and submit them as an import job"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Emit logs as JSON lines on stderr.
    #[arg(long = "log-json", global = true)]
    pub log_json: bool,

    /// Override the local database path.
    #[arg(long = "db-path", value_name = "PATH", global = true)]
    pub db_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Save the account id and API token used for submissions.
    Login(LoginArgs),

    /// Clear stored credentials and all saved column mappings (history is kept).
    Logout,

    /// List the selectable columns of a spreadsheet and suggest a mapping.
    Headers(SourceArgs),

    /// Save the column mapping for a spreadsheet.
    Map(MapArgs),

    /// Validate a spreadsheet and submit it after confirmation.
    Import(ImportArgs),

    /// Show the status of an import job.
    Status(StatusArgs),

    /// Show the most recent imports.
    History,
}

#[derive(Args)]
pub struct LoginArgs {
    /// Account id.
    #[arg(long = "account-id", env = "PRODUCT_IMPORTER_ACCOUNT_ID")]
    pub account_id: String,

    /// API token.
    #[arg(long = "api-token", env = "PRODUCT_IMPORTER_API_TOKEN", hide_env_values = true)]
    pub api_token: String,
}

#[derive(Args, Clone)]
pub struct SourceArgs {
    /// A Google Sheets URL, or a path to a .csv/.xlsx/.xls file.
    #[arg(value_name = "SOURCE")]
    pub source: String,

    /// Sheet name (defaults to the first sheet).
    #[arg(long = "sheet")]
    pub sheet: Option<String>,

    /// OAuth access token for the Google Sheets API.
    #[arg(long = "access-token", env = "GOOGLE_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,
}

#[derive(Args)]
pub struct MapArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Start from a mapping suggested by the header names.
    #[arg(long = "suggest")]
    pub suggest: bool,

    /// Column letter for SKU.
    #[arg(long = "sku", value_name = "COLUMN")]
    pub sku: Option<String>,

    /// Column letter for Name.
    #[arg(long = "name", value_name = "COLUMN")]
    pub name: Option<String>,

    /// Column letter for Brand.
    #[arg(long = "brand", value_name = "COLUMN")]
    pub brand: Option<String>,

    /// Column letter for Category.
    #[arg(long = "category", value_name = "COLUMN")]
    pub category: Option<String>,

    /// Column letter for Image URL.
    #[arg(long = "image-url", value_name = "COLUMN")]
    pub image_url: Option<String>,

    /// Column letter for Base price.
    #[arg(long = "base-price", value_name = "COLUMN")]
    pub base_price: Option<String>,

    /// Column letter for Cost.
    #[arg(long = "cost", value_name = "COLUMN")]
    pub cost: Option<String>,

    /// Column letter for MSRP.
    #[arg(long = "msrp", value_name = "COLUMN")]
    pub msrp: Option<String>,
}

#[derive(Args)]
pub struct ImportArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Display name recorded in the import history.
    #[arg(long = "name")]
    pub name: Option<String>,

    /// Submit without asking for confirmation.
    #[arg(long = "yes", short = 'y')]
    pub yes: bool,

    /// Poll the job until it completes or fails.
    #[arg(long = "watch")]
    pub watch: bool,
}

#[derive(Args)]
pub struct StatusArgs {
    /// Job id returned by `import`.
    #[arg(value_name = "JOB_ID")]
    pub job_id: String,

    /// Keep polling until the job completes or fails.
    #[arg(long = "watch")]
    pub watch: bool,
}
