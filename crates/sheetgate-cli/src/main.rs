use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use sheetgate::{ApiDefinition, Gateway, GatewayConfig, Request, Response, SheetBackend};
use sheetgate_store::JsonFileBackend;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "sheetgate",
    version,
    about = "Serve spreadsheet tables as REST resources declared in a control table"
)]
struct Cli {
    #[command(flatten)]
    backend: BackendArgs,

    /// YAML gateway config. Environment variables and flags override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Spreadsheet holding the control table.
    #[arg(long = "control-spreadsheet", global = true)]
    control_spreadsheet: Option<String>,

    /// Sheet holding the control table.
    #[arg(long = "control-sheet", global = true)]
    control_sheet: Option<String>,

    /// Log debug events to stderr. `RUST_LOG` takes precedence.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct BackendArgs {
    /// JSON workbook file (`{"spreadsheets": {id: {sheet: [[...]]}}}`). Writes are saved back.
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Bearer token for the Google Sheets API, used when no `--store` is given.
    #[cfg(feature = "webservice")]
    #[arg(long, env = "SHEETGATE_ACCESS_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    /// Sheets API base URL.
    #[cfg(feature = "webservice")]
    #[arg(long, default_value = sheetgate_store::backends::sheets_api::DEFAULT_BASE_URL, global = true)]
    api_base: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read records from a resource.
    Get(GetArgs),
    /// Append records to a resource.
    Post(PostArgs),
    /// List the definitions in the control table.
    Catalog,
}

#[derive(Args, Debug)]
struct GetArgs {
    /// Resource name as declared in the control table.
    api: String,

    /// JSON object of field/value equality filters.
    #[arg(short, long)]
    q: Option<String>,

    /// Sort keys, e.g. `-age,name`.
    #[arg(long, allow_hyphen_values = true)]
    sort: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    limit: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    offset: Option<String>,

    /// Print status and headers before the body.
    #[arg(short, long)]
    include: bool,
}

#[derive(Args, Debug)]
struct PostArgs {
    api: String,

    /// JSON array of objects. Reads stdin when omitted or `-`.
    #[arg(long)]
    body: Option<String>,

    /// Read the JSON body from a file.
    #[arg(long, conflicts_with = "body")]
    body_file: Option<PathBuf>,

    #[arg(short, long)]
    include: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;
    tracing::debug!(?config, "configuration resolved");

    if let Some(path) = &cli.backend.store {
        let backend = JsonFileBackend::open_path(path)
            .with_context(|| format!("failed to open store {}", path.display()))?;
        return run(&backend, config, cli.command);
    }

    #[cfg(feature = "webservice")]
    if let Some(token) = &cli.backend.token {
        let backend = sheetgate_store::SheetsApiBackend::with_base_url(
            &cli.backend.api_base,
            sheetgate_store::AccessToken::new(token.as_str()),
        )?;
        return run(&backend, config, cli.command);
    }

    bail!("no backend configured; pass --store <FILE>")
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("sheetgate=debug,sheetgate_store=debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Config file, then environment, then flags.
fn load_config(cli: &Cli) -> Result<GatewayConfig> {
    let base = match &cli.config {
        Some(path) => GatewayConfig::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => GatewayConfig::default(),
    };
    let mut config = base.merge_env();
    if let Some(id) = &cli.control_spreadsheet {
        config.control_spreadsheet_id = id.clone();
    }
    if let Some(sheet) = &cli.control_sheet {
        config.control_sheet = sheet.clone();
    }
    config.validate()?;
    if config.control_spreadsheet_id.is_empty() {
        bail!(
            "no control spreadsheet configured; pass --control-spreadsheet or set {}",
            sheetgate::ENV_CONTROL_SPREADSHEET_ID
        );
    }
    Ok(config)
}

fn run<B: SheetBackend>(backend: &B, config: GatewayConfig, command: Command) -> Result<()> {
    let gateway = Gateway::new(backend, config);
    match command {
        Command::Get(args) => {
            let mut request = Request::get(format!("/{}", args.api));
            let params = [
                ("q", args.q),
                ("sort", args.sort),
                ("limit", args.limit),
                ("offset", args.offset),
            ];
            for (key, value) in params {
                if let Some(value) = value {
                    request = request.with_query(key, value);
                }
            }
            emit(gateway.handle(&request), args.include)
        }
        Command::Post(args) => {
            let body = read_body(args.body, args.body_file)?;
            emit(
                gateway.handle(&Request::post(format!("/{}", args.api), body)),
                args.include,
            )
        }
        Command::Catalog => {
            let catalog = gateway.catalog()?;
            print_catalog(catalog.definitions())
        }
    }
}

fn read_body(inline: Option<String>, file: Option<PathBuf>) -> Result<String> {
    if let Some(path) = file {
        return fs::read_to_string(&path)
            .with_context(|| format!("failed to read body from {}", path.display()));
    }
    match inline {
        Some(body) if body != "-" => Ok(body),
        _ => {
            let mut body = String::new();
            io::stdin()
                .read_to_string(&mut body)
                .context("failed to read body from stdin")?;
            Ok(body)
        }
    }
}

fn emit(response: Response, include: bool) -> Result<()> {
    if include {
        println!("HTTP {}", response.status);
        for (name, value) in &response.headers {
            println!("{name}: {value}");
        }
        println!();
    }
    if !response.is_success() {
        bail!("{} {}", response.status, response.body_text());
    }
    match &response.body {
        sheetgate::Body::Json(value) => println!("{}", serde_json::to_string_pretty(value)?),
        sheetgate::Body::Text(text) => println!("{text}"),
    }
    Ok(())
}

fn print_catalog(definitions: &[ApiDefinition]) -> Result<()> {
    if definitions.is_empty() {
        eprintln!("control table has no definitions");
        return Ok(());
    }
    print!("{}", serde_yaml::to_string(definitions)?);
    Ok(())
}
