//! Command-line interface for doublefetch.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::client::{ApiClient, CachingApiClient, HttpApiClient};
use crate::config::{self, ClientKind, Config, StubConfig};
use crate::report;
use crate::stub::StubApiClient;
use crate::usecase::FetchUseCase;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Fetch URLs through a swappable API client.
///
/// The same use case runs against a real HTTP client or a stub that returns
/// canned bodies and errors, selected by config or command-line flags.
#[derive(Parser)]
#[command(name = "doublefetch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch one or more URLs
    #[command(visible_alias = "get")]
    Fetch(FetchArgs),
    /// Create a config file from a template
    Init(InitArgs),
}

/// Arguments for the fetch command.
#[derive(Parser)]
pub struct FetchArgs {
    /// URLs to fetch (relative URLs need base_url in the config)
    #[arg(required = true)]
    pub urls: Vec<String>,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Use a stub client that returns this body
    #[arg(long)]
    pub stub: Option<String>,

    /// Use a stub client that fails with this error (e.g. not_found, status:500)
    #[arg(long, conflicts_with = "stub")]
    pub stub_error: Option<String>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Print response bodies
    #[arg(long)]
    pub show_body: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "doublefetch.yaml")]
    pub output: PathBuf,

    /// Template to use
    #[arg(short, long, default_value = DEFAULT_TEMPLATE)]
    pub template: String,

    /// List available templates
    #[arg(short, long)]
    pub list: bool,
}

const DEFAULT_TEMPLATE: &str = "http";

/// Available config templates.
struct Template {
    name: &'static str,
    description: &'static str,
    content: &'static str,
}

static TEMPLATES: &[Template] = &[
    Template {
        name: "http",
        description: "Real HTTP client with timeout and optional cache",
        content: include_str!("templates/http.yaml"),
    },
    Template {
        name: "stub",
        description: "Stub client with canned bodies and errors, no network",
        content: include_str!("templates/stub.yaml"),
    },
];

/// Build the client selected by `config`.
///
/// This is the one place that knows about concrete implementations;
/// everything downstream sees `dyn ApiClient`.
pub fn build_client(config: &Config) -> anyhow::Result<Arc<dyn ApiClient>> {
    match config.client {
        ClientKind::Http => {
            let http = HttpApiClient::new(config).context("failed to create HTTP client")?;
            Ok(with_cache(http, config))
        }
        ClientKind::Stub => {
            let stub_config = config.stub.clone().unwrap_or_default();
            let stub = StubApiClient::from_config(&stub_config)?;
            Ok(with_cache(stub, config))
        }
    }
}

fn with_cache<C: ApiClient + 'static>(client: C, config: &Config) -> Arc<dyn ApiClient> {
    if config.cache_enabled() {
        let ttl = Duration::from_secs(config.cache_ttl_secs());
        Arc::new(CachingApiClient::new(client, ttl))
    } else {
        Arc::new(client)
    }
}

/// Load the config named on the command line, a discovered one, or defaults.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    let path = explicit.map(Path::to_path_buf).or_else(config::discover);
    if let Some(p) = &path {
        debug!(path = %p.display(), "loading config");
    }
    Config::load_or_default(path.as_deref())
}

/// Apply `--stub` / `--stub-error` on top of a loaded config.
///
/// The CLI rejects both flags together; called directly with both, the
/// error takes precedence over the body.
pub fn apply_stub_overrides(config: &mut Config, body: Option<&str>, error: Option<&str>) {
    if body.is_none() && error.is_none() {
        return;
    }

    let mut stub = config.stub.take().unwrap_or_else(StubConfig::default);
    if let Some(body) = body {
        stub.body = body.to_string();
        stub.error = None;
    }
    if let Some(error) = error {
        stub.error = Some(error.to_string());
    }

    config.client = ClientKind::Stub;
    config.stub = Some(stub);
}

/// Run the fetch command.
pub fn run_fetch(args: &FetchArgs) -> anyhow::Result<i32> {
    if args.format != "pretty" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let mut config = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return Ok(EXIT_ERROR);
        }
    };
    apply_stub_overrides(&mut config, args.stub.as_deref(), args.stub_error.as_deref());

    if let Err(e) = config::validate(&config) {
        eprintln!("Error: invalid config: {}", e);
        return Ok(EXIT_ERROR);
    }

    let client = match build_client(&config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return Ok(EXIT_ERROR);
        }
    };
    let usecase = FetchUseCase::new(client);

    let runtime = tokio::runtime::Runtime::new()?;
    let outcomes = runtime.block_on(usecase.execute_all(&args.urls, config.concurrency));

    let client_name = config.client.to_string();
    match args.format.as_str() {
        "json" => report::write_json(&client_name, &outcomes, args.show_body)?,
        _ => report::write_pretty(&client_name, &outcomes, args.show_body),
    }

    if outcomes.iter().all(|o| o.is_ok()) {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.list {
        list_templates();
        return Ok(EXIT_SUCCESS);
    }

    let Some(template) = find_template(&args.template) else {
        eprintln!("Error: unknown template {:?}", args.template);
        eprintln!("Run 'doublefetch init --list' to see available templates");
        return Ok(EXIT_ERROR);
    };

    match write_template(template, &args.output) {
        Ok(config) => {
            println!(
                "Created {} ({} client) from template '{}'",
                args.output.display(),
                config.client,
                template.name
            );
            println!("Try: doublefetch fetch <url> --config {}", args.output.display());
            Ok(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            Ok(EXIT_ERROR)
        }
    }
}

fn find_template(name: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.name == name)
}

/// Validate `template` as a config, then write it to a new file at `output`.
///
/// Never overwrites: an existing file is an error.
fn write_template(template: &Template, output: &Path) -> anyhow::Result<Config> {
    let config = Config::parse_str(template.content)
        .and_then(|c| config::validate(&c).map(|()| c))
        .with_context(|| format!("template '{}' is not a valid config", template.name))?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(output)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => {
                anyhow::anyhow!("file already exists: {}", output.display())
            }
            _ => anyhow::anyhow!("failed to create {}: {}", output.display(), e),
        })?;
    file.write_all(template.content.as_bytes())
        .with_context(|| format!("failed to write {}", output.display()))?;

    Ok(config)
}

fn list_templates() {
    println!("Available templates:");
    for template in TEMPLATES {
        let marker = if template.name == DEFAULT_TEMPLATE { " (default)" } else { "" };
        println!(
            "  {:<20} {}",
            format!("{}{}", template.name, marker),
            template.description
        );
    }
}
