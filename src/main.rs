use anyhow::{anyhow, bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::io::AsyncReadExt;
use tracing::debug;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;
use wirenode::config::Config;
use wirenode::connector::path_extractor::set_by_path;
use wirenode::connector::{all_operations, get_operation};
use wirenode::error::format_connector_error;
use wirenode::http::ReqwestTransport;
use wirenode::{ConnectorError, ErrorPolicy, InputItem, Runner, Service};

/// Run Elasticsearch, Jira, Raindrop and Lemlist operations from the terminal
#[derive(Parser, Debug)]
#[command(name = "wirenode", version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Write logs to a file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List available operations
    List {
        /// Only list operations of this service
        service: Option<Service>,
    },
    /// Print the field schema of an operation as JSON
    Describe {
        service: Service,
        resource: String,
        operation: String,
    },
    /// Run an operation over a batch of records
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    service: Service,
    resource: String,
    operation: String,

    /// Credentials profile from the config file
    #[arg(short, long)]
    profile: Option<String>,

    /// JSON object with field values applied to every record
    #[arg(long, value_name = "FILE")]
    params: Option<PathBuf>,

    /// Field value, `key=value`; dots address nested fields
    #[arg(long = "set", value_name = "KEY=VALUE")]
    set: Vec<String>,

    /// JSON array of records, or '-' for stdin
    #[arg(short, long, value_name = "FILE")]
    input: Option<String>,

    /// Emit an error record for failing records instead of aborting
    #[arg(long)]
    continue_on_fail: bool,
}

fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<()> {
    let fallback = match verbose {
        0 => "wirenode=warn",
        1 => "wirenode=debug",
        _ => "wirenode=trace",
    };
    let filter = EnvFilter::try_from_env("WIRENODE_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));

    let writer = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(ChronoUtc::rfc_3339())
        .with_target(false)
        .with_ansi(log_file.is_none())
        .with_writer(writer)
        .init();
    Ok(())
}

fn list(service: Option<Service>) {
    for descriptor in all_operations()
        .iter()
        .filter(|d| service.map_or(true, |s| d.key.service == s))
    {
        println!(
            "{:<14} {:<18} {:<12} {}",
            descriptor.key.service.name(),
            descriptor.key.resource,
            descriptor.key.operation,
            descriptor.description
        );
    }
}

fn describe(service: Service, resource: &str, operation: &str) -> Result<()> {
    let descriptor = get_operation(service, resource, operation)
        .ok_or_else(|| anyhow!("Unknown operation {} {}:{}", service, resource, operation))?;
    println!("{}", serde_json::to_string_pretty(descriptor)?);
    Ok(())
}

/// Parse `key=value`; values that read as JSON keep their type
fn parse_assignment(assignment: &str) -> Result<(String, Value)> {
    let (key, raw) = assignment
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected KEY=VALUE, got '{}'", assignment))?;
    if key.trim().is_empty() {
        bail!("Empty key in '{}'", assignment);
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.trim().replace('.', "/"), value))
}

async fn read_source(source: &str) -> Result<String> {
    let mut text = String::new();
    if source == "-" {
        tokio::io::stdin().read_to_string(&mut text).await?;
    } else {
        text = tokio::fs::read_to_string(source)
            .await
            .with_context(|| format!("Failed to read {}", source))?;
    }
    Ok(text)
}

/// Shared field values from `--params` and `--set`
async fn shared_params(args: &RunArgs) -> Result<Map<String, Value>> {
    let mut params = Value::Object(Map::new());
    if let Some(path) = &args.params {
        let text = read_source(&path.to_string_lossy()).await?;
        params = serde_json::from_str(&text)
            .with_context(|| format!("{} is not valid JSON", path.display()))?;
        if !params.is_object() {
            bail!("{} must contain a JSON object", path.display());
        }
    }
    for assignment in &args.set {
        let (path, value) = parse_assignment(assignment)?;
        set_by_path(&mut params, &path, value);
    }
    match params {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

/// Records from `--input`, with shared values filling in missing fields
async fn input_items(args: &RunArgs, shared: Map<String, Value>) -> Result<Vec<InputItem>> {
    let Some(source) = &args.input else {
        return Ok(vec![InputItem {
            params: shared,
            ..Default::default()
        }]);
    };

    let text = read_source(source).await?;
    let mut items: Vec<InputItem> = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a JSON array of records", source))?;
    for item in &mut items {
        for (key, value) in &shared {
            item.params.entry(key.clone()).or_insert_with(|| value.clone());
        }
    }
    Ok(items)
}

async fn run(config: &Config, args: RunArgs) -> Result<()> {
    let profile = match &args.profile {
        Some(name) => Some(config.profile(name)?.clone()),
        None => config.sole_profile_for(args.service).cloned(),
    };
    let shared = shared_params(&args).await?;
    let items = input_items(&args, shared).await?;
    debug!("Loaded {} input records", items.len());

    let transport = ReqwestTransport::new(config.timeout(), &config.defaults.user_agent)
        .map_err(|e| anyhow!(format_connector_error(&e)))?;
    let policy = ErrorPolicy::from_flag(args.continue_on_fail || config.defaults.continue_on_fail);
    let runner = Runner::new(Arc::new(transport), profile).policy(policy);

    let output = runner
        .run(args.service, &args.resource, &args.operation, &items)
        .await
        .map_err(|e: ConnectorError| anyhow!(format_connector_error(&e)))?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Command::List { service } => {
            list(service);
            Ok(())
        }
        Command::Describe {
            service,
            resource,
            operation,
        } => describe(service, &resource, &operation),
        Command::Run(args) => {
            let config = Config::load()?;
            run(&config, args).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_assignment_keeps_json_types() {
        assert_eq!(parse_assignment("limit=5").unwrap(), ("limit".to_string(), json!(5)));
        assert_eq!(
            parse_assignment("returnAll=true").unwrap(),
            ("returnAll".to_string(), json!(true))
        );
        assert_eq!(
            parse_assignment("issueKey=ENG-1").unwrap(),
            ("issueKey".to_string(), json!("ENG-1"))
        );
        assert_eq!(
            parse_assignment("options.expand=names").unwrap(),
            ("options/expand".to_string(), json!("names"))
        );
        assert!(parse_assignment("no-equals").is_err());
        assert!(parse_assignment("=x").is_err());
    }

    #[test]
    fn test_cli_parses_run() {
        let cli = Cli::try_parse_from([
            "wirenode",
            "-vv",
            "run",
            "jira",
            "issue",
            "get",
            "--set",
            "issueKey=ENG-1",
            "--continue-on-fail",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.service, Service::Jira);
                assert_eq!(args.set, vec!["issueKey=ENG-1"]);
                assert!(args.continue_on_fail);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_shared_params_fill_missing_fields() {
        let args = RunArgs {
            service: Service::Lemlist,
            resource: "lead".to_string(),
            operation: "get".to_string(),
            profile: None,
            params: None,
            set: vec!["email=a@acme.io".to_string()],
            input: None,
            continue_on_fail: false,
        };
        let shared = shared_params(&args).await.unwrap();
        let items = input_items(&args, shared).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].params["email"], "a@acme.io");
    }
}
