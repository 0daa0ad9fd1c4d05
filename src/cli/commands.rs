use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::config::CorsFileConfig;
use crate::cors::{parse_method, ClassificationOutcome, CorsPolicyApplier};
use crate::dispatcher::PipelineAction;
use crate::exchange::BufferedExchange;
use crate::logging::init_logging_with_config;
use crate::runtime_config::RuntimeConfig;

/// Command-line interface for the CORS engine
///
/// Evaluates a request description against a configuration file and prints
/// the decision, or validates configuration files.
#[derive(Parser, Debug)]
#[command(name = "brrtrouter-cors")]
#[command(about = "Evaluate CORS decisions against a BRRTRouter CORS configuration", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify one request and print outcome, action, status and response headers as JSON
    Check {
        /// Path to the YAML configuration (defaults to component defaults)
        #[arg(short, long, env = "BRRTR_CORS_CONFIG")]
        config: Option<PathBuf>,

        /// Full request URL, e.g. https://api.example.com/pets
        #[arg(short, long)]
        url: String,

        /// Request method
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Value of the Origin header
        #[arg(short, long)]
        origin: Option<String>,

        /// Additional request header as 'Name: value' (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Treat the request as carrying cookies
        #[arg(long, default_value_t = false)]
        cookie: bool,

        /// Handler name, used to pick a route-specific policy
        #[arg(short, long)]
        route: Option<String>,

        /// Simulate a response whose headers were already flushed
        #[arg(long, default_value_t = false)]
        headers_sent: bool,
    },
    /// Parse and validate a configuration file
    Validate {
        /// Path to the YAML configuration
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// One staged response header in the report
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct HeaderLine {
    pub name: String,
    pub value: String,
}

/// JSON report printed by `check`
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CheckReport {
    /// `None` when CORS is disabled for the route
    pub outcome: Option<ClassificationOutcome>,
    pub action: PipelineAction,
    pub cors_enabled: bool,
    pub status: u16,
    pub headers: Vec<HeaderLine>,
}

/// Parse arguments, initialize logging, and run the selected command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let runtime = RuntimeConfig::from_env();

    let config_path = match &cli.command {
        Commands::Check { config, .. } => config.clone().or_else(|| runtime.config_path.clone()),
        Commands::Validate { config } => Some(config.clone()),
    };
    let mut config = load_config(config_path.as_deref())?;
    config.apply_runtime(&runtime);

    // Logging problems must not hide the command result
    if let Err(e) = init_logging_with_config(&config.log_config()) {
        eprintln!("Warning: {e:#}");
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_command(&cli.command, &config, &mut out)
}

fn load_config(path: Option<&Path>) -> Result<CorsFileConfig> {
    match path {
        Some(path) => CorsFileConfig::load(path),
        None => Ok(CorsFileConfig::default()),
    }
}

/// Run a parsed command against an already loaded configuration.
pub fn run_command<W: Write>(command: &Commands, config: &CorsFileConfig, out: &mut W) -> Result<()> {
    match command {
        Commands::Check {
            url,
            method,
            origin,
            headers,
            cookie,
            route,
            headers_sent,
            ..
        } => {
            let mut exchange = BufferedExchange::new(
                parse_method(method).with_context(|| format!("--method {method}"))?,
                url.as_str(),
            )
            .with_headers_sent(*headers_sent);
            if let Some(origin) = origin {
                exchange = exchange.with_header("Origin", origin.as_str());
            }
            for raw in headers {
                let (name, value) = parse_header_arg(raw)?;
                exchange = exchange.with_header(name, value);
            }
            if *cookie {
                exchange = exchange.with_cookie("cli", "1");
            }

            let report = check(config, route.as_deref(), &mut exchange);
            serde_json::to_writer_pretty(&mut *out, &report)
                .context("Failed to write report")?;
            writeln!(out)?;
            Ok(())
        }
        Commands::Validate { config: path } => {
            writeln!(
                out,
                "✅ {} is valid ({} route policies, static resources {})",
                path.display(),
                config.cors.routes.len(),
                if config.static_resources.enabled {
                    "enabled"
                } else {
                    "disabled"
                }
            )?;
            Ok(())
        }
    }
}

/// Evaluate `exchange` with the policy `config` gives `route`.
pub fn check(
    config: &CorsFileConfig,
    route: Option<&str>,
    exchange: &mut BufferedExchange,
) -> CheckReport {
    let middleware = config.cors_middleware();
    let policy = match route {
        Some(route) => middleware.policy_for(route),
        None => Some(middleware.global_policy()),
    };

    let (outcome, action) = match policy {
        Some(policy) => {
            let decision = CorsPolicyApplier::new().evaluate_policy(exchange, policy);
            (Some(decision.outcome), decision.action)
        }
        None => (None, PipelineAction::Continue),
    };

    CheckReport {
        outcome,
        action,
        cors_enabled: policy.is_some(),
        status: exchange.status,
        headers: exchange
            .response_headers
            .iter()
            .map(|(name, value)| HeaderLine {
                name: name.to_string(),
                value: value.clone(),
            })
            .collect(),
    }
}

/// Split a `'Name: value'` argument.
pub fn parse_header_arg(raw: &str) -> Result<(&str, &str)> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| anyhow!("header '{raw}' must look like 'Name: value'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow!("header '{raw}' has an empty name"));
    }
    Ok((name, value.trim()))
}
