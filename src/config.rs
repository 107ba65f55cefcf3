use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.spacex.land/graphql/";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub endpoint: String,
    /// Budget for the whole request: connect, send and body read.
    pub timeout: Duration,
    pub pool_max_idle_per_host: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
        }
    }
}

impl ClientConfig {
    pub fn from_args(args: &CliArgs) -> Result<Self> {
        let file_config = if let Some(path) = args.config.as_ref() {
            load_config_file(path)?
        } else {
            PartialConfig::default()
        };

        let PartialConfig {
            endpoint: file_endpoint,
            timeout_ms: file_timeout_ms,
            pool_max_idle_per_host: file_pool_max_idle_per_host,
        } = file_config;

        let endpoint = args
            .endpoint
            .clone()
            .or(file_endpoint)
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let timeout = Duration::from_millis(
            args.timeout_ms
                .or(file_timeout_ms)
                .unwrap_or(DEFAULT_TIMEOUT_MS),
        );

        let pool_max_idle_per_host = args
            .pool_max_idle_per_host
            .or(file_pool_max_idle_per_host)
            .unwrap_or(DEFAULT_POOL_MAX_IDLE_PER_HOST);

        let config = Self {
            endpoint,
            timeout,
            pool_max_idle_per_host,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(!self.timeout.is_zero(), "timeout must be greater than 0");

        let url = reqwest::Url::parse(&self.endpoint)
            .with_context(|| format!("invalid endpoint {:?}", self.endpoint))?;
        anyhow::ensure!(
            matches!(url.scheme(), "http" | "https"),
            "endpoint {:?} must use http or https",
            self.endpoint
        );
        Ok(())
    }
}

#[derive(Parser, Debug, Default, Clone)]
#[command(
    name = "spacex-queries",
    about = "Run bundled GraphQL queries against the SpaceX API",
    version
)]
pub struct CliArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "Path to a configuration file (YAML or JSON)",
        global = true
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "SPACEX_QUERIES_ENDPOINT",
        value_name = "URL",
        help = "GraphQL endpoint to POST queries to",
        global = true
    )]
    pub endpoint: Option<String>,

    #[arg(
        long,
        env = "SPACEX_QUERIES_TIMEOUT_MS",
        value_name = "MS",
        help = "Total request timeout in milliseconds",
        value_parser = clap::value_parser!(u64),
        global = true
    )]
    pub timeout_ms: Option<u64>,

    #[arg(
        long,
        env = "SPACEX_QUERIES_POOL_MAX_IDLE",
        value_name = "N",
        help = "Maximum idle connections kept per host",
        value_parser = clap::value_parser!(usize),
        global = true
    )]
    pub pool_max_idle_per_host: Option<usize>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the four sample queries in sequence
    Demo,
    /// Fetch a mission by id
    Mission {
        #[arg(value_name = "ID")]
        id: String,
    },
    /// Fetch missions for a manufacturer
    Missions {
        #[arg(value_name = "MANUFACTURER")]
        manufacturer: String,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Fetch the most recent past launches
    Launches {
        #[arg(long, default_value_t = 3)]
        limit: u32,
    },
    /// Fetch rockets
    Rockets {
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// List the loaded query names
    List,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    endpoint: Option<String>,
    timeout_ms: Option<u64>,
    pool_max_idle_per_host: Option<usize>,
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {:?}", path))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {:?}", path))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };
    Ok(parsed)
}
