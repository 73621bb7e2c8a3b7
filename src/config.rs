//! Layered application configuration.
//!
//! Precedence, highest first: CLI flag, the flag's env alias, `FELLOWSHIP_`
//! prefixed environment variables, the config file, built-in defaults.

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use url::Url;

use crate::telemetry::LogFormat;
use crate::ui::Layout;

/// Reply endpoint used when nothing else is configured.
pub const DEFAULT_REPLY_ENDPOINT: &str =
    "https://2pe5868qg6.execute-api.us-east-1.amazonaws.com/dev/ask";

/// Prefix for environment overrides, e.g. `FELLOWSHIP_SERVER__PORT=8000`.
const ENV_PREFIX: &str = "FELLOWSHIP";

/// Config file looked up in the working directory (`config.yaml`,
/// `config.toml`, ...) when no explicit file is given.
const DEFAULT_CONFIG_STEM: &str = "config";

#[derive(Parser, Debug)]
#[command(name = "fellowship-chat", author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Address to bind
    #[arg(long, env = "CHAT_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Reply service endpoint
    #[arg(long, env = "CHAT_API_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Default page layout
    #[arg(long, env = "CHAT_LAYOUT", value_enum)]
    pub layout: Option<Layout>,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub reply: ReplyConfig,
    pub ui: UiConfig,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplyConfig {
    pub endpoint: Url,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UiConfig {
    pub layout: Layout,
    pub title: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
}

impl AppConfig {
    /// Load from the process arguments. `--help` and `--version` exit here.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::from_cli(Cli::parse())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Self::from_cli(cli)
    }

    pub fn from_cli(cli: Cli) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("reply.endpoint", DEFAULT_REPLY_ENDPOINT)?
            .set_default("ui.layout", Layout::default().as_str())?
            .set_default("ui.title", "AI Fellowship Chat")?
            .set_default("log.format", LogFormat::default().as_str())?;

        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path).required(true)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_STEM).required(false)),
        };

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // clap has already folded each flag's env alias into `cli`.
        if let Some(host) = cli.host {
            builder = builder.set_override("server.host", host)?;
        }
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(endpoint) = cli.endpoint {
            builder = builder.set_override("reply.endpoint", endpoint)?;
        }
        if let Some(layout) = cli.layout {
            builder = builder.set_override("ui.layout", layout.as_str())?;
        }
        if let Some(format) = cli.log_format {
            builder = builder.set_override("log.format", format.as_str())?;
        }

        builder.build()?.try_deserialize()
    }

    /// `host:port` to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
