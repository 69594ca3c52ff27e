use crate::genai::GenAiSettings;
use clap::Parser;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::env;
use std::path::Path;

/// Config file read when neither `--config` nor `CONFIG_FILE` is given.
const DEFAULT_CONFIG_FILE: &str = "config.yaml";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Directory served under /static
    #[arg(long, env = "STATIC_DIR")]
    pub static_dir: Option<String>,

    /// Model used for chat turns
    #[arg(long, env = "GEMINI_CHAT_MODEL")]
    pub chat_model: Option<String>,

    /// Log output format (pretty or json)
    #[arg(long, env = "LOG_FORMAT")]
    pub log_format: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub genai: GenAiConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub static_dir: String,
    /// Per-request timeout; `0` disables the middleware.
    pub request_timeout_secs: u64,
}

#[derive(Deserialize, Clone)]
pub struct GenAiConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub chat_model: String,
    pub image_model: String,
    pub speech_model: String,
    pub voice: String,
}

impl std::fmt::Debug for GenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenAiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("chat_model", &self.chat_model)
            .field("image_model", &self.image_model)
            .field("speech_model", &self.speech_model)
            .field("voice", &self.voice)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Default directive when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder();

        // 1. Defaults
        builder = builder
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.static_dir", "static")?
            .set_default("server.request_timeout_secs", 120)?
            .set_default("genai.base_url", "https://generativelanguage.googleapis.com")?
            .set_default("genai.chat_model", "gemini-2.5-flash")?
            .set_default("genai.image_model", "gemini-2.5-flash-image")?
            .set_default("genai.speech_model", "gemini-2.5-flash-preview-tts")?
            .set_default("genai.voice", "Kore")?
            .set_default("logging.level", "glossy_travel=debug,tower_http=debug")?
            .set_default("logging.format", "pretty")?;

        // 2. Config file: explicit path must exist, the default one is optional
        match &cli.config {
            Some(path) => {
                builder = builder.add_source(File::new(path, FileFormat::Yaml).required(true));
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                builder = builder
                    .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));
            }
            None => {}
        }

        // 3. Unprefixed key names used by the hosted API's own tooling
        if let Some(key) = ["GEMINI_API_KEY", "API_KEY"]
            .iter()
            .find_map(|name| env::var(name).ok().filter(|v| !v.trim().is_empty()))
        {
            builder = builder.set_default("genai.api_key", key)?;
        }

        // 4. Environment variables (prefixed with GLOSSY_), e.g. GLOSSY_SERVER__PORT=8000
        builder = builder.add_source(
            Environment::with_prefix("GLOSSY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // 5. CLI flags (and their clap env vars) win over everything
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", port)?;
        }
        if let Some(host) = cli.host {
            builder = builder.set_override("server.host", host)?;
        }
        if let Some(dir) = cli.static_dir {
            builder = builder.set_override("server.static_dir", dir)?;
        }
        if let Some(model) = cli.chat_model {
            builder = builder.set_override("genai.chat_model", model)?;
        }
        if let Some(format) = cli.log_format {
            builder = builder.set_override("logging.format", format.to_lowercase())?;
        }

        let cfg = builder.build()?;
        cfg.try_deserialize()
    }

    /// Settings for the Gemini client.
    #[must_use]
    pub fn genai_settings(&self) -> GenAiSettings {
        GenAiSettings {
            base_url: self.genai.base_url.clone(),
            api_key: self.genai.api_key.clone().filter(|k| !k.trim().is_empty()),
            chat_model: self.genai.chat_model.clone(),
            image_model: self.genai.image_model.clone(),
            speech_model: self.genai.speech_model.clone(),
            voice: self.genai.voice.clone(),
        }
    }
}
