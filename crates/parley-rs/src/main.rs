//! Parley HTTP service entry point.

use anyhow::{Context, bail};
use autoagents_llm::LLMProvider;
use autoagents_llm::backends::google::Google;
use autoagents_llm::builder::LLMBuilder;
use chrono::TimeDelta;
use clap::Parser;
use log::{debug, info, warn};
use parley_rs::config::{LayeredConfigOptions, ParleyConfig};
use parley_rs::core::{ConversationStore, Negotiator};
use parley_rs::server::{build_router, serve};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Command-line options for the Parley server.
#[derive(Parser, Debug, Default)]
#[command(name = "parley", version)]
struct Cli {
    /// Extra parley.json5 config file applied over the user and cwd layers
    #[arg(long)]
    config: Option<PathBuf>,
    /// Address to bind
    #[arg(long)]
    host: Option<String>,
    /// Port to bind
    #[arg(long)]
    port: Option<u16>,
    /// Model name passed to the provider
    #[arg(long)]
    model: Option<String>,
}

impl Cli {
    /// Command-line flags win over files and environment.
    fn apply_to(&self, config: &mut ParleyConfig) -> anyhow::Result<()> {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(model) = &self.model {
            config.model.name = model.clone();
        }
        config.validate().context("invalid command-line override")
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    parley_rs::init_logging();
    load_dotenv();

    let cli = Cli::parse();
    info!(
        "starting parley (config_set={}, host_set={}, port_set={}, model_set={})",
        cli.config.is_some(),
        cli.host.is_some(),
        cli.port.is_some(),
        cli.model.is_some()
    );

    let config = load_config(&cli)?;
    let llm = build_llm(&config)?;
    let max_age = TimeDelta::from_std(config.conversations.max_age())
        .context("conversation max age out of range")?;
    let negotiator = Negotiator::new(llm, config.model.name.clone(), ConversationStore::new(max_age))
        .with_prompt_echo(config.negotiate.include_prompt);

    let address = config.server.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    serve(listener, build_router(Arc::new(negotiator)))
        .await
        .context("server error")
}

fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => debug!("loaded environment file (path={})", path.display()),
        Err(err) if err.not_found() => {}
        Err(err) => warn!("failed to load .env (error={})", err),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<ParleyConfig> {
    let cwd = std::env::current_dir().context("failed to resolve current working directory")?;
    let mut options = LayeredConfigOptions::new(&cwd);
    if let Some(path) = &cli.config {
        info!("adding runtime config layer (path={})", path.display());
        options = options.with_runtime_path(path);
    }
    let layered = ParleyConfig::load_layered_with_options(options)
        .context("failed to load layered config")?;
    debug!("layered config loaded (layers={})", layered.layers.len());

    let mut config = layered.config;
    config
        .apply_env_overrides()
        .context("invalid environment override")?;
    cli.apply_to(&mut config)?;
    Ok(config)
}

fn build_llm(config: &ParleyConfig) -> anyhow::Result<Arc<dyn LLMProvider>> {
    let key_env = config.model.api_key_env.as_str();
    let api_key = match std::env::var(key_env) {
        Ok(key) if !key.trim().is_empty() => key,
        _ => bail!("{key_env} is required to run parley"),
    };
    info!(
        "building LLM provider (provider={}, model={})",
        config.model.provider, config.model.name
    );
    let llm: Arc<dyn LLMProvider> = LLMBuilder::<Google>::new()
        .api_key(api_key)
        .model(config.model.name.clone())
        .build()
        .context("failed to build Google LLM provider")?;
    Ok(llm)
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::Parser;
    use parley_rs::config::ParleyConfig;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_flags() {
        let cli = Cli::parse_from([
            "parley",
            "--config",
            "dev.json5",
            "--port",
            "9000",
            "--model",
            "gemini-2.0-flash",
        ]);
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("dev.json5")));
        assert_eq!(cli.port, Some(9000));
        assert_eq!(cli.host, None);
        assert_eq!(cli.model.as_deref(), Some("gemini-2.0-flash"));
    }

    #[test]
    fn flags_override_config() {
        let mut config = ParleyConfig::default();
        let cli = Cli {
            host: Some("127.0.0.1".to_string()),
            port: Some(9000),
            ..Cli::default()
        };
        cli.apply_to(&mut config).expect("apply");
        assert_eq!(config.server.bind_address(), "127.0.0.1:9000");
        assert_eq!(config.model.name, "gemini-1.5-flash");
    }

    #[test]
    fn zero_port_flag_is_rejected() {
        let mut config = ParleyConfig::default();
        let cli = Cli {
            port: Some(0),
            ..Cli::default()
        };
        assert!(cli.apply_to(&mut config).is_err());
    }
}
