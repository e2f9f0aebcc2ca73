use anyhow::Result;
use clap::Parser;
use gemini_relay::adapter::RequestAdapter;
use gemini_relay::ai::GeminiClient;
use gemini_relay::models::Config;
use gemini_relay::server;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "gemini-relay")]
#[command(about = "Relay HTTP queries to the Gemini generateContent API")]
struct CliArgs {
    /// Interface to bind (overrides RELAY_HOST).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides RELAY_PORT).
    #[arg(long)]
    port: Option<u16>,

    /// Gemini model ID (overrides GEMINI_MODEL).
    #[arg(long)]
    model: Option<String>,

    /// Only accept JSON bodies with a `query` field.
    #[arg(long)]
    strict: bool,

    /// Log request and response content at info level.
    #[arg(long)]
    verbose: bool,
}

impl CliArgs {
    fn apply(self, mut config: Config) -> Config {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(model) = self.model {
            config.gemini_model = model;
        }
        config.options.strict_input_schema |= self.strict;
        config.options.verbose_logging |= self.verbose;
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gemini_relay=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    let config = match Config::from_env() {
        Ok(config) => args.apply(config),
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Starting gemini-relay (model: {}, strict: {}, verbose: {})",
        config.gemini_model, config.options.strict_input_schema, config.options.verbose_logging
    );

    let client = GeminiClient::new(config.gemini_model.clone(), config.request_timeout)
        .with_base_url(config.gemini_base_url.clone());
    let adapter = RequestAdapter::new(config.gemini_api_key.clone(), config.options, Box::new(client));

    if let Err(e) = server::serve(&config.bind_addr(), server::router(adapter)).await {
        error!("Relay server failed: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config::from_vars(|name| (name == "GEMINI_API_KEY").then(|| "k".to_string())).unwrap()
    }

    #[test]
    fn test_cli_overrides_config() {
        let args =
            CliArgs::try_parse_from(["gemini-relay", "--port", "9999", "--strict", "--model", "m"])
                .unwrap();
        let config = args.apply(base_config());

        assert_eq!(config.port, 9999);
        assert_eq!(config.gemini_model, "m");
        assert!(config.options.strict_input_schema);
        assert!(!config.options.verbose_logging);
    }

    #[test]
    fn test_no_flags_keeps_config() {
        let args = CliArgs::try_parse_from(["gemini-relay"]).unwrap();
        let config = args.apply(base_config());

        assert_eq!(config.bind_addr(), "127.0.0.1:8811");
    }
}
