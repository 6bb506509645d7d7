use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "./config/example-config.yaml";

#[derive(Debug, Parser)]
#[command(
    name = "chatbot-webhooks",
    version,
    about = "Fulfillment webhooks for the city's conversational agent"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start the HTTP server.
    Serve {
        #[arg(long, env = "CHATBOT_WEBHOOKS_CONFIG", default_value = DEFAULT_CONFIG)]
        config: String,
    },
    /// Load and validate a config file, then exit.
    CheckConfig {
        #[arg(long, env = "CHATBOT_WEBHOOKS_CONFIG", default_value = DEFAULT_CONFIG)]
        config: String,
    },
    /// Print the SHA-256 digest to store in `auth.tokens[].token_sha256`.
    HashToken { token: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = init_tracing() {
        eprintln!("{e}");
        std::process::exit(2);
    }
    install_panic_hook();

    match cli.command {
        Command::Serve { config } => {
            let cfg = load_config(&config);
            tokio::select! {
                result = webhooks_server::serve(cfg) => {
                    if let Err(e) = result {
                        eprintln!("server exited with error: {e}");
                        std::process::exit(1);
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("shutdown requested");
                }
            }
        }
        Command::CheckConfig { config } => {
            let cfg = load_config(&config);
            println!(
                "config ok: environment={} tokens={}",
                cfg.server.environment,
                cfg.auth.tokens.len()
            );
        }
        Command::HashToken { token } => {
            println!("{}", webhooks_server::auth::hash_token(&token));
        }
    }
}

fn load_config(path: &str) -> webhooks_config::Config {
    match webhooks_config::load_and_validate(path) {
        Ok(cfg) => {
            tracing::info!(%path, environment = %cfg.server.environment, "config loaded");
            cfg
        }
        Err(e) => {
            eprintln!("failed to load config: {e}");
            std::process::exit(1);
        }
    }
}

fn init_tracing() -> Result<(), String> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,webhooks_server=debug"));
    let log_format = std::env::var("CHATBOT_WEBHOOKS_LOG_FORMAT")
        .unwrap_or_else(|_| "json".to_string())
        .to_ascii_lowercase();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_line_number(true);
    match log_format.as_str() {
        "json" => builder
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .init(),
        "pretty" => builder.pretty().init(),
        "compact" => builder.compact().init(),
        other => {
            return Err(format!(
                "unsupported CHATBOT_WEBHOOKS_LOG_FORMAT={other:?}; expected one of: json, pretty, compact"
            ))
        }
    }
    tracing::debug!(log_format = %log_format, "tracing initialized");
    Ok(())
}

fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        tracing::error!(panic_location = %location, panic_payload = %payload, "panic captured");
        default_hook(info);
    }));
}
