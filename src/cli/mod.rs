use clap::{Parser, Subcommand};
use std::process::ExitCode;

use crate::infra::config::{Config, Mode};
use crate::infra::http::headers::add_standard_headers;
use crate::infra::runtime::limits::make_http_client;

#[derive(Parser)]
#[command(name = "whatsapp-mcp-server")]
#[command(about = "WhatsApp MCP Server - mock send_whatsapp_message tool")]
#[command(version)]
pub struct Cli {
    /// Defaults to `serve` when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the MCP server (stdio unless configured otherwise)
    Serve {
        /// Override MODE
        #[arg(long, value_enum)]
        mode: Option<Mode>,
        /// Override PORT (http mode)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Health check a server running in http mode
    Health {
        /// Service URL to check
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,
    },
    /// Validate configuration
    Config,
    /// Invoke send_whatsapp_message in-process and print the result
    Send {
        /// Message to send
        #[arg(short, long, default_value = "")]
        message: String,
    },
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();

    run_commands(cli.command.unwrap_or(Commands::Serve { mode: None, port: None })).await
}

pub async fn run_commands(command: Commands) -> ExitCode {
    match command {
        // Stdout belongs to the protocol here: report through tracing/stderr only.
        Commands::Serve { mode, port } => match serve(mode, port).await {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!(error = %e, "server exited with error");
                eprintln!("❌ Server failed: {:#}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Health { url } => match health_check(&url).await {
            Ok(_) => {
                println!("✅ Service is healthy");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Health check failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Config => match validate_config() {
            Ok(cfg) => {
                println!("✅ Configuration is valid");
                println!("  Mode: {}", cfg.mode);
                println!("  Port: {}", cfg.port);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Configuration validation failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Send { message } => {
            let (text, failed) = send_local(&message).await;
            println!("{text}");
            if failed {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
    }
}

async fn serve(mode: Option<Mode>, port: Option<u16>) -> anyhow::Result<()> {
    let mut cfg = Config::from_env()?;
    if let Some(mode) = mode {
        cfg.mode = mode;
    }
    if let Some(port) = port {
        cfg.port = port;
    }
    cfg.validate()?;
    crate::infra::boot::run_server(&cfg).await
}

async fn health_check(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = make_http_client()?;
    let (builder, _rid) = add_standard_headers(
        client.get(format!("{}/healthz", url.trim_end_matches('/'))),
        None,
    );
    let response = builder
        .timeout(std::time::Duration::from_millis(500))
        .send()
        .await?;

    if response.status().is_success() {
        Ok(())
    } else {
        Err(format!("HTTP {}", response.status()).into())
    }
}

fn validate_config() -> Result<Config, Box<dyn std::error::Error>> {
    let cfg = Config::from_env()?;
    cfg.validate()?;
    Ok(cfg)
}

/// Returns the rendered text and whether it is a tool-level failure.
async fn send_local(message: &str) -> (String, bool) {
    let registry = crate::tools::registry::build_default_registry();
    let mut args = crate::core::tool::Arguments::new();
    args.insert("message".into(), message.into());
    match registry
        .call(crate::tools::send_message::TOOL_NAME, &args)
        .await
    {
        Ok(outcome) => (outcome.render(), outcome.is_error()),
        Err(e) => (e.to_string(), true),
    }
}
