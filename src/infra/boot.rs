use crate::infra::config::{Config, Mode};
use std::net::SocketAddr;

pub async fn run_server(cfg: &Config) -> anyhow::Result<()> {
    tracing::info!(mode = %cfg.mode, port = cfg.port, "BOOT whatsapp-mcp-server");

    match cfg.mode {
        // Stdio mode: MCP over stdin/stdout only, no HTTP listener.
        Mode::Stdio => {
            crate::infra::runtime::mcp_transport::serve_stdio(crate::infra::mcp::factory_default)
                .await
                .map_err(|e| anyhow::anyhow!(e))?;
        }
        Mode::Http => {
            let app = crate::infra::http_app::build_app_default();
            let addr: SocketAddr = ([0, 0, 0, 0], cfg.port).into();
            let listener = tokio::net::TcpListener::bind(addr).await?;
            tracing::info!(addr = %addr, "listening");
            axum::serve(listener, app).await?;
        }
    }
    Ok(())
}
