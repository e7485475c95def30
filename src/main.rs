use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    whatsapp_mcp_server::infra::logging::init();
    whatsapp_mcp_server::cli::run().await
}
