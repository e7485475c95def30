//! Generic MCP transport helpers (stdio + streamable HTTP) decoupled from tool logic.

use std::sync::Arc;
use std::time::Duration;

use rmcp::service::{serve_directly, RoleServer};
use rmcp::transport::streamable_http_server::tower::{StreamableHttpServerConfig, StreamableHttpService};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, DuplexStream};
use tokio::sync::watch;

pub use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
pub use rmcp::ServerHandler;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const PIPE_CAPACITY: usize = 64 * 1024;

/// Upper bound on how long a closed input waits for outstanding responses.
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Serve one MCP session over stdin/stdout and return once the peer hangs up.
pub async fn serve_stdio<H>(factory: impl FnOnce() -> H) -> Result<(), BoxError>
where
    H: ServerHandler,
{
    serve_io(factory(), tokio::io::stdin(), tokio::io::stdout()).await
}

/// Serve one MCP session over a line-delimited byte stream pair.
///
/// The session does not require the `initialize` handshake: a bare
/// `tools/list` is answered straight away. When `reader` hits EOF the session
/// stays open until every request read so far has had its response written
/// and flushed to `writer` (or [`DRAIN_TIMEOUT`] passes).
pub async fn serve_io<H, R, W>(handler: H, reader: R, writer: W) -> Result<(), BoxError>
where
    H: ServerHandler,
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let outstanding = Arc::new(watch::Sender::new(0usize));
    let (input_tx, server_in) = tokio::io::duplex(PIPE_CAPACITY);
    let (server_out, output_rx) = tokio::io::duplex(PIPE_CAPACITY);

    let input = tokio::spawn(forward_input(reader, input_tx, outstanding.clone()));
    let output = tokio::spawn(forward_output(output_rx, writer, outstanding));

    let running = serve_directly::<RoleServer, _, _, _, _>(handler, (server_in, server_out), None);
    tracing::info!("stdio session established");
    let reason = running.waiting().await?;
    tracing::info!(reason = ?reason, "stdio session closed");

    input.abort();
    output.await??;
    Ok(())
}

/// Copy client lines to the server, counting requests; on EOF hold the pipe
/// open until the count drops back to zero.
async fn forward_input<R>(
    reader: R,
    mut pipe: DuplexStream,
    outstanding: Arc<watch::Sender<usize>>,
) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "stdin read failed; treating as EOF");
                break;
            }
        };
        let requests = count_messages(&line, is_request);
        if requests > 0 {
            outstanding.send_modify(|n| *n += requests);
        }
        pipe.write_all(line.as_bytes()).await?;
        pipe.write_all(b"\n").await?;
    }

    let mut idle = outstanding.subscribe();
    match tokio::time::timeout(DRAIN_TIMEOUT, idle.wait_for(|n| *n == 0)).await {
        Ok(_) => tracing::debug!("stdin closed, all responses written"),
        Err(_) => tracing::warn!(
            outstanding = *outstanding.borrow(),
            "stdin closed, gave up waiting for responses"
        ),
    }
    Ok(())
}

/// Copy server lines to the client, flushing each one before it counts as answered.
async fn forward_output<W>(
    pipe: DuplexStream,
    mut writer: W,
    outstanding: Arc<watch::Sender<usize>>,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(pipe).lines();
    while let Some(line) = lines.next_line().await? {
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
        let responses = count_messages(&line, is_response);
        if responses > 0 {
            outstanding.send_modify(|n| *n = n.saturating_sub(responses));
        }
    }
    writer.flush().await
}

/// Number of JSON-RPC messages on one line (single or batch) matching `pred`.
fn count_messages(line: &str, pred: fn(&Value) -> bool) -> usize {
    match serde_json::from_str::<Value>(line) {
        Ok(Value::Array(batch)) => batch.iter().filter(|m| pred(m)).count(),
        Ok(msg) => usize::from(pred(&msg)),
        Err(_) => 0,
    }
}

fn is_request(msg: &Value) -> bool {
    msg.get("id").is_some() && msg.get("method").is_some()
}

fn is_response(msg: &Value) -> bool {
    msg.get("id").is_some()
        && msg.get("method").is_none()
        && (msg.get("result").is_some() || msg.get("error").is_some())
}

pub fn make_streamable_http_service<H>(
    factory: impl Fn() -> H + Send + Sync + Clone + 'static,
    session_mgr: Arc<LocalSessionManager>,
) -> StreamableHttpService<H, LocalSessionManager>
where
    H: ServerHandler,
{
    let cfg = StreamableHttpServerConfig::default();
    tracing::debug!(stateful_mode = %cfg.stateful_mode, keep_alive = ?cfg.sse_keep_alive, "StreamableHttpServerConfig");
    let service_factory = move || Ok(factory());
    StreamableHttpService::new(service_factory, session_mgr, cfg)
}
