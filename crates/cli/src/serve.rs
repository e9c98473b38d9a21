//! Daemon mode – minimal JSON-RPC-ish protocol over Unix socket.
//!
//! One request per line: `{"id": "1", "method": "normalize", "params": {"intent": {...}}}`.

use engine::types::*;
use engine::{AppContext, CommandRegistry};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;

pub async fn run_daemon(socket_path: PathBuf, ctx: AppContext, registry: CommandRegistry) {
    // Remove stale socket if it exists
    let _ = std::fs::remove_file(&socket_path);

    let listener = match UnixListener::bind(&socket_path) {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(socket = %socket_path.display(), error = %e, "cannot bind socket");
            std::process::exit(2);
        }
    };

    tracing::info!(socket = %socket_path.display(), "shellctl daemon listening");

    loop {
        match listener.accept().await {
            Ok((stream, _addr)) => {
                let (reader, mut writer) = stream.into_split();
                let mut lines = BufReader::new(reader).lines();

                while let Ok(Some(line)) = lines.next_line().await {
                    let response = handle_request(&line, &ctx, &registry);
                    let mut resp_json =
                        serde_json::to_string(&response).unwrap_or_else(|_| "{}".into());
                    resp_json.push('\n');
                    if writer.write_all(resp_json.as_bytes()).await.is_err() {
                        break;
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "accept error");
            }
        }
    }
}

fn handle_request(line: &str, ctx: &AppContext, registry: &CommandRegistry) -> DaemonResponse {
    let req: DaemonRequest = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => {
            return DaemonResponse {
                id: "unknown".into(),
                result: None,
                error: Some(ErrorInfo {
                    code: ErrorCode::InvalidInput,
                    message: format!("invalid JSON request: {}", e),
                }),
            };
        }
    };

    let result = match req.method.as_str() {
        "call" => {
            let cmd_name = req.params.get("cmd").and_then(|v| v.as_str()).unwrap_or("");
            let args = req
                .params
                .get("args")
                .cloned()
                .unwrap_or(serde_json::Value::Object(Default::default()));
            registry.execute(cmd_name, args, ctx)
        }
        "normalize" => registry.execute("normalize_intent", req.params, ctx),
        other => {
            return DaemonResponse {
                id: req.id,
                result: None,
                error: Some(ErrorInfo {
                    code: ErrorCode::InvalidInput,
                    message: format!("unknown method: {}", other),
                }),
            };
        }
    };

    DaemonResponse {
        id: req.id,
        result: Some(result),
        error: None,
    }
}
