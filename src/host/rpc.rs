//! Line-delimited JSON-RPC 2.0 session with the host.

use crate::config::GeneratorSettings;
use crate::error::GeneratorError;
use crate::generation::Generator;
use crate::host::manifest::GeneratorManifest;
use crate::host::options::GeneratorOptions;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};
use tracing::{debug, error, info, warn};

pub const PARSE_ERROR: i64 = -32700;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
/// Generation failed; `data.stage` names the pipeline stage.
pub const GENERATION_FAILED: i64 = -32000;

#[derive(Debug, Clone, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    fn failure(id: Value, code: i64, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
                data,
            }),
        }
    }
}

/// Answers host requests. Settings supply fallbacks for options the host omits.
#[derive(Debug, Clone, Default)]
pub struct HostSession {
    settings: GeneratorSettings,
    manifest: GeneratorManifest,
}

impl HostSession {
    pub fn new(settings: GeneratorSettings) -> Self {
        Self {
            settings,
            manifest: GeneratorManifest::default(),
        }
    }

    /// Handle one raw request line.
    pub fn handle_line(&self, line: &str) -> RpcResponse {
        match serde_json::from_str::<RpcRequest>(line) {
            Ok(request) => self.handle(request),
            Err(e) => {
                warn!(error = %e, "Malformed host request");
                RpcResponse::failure(Value::Null, PARSE_ERROR, format!("parse error: {}", e), None)
            }
        }
    }

    pub fn handle(&self, request: RpcRequest) -> RpcResponse {
        debug!(method = %request.method, "Host request");
        match request.method.as_str() {
            "getManifest" => {
                RpcResponse::success(request.id, json!({ "manifest": self.manifest }))
            }
            "generate" => self.generate(request.id, request.params),
            other => RpcResponse::failure(
                request.id,
                METHOD_NOT_FOUND,
                format!("method not found: {}", other),
                None,
            ),
        }
    }

    fn generate(&self, id: Value, params: Value) -> RpcResponse {
        let options: GeneratorOptions = match serde_json::from_value(params) {
            Ok(options) => options,
            Err(e) => {
                return RpcResponse::failure(
                    id,
                    INVALID_PARAMS,
                    format!("invalid generator options: {}", e),
                    None,
                )
            }
        };

        let generator = Generator::new(options.to_generation_config(&self.settings));
        let source = options.model_source(&self.settings);
        match generator.run(&source) {
            Ok(report) => {
                info!(
                    queries = report.queries,
                    mutations = report.mutations,
                    "Generation finished"
                );
                RpcResponse::success(id, Value::Null)
            }
            Err(e) => {
                error!(stage = e.stage(), error = %e, "Generation failed");
                failure_for(id, &e)
            }
        }
    }
}

fn failure_for(id: Value, err: &GeneratorError) -> RpcResponse {
    RpcResponse::failure(
        id,
        GENERATION_FAILED,
        err.to_string(),
        Some(json!({ "stage": err.stage() })),
    )
}

/// Serve requests until `reader` reaches end of input.
pub fn serve<R: BufRead, W: Write>(
    session: &HostSession,
    reader: R,
    mut writer: W,
) -> io::Result<()> {
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let response = session.handle_line(&line);
        let encoded = serde_json::to_string(&response)?;
        writeln!(writer, "{}", encoded)?;
        writer.flush()?;
    }
    debug!("Host closed the request stream");
    Ok(())
}
