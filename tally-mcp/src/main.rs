//! Tally MCP Server
//!
//! Line-delimited JSON-RPC 2.0 over stdio. Logs go to stderr.
//!
//! Tools:
//! - validate_config: Check a calculator config document
//! - evaluate: Evaluate a single expression
//! - evaluate_file: Calculate a config file by reference
//! - convert, resolve_unit, conversion_table, conversion_formula, list_units
//! - list_functions: Helpers, Math.* functions and constants
//! - fx_rate: ECB reference exchange rate
//!
//! Resources:
//! - tally://configs - List available config files
//! - tally://configs/{name} - Get specific config

mod rates;
mod resources;
mod settings;
mod tools;

use rates::{FileRateSource, RateCache, RateSource};
use resources::{list_config_files, load_config_file, CONFIG_URI_PREFIX};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use settings::Settings;
use std::io::{self, BufRead, Write};
use tally::Tally;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

const PROTOCOL_VERSION: &str = "2025-11-25";
const SERVER_NAME: &str = "tally";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

const PARSE_ERROR: i32 = -32700;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;

// MCP Protocol types
#[derive(Debug, Deserialize)]
struct McpRequest {
    #[allow(dead_code)]
    jsonrpc: String,
    id: Option<JsonValue>,
    method: String,
    #[serde(default)]
    params: Option<JsonValue>,
}

#[derive(Debug, Serialize)]
struct McpResponse {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<McpError>,
}

impl McpResponse {
    fn new(id: Option<JsonValue>, outcome: Result<JsonValue, McpError>) -> Self {
        let (result, error) = match outcome {
            Ok(r) => (Some(r), None),
            Err(e) => (None, Some(e)),
        };
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result,
            error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct McpError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<JsonValue>,
}

impl McpError {
    pub(crate) fn invalid_params(message: impl Into<String>) -> Self {
        Self {
            code: INVALID_PARAMS,
            message: message.into(),
            data: None,
        }
    }

    pub(crate) fn with_data(mut self, data: JsonValue) -> Self {
        self.data = Some(data);
        self
    }
}

/// Everything a request handler may touch
pub(crate) struct Server {
    pub(crate) tally: Tally,
    pub(crate) settings: Settings,
    pub(crate) rates: RateCache,
    pub(crate) rate_source: Box<dyn RateSource>,
}

impl Server {
    fn new(settings: Settings) -> Self {
        Self {
            tally: Tally::with_standard_library(),
            rates: RateCache::new(settings.rate_ttl),
            rate_source: Box::new(FileRateSource::new(settings.ecb_path.clone())),
            settings,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();

    let mut server = Server::new(Settings::from_env());

    info!(version = SERVER_VERSION, protocol = PROTOCOL_VERSION, "Tally MCP Server started");
    info!(data_path = %server.settings.data_path.display(), ecb_path = %server.settings.ecb_path.display(), "settings");

    let files = list_config_files(&server.settings.data_path);
    info!(count = files.len(), "available config files");
    for f in &files {
        debug!(name = %f.name, title = ?f.title, "config file");
    }

    let stdin = io::stdin();
    let mut reader = io::BufReader::new(stdin.lock());

    info!("Server ready, waiting for requests...");

    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => {
                info!("Client disconnected (EOF)");
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                debug!(bytes = line.len(), "received");

                let Some(response) = handle_line(&mut server, line) else {
                    continue;
                };
                if let Err(e) = write_response(&response) {
                    error!(error = %e, "Error writing response");
                    break;
                }
            }
            Err(e) => {
                error!(error = %e, "Error reading input");
                break;
            }
        }
    }

    info!("Server shutting down");
}

/// Handle one protocol frame. Notifications (no id) get no response.
fn handle_line(server: &mut Server, line: &str) -> Option<McpResponse> {
    let request: McpRequest = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "Error parsing request");
            return Some(McpResponse::new(
                None,
                Err(McpError {
                    code: PARSE_ERROR,
                    message: format!("Parse error: {}", e),
                    data: None,
                }),
            ));
        }
    };

    debug!(method = %request.method, "processing");
    let response = handle_request(server, &request);

    if request.id.is_none() {
        debug!(method = %request.method, "notification processed (no response)");
        return None;
    }
    Some(response)
}

fn write_response(response: &McpResponse) -> io::Result<()> {
    let response_json = serde_json::to_string(response).map_err(io::Error::other)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", response_json)?;
    stdout.flush()
}

fn handle_request(server: &mut Server, request: &McpRequest) -> McpResponse {
    let result = match request.method.as_str() {
        // Lifecycle
        "initialize" => handle_initialize(&request.params),
        "initialized" => Ok(json!({})),
        "ping" => Ok(json!({})),

        // Tools
        "tools/list" => Ok(tools::tools_list()),
        "tools/call" => handle_tool_call(server, &request.params),

        // Resources
        "resources/list" => handle_resources_list(server),
        "resources/read" => handle_resources_read(server, &request.params),

        _ => Err(McpError {
            code: METHOD_NOT_FOUND,
            message: format!("Method not found: {}", request.method),
            data: None,
        }),
    };

    McpResponse::new(request.id.clone(), result)
}

fn handle_initialize(params: &Option<JsonValue>) -> Result<JsonValue, McpError> {
    let client_info = params
        .as_ref()
        .and_then(|p| p.get("clientInfo"))
        .and_then(|c| c.get("name"))
        .and_then(|n| n.as_str())
        .unwrap_or("unknown");

    // Use client's protocol version for compatibility
    let client_protocol = params
        .as_ref()
        .and_then(|p| p.get("protocolVersion"))
        .and_then(|v| v.as_str())
        .unwrap_or(PROTOCOL_VERSION);

    info!(client = client_info, protocol = client_protocol, "Client connected");

    Ok(json!({
        "protocolVersion": client_protocol,
        "serverInfo": {
            "name": SERVER_NAME,
            "version": SERVER_VERSION,
            "description": "Declarative calculators and unit conversion"
        },
        "capabilities": {
            "tools": {
                "listChanged": false
            },
            "resources": {
                "subscribe": false,
                "listChanged": false
            }
        },
        "instructions": "Tally validates calculator config documents, evaluates their formulas and converts between units. Use 'list_functions' to see what expressions may call and 'list_units' for unit ids. Unavailable results are reported as null and shown as '—'."
    }))
}

fn handle_tool_call(server: &mut Server, params: &Option<JsonValue>) -> Result<JsonValue, McpError> {
    let params = params.as_ref().ok_or_else(|| McpError::invalid_params("Missing params"))?;

    let name = params
        .get("name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| McpError::invalid_params("Missing tool name"))?;

    let args = params.get("arguments").cloned().unwrap_or(json!({}));
    tools::call_tool(server, name, &args)
}

fn handle_resources_list(server: &Server) -> Result<JsonValue, McpError> {
    let files = list_config_files(&server.settings.data_path);

    let resources: Vec<JsonValue> = files
        .iter()
        .map(|f| {
            json!({
                "uri": format!("{}{}", CONFIG_URI_PREFIX, f.name),
                "name": f.name,
                "description": f.title.clone().unwrap_or_else(|| format!("Calculator config: {}.json", f.name)),
                "mimeType": "application/json"
            })
        })
        .collect();

    Ok(json!({ "resources": resources }))
}

fn handle_resources_read(server: &Server, params: &Option<JsonValue>) -> Result<JsonValue, McpError> {
    let uri = params
        .as_ref()
        .and_then(|p| p.get("uri"))
        .and_then(|u| u.as_str())
        .ok_or_else(|| McpError::invalid_params("Missing uri parameter"))?;

    let name = uri.strip_prefix(CONFIG_URI_PREFIX).ok_or_else(|| {
        McpError::invalid_params(format!("Invalid URI: {}. Expected {}{{name}}", uri, CONFIG_URI_PREFIX))
    })?;

    let content = load_config_file(&server.settings.data_path, name).map_err(McpError::invalid_params)?;

    Ok(json!({
        "contents": [{
            "uri": uri,
            "mimeType": "application/json",
            "text": content
        }]
    }))
}
