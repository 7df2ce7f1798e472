//! JSON-RPC tool surface for the iceberg explorer
//!
//! Exposes the controller contract (search, toggles, derived needs, graph) as
//! MCP-style tools so a browser or agent front end can drive a session.

use crate::app::IcebergApp;
use crate::selection::Action;
use anyhow::{anyhow, Result};
use serde_json::{json, Value};

// ============================================================================
// TOOL DEFINITIONS
// ============================================================================

fn label_tool(name: &str, description: &str, field: &str, field_description: &str) -> Value {
    json!({
        "name": name,
        "description": description,
        "inputSchema": {
            "type": "object",
            "properties": {
                field: {
                    "type": "string",
                    "description": field_description
                }
            },
            "required": [field]
        }
    })
}

/// Tool definitions
pub fn get_tools() -> Vec<Value> {
    vec![
        json!({
            "name": "search",
            "description": "Search faux feelings and feelings. Returns ranked feelings (prefix, synonym of prefix, substring, synonym of substring) and faux feelings whose label contains the query. The query becomes the session's current query.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Free text; blank clears the results"
                    }
                },
                "required": ["query"]
            }
        }),
        label_tool(
            "toggle_faux_feeling",
            "Select or deselect a faux feeling. Selecting hides any feeling with the same text.",
            "label",
            "Exact faux feeling label, e.g. 'Overwhelmed'",
        ),
        label_tool(
            "toggle_feeling",
            "Select or deselect a feeling for the iceberg diagram.",
            "label",
            "Feeling, case-insensitive",
        ),
        label_tool(
            "toggle_need",
            "Select or deselect a need for the iceberg diagram.",
            "label",
            "Need exactly as listed in the dataset",
        ),
        json!({
            "name": "get_selected_needs",
            "description": "Needs underneath the currently selected faux feelings, without duplicates.",
            "inputSchema": { "type": "object", "properties": {} }
        }),
        json!({
            "name": "get_graph",
            "description": "Nodes and weighted links (faux feeling -> feeling -> need) for the iceberg diagram.",
            "inputSchema": { "type": "object", "properties": {} }
        }),
        json!({
            "name": "get_view",
            "description": "Full view model: query, search results, all selections, needs and graph.",
            "inputSchema": { "type": "object", "properties": {} }
        }),
        json!({
            "name": "list_categories",
            "description": "Browse-by-category landing list.",
            "inputSchema": { "type": "object", "properties": {} }
        }),
        label_tool(
            "get_category",
            "One category with each of its feelings flagged as selected or not.",
            "id",
            "Category id",
        ),
    ]
}

// ============================================================================
// DISPATCH
// ============================================================================

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const TOOL_ERROR: i64 = -32000;

/// JSON-RPC error envelope
pub fn error_response(id: Value, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {"code": code, "message": message}
    })
}

fn string_arg<'a>(args: &'a Value, field: &str) -> Result<&'a str> {
    args.get(field)
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow!("Missing string argument '{}'", field))
}

/// Run one tool call against the session
pub fn call_tool(app: &mut IcebergApp, name: &str, args: &Value) -> Result<Value> {
    match name {
        "search" => {
            let query = string_arg(args, "query")?;
            let view = app.dispatch(Action::SetQuery(query.to_string()));
            Ok(serde_json::to_value(&view.search)?)
        }
        "toggle_faux_feeling" => {
            app.toggle_faux_feeling(string_arg(args, "label")?);
            Ok(serde_json::to_value(app.view())?)
        }
        "toggle_feeling" => {
            app.toggle_feeling(string_arg(args, "label")?);
            Ok(serde_json::to_value(app.view())?)
        }
        "toggle_need" => {
            app.toggle_need(string_arg(args, "label")?);
            Ok(serde_json::to_value(app.view())?)
        }
        "get_selected_needs" => Ok(json!({ "needs": app.get_selected_needs() })),
        "get_graph" => Ok(serde_json::to_value(app.get_graph())?),
        "get_view" => Ok(serde_json::to_value(app.view())?),
        "list_categories" => Ok(json!({ "categories": app.categories() })),
        "get_category" => {
            let id = string_arg(args, "id")?;
            match app.category_view(id) {
                Some(view) => Ok(serde_json::to_value(view)?),
                None => Err(anyhow!("Unknown category: {}", id)),
            }
        }
        _ => Err(anyhow!("Unknown tool: {}", name)),
    }
}

/// Handle a JSON-RPC request object and build the response object
pub fn handle_request(app: &mut IcebergApp, request: &Value) -> Value {
    let method = request.get("method").and_then(|m| m.as_str()).unwrap_or("");
    let params = request.get("params").cloned().unwrap_or_else(|| json!({}));
    let id = request.get("id").cloned().unwrap_or(json!(1));

    let result = match method {
        "tools/list" => Ok(json!({ "tools": get_tools() })),
        "tools/call" => {
            let name = params.get("name").and_then(|n| n.as_str()).unwrap_or("");
            let args = params.get("arguments").unwrap_or(&params);
            call_tool(app, name, args)
        }
        _ => Err(anyhow!("Unknown method: {}", method)),
    };

    match result {
        Ok(r) => json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": r
        }),
        Err(e) => {
            tracing::debug!("JSON-RPC error for '{}': {}", method, e);
            error_response(id, TOOL_ERROR, &e.to_string())
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
