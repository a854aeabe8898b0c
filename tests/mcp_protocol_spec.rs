//! MCP protocol integration tests.
//!
//! These tests spawn the actual `skill-forge mcp` process and communicate via
//! JSON-RPC over stdio, testing the complete MCP protocol flow.
//!
//! The rmcp library uses line-delimited JSON (each message is one line):
//! ```text
//! {"jsonrpc":"2.0","id":1,"method":"initialize",...}\n
//! {"jsonrpc":"2.0","id":1,"result":{...}}\n
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

/// JSON-RPC 2.0 request
#[derive(Debug, Serialize)]
struct JsonRpcRequest {
    jsonrpc: &'static str,
    id: u64,
    method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Value>,
}

/// JSON-RPC 2.0 response
#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: String,
    #[allow(dead_code)]
    id: Option<u64>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct JsonRpcError {
    code: i64,
    message: String,
    data: Option<Value>,
}

/// MCP test client that spawns and communicates with the server
struct McpTestClient {
    child: Child,
    request_id: u64,
    reader: BufReader<std::process::ChildStdout>,
}

impl McpTestClient {
    /// Spawn a server with persistence disabled
    fn spawn() -> Self {
        Self::spawn_with(&[("SKILL_FORGE_PERSIST", "false")])
    }

    /// Spawn a server that persists to `state_file`
    fn spawn_persistent(state_file: &Path) -> Self {
        Self::spawn_with(&[
            ("SKILL_FORGE_PERSIST", "true"),
            ("SKILL_FORGE_STATE_FILE", state_file.to_str().expect("utf-8 path")),
        ])
    }

    fn spawn_with(env: &[(&str, &str)]) -> Self {
        // Isolate from the real home directory
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");

        let mut command = Command::new(env!("CARGO_BIN_EXE_skill-forge"));
        command
            .arg("mcp")
            .env("HOME", temp_dir.path())
            .env_remove("SKILL_FORGE_LANG")
            .env_remove("SKILL_FORGE_STATE_FILE")
            .env_remove("SKILL_FORGE_CONTENT_DIR")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        for (key, value) in env {
            command.env(key, value);
        }
        let mut child = command.spawn().expect("Failed to spawn skill-forge mcp");

        let stdout = child.stdout.take().expect("Failed to get stdout");
        let reader = BufReader::new(stdout);

        // Keep temp_dir alive by leaking it (tests are short-lived anyway)
        std::mem::forget(temp_dir);

        Self {
            child,
            request_id: 0,
            reader,
        }
    }

    /// Send a message as line-delimited JSON
    fn send_message(&mut self, content: &str) {
        let stdin = self.child.stdin.as_mut().expect("Failed to get stdin");
        writeln!(stdin, "{}", content).expect("Failed to write message");
        stdin.flush().expect("Failed to flush stdin");
    }

    /// Read a message as line-delimited JSON
    fn read_message(&mut self) -> String {
        let mut line = String::new();
        self.reader
            .read_line(&mut line)
            .expect("Failed to read line");
        line.trim().to_string()
    }

    /// Send a JSON-RPC request and get the response
    fn request(&mut self, method: &str, params: Option<Value>) -> JsonRpcResponse {
        self.request_id += 1;
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.request_id,
            method: method.to_string(),
            params,
        };

        let request_json = serde_json::to_string(&request).expect("Failed to serialize request");
        self.send_message(&request_json);

        let response_json = self.read_message();
        serde_json::from_str(&response_json).expect("Failed to parse response")
    }

    /// Send initialize request and initialized notification (required first messages)
    fn initialize(&mut self) -> JsonRpcResponse {
        let response = self.request(
            "initialize",
            Some(json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": {
                    "name": "test-client",
                    "version": "1.0.0"
                }
            })),
        );

        let notification = json!({
            "jsonrpc": "2.0",
            "method": "notifications/initialized"
        });
        self.send_message(&notification.to_string());

        response
    }

    fn read_resource(&mut self, uri: &str) -> JsonRpcResponse {
        self.request("resources/read", Some(json!({ "uri": uri })))
    }

    fn call_tool(&mut self, name: &str, arguments: Value) -> JsonRpcResponse {
        self.request(
            "tools/call",
            Some(json!({
                "name": name,
                "arguments": arguments
            })),
        )
    }

    /// Close stdin and wait for a clean exit
    fn shutdown(mut self) {
        drop(self.child.stdin.take());
        let status = self.child.wait().expect("Failed to wait for server");
        assert!(status.success(), "Server exited with {status}");
    }
}

impl Drop for McpTestClient {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn result(response: JsonRpcResponse) -> Value {
    assert!(
        response.error.is_none(),
        "Expected success, got error: {:?}",
        response.error
    );
    response.result.expect("Expected result")
}

fn names(list: &Value, key: &str, field: &str) -> Vec<String> {
    list.get(key)
        .and_then(|v| v.as_array())
        .unwrap_or_else(|| panic!("Expected {key} array"))
        .iter()
        .filter_map(|item| item.get(field).and_then(|n| n.as_str()))
        .map(String::from)
        .collect()
}

fn extract_text_content(response: JsonRpcResponse) -> String {
    result(response)
        .get("content")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|c| c.get("text"))
        .and_then(|t| t.as_str())
        .expect("Expected text content in response")
        .to_string()
}

// ============================================================
// Protocol Tests
// ============================================================

mod protocol {
    use super::*;

    #[test]
    fn initialize_returns_server_info() {
        let mut client = McpTestClient::spawn();
        let result = result(client.initialize());

        assert_eq!(result["serverInfo"]["name"], "skill-forge");
        let capabilities = &result["capabilities"];
        assert!(capabilities.get("tools").is_some());
        assert!(capabilities.get("resources").is_some());
        assert!(capabilities.get("prompts").is_some());
    }

    #[test]
    fn lists_tools_resources_templates_and_prompts() {
        let mut client = McpTestClient::spawn();
        client.initialize();

        let tools = names(&result(client.request("tools/list", None)), "tools", "name");
        assert_eq!(tools.len(), 3);
        for tool in ["search_process", "mark_progress", "get_status"] {
            assert!(tools.contains(&tool.to_string()), "missing tool {tool}");
        }

        let resources = names(
            &result(client.request("resources/list", None)),
            "resources",
            "uri",
        );
        assert_eq!(resources.len(), 10);
        assert_eq!(resources[0], "process://manifest");
        assert_eq!(resources[9], "process://phase/8");

        let templates = names(
            &result(client.request("resources/templates/list", None)),
            "resourceTemplates",
            "uriTemplate",
        );
        assert_eq!(
            templates,
            vec![
                "process://phase/{phaseId}/section/{sectionName}",
                "process://phases/{phaseIds}",
            ]
        );

        let prompts = names(&result(client.request("prompts/list", None)), "prompts", "name");
        assert!(prompts.contains(&"create_skill".to_string()));
        assert!(prompts.contains(&"resume_skill".to_string()));
    }

    #[test]
    fn tool_schemas_use_camel_case_arguments() {
        let mut client = McpTestClient::spawn();
        client.initialize();

        let tools = result(client.request("tools/list", None));
        let tools = tools["tools"].as_array().expect("Tools should be array");
        let mark = tools
            .iter()
            .find(|t| t["name"] == "mark_progress")
            .expect("mark_progress tool");
        assert!(mark["description"].is_string());
        assert!(mark["inputSchema"]["properties"].get("phaseId").is_some());

        let search = tools
            .iter()
            .find(|t| t["name"] == "search_process")
            .expect("search_process tool");
        assert!(search["inputSchema"]["properties"].get("maxResults").is_some());
    }
}

// ============================================================
// Resource Tests
// ============================================================

mod resource_reads {
    use super::*;

    #[test]
    fn reads_a_phase_document() {
        let mut client = McpTestClient::spawn();
        client.initialize();

        let result = result(client.read_resource("process://phase/1"));
        let contents = result["contents"].as_array().expect("contents");
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0]["uri"], "process://phase/1");
        assert_eq!(contents[0]["mimeType"], "text/markdown");
        assert!(contents[0]["text"]
            .as_str()
            .unwrap()
            .starts_with("# Phase 1"));
    }

    #[test]
    fn batch_read_returns_each_phase() {
        let mut client = McpTestClient::spawn();
        client.initialize();

        let result = result(client.read_resource("process://phases/0,8"));
        let contents = result["contents"].as_array().expect("contents");
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[1]["uri"], "process://phase/8");
    }

    #[test]
    fn unknown_section_returns_resource_not_found() {
        let mut client = McpTestClient::spawn();
        client.initialize();

        let response = client.read_resource("process://phase/0/section/frontmat");
        let error = response.error.expect("Expected error");
        assert_eq!(error.code, -32002);
        let data = error.data.expect("Expected error data");
        assert_eq!(data["suggestion"], "Did you mean 'frontmatter'?");
        assert!(data["availableSections"].as_array().unwrap().len() > 1);
    }

    #[test]
    fn out_of_range_phase_returns_resource_not_found() {
        let mut client = McpTestClient::spawn();
        client.initialize();

        let response = client.read_resource("process://phase/9");
        let error = response.error.expect("Expected error");
        assert_eq!(error.code, -32002);
        assert!(error.message.contains("Valid range: 0-8"));
    }
}

// ============================================================
// Tool Call Tests
// ============================================================

mod tool_calls {
    use super::*;

    #[test]
    fn search_returns_text_and_structured_content() {
        let mut client = McpTestClient::spawn();
        client.initialize();

        let result = result(client.call_tool(
            "search_process",
            json!({ "query": "frontmatter", "maxResults": 2 }),
        ));
        let text = result["content"][0]["text"].as_str().expect("text");
        assert!(text.starts_with("Found 2 matches for 'frontmatter'"));
        assert_eq!(result["structuredContent"]["total"], 2);
        assert!(result["structuredContent"]["results"][0]["sectionName"].is_string());
    }

    #[test]
    fn mark_progress_then_get_status() {
        let mut client = McpTestClient::spawn();
        client.initialize();

        client.read_resource("process://phase/0");
        let text = extract_text_content(client.call_tool(
            "mark_progress",
            json!({ "phaseId": 0, "status": "completed", "note": "read it" }),
        ));
        assert_eq!(text, "Phase 0 marked as 'completed'.");

        let status = result(client.call_tool("get_status", json!({})));
        let table = status["content"][0]["text"].as_str().expect("table");
        assert!(table.contains("| 0 | SKILL.md Specification | completed | 1 |"));
        assert_eq!(status["structuredContent"]["phases"][0]["status"], "completed");
        assert_eq!(status["structuredContent"]["phases"][0]["reads"], 1);
    }

    #[test]
    fn mark_progress_rejects_unknown_status() {
        let mut client = McpTestClient::spawn();
        client.initialize();

        let response = client.call_tool(
            "mark_progress",
            json!({ "phaseId": 1, "status": "done" }),
        );
        assert!(response.error.is_some());
    }
}

// ============================================================
// Persistence Tests
// ============================================================

mod persistence {
    use super::*;

    fn state_file() -> PathBuf {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("state.json");
        std::mem::forget(dir);
        path
    }

    #[test]
    fn progress_survives_restart() {
        let path = state_file();

        let mut client = McpTestClient::spawn_persistent(&path);
        client.initialize();
        result(client.call_tool(
            "mark_progress",
            json!({ "phaseId": 3, "status": "in-progress" }),
        ));
        client.read_resource("process://phase/3/section/gap-catalog");
        client.shutdown();

        let mut client = McpTestClient::spawn_persistent(&path);
        client.initialize();
        let status = result(client.call_tool("get_status", json!({})));
        assert_eq!(status["structuredContent"]["phases"][3]["status"], "in-progress");
        assert_eq!(status["structuredContent"]["phases"][3]["reads"], 1);
    }

    #[test]
    fn disabled_persistence_writes_nothing() {
        let path = state_file();

        let mut client = McpTestClient::spawn_with(&[
            ("SKILL_FORGE_PERSIST", "1"),
            ("SKILL_FORGE_STATE_FILE", path.to_str().unwrap()),
        ]);
        client.initialize();
        result(client.call_tool(
            "mark_progress",
            json!({ "phaseId": 2, "status": "completed" }),
        ));
        client.shutdown();

        assert!(!path.exists());
    }
}
