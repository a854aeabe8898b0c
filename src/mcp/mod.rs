//! MCP server exposing the phase corpus as resources, tools, and prompts.

mod types;

use std::sync::Arc;

pub use types::*;

use chrono::SecondsFormat;
use rmcp::{
    handler::server::{
        router::{prompt::PromptRouter, tool::ToolRouter},
        wrapper::Parameters,
    },
    model::{
        AnnotateAble, CallToolResult, Content, GetPromptRequestParam, GetPromptResult,
        ListPromptsResult, ListResourceTemplatesResult, ListResourcesResult,
        PaginatedRequestParam, PromptMessage, PromptMessageRole, RawResource,
        ReadResourceRequestParam, ReadResourceResult, Resource, ResourceContents,
        ResourceTemplate, ServerCapabilities, ServerInfo,
    },
    prompt, prompt_handler, prompt_router,
    service::RequestContext,
    tool, tool_handler, tool_router, ErrorData as McpError, RoleServer, ServerHandler, ServiceExt,
};
use serde_json::json;

use crate::address::{
    AddressError, ResourceAddress, BATCH_URI_TEMPLATE, MANIFEST_URI, SECTION_URI_TEMPLATE,
};
use crate::content::{Corpus, Locale};
use crate::error::ContentError;
use crate::models::*;
use crate::search::{self, MAX_RESULTS_LIMIT};
use crate::state::SharedState;
use crate::status;

#[derive(Clone)]
pub struct McpServer {
    corpus: Arc<Corpus>,
    locale: Locale,
    state: SharedState,
    tool_router: ToolRouter<Self>,
    prompt_router: PromptRouter<Self>,
}

impl McpServer {
    pub fn new(corpus: Arc<Corpus>, locale: Locale, state: SharedState) -> Self {
        Self {
            corpus,
            locale,
            state,
            tool_router: Self::tool_router(),
            prompt_router: Self::prompt_router(),
        }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    fn manifest(&self) -> &Manifest {
        self.corpus.manifest(self.locale)
    }

    // ============================================================
    // Operations - shared by the protocol handlers and tests
    // ============================================================

    /// Resolve a `process://` address to its text contents.
    ///
    /// Phase, section, and batch reads append to the access log; manifest
    /// reads do not. Nothing is logged unless the whole read succeeds.
    pub fn read(&self, uri: &str) -> Result<Vec<ResourceText>, McpError> {
        match ResourceAddress::parse(uri).map_err(address_error)? {
            ResourceAddress::Manifest => {
                let text = serde_json::to_string(self.manifest())
                    .map_err(|e| McpError::internal_error(e.to_string(), None))?;
                Ok(vec![ResourceText {
                    uri: MANIFEST_URI.to_string(),
                    mime_type: MIME_JSON,
                    text,
                }])
            }
            ResourceAddress::Phase(id) => {
                let item = self.phase_text(id);
                self.state
                    .record_access([AccessLogEntry::new(item.uri.clone(), id.get(), None)]);
                Ok(vec![item])
            }
            ResourceAddress::Section { phase, section } => {
                let text = self
                    .corpus
                    .section(phase, &section, self.locale)
                    .map_err(content_error)?;
                let uri = ResourceAddress::section_uri(phase, &section);
                self.state.record_access([AccessLogEntry::new(
                    uri.clone(),
                    phase.get(),
                    Some(section),
                )]);
                Ok(vec![ResourceText {
                    uri,
                    mime_type: MIME_MARKDOWN,
                    text,
                }])
            }
            ResourceAddress::Batch(ids) => {
                let items: Vec<ResourceText> = ids.iter().map(|&id| self.phase_text(id)).collect();
                self.state.record_access(
                    ids.iter()
                        .zip(&items)
                        .map(|(id, item)| AccessLogEntry::new(item.uri.clone(), id.get(), None)),
                );
                Ok(items)
            }
        }
    }

    fn phase_text(&self, id: PhaseId) -> ResourceText {
        ResourceText {
            uri: ResourceAddress::phase_uri(id),
            mime_type: MIME_MARKDOWN,
            text: self.corpus.document(id, self.locale).to_string(),
        }
    }

    pub fn search(&self, query: &str, max_results: usize) -> Result<SearchResponse, McpError> {
        if !(1..=MAX_RESULTS_LIMIT).contains(&max_results) {
            return Err(McpError::invalid_params(
                format!(
                    "maxResults must be between 1 and {}, got {}",
                    MAX_RESULTS_LIMIT, max_results
                ),
                None,
            ));
        }
        let results = search::search(&self.corpus, self.locale, query, max_results);
        Ok(SearchResponse {
            total: results.len(),
            results,
        })
    }

    pub fn mark_progress(
        &self,
        phase_id: i64,
        status: ProgressStatus,
        note: Option<String>,
    ) -> Result<MarkProgressResponse, McpError> {
        let id = PhaseId::try_from(phase_id).map_err(content_error)?;
        let entry = self
            .state
            .set_progress(id, status, note)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        tracing::info!("Phase {} marked as '{}'", id, status);

        Ok(MarkProgressResponse {
            phase_id: id.get(),
            status: entry.status,
            updated_at: entry
                .updated_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }

    pub fn status(&self) -> StatusResponse {
        let manifest = self.manifest();
        StatusResponse {
            phases: self
                .state
                .read(|state| status::phase_statuses(state, manifest)),
        }
    }

    pub fn status_table(&self) -> String {
        let manifest = self.manifest();
        self.state
            .read(|state| status::format_status_table(state, manifest))
    }

    fn resources(&self) -> Vec<Resource> {
        let mut manifest = RawResource::new(MANIFEST_URI, "manifest");
        manifest.description = Some(
            "List of all 9 phases. Overview, dependencies, and section structure for each phase. Read this first to understand the overall picture."
                .to_string(),
        );
        manifest.mime_type = Some(MIME_JSON.to_string());

        let phases = self.manifest().phases().iter().map(|phase| {
            let mut resource = RawResource::new(
                format!("process://phase/{}", phase.id),
                format!("phase-{}", phase.id),
            );
            resource.description = Some(format!(
                "Phase {}: {}. {}",
                phase.id, phase.name, phase.description
            ));
            resource.mime_type = Some(MIME_MARKDOWN.to_string());
            resource
        });

        std::iter::once(manifest)
            .chain(phases)
            .map(|r| r.no_annotation())
            .collect()
    }
}

// ============================================================
// Error mapping
// ============================================================

fn content_error(e: ContentError) -> McpError {
    match &e {
        ContentError::InvalidPhaseId(_) => McpError::resource_not_found(e.to_string(), None),
        ContentError::SectionNotFound {
            available,
            suggestion,
            ..
        } => {
            let mut data = json!({ "availableSections": available });
            if let Some(s) = suggestion {
                data["suggestion"] = json!(format!("Did you mean '{}'?", s));
            }
            McpError::resource_not_found(e.to_string(), Some(data))
        }
        ContentError::HeadingIntegrity { phase_id, marker } => {
            tracing::error!(
                "Phase {} manifest heading missing from document: {}",
                phase_id,
                marker
            );
            McpError::internal_error(e.to_string(), None)
        }
    }
}

fn address_error(e: AddressError) -> McpError {
    match e {
        AddressError::Unknown(uri) => McpError::resource_not_found(
            format!("Unknown resource: {}", uri),
            Some(json!({ "uri": uri })),
        ),
        AddressError::Content(e) => content_error(e),
    }
}

fn to_contents(item: ResourceText) -> Result<ResourceContents, McpError> {
    serde_json::from_value(json!({
        "uri": item.uri,
        "mimeType": item.mime_type,
        "text": item.text,
    }))
    .map_err(|e| McpError::internal_error(e.to_string(), None))
}

fn template(
    uri_template: &str,
    name: &str,
    description: &str,
) -> Result<ResourceTemplate, McpError> {
    serde_json::from_value(json!({
        "uriTemplate": uri_template,
        "name": name,
        "description": description,
        "mimeType": MIME_MARKDOWN,
    }))
    .map_err(|e| McpError::internal_error(e.to_string(), None))
}

fn structured<T: serde::Serialize>(text: String, value: &T) -> Result<CallToolResult, McpError> {
    let mut result = CallToolResult::success(vec![Content::text(text)]);
    result.structured_content = Some(
        serde_json::to_value(value).map_err(|e| McpError::internal_error(e.to_string(), None))?,
    );
    Ok(result)
}

// ============================================================
// Tools
// ============================================================

#[tool_router]
impl McpServer {
    #[tool(
        description = "Search all phases of the skill creation process by keyword. Case-insensitive partial match. Returns matching phase IDs, section names, and matched lines.",
        annotations(read_only_hint = true, idempotent_hint = true, open_world_hint = false)
    )]
    async fn search_process(
        &self,
        params: Parameters<SearchProcessRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let response = self.search(&req.query, req.max_results)?;
        structured(
            search::format_search_results(&req.query, &response.results),
            &response,
        )
    }

    #[tool(
        name = "mark_progress",
        description = "Record progress status for a phase. status: 'not-started' | 'in-progress' | 'completed'. Persists immediately when persistence is enabled.",
        annotations(
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = false
        )
    )]
    async fn mark_progress_tool(
        &self,
        params: Parameters<MarkProgressRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let response = self.mark_progress(req.phase_id, req.status, req.note)?;
        structured(
            format!(
                "Phase {} marked as '{}'.",
                response.phase_id, response.status
            ),
            &response,
        )
    }

    #[tool(
        description = "Return a summary of all phase progress (not-started/in-progress/completed) and access counts.",
        annotations(read_only_hint = true, idempotent_hint = true, open_world_hint = false)
    )]
    async fn get_status(&self) -> Result<CallToolResult, McpError> {
        structured(self.status_table(), &self.status())
    }
}

// ============================================================
// Prompts
// ============================================================

pub fn create_skill_text(topic: &str) -> String {
    [
        format!("I want to create an Agent Skill for: \"{}\"", topic),
        String::new(),
        "Please follow the SkillForge process:".to_string(),
        "1. Read process://manifest to understand the full 9-phase workflow".to_string(),
        "2. Start from Phase 0 to understand the SKILL.md specification".to_string(),
        "3. Work through each phase sequentially (Phase 1→8)".to_string(),
        "4. Use mark_progress to record your progress on each phase".to_string(),
        "5. Use search_process if you need to find specific guidance".to_string(),
        "6. Generate the final SKILL.md at Phase 6".to_string(),
        "7. Deploy and validate in Phases 7-8".to_string(),
        String::new(),
        "Begin by reading the manifest.".to_string(),
    ]
    .join("\n")
}

pub const RESUME_SKILL_TEXT: &str = "I want to resume my skill creation session.

Please:
1. Call get_status to check my current progress
2. Identify the next incomplete phase
3. Read that phase's content and continue the workflow
4. Use mark_progress as you complete each phase";

#[prompt_router]
impl McpServer {
    #[prompt(
        name = "create_skill",
        description = "Guide the agent through the full skill creation process (Phase 0→8). Provide a topic and the agent will follow the structured workflow."
    )]
    async fn create_skill(
        &self,
        Parameters(args): Parameters<CreateSkillArgs>,
    ) -> Result<Vec<PromptMessage>, McpError> {
        Ok(vec![PromptMessage::new_text(
            PromptMessageRole::User,
            create_skill_text(&args.topic),
        )])
    }

    #[prompt(
        name = "resume_skill",
        description = "Resume a skill creation session. Checks current progress and continues from where you left off."
    )]
    async fn resume_skill(&self) -> Result<Vec<PromptMessage>, McpError> {
        Ok(vec![PromptMessage::new_text(
            PromptMessageRole::User,
            RESUME_SKILL_TEXT,
        )])
    }
}

#[tool_handler]
#[prompt_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: rmcp::model::Implementation {
                name: "skill-forge".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: Some("SkillForge".into()),
                icons: None,
                website_url: None,
            },
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .enable_prompts()
                .build(),
            instructions: Some(
                r#"SkillForge guides the creation of Agent Skills through a 9-phase process.

START HERE:
1. Read process://manifest for the phase list, dependencies, and section names
2. Read one phase at a time with process://phase/{id} (0-8)
3. Read a single section with process://phase/{id}/section/{name}
4. Read several phases at once with process://phases/{id},{id}

WHILE WORKING:
- Call mark_progress when you start and finish each phase
- Call search_process to find guidance by keyword
- Call get_status to see where the session stands

Progress is kept for the lifetime of the server, and across restarts when persistence is enabled."#
                    .into(),
            ),
            ..Default::default()
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult::with_all_items(self.resources()))
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, McpError> {
        Ok(ListResourceTemplatesResult::with_all_items(vec![
            template(
                SECTION_URI_TEMPLATE,
                "section-by-name",
                "Retrieve a specific section within a phase. phaseId: 0-8, sectionName: manifest phases[N].sections[].name",
            )?,
            template(
                BATCH_URI_TEMPLATE,
                "phases-batch",
                "Retrieve multiple phases at once using comma-separated phase IDs. Example: process://phases/1,2,3",
            )?,
        ]))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let contents = self
            .read(&request.uri)?
            .into_iter()
            .map(to_contents)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ReadResourceResult { contents })
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

pub async fn run_stdio_server(server: McpServer) -> anyhow::Result<()> {
    use tokio::io::{stdin, stdout};

    tracing::info!("Starting MCP server via stdio (locale: {})", server.locale());

    let state = server.state().clone();
    let running = server.serve((stdin(), stdout())).await?;

    tokio::select! {
        quit_reason = running.waiting() => {
            tracing::info!("MCP server stopped: {:?}", quit_reason?);
        }
        _ = shutdown_signal() => {
            tracing::info!("Received shutdown signal");
        }
    }

    state.flush()?;
    Ok(())
}
