//! Kroki-backed rendering engines for illume.
//!
//! Implements the pipeline's engine seams against a Kroki server:
//! - [`KrokiDiagramEngine`] posts mermaid source and receives SVG
//! - [`KrokiDrawingExport`] posts an excalidraw document and receives SVG
//!
//! [`KrokiEngineProvider`] is the loader handed to the pipeline; engine
//! construction (HTTP agent included) happens only when the pipeline
//! activates a renderer, which keeps unused engines cost-free.

use std::time::Duration;

use serde_json::{Map, Value};
use ureq::Agent;

use illume_enhance::{
    DiagramEngine, DiagramEngineLoader, DiagramOptions, DrawingExport, DrawingExportLoader,
    EngineError, ExportRequest,
};

/// Default HTTP timeout for render calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Create an HTTP agent with the given timeout.
fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// POST a render request and return the SVG response body.
fn post_svg(
    agent: &Agent,
    url: &str,
    content_type: &str,
    body: &[u8],
) -> Result<String, EngineError> {
    let response = agent
        .post(url)
        .header("Content-Type", content_type)
        .send(body)
        .map_err(|e| EngineError::Http(e.to_string()))?;

    let status = response.status().as_u16();
    let mut body = response.into_body();

    if status >= 400 {
        let error_body = body
            .read_to_string()
            .unwrap_or_else(|_| String::from("(unable to read error body)"));
        return Err(EngineError::Http(format!("HTTP {status}: {error_body}")));
    }

    let svg = body.read_to_string().map_err(|e| EngineError::Io(e.to_string()))?;
    if !svg.contains("<svg") {
        return Err(EngineError::InvalidOutput(
            "response does not contain an <svg> root".to_owned(),
        ));
    }
    Ok(svg)
}

/// Build the theme/fit init directive prepended to mermaid source.
fn init_directive(options: &DiagramOptions) -> String {
    format!(
        r#"%%{{init: {{"theme": "{}", "flowchart": {{"useMaxWidth": {fit}}}, "sequence": {{"useMaxWidth": {fit}}}}}}}%%"#,
        options.theme.as_str(),
        fit = options.fit_to_width,
    )
}

/// Prepend the init directive unless the source carries its own.
fn prepare_source(source: &str, directive: &str) -> String {
    if source.trim_start().starts_with("%%{init") {
        source.to_owned()
    } else {
        format!("{directive}\n{source}")
    }
}

/// Mermaid engine rendering through a Kroki server.
pub struct KrokiDiagramEngine {
    agent: Agent,
    endpoint_url: String,
    directive: String,
}

impl DiagramEngine for KrokiDiagramEngine {
    fn render(&self, source: &str) -> Result<String, EngineError> {
        let prepared = prepare_source(source, &self.directive);
        post_svg(
            &self.agent,
            &self.endpoint_url,
            "text/plain",
            prepared.as_bytes(),
        )
    }
}

/// Build the excalidraw document posted to the server.
fn build_export_payload(request: &ExportRequest<'_>) -> Value {
    let mut app_state: Map<String, Value> = request.app_state.clone();
    app_state.insert("exportPadding".to_owned(), Value::from(request.padding));
    serde_json::json!({
        "type": "excalidraw",
        "version": 2,
        "elements": request.elements,
        "appState": app_state,
        "files": request.files,
    })
}

/// Drawing export engine rendering through a Kroki server.
pub struct KrokiDrawingExport {
    agent: Agent,
    endpoint_url: String,
}

impl DrawingExport for KrokiDrawingExport {
    fn export(&self, request: &ExportRequest<'_>) -> Result<String, EngineError> {
        let payload = build_export_payload(request);
        let body =
            serde_json::to_vec(&payload).map_err(|e| EngineError::InvalidOutput(e.to_string()))?;
        post_svg(&self.agent, &self.endpoint_url, "application/json", &body)
    }
}

/// Deferred constructor for both Kroki engines.
#[derive(Clone, Debug)]
pub struct KrokiEngineProvider {
    server_url: String,
    timeout: Duration,
}

impl KrokiEngineProvider {
    /// Provider for the given Kroki server URL.
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the HTTP timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self, engine: &str) -> String {
        format!("{}/{engine}/svg", self.server_url.trim_end_matches('/'))
    }
}

impl DiagramEngineLoader for KrokiEngineProvider {
    fn load(&self, options: &DiagramOptions) -> Result<Box<dyn DiagramEngine>, EngineError> {
        tracing::debug!(server = %self.server_url, "Loading mermaid engine");
        Ok(Box::new(KrokiDiagramEngine {
            agent: create_agent(self.timeout),
            endpoint_url: self.endpoint("mermaid"),
            directive: init_directive(options),
        }))
    }
}

impl DrawingExportLoader for KrokiEngineProvider {
    fn load(&self) -> Result<Box<dyn DrawingExport>, EngineError> {
        tracing::debug!(server = %self.server_url, "Loading drawing export engine");
        Ok(Box::new(KrokiDrawingExport {
            agent: create_agent(self.timeout),
            endpoint_url: self.endpoint("excalidraw"),
        }))
    }
}
