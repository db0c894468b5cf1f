//! Block enhancement pipeline for rendered documents.
//!
//! Takes a server-rendered HTML document and replaces special content
//! blocks with their final visual form:
//! - code blocks get class-based syntax coloring ([`highlight`])
//! - `mermaid` diagram text is rendered by a lazily constructed engine
//!   ([`diagram`])
//! - `plantuml` diagram text becomes an `<img>` pointing at a remote
//!   rendering server ([`remote`])
//! - `excalidraw` drawing state becomes an inline vector visual, exported
//!   lazily or injected from pre-baked output ([`drawing`])
//!
//! Engines are dependency-injected through loader traits and constructed
//! only when a matching block exists. Every per-block failure is isolated:
//! the pass always returns a document, plus warnings for whatever went
//! wrong along the way.
//!
//! # Example
//!
//! ```
//! use illume_enhance::{Enhancer, Highlighter};
//!
//! let enhancer = Enhancer::new(Highlighter::default());
//! let outcome = enhancer.enhance(
//!     r#"<pre><code class="language-rust">fn main() {}</code></pre>"#,
//! );
//! assert!(outcome.warnings.is_empty());
//! ```

mod block;
mod diagram;
mod drawing;
mod error;
mod highlight;
mod remote;
mod rewrite;
mod scan;
mod util;

pub use block::{BlockSet, CodeBlock, DiagramBlock, DrawingBlock};
pub use diagram::{DiagramEngine, DiagramEngineLoader, DiagramOptions, DiagramTheme};
pub use drawing::{
    DrawingExport, DrawingExportLoader, DrawingState, EXPORT_PADDING, ExportRequest,
};
pub use error::EngineError;
pub use highlight::{Highlighter, PROCESSED_CLASS};
pub use remote::{
    DEFAULT_PLANTUML_FORMAT, DEFAULT_PLANTUML_SERVER, encode_diagram, image_url,
};
pub use scan::scan;
pub use util::{escape_html, unescape_html};

/// Result of one enhancement pass.
#[derive(Debug)]
pub struct EnhanceOutcome {
    /// The rewritten document.
    pub html: String,
    /// Non-fatal per-block warnings, in no particular order.
    pub warnings: Vec<String>,
}

/// Block enhancement pipeline.
///
/// Renderers and engines are wired in with builder methods; `enhance` runs
/// the whole pass. Engine loaders left unset simply report unavailability
/// for their blocks instead of failing the pass.
pub struct Enhancer {
    highlighter: Highlighter,
    diagram_loader: Option<Box<dyn DiagramEngineLoader>>,
    diagram_options: DiagramOptions,
    drawing_loader: Option<Box<dyn DrawingExportLoader>>,
    plantuml_server: String,
    plantuml_format: String,
}

impl Enhancer {
    /// Create a pipeline with the given highlighter and no engines.
    #[must_use]
    pub fn new(highlighter: Highlighter) -> Self {
        Self {
            highlighter,
            diagram_loader: None,
            diagram_options: DiagramOptions::default(),
            drawing_loader: None,
            plantuml_server: DEFAULT_PLANTUML_SERVER.to_owned(),
            plantuml_format: DEFAULT_PLANTUML_FORMAT.to_owned(),
        }
    }

    /// Set the diagram engine loader.
    #[must_use]
    pub fn with_diagram_engine(mut self, loader: impl DiagramEngineLoader + 'static) -> Self {
        self.diagram_loader = Some(Box::new(loader));
        self
    }

    /// Override the fixed diagram engine configuration.
    #[must_use]
    pub fn with_diagram_options(mut self, options: DiagramOptions) -> Self {
        self.diagram_options = options;
        self
    }

    /// Set the drawing export engine loader.
    #[must_use]
    pub fn with_drawing_export(mut self, loader: impl DrawingExportLoader + 'static) -> Self {
        self.drawing_loader = Some(Box::new(loader));
        self
    }

    /// Override the remote rendering server.
    #[must_use]
    pub fn with_plantuml_server(mut self, server: impl Into<String>) -> Self {
        self.plantuml_server = server.into();
        self
    }

    /// Override the remote image format.
    #[must_use]
    pub fn with_plantuml_format(mut self, format: impl Into<String>) -> Self {
        self.plantuml_format = format.into();
        self
    }

    /// Run one enhancement pass over the document.
    ///
    /// Scans once, dispatches every block to its renderer and splices the
    /// rendered fragments back in. Never panics on block content; all
    /// failures surface as inline error markup or warnings.
    #[must_use]
    pub fn enhance(&self, html: &str) -> EnhanceOutcome {
        let blocks = scan(html);
        tracing::debug!(
            code = blocks.code.len(),
            mermaid = blocks.mermaid.len(),
            plantuml = blocks.plantuml.len(),
            drawings = blocks.drawings.len(),
            "Scanned document"
        );

        let mut replacements = Vec::with_capacity(blocks.len());
        let mut warnings = Vec::new();

        replacements.extend(highlight::render_code_blocks(&blocks.code, &self.highlighter));

        let (rendered, diagram_warnings) = diagram::render_diagram_blocks(
            &blocks.mermaid,
            self.diagram_loader
                .as_deref()
                .unwrap_or(&UnconfiguredDiagramLoader),
            &self.diagram_options,
        );
        replacements.extend(rendered);
        warnings.extend(diagram_warnings);

        replacements.extend(remote::render_remote_blocks(
            &blocks.plantuml,
            &self.plantuml_server,
            &self.plantuml_format,
        ));

        let (rendered, drawing_warnings) = drawing::render_drawing_blocks(
            &blocks.drawings,
            self.drawing_loader
                .as_deref()
                .unwrap_or(&UnconfiguredDrawingLoader),
        );
        replacements.extend(rendered);
        warnings.extend(drawing_warnings);

        EnhanceOutcome {
            html: rewrite::apply(html, replacements),
            warnings,
        }
    }
}

/// Stand-in loader reporting that no diagram engine was wired in.
struct UnconfiguredDiagramLoader;

impl DiagramEngineLoader for UnconfiguredDiagramLoader {
    fn load(&self, _options: &DiagramOptions) -> Result<Box<dyn DiagramEngine>, EngineError> {
        Err(EngineError::Unavailable(
            "no diagram engine configured".to_owned(),
        ))
    }
}

/// Stand-in loader reporting that no export engine was wired in.
struct UnconfiguredDrawingLoader;

impl DrawingExportLoader for UnconfiguredDrawingLoader {
    fn load(&self) -> Result<Box<dyn DrawingExport>, EngineError> {
        Err(EngineError::Unavailable(
            "no drawing export engine configured".to_owned(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;

    use super::*;

    struct StaticDiagramEngine;

    impl DiagramEngine for StaticDiagramEngine {
        fn render(&self, source: &str) -> Result<String, EngineError> {
            Ok(format!("<svg data-source=\"{}\"/>", source.len()))
        }
    }

    struct StaticDiagramLoader {
        loads: Arc<AtomicUsize>,
    }

    impl DiagramEngineLoader for StaticDiagramLoader {
        fn load(&self, _options: &DiagramOptions) -> Result<Box<dyn DiagramEngine>, EngineError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(StaticDiagramEngine))
        }
    }

    struct StaticExport;

    impl DrawingExport for StaticExport {
        fn export(&self, request: &ExportRequest<'_>) -> Result<String, EngineError> {
            Ok(format!("<svg data-elements=\"{}\"/>", request.elements.len()))
        }
    }

    struct StaticExportLoader {
        loads: Arc<AtomicUsize>,
    }

    impl DrawingExportLoader for StaticExportLoader {
        fn load(&self) -> Result<Box<dyn DrawingExport>, EngineError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(StaticExport))
        }
    }

    fn full_enhancer(diagram_loads: &Arc<AtomicUsize>, export_loads: &Arc<AtomicUsize>) -> Enhancer {
        Enhancer::new(Highlighter::default())
            .with_diagram_engine(StaticDiagramLoader {
                loads: Arc::clone(diagram_loads),
            })
            .with_drawing_export(StaticExportLoader {
                loads: Arc::clone(export_loads),
            })
    }

    #[test]
    fn test_no_special_blocks_loads_no_engine() {
        let diagram_loads = Arc::new(AtomicUsize::new(0));
        let export_loads = Arc::new(AtomicUsize::new(0));
        let enhancer = full_enhancer(&diagram_loads, &export_loads);

        let outcome = enhancer.enhance("<h1>Plain</h1><p>document</p>");

        assert_eq!(outcome.html, "<h1>Plain</h1><p>document</p>");
        assert!(outcome.warnings.is_empty());
        assert_eq!(diagram_loads.load(Ordering::SeqCst), 0);
        assert_eq!(export_loads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_mixed_document_enhanced_in_place() {
        let diagram_loads = Arc::new(AtomicUsize::new(0));
        let export_loads = Arc::new(AtomicUsize::new(0));
        let enhancer = full_enhancer(&diagram_loads, &export_loads);

        let html = concat!(
            "<h1>Doc</h1>",
            r#"<pre><code class="language-rust">fn main() {}</code></pre>"#,
            r#"<div class="mermaid">graph TD</div>"#,
            r#"<div class="plantuml">@startuml\n@enduml</div>"#,
            r#"<div class="excalidraw" data-src="{&quot;elements&quot;:[]}"></div>"#,
            "<p>tail</p>",
        );
        let outcome = enhancer.enhance(html);

        assert!(outcome.html.starts_with("<h1>Doc</h1>"));
        assert!(outcome.html.ends_with("<p>tail</p>"));
        assert!(outcome.html.contains(PROCESSED_CLASS));
        assert!(outcome.html.contains(r#"<figure class="diagram">"#));
        assert!(outcome.html.contains(r#"<img src="https://www.plantuml.com/plantuml/dsvg/"#));
        assert!(outcome.html.contains(r#"data-elements="0""#));
        assert!(outcome.warnings.is_empty());
        assert_eq!(diagram_loads.load(Ordering::SeqCst), 1);
        assert_eq!(export_loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_bad_drawing_does_not_stop_siblings() {
        let diagram_loads = Arc::new(AtomicUsize::new(0));
        let export_loads = Arc::new(AtomicUsize::new(0));
        let enhancer = full_enhancer(&diagram_loads, &export_loads);

        let html = concat!(
            r#"<div class="excalidraw" data-src="{not valid json"></div>"#,
            r#"<div class="mermaid">graph LR</div>"#,
        );
        let outcome = enhancer.enhance(html);

        assert!(outcome.html.contains("drawing-error"));
        assert!(outcome.html.contains(r#"<figure class="diagram">"#));
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[test]
    fn test_unconfigured_engines_warn_instead_of_failing() {
        let enhancer = Enhancer::new(Highlighter::default());
        let html = concat!(
            r#"<div class="mermaid">graph TD</div>"#,
            r#"<div class="excalidraw" data-src="{&quot;elements&quot;:[]}"></div>"#,
        );
        let outcome = enhancer.enhance(html);

        // The mermaid block stays as-is; the drawing reports inline.
        assert!(outcome.html.contains(r#"<div class="mermaid">graph TD</div>"#));
        assert!(outcome.html.contains("no drawing export engine configured"));
        assert_eq!(outcome.warnings.len(), 2);
    }

    #[test]
    fn test_enhance_is_idempotent_for_code() {
        let enhancer = Enhancer::new(Highlighter::default());
        let first = enhancer.enhance(r#"<pre><code class="language-java">int x;</code></pre>"#);
        let second = enhancer.enhance(&first.html);

        assert_eq!(first.html, second.html);
    }

    #[test]
    fn test_prebaked_drawing_never_needs_engine() {
        let export_loads = Arc::new(AtomicUsize::new(0));
        let enhancer = Enhancer::new(Highlighter::default()).with_drawing_export(
            StaticExportLoader {
                loads: Arc::clone(&export_loads),
            },
        );

        let html = r#"<div class="excalidraw" data-src="{&quot;svg&quot;: &quot;&lt;svg/&gt;&quot;}"></div>"#;
        let outcome = enhancer.enhance(html);

        assert_eq!(export_loads.load(Ordering::SeqCst), 0);
        assert!(outcome.html.contains("<svg/>"));
    }

    #[test]
    fn test_deterministic_remote_url() {
        let enhancer = Enhancer::new(Highlighter::default());
        let html = r#"<div class="plantuml">@startuml
Alice -&gt; Bob
@enduml</div>"#;

        let first = enhancer.enhance(html);
        let second = enhancer.enhance(html);
        assert_eq!(first.html, second.html);
        assert!(first.html.contains("/dsvg/"));
    }
}
