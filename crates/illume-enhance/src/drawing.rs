//! Drawing renderer.
//!
//! Each drawing block carries a serialized drawing-state document. Per
//! block, strictly in order: parse the state, build a display container,
//! wire click-to-navigate when a source file is referenced, then either
//! inject the pre-baked SVG verbatim or hand elements, appearance state and
//! assets to the export engine. Blocks are independent and rendered in
//! parallel; a failure is confined to its own block.

use std::sync::LazyLock;

use rayon::prelude::*;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};

use illume_navigate::NavigationIntent;

use crate::block::DrawingBlock;
use crate::error::EngineError;
use crate::rewrite::Replacement;
use crate::util::escape_html;

/// Whitespace padding passed to the export engine.
pub const EXPORT_PADDING: u32 = 10;

/// Container styling: centered, transparent, filling the block.
const CONTAINER_STYLE: &str =
    "width:100%;height:100%;background:transparent;display:flex;align-items:center;justify-content:center";

static SVG_DIMENSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\s(?:width|height)="[^"]*""#).unwrap());

/// A serialized vector drawing document.
///
/// `elements` and `files` are opaque pass-through data for the export
/// engine. When `svg` is present the other fields are ignored entirely.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DrawingState {
    /// Ordered drawable shapes.
    pub elements: Vec<Value>,
    /// Free-form rendering configuration.
    pub app_state: Map<String, Value>,
    /// Embedded assets keyed by identifier.
    pub files: Map<String, Value>,
    /// Pre-rendered output; short-circuits the export engine.
    pub svg: Option<String>,
}

/// One export invocation's input.
pub struct ExportRequest<'a> {
    /// Shapes to draw, passed through unmodified.
    pub elements: &'a [Value],
    /// Rendering configuration, already merged with the forced dark-mode
    /// export flag.
    pub app_state: Map<String, Value>,
    /// Embedded assets.
    pub files: &'a Map<String, Value>,
    /// Whitespace around the drawing.
    pub padding: u32,
}

/// A loaded vector-drawing export engine.
pub trait DrawingExport: Send + Sync {
    /// Export the drawing to an SVG document.
    fn export(&self, request: &ExportRequest<'_>) -> Result<String, EngineError>;
}

/// Deferred export engine construction.
///
/// `load` is invoked at most once per pass, and only when at least one
/// drawing block actually requires export (pre-baked blocks never trigger
/// it).
pub trait DrawingExportLoader: Send + Sync {
    /// Construct the export engine.
    fn load(&self) -> Result<Box<dyn DrawingExport>, EngineError>;
}

/// Render all drawing blocks.
pub(crate) fn render_drawing_blocks(
    blocks: &[DrawingBlock],
    loader: &dyn DrawingExportLoader,
) -> (Vec<Replacement>, Vec<String>) {
    if blocks.is_empty() {
        return (Vec::new(), Vec::new());
    }

    let parsed: Vec<Result<DrawingState, serde_json::Error>> = blocks
        .iter()
        .map(|block| serde_json::from_str(&block.raw_state))
        .collect();

    let needs_engine = parsed
        .iter()
        .any(|p| matches!(p, Ok(state) if state.svg.is_none()));
    let engine = if needs_engine {
        match loader.load() {
            Ok(engine) => Ok(engine),
            Err(e) => {
                tracing::warn!(error = %e, "Drawing export engine failed to load");
                Err(e.to_string())
            }
        }
    } else {
        Err(String::new())
    };

    let results: Vec<(Replacement, Option<String>)> = blocks
        .par_iter()
        .zip(parsed.par_iter())
        .enumerate()
        .map(|(index, (block, state))| render_block(index, block, state, &engine))
        .collect();

    let mut replacements = Vec::with_capacity(results.len());
    let mut warnings = Vec::new();
    for (replacement, warning) in results {
        replacements.push(replacement);
        warnings.extend(warning);
    }
    (replacements, warnings)
}

/// Render one block; always produces a replacement, plus a warning on
/// failure.
fn render_block(
    index: usize,
    block: &DrawingBlock,
    state: &Result<DrawingState, serde_json::Error>,
    engine: &Result<Box<dyn DrawingExport>, String>,
) -> (Replacement, Option<String>) {
    let state = match state {
        Ok(state) => state,
        Err(e) => {
            tracing::warn!(index, error = %e, "Malformed drawing state");
            return (
                error_replacement(block, &format!("Error loading drawing: {e}")),
                Some(format!("drawing {index}: {e}")),
            );
        }
    };

    // Pre-baked output wins; the export engine is never consulted.
    if let Some(svg) = &state.svg {
        return (container_replacement(block, svg), None);
    }

    let engine = match engine {
        Ok(engine) => engine,
        Err(load_error) => {
            return (
                error_replacement(block, &format!("Error loading drawing: {load_error}")),
                Some(format!("drawing {index}: export engine unavailable")),
            );
        }
    };

    let mut app_state = state.app_state.clone();
    app_state.insert("exportWithDarkMode".to_owned(), Value::Bool(true));
    let request = ExportRequest {
        elements: &state.elements,
        app_state,
        files: &state.files,
        padding: EXPORT_PADDING,
    };

    match engine.export(&request) {
        Ok(svg) => (
            container_replacement(block, &size_svg_to_container(&svg)),
            None,
        ),
        Err(e) => {
            tracing::warn!(index, error = %e, "Drawing export failed");
            (
                error_replacement(block, &format!("Error loading drawing: {e}")),
                Some(format!("drawing {index}: {e}")),
            )
        }
    }
}

/// Build the display container, wiring navigation when a source file is
/// referenced.
fn container_replacement(block: &DrawingBlock, inner: &str) -> Replacement {
    let html = match &block.source_file {
        Some(path) => {
            let uri = NavigationIntent::new(path.clone()).uri();
            format!(
                r#"<div class="drawing" style="{CONTAINER_STYLE};cursor:pointer" onclick="window.location.href='{}'">{inner}</div>"#,
                escape_html(&uri)
            )
        }
        None => format!(r#"<div class="drawing" style="{CONTAINER_STYLE}">{inner}</div>"#),
    };
    Replacement {
        span: block.span.clone(),
        html,
    }
}

fn error_replacement(block: &DrawingBlock, message: &str) -> Replacement {
    Replacement {
        span: block.span.clone(),
        html: format!(
            r#"<div class="drawing drawing-error" style="color:red;padding:20px;text-align:center">{}</div>"#,
            escape_html(message)
        ),
    }
}

/// Size an exported SVG to fill its container.
///
/// Rewrites only the root `<svg>` tag: fixed pixel dimensions are dropped
/// and replaced with relative ones.
fn size_svg_to_container(svg: &str) -> String {
    let Some(start) = svg.find("<svg") else {
        return svg.to_owned();
    };
    let Some(tag_len) = svg[start..].find('>') else {
        return svg.to_owned();
    };
    let tag = &svg[start..=start + tag_len];
    let stripped = SVG_DIMENSION_RE.replace_all(tag, "");
    let sized = stripped.replacen("<svg", r#"<svg width="100%" height="100%""#, 1);
    format!("{}{}{}", &svg[..start], sized, &svg[start + tag_len + 1..])
}
