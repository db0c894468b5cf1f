//! Diagram renderer activation gate.
//!
//! The pipeline implements no diagram semantics. This module decides *when*
//! an engine is constructed (only if at least one diagram block exists) and
//! with what configuration (fixed dark theme, size fitting); the engine owns
//! the rendering itself. Engine construction and per-block rendering
//! failures become warnings, never pass-level errors.

use rayon::prelude::*;

use crate::block::DiagramBlock;
use crate::error::EngineError;
use crate::rewrite::Replacement;

/// Visual theme handed to the engine at load time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DiagramTheme {
    /// Dark rendering, matching the host's dark document style.
    #[default]
    Dark,
    /// Engine default rendering.
    Light,
}

impl DiagramTheme {
    /// Theme name as engines expect it.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DiagramTheme::Dark => "dark",
            DiagramTheme::Light => "default",
        }
    }
}

/// Fixed engine configuration, decided before any block is rendered.
#[derive(Clone, Debug)]
pub struct DiagramOptions {
    /// Visual theme.
    pub theme: DiagramTheme,
    /// Fit rendered diagrams to the available width.
    pub fit_to_width: bool,
}

impl Default for DiagramOptions {
    fn default() -> Self {
        Self {
            theme: DiagramTheme::Dark,
            fit_to_width: true,
        }
    }
}

/// A loaded diagram rendering engine.
pub trait DiagramEngine: Send + Sync {
    /// Render diagram source text to an SVG document.
    fn render(&self, source: &str) -> Result<String, EngineError>;
}

/// Deferred engine construction.
///
/// `load` is invoked at most once per enhancement pass, and only when the
/// scanned set contains at least one diagram block.
pub trait DiagramEngineLoader: Send + Sync {
    /// Construct the engine with the given configuration.
    fn load(&self, options: &DiagramOptions) -> Result<Box<dyn DiagramEngine>, EngineError>;
}

/// Render all engine-local diagram blocks.
///
/// Failed blocks are left untouched; each failure is reported as a warning.
pub(crate) fn render_diagram_blocks(
    blocks: &[DiagramBlock],
    loader: &dyn DiagramEngineLoader,
    options: &DiagramOptions,
) -> (Vec<Replacement>, Vec<String>) {
    if blocks.is_empty() {
        return (Vec::new(), Vec::new());
    }

    let engine = match loader.load(options) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::warn!(error = %e, count = blocks.len(), "Diagram engine failed to load");
            return (
                Vec::new(),
                vec![format!(
                    "diagram engine failed to load, {} block(s) left unrendered: {e}",
                    blocks.len()
                )],
            );
        }
    };

    let results: Vec<Result<Replacement, String>> = blocks
        .par_iter()
        .enumerate()
        .map(|(index, block)| match engine.render(&block.source) {
            Ok(svg) => Ok(Replacement {
                span: block.span.clone(),
                html: format!(r#"<figure class="diagram">{svg}</figure>"#),
            }),
            Err(e) => {
                tracing::warn!(index, error = %e, "Diagram rendering failed");
                Err(format!("diagram {index}: {e}"))
            }
        })
        .collect();

    let mut replacements = Vec::with_capacity(results.len());
    let mut warnings = Vec::new();
    for result in results {
        match result {
            Ok(replacement) => replacements.push(replacement),
            Err(warning) => warnings.push(warning),
        }
    }
    (replacements, warnings)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;

    use super::*;

    struct FixedEngine;

    impl DiagramEngine for FixedEngine {
        fn render(&self, source: &str) -> Result<String, EngineError> {
            if source.contains("bad") {
                Err(EngineError::InvalidOutput("unparseable".to_owned()))
            } else {
                Ok(format!("<svg>{source}</svg>"))
            }
        }
    }

    /// Loader that counts how many times an engine was constructed.
    pub(crate) struct CountingLoader {
        pub loads: AtomicUsize,
        pub fail: bool,
    }

    impl CountingLoader {
        pub(crate) fn new(fail: bool) -> Self {
            Self {
                loads: AtomicUsize::new(0),
                fail,
            }
        }
    }

    impl DiagramEngineLoader for CountingLoader {
        fn load(&self, _options: &DiagramOptions) -> Result<Box<dyn DiagramEngine>, EngineError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(EngineError::Unavailable("offline".to_owned()))
            } else {
                Ok(Box::new(FixedEngine))
            }
        }
    }

    fn diagram(span: std::ops::Range<usize>, source: &str) -> DiagramBlock {
        DiagramBlock {
            span,
            source: source.to_owned(),
        }
    }

    #[test]
    fn test_no_blocks_never_loads_engine() {
        let loader = CountingLoader::new(false);
        let (replacements, warnings) =
            render_diagram_blocks(&[], &loader, &DiagramOptions::default());

        assert_eq!(loader.loads.load(Ordering::SeqCst), 0);
        assert!(replacements.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_engine_loaded_once_for_many_blocks() {
        let loader = CountingLoader::new(false);
        let blocks = vec![diagram(0..5, "graph TD"), diagram(10..15, "graph LR")];
        let (replacements, warnings) =
            render_diagram_blocks(&blocks, &loader, &DiagramOptions::default());

        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
        assert_eq!(replacements.len(), 2);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_loader_failure_is_warning_not_panic() {
        let loader = CountingLoader::new(true);
        let blocks = vec![diagram(0..5, "graph TD")];
        let (replacements, warnings) =
            render_diagram_blocks(&blocks, &loader, &DiagramOptions::default());

        assert!(replacements.is_empty());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("offline"));
    }

    #[test]
    fn test_failed_block_does_not_abort_siblings() {
        let loader = CountingLoader::new(false);
        let blocks = vec![diagram(0..5, "bad input"), diagram(10..15, "graph LR")];
        let (replacements, warnings) =
            render_diagram_blocks(&blocks, &loader, &DiagramOptions::default());

        assert_eq!(replacements.len(), 1);
        assert!(replacements[0].html.contains("graph LR"));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_rendered_block_wrapped_in_figure() {
        let loader = CountingLoader::new(false);
        let (replacements, _) = render_diagram_blocks(
            &[diagram(0..5, "graph TD")],
            &loader,
            &DiagramOptions::default(),
        );

        assert_eq!(
            replacements[0].html,
            r#"<figure class="diagram"><svg>graph TD</svg></figure>"#
        );
    }

    #[test]
    fn test_theme_names() {
        assert_eq!(DiagramTheme::Dark.as_str(), "dark");
        assert_eq!(DiagramTheme::Light.as_str(), "default");
    }
}
