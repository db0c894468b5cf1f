//! Block scanner.
//!
//! Locates marked elements in a rendered document and classifies each into a
//! [`BlockSet`] in a single pass. Markers are kind-specific class attributes:
//! `language-*` classed `<pre><code>` elements for code, `mermaid` and
//! `plantuml` classed containers for diagram text, and `excalidraw` classed
//! containers carrying a `data-src` serialized-state attribute (plus an
//! optional `data-source-file` attribute) for drawings.
//!
//! Spans of discovered blocks are guaranteed disjoint; a candidate
//! overlapping an earlier match is discarded.

use std::sync::LazyLock;

use regex::Regex;

use crate::block::{BlockSet, CodeBlock, DiagramBlock, DrawingBlock};
use crate::highlight::PROCESSED_CLASS;
use crate::util::unescape_html;

static CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<pre><code(?: class="([^"]*)")?>(.*?)</code></pre>"#).unwrap()
});

static MERMAID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<div\b[^>]*\bclass="[^"]*\bmermaid\b[^"]*"[^>]*>(.*?)</div>"#).unwrap()
});

static PLANTUML_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<div\b[^>]*\bclass="[^"]*\bplantuml\b[^"]*"[^>]*>(.*?)</div>"#).unwrap()
});

static EXCALIDRAW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<div\b([^>]*\bclass="[^"]*\bexcalidraw\b[^"]*"[^>]*)>(.*?)</div>"#).unwrap()
});

static DATA_SRC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bdata-src="([^"]*)""#).unwrap());

static DATA_SOURCE_FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bdata-source-file="([^"]*)""#).unwrap());

/// Internal classification result, kept ordered for overlap resolution.
enum Scanned {
    Code(CodeBlock),
    Mermaid(DiagramBlock),
    PlantUml(DiagramBlock),
    Drawing(DrawingBlock),
}

impl Scanned {
    fn span(&self) -> (usize, usize) {
        match self {
            Scanned::Code(b) => (b.span.start, b.span.end),
            Scanned::Mermaid(b) | Scanned::PlantUml(b) => (b.span.start, b.span.end),
            Scanned::Drawing(b) => (b.span.start, b.span.end),
        }
    }
}

/// Scan the document and group every marked block by kind.
///
/// Runs once per enhancement pass; the returned set is the complete work
/// list for all renderers, so no block is ever processed twice.
#[must_use]
pub fn scan(html: &str) -> BlockSet {
    let mut found = Vec::new();

    for caps in CODE_RE.captures_iter(html) {
        let whole = caps.get(0).unwrap();
        let classes = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let language = classes
            .split_whitespace()
            .find_map(|c| c.strip_prefix("language-"))
            .map(str::to_owned);
        let highlighted = classes.split_whitespace().any(|c| c == PROCESSED_CLASS);
        found.push(Scanned::Code(CodeBlock {
            span: whole.range(),
            language,
            source: unescape_html(&caps[2]),
            classes: classes.to_owned(),
            highlighted,
        }));
    }

    for caps in MERMAID_RE.captures_iter(html) {
        let whole = caps.get(0).unwrap();
        found.push(Scanned::Mermaid(DiagramBlock {
            span: whole.range(),
            source: unescape_html(caps[1].trim()),
        }));
    }

    for caps in PLANTUML_RE.captures_iter(html) {
        let whole = caps.get(0).unwrap();
        found.push(Scanned::PlantUml(DiagramBlock {
            span: whole.range(),
            source: unescape_html(caps[1].trim()),
        }));
    }

    for caps in EXCALIDRAW_RE.captures_iter(html) {
        let whole = caps.get(0).unwrap();
        let attrs = &caps[1];
        let Some(raw) = DATA_SRC_RE.captures(attrs) else {
            tracing::debug!(span = ?whole.range(), "Drawing block without data-src skipped");
            continue;
        };
        let source_file = DATA_SOURCE_FILE_RE
            .captures(attrs)
            .map(|c| unescape_html(&c[1]));
        found.push(Scanned::Drawing(DrawingBlock {
            span: whole.range(),
            raw_state: unescape_html(&raw[1]),
            source_file,
        }));
    }

    partition(found)
}

/// Sort by position, discard overlaps, and group into a [`BlockSet`].
fn partition(mut found: Vec<Scanned>) -> BlockSet {
    found.sort_by_key(|s| s.span().0);

    let mut set = BlockSet::default();
    let mut last_end = 0;
    for scanned in found {
        let (start, end) = scanned.span();
        if start < last_end {
            tracing::debug!(start, end, "Overlapping block candidate discarded");
            continue;
        }
        last_end = end;
        match scanned {
            Scanned::Code(b) => set.code.push(b),
            Scanned::Mermaid(b) => set.mermaid.push(b),
            Scanned::PlantUml(b) => set.plantuml.push(b),
            Scanned::Drawing(b) => set.drawings.push(b),
        }
    }
    set
}
