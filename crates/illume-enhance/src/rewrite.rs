//! In-place document rewriting.
//!
//! Renderers produce replacement fragments keyed by the block spans the
//! scanner discovered. Spans are disjoint, so splicing is a single ordered
//! pass over the document.

use std::ops::Range;

/// A rendered fragment destined for one block's span.
#[derive(Debug)]
pub(crate) struct Replacement {
    pub span: Range<usize>,
    pub html: String,
}

/// Splice replacements into the document.
///
/// Replacements are applied in span order; a replacement overlapping an
/// earlier one indicates a scanner bug and is dropped with a log line rather
/// than corrupting the output.
pub(crate) fn apply(html: &str, mut replacements: Vec<Replacement>) -> String {
    replacements.sort_by_key(|r| r.span.start);

    let mut output = String::with_capacity(html.len());
    let mut cursor = 0;
    for replacement in replacements {
        if replacement.span.start < cursor {
            tracing::warn!(span = ?replacement.span, "Overlapping replacement dropped");
            continue;
        }
        output.push_str(&html[cursor..replacement.span.start]);
        output.push_str(&replacement.html);
        cursor = replacement.span.end;
    }
    output.push_str(&html[cursor..]);
    output
}
