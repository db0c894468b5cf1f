//! Content block model.
//!
//! The scanner classifies marked document regions once, into a closed set of
//! block kinds; each kind carries only the fields its renderer needs. Block
//! identity is positional: the byte span of the element in the document.

use std::ops::Range;

/// A fenced code region awaiting syntax coloring.
#[derive(Clone, Debug)]
pub struct CodeBlock {
    /// Byte span of the whole `<pre><code>` element.
    pub span: Range<usize>,
    /// Declared language token, if any.
    pub language: Option<String>,
    /// Decoded source text.
    pub source: String,
    /// Class attribute value as found in the document.
    pub classes: String,
    /// Whether the block already carries the processed marker class.
    pub highlighted: bool,
}

/// A diagram described as text, rendered by an engine or a remote service.
#[derive(Clone, Debug)]
pub struct DiagramBlock {
    /// Byte span of the whole element.
    pub span: Range<usize>,
    /// Decoded diagram source text.
    pub source: String,
}

/// A serialized vector drawing.
#[derive(Clone, Debug)]
pub struct DrawingBlock {
    /// Byte span of the whole element.
    pub span: Range<usize>,
    /// Decoded serialized drawing state (JSON).
    pub raw_state: String,
    /// Originating document path, used for click-to-navigate wiring.
    pub source_file: Option<String>,
}

/// All blocks discovered in one scan pass, grouped by kind.
///
/// Spans are disjoint; the partitioning is what makes the later in-place
/// rewrites safe without any synchronization.
#[derive(Debug, Default)]
pub struct BlockSet {
    /// Code blocks, in document order.
    pub code: Vec<CodeBlock>,
    /// Diagram blocks rendered by the local engine.
    pub mermaid: Vec<DiagramBlock>,
    /// Diagram blocks rendered by the remote image service.
    pub plantuml: Vec<DiagramBlock>,
    /// Serialized drawing blocks.
    pub drawings: Vec<DrawingBlock>,
}

impl BlockSet {
    /// Whether the scan found nothing to enhance.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
            && self.mermaid.is_empty()
            && self.plantuml.is_empty()
            && self.drawings.is_empty()
    }

    /// Total number of discovered blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.code.len() + self.mermaid.len() + self.plantuml.len() + self.drawings.len()
    }
}
