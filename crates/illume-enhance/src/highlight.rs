//! Syntax coloring for code blocks.
//!
//! Runs synchronously at the start of the enhancement pass with a language
//! set registered at construction. Blocks declaring a language outside the
//! set fall back to plain rendering; a visible error is never produced.

use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::block::CodeBlock;
use crate::rewrite::Replacement;
use crate::util::escape_html;

/// Marker class added to processed code elements.
///
/// The scanner reports blocks carrying it as already highlighted, so
/// re-running the pass on its own output leaves them untouched.
pub const PROCESSED_CLASS: &str = "highlighted";

/// Class-based syntax highlighter with a fixed language set.
pub struct Highlighter {
    syntaxes: SyntaxSet,
    languages: Vec<String>,
}

impl Highlighter {
    /// Create a highlighter supporting the given language tokens.
    pub fn new<I, S>(languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            languages: languages
                .into_iter()
                .map(|l| l.into().to_ascii_lowercase())
                .collect(),
        }
    }

    /// Default language set.
    #[must_use]
    pub fn default_languages() -> Vec<String> {
        [
            "rust", "java", "javascript", "python", "xml", "html", "css", "json", "bash", "shell",
            "toml", "yaml",
        ]
        .iter()
        .map(|s| (*s).to_owned())
        .collect()
    }

    /// Whether the language token is in the registered set.
    #[must_use]
    pub fn supports(&self, language: &str) -> bool {
        let token = language.to_ascii_lowercase();
        self.languages.iter().any(|l| *l == token)
    }

    /// Highlight source as class-styled HTML spans.
    ///
    /// Returns `None` when the language is unregistered or unknown to the
    /// syntax set; callers fall back to plain rendering.
    #[must_use]
    pub fn highlight(&self, language: &str, source: &str) -> Option<String> {
        if !self.supports(language) {
            return None;
        }
        let syntax = self.syntaxes.find_syntax_by_token(language)?;
        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntaxes, ClassStyle::Spaced);
        for line in LinesWithEndings::from(source) {
            if let Err(e) = generator.parse_html_for_line_which_includes_newline(line) {
                tracing::debug!(language, error = %e, "Highlighting failed, falling back to plain");
                return None;
            }
        }
        Some(generator.finalize())
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new(Self::default_languages())
    }
}

/// Render every code block, marking each as processed.
pub(crate) fn render_code_blocks(
    blocks: &[CodeBlock],
    highlighter: &Highlighter,
) -> Vec<Replacement> {
    blocks
        .iter()
        .filter(|block| !block.highlighted)
        .map(|block| {
            let body = block
                .language
                .as_deref()
                .and_then(|lang| highlighter.highlight(lang, &block.source))
                .unwrap_or_else(|| escape_html(&block.source));

            let classes = if block.classes.is_empty() {
                PROCESSED_CLASS.to_owned()
            } else {
                format!("{} {PROCESSED_CLASS}", block.classes)
            };

            Replacement {
                span: block.span.clone(),
                html: format!(r#"<pre><code class="{classes}">{body}</code></pre>"#),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(language: Option<&str>, source: &str) -> CodeBlock {
        let classes = language.map(|l| format!("language-{l}")).unwrap_or_default();
        CodeBlock {
            span: 0..10,
            language: language.map(str::to_owned),
            source: source.to_owned(),
            classes,
            highlighted: false,
        }
    }

    #[test]
    fn test_highlight_supported_language() {
        let highlighter = Highlighter::default();
        let html = highlighter.highlight("rust", "fn main() {}\n").unwrap();

        assert!(html.contains("<span"));
        assert!(html.contains("main"));
    }

    #[test]
    fn test_unsupported_language_falls_back_to_plain() {
        let highlighter = Highlighter::default();
        assert!(highlighter.highlight("klingon", "nuqneH").is_none());

        let replacements = render_code_blocks(&[block(Some("klingon"), "a < b")], &highlighter);
        assert_eq!(replacements.len(), 1);
        assert!(replacements[0].html.contains("a &lt; b"));
        assert!(!replacements[0].html.contains("<span"));
    }

    #[test]
    fn test_language_outside_registered_set_is_plain() {
        // "rust" is known to the syntax set but deliberately unregistered here.
        let highlighter = Highlighter::new(["java"]);
        assert!(highlighter.highlight("rust", "fn main() {}\n").is_none());
    }

    #[test]
    fn test_no_language_renders_plain() {
        let replacements = render_code_blocks(&[block(None, "plain")], &Highlighter::default());

        assert_eq!(replacements.len(), 1);
        assert!(replacements[0].html.contains("plain"));
        assert!(!replacements[0].html.contains("<span"));
    }

    #[test]
    fn test_processed_block_is_skipped() {
        let mut b = block(Some("rust"), "fn main() {}");
        b.highlighted = true;

        assert!(render_code_blocks(&[b], &Highlighter::default()).is_empty());
    }

    #[test]
    fn test_marker_class_added() {
        let replacements = render_code_blocks(&[block(Some("java"), "int x;")], &Highlighter::default());

        assert!(
            replacements[0]
                .html
                .contains(&format!(r#"class="language-java {PROCESSED_CLASS}""#))
        );
    }

    #[test]
    fn test_supports_is_case_insensitive() {
        let highlighter = Highlighter::default();
        assert!(highlighter.supports("Rust"));
        assert!(!highlighter.supports("fortran"));
    }
}
