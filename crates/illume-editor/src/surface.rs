//! Editing surface bound to a text widget.
//!
//! Keystroke-level editing belongs to the embedded widget behind
//! [`TextWidget`]; the surface seeds it, relays change events to the host
//! through a typed callback, and applies the link-insertion template.

use crate::options::EditorOptions;

/// Host-registered reaction to content changes.
pub type ChangeHandler = Box<dyn FnMut(&str) + Send>;

/// Seam to the embedded text-editing widget.
pub trait TextWidget {
    /// Current widget content.
    fn value(&self) -> &str;

    /// Replace the widget content.
    fn set_value(&mut self, text: String);

    /// Wrap the current selection (or cursor position) in prefix/suffix.
    fn surround_selection(&mut self, prefix: &str, suffix: &str);
}

/// In-memory text widget.
///
/// Serves hosts without a native widget and the test suite; selection
/// handling is deliberately minimal.
#[derive(Debug, Default)]
pub struct TextBuffer {
    text: String,
    selection: std::ops::Range<usize>,
}

impl TextBuffer {
    /// Empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a byte range of the content.
    ///
    /// Out-of-range or inverted bounds are clamped.
    pub fn select(&mut self, start: usize, end: usize) {
        let end = end.min(self.text.len());
        let start = start.min(end);
        self.selection = start..end;
    }

    /// Currently selected text.
    #[must_use]
    pub fn selected(&self) -> &str {
        &self.text[self.selection.clone()]
    }
}

impl TextWidget for TextBuffer {
    fn value(&self) -> &str {
        &self.text
    }

    fn set_value(&mut self, text: String) {
        let len = text.len();
        self.text = text;
        self.selection = len..len;
    }

    fn surround_selection(&mut self, prefix: &str, suffix: &str) {
        let (start, end) = (self.selection.start, self.selection.end);
        self.text.insert_str(end, suffix);
        self.text.insert_str(start, prefix);
        self.selection = (start + prefix.len())..(end + prefix.len());
    }
}

/// Rich markdown-editing surface.
///
/// Construction seeds the widget with the configured initial content. The
/// surface itself is the handle the host keeps for external control:
/// reading and replacing content, inserting links, and relaying widget
/// change events.
pub struct EditorSurface<W: TextWidget> {
    widget: W,
    options: EditorOptions,
    on_change: Option<ChangeHandler>,
}

impl<W: TextWidget> EditorSurface<W> {
    /// Bind the surface to a widget and seed it.
    pub fn new(mut widget: W, options: EditorOptions) -> Self {
        widget.set_value(options.initial_value.clone());
        Self {
            widget,
            options,
            on_change: None,
        }
    }

    /// Register the change callback.
    ///
    /// Invoked with the full current content on every change notification.
    pub fn on_change(&mut self, handler: impl FnMut(&str) + Send + 'static) {
        self.on_change = Some(Box::new(handler));
    }

    /// The surface configuration.
    #[must_use]
    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    /// Current content.
    #[must_use]
    pub fn value(&self) -> &str {
        self.widget.value()
    }

    /// Replace the content and notify the host.
    pub fn set_value(&mut self, text: impl Into<String>) {
        self.widget.set_value(text.into());
        self.notify_change();
    }

    /// Wrap the selection in the link template and notify the host.
    pub fn insert_link(&mut self) {
        let template = self.options.link_template.clone();
        self.widget
            .surround_selection(&template.prefix, &template.suffix);
        self.notify_change();
    }

    /// Relay a widget change event to the host callback.
    ///
    /// Hosts call this whenever the embedded widget reports an edit.
    pub fn notify_change(&mut self) {
        if let Some(handler) = &mut self.on_change {
            handler(self.widget.value());
        } else {
            tracing::trace!("Editor change with no registered handler");
        }
    }

    /// Direct access to the widget.
    pub fn widget_mut(&mut self) -> &mut W {
        &mut self.widget
    }
}
