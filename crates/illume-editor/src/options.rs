//! Static editor configuration.
//!
//! All options are fixed at construction; there is no runtime
//! reconfiguration of the surface.

use illume_navigate::NAVIGATE_SCHEME;

/// One toolbar action offered by the host UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolbarItem {
    Bold,
    Heading,
    Quote,
    UnorderedList,
    OrderedList,
    Table,
    Code,
    Link,
    Image,
    Undo,
    Redo,
    /// Visual divider between action groups.
    Separator,
}

/// Text wrapped around the selection when inserting a link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkTemplate {
    /// Inserted before the selection.
    pub prefix: String,
    /// Inserted after the selection.
    pub suffix: String,
}

impl Default for LinkTemplate {
    /// Emits host-navigation links instead of bare URLs.
    fn default() -> Self {
        Self {
            prefix: "[".to_owned(),
            suffix: format!("]({NAVIGATE_SCHEME}://)"),
        }
    }
}

/// Editor surface configuration.
#[derive(Clone, Debug)]
pub struct EditorOptions {
    /// Content the widget is seeded with.
    pub initial_value: String,
    /// Focus the widget on construction.
    pub autofocus: bool,
    /// Spell checking inside the widget.
    pub spell_checker: bool,
    /// Status bar below the widget.
    pub status_bar: bool,
    /// Syntax-aware rendering of code spans inside the editor.
    pub code_syntax_highlighting: bool,
    /// Toolbar actions, in display order.
    pub toolbar: Vec<ToolbarItem>,
    /// Link insertion template.
    pub link_template: LinkTemplate,
}

impl EditorOptions {
    /// The fixed toolbar action set.
    #[must_use]
    pub fn default_toolbar() -> Vec<ToolbarItem> {
        use ToolbarItem::*;
        vec![
            Bold,
            Heading,
            Separator,
            Quote,
            UnorderedList,
            OrderedList,
            Table,
            Code,
            Separator,
            Link,
            Image,
            Separator,
            Undo,
            Redo,
        ]
    }
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            initial_value: String::new(),
            autofocus: true,
            spell_checker: false,
            status_bar: false,
            code_syntax_highlighting: true,
            toolbar: Self::default_toolbar(),
            link_template: LinkTemplate::default(),
        }
    }
}
