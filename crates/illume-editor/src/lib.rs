//! Markdown editing surface for illume hosts.
//!
//! Wraps an embedded text-editing widget into a configured markdown
//! surface: seeded initial content, a fixed toolbar/action set, a link
//! template emitting `navigate://` links, and a typed change callback the
//! host registers at initialization. The [`EditorSurface`] value is the
//! handle the host keeps; nothing is exposed through ambient globals.
//!
//! # Example
//!
//! ```
//! use illume_editor::{EditorOptions, EditorSurface, TextBuffer};
//!
//! let mut surface = EditorSurface::new(
//!     TextBuffer::new(),
//!     EditorOptions {
//!         initial_value: "# Draft".to_owned(),
//!         ..EditorOptions::default()
//!     },
//! );
//! surface.on_change(|content| println!("{} bytes", content.len()));
//! surface.set_value("# Draft\n\nBody.");
//! ```

mod options;
mod surface;

pub use options::{EditorOptions, LinkTemplate, ToolbarItem};
pub use surface::{ChangeHandler, EditorSurface, TextBuffer, TextWidget};
