//! Interactive editing core for a rich-text Markdown editor.
//!
//! The crate covers the four subsystems a structured-text editor needs
//! underneath its rendering:
//!
//! - [`layout`] — a registry of on-screen text components with geometric
//!   navigation (closest, above/below, line order).
//! - [`editor`] — the cursor and selection model over those components,
//!   plus the edit loop applying commands to the source text.
//! - [`mapping`] — translation between rendered character offsets and the
//!   byte ranges of the raw Markdown source.
//! - [`document`] and [`history`] — the parsed document tree with
//!   structural queries, and the undo/redo manager over source snapshots.
//!
//! Rendering, clipboard and file handling are collaborators, not part of
//! this crate: the layout engine registers components (with bounds and a
//! [`mapping::TextMapping`]) through [`layout::ComponentLayout`], and the
//! [`input`] module translates terminal key events into the command set
//! [`editor::EditorCore`] applies.

pub mod document;
pub mod editor;
pub mod history;
pub mod input;
pub mod layout;
pub mod mapping;

pub use document::{parse, DocumentTree, NodeData, NodeId, TreeError, VisualNode};
pub use editor::selection::{Selection, SelectionMode};
pub use editor::source::SourceEditor;
pub use editor::{
    Direction, EditCommand, EditOutcome, EditorCore, VerticalDirection, VisualCursor,
};
pub use history::UndoManager;
pub use layout::{
    ComponentLayout, IdGenerator, InteractiveComponent, InteractiveId, LayoutError, RenderedText,
    UserData,
};
pub use mapping::TextMapping;
