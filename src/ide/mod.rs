//! Editor features on top of the semantic index.
//!
//! The entry point is [`Workspace`], which owns the open documents and
//! answers position-based requests. The feature functions themselves
//! (goto, hover, completion, ...) are plain functions over the index and a
//! resolved [`CursorContext`], so they can be driven without a workspace.
//!
//! ## Design Principles
//!
//! 1. **No protocol types**: results use our own types; LSP conversion
//!    happens at the server boundary (`to_lsp` helpers give the kind numbers)
//! 2. **Lazy parsing**: edits only invalidate; the next request re-parses
//! 3. **Degrade, don't fail**: a document that stops parsing keeps its last
//!    index entries and its local definition map
//!
//! ## Usage
//!
//! ```
//! use archscope::base::Position;
//! use archscope::ide::Workspace;
//!
//! let workspace = Workspace::new();
//! workspace.open("/ws/shop.arch", "person User\nsystem Shop\nUser -> Shop", 1);
//!
//! let result = workspace.goto_definition("/ws/shop.arch", Position::new(2, 9)).unwrap();
//! assert_eq!(result.targets[0].span.start, Position::new(1, 7));
//! ```

mod completion;
mod cursor;
mod document;
mod goto;
mod hover;
mod local_defs;
mod references;
mod rename;
mod symbols;
pub mod text_utils;
mod workspace;

pub use completion::{CompletionItem, CompletionKind, completions};
pub use cursor::CursorContext;
pub use document::{Document, TextChange};
pub use goto::{GotoResult, GotoTarget, goto_definition};
pub use hover::{HoverResult, hover};
pub use local_defs::{DefinitionKind, LocalDefinition, LocalDefinitions};
pub use references::{Reference, ReferenceResult, find_references};
pub use rename::{RenameResult, TextEdit, rename};
pub use symbols::{DocumentSymbol, SymbolInfo, document_symbols, workspace_symbols};
pub use text_utils::{extract_reference_at_cursor, extract_word_at_cursor};
pub use workspace::Workspace;
