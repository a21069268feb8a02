#![allow(
    clippy::missing_docs_in_private_items,
    reason = "Internal implementation details don't need public documentation"
)]
#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Inlining decisions left to compiler for this crate"
)]

//! In-memory document tree implementing the host traits.

pub mod dom;

pub use dom::{Document, DomNode, FrameContent, NodeKind, SharedDocument, SheetState};
