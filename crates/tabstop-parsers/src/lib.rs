//! # tabstop parsers
//!
//! Concrete syntax tree access for the languages the tabstop rendering core
//! formats: Go, JavaScript and Python.
//!
//! ## Features
//!
//! - **Grammar registry**: one tree-sitter grammar per [`Language`]
//! - **Parser pooling**: tree-sitter parsers are not reentrant, so callers
//!   check one out exclusively from a [`ParserPool`] for the duration of a parse
//! - **Explicit traversal**: [`TreeWalker`] drives a [`NodeVisitor`] with
//!   separate `enter`/`exit` calls instead of a sentinel node

pub mod error;
pub mod languages;
pub mod pool;
pub mod traversal;

pub use error::{ParserError, ParserResult};
pub use languages::Language;
pub use pool::{ParserPool, ParserRegistry, PooledParser};
pub use traversal::{cursor_inside, node_text, NodeVisitor, TreeWalker, VisitAction};

/// Re-export of the tree-sitter types shared with downstream crates
pub use tree_sitter::{Node, Point, Tree};
