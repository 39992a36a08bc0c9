//! Per-language dialects
//!
//! The merge and format algorithms are written once, generic over a
//! [`Dialect`]: the token kinds of one language with their affinity and
//! bracket tables, the language-specific merge hooks and the pretty printer.

pub mod go;
pub mod javascript;
pub mod python;

use std::fmt;
use std::hash::Hash;
use std::ops::Range;

use tabstop_parsers::{Language, Node};

use crate::error::{Rejection, RenderResult};
use crate::types::{Affinity, AffinityPair, MergeOptions, OffsetMapping, SnippetBuilder, Token};

pub use go::{Go, GoKind};
pub use javascript::{JavaScript, JsKind};
pub use python::{PyKind, Python};

/// Whether a merge hook consumed the current token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Fall through to the next step
    Continue,
    /// The token has been rendered (or deliberately dropped)
    Handled,
}

/// Merge state exposed to dialect hooks for one token
pub struct MergeStep<'a, K> {
    pub tokens: &'a [&'a Token<K>],
    pub index: usize,
    pub context_len: usize,
    pub options: MergeOptions,
    pub in_completion: bool,
    pub last_right: Affinity,
    /// Emit a newline before the next token
    pub newline: bool,
    pub out: &'a mut SnippetBuilder,
}

impl<'a, K: Copy> MergeStep<'a, K> {
    pub fn current(&self) -> &'a Token<K> {
        self.tokens[self.index]
    }

    pub fn previous(&self) -> Option<&'a Token<K>> {
        self.index.checked_sub(1).map(|i| self.tokens[i])
    }

    pub fn next(&self) -> Option<&'a Token<K>> {
        self.tokens.get(self.index + 1).copied()
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.tokens.len()
    }

    /// The current token is the first one of the prediction
    pub fn is_first_predicted(&self) -> bool {
        self.index == self.context_len
    }

    /// The first predicted token, right after a typed prefix or a space
    pub fn after_prefix_or_space(&self) -> bool {
        self.is_first_predicted() && (self.options.has_prefix || self.options.preceded_by_space)
    }
}

/// Token tables, merge hooks and pretty printer of one language
pub trait Dialect: Send + Sync {
    type Kind: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static;
    type Style: Clone + Default + fmt::Debug + Send + Sync + 'static;
    /// Dialect-private state carried across one merge
    type Scratch: Default;

    const LANGUAGE: Language;

    /// Whether the merge depends on the indentation around the cursor
    const INDENT_SENSITIVE: bool = false;

    /// This dialect adjusted to the cursor of `src`, parsed as `root`
    ///
    /// Only consulted when [`Dialect::INDENT_SENSITIVE`] is set.
    fn at_cursor(&self, _src: &str, _root: Node<'_>, _cursor: usize) -> RenderResult<Option<Self>>
    where
        Self: Sized,
    {
        Ok(None)
    }

    fn affinity(&self, kind: Self::Kind) -> AffinityPair;

    /// The closer matching `kind`, if `kind` opens a bracket pair
    fn closer_of(&self, kind: Self::Kind) -> Option<Self::Kind>;

    fn is_closer(&self, kind: Self::Kind) -> bool;

    /// Source text of the closer matching `opener`
    fn closer_text(&self, opener: Self::Kind) -> &'static str;

    fn is_literal(&self, kind: Self::Kind) -> bool;

    fn is_identifier(&self, kind: Self::Kind) -> bool;

    /// Placeholder text shown instead of a literal's value
    fn hole_text(&self, token: &Token<Self::Kind>) -> Option<&'static str>;

    fn render_token(&self, token: &Token<Self::Kind>, out: &mut SnippetBuilder) {
        match self.hole_text(token) {
            Some(hole) => out.push_hole(hole),
            None => out.push_str(&token.literal),
        }
    }

    /// Whether a partly typed `token` under the cursor is a prefix the
    /// prediction may complete
    fn completes_token(&self, token: &Token<Self::Kind>) -> bool {
        crate::cursor::is_word(&token.literal)
    }

    /// Text tokens the cursor may sit inside while still following a space
    fn is_free_text(&self, _kind: Self::Kind) -> bool {
        false
    }

    /// Reject a prediction before any merging happens
    fn screen(&self, _context: &[Token<Self::Kind>], _predicted: &[Token<Self::Kind>]) -> Result<(), Rejection> {
        Ok(())
    }

    /// Whether the forced-merge rejection applies at sequence index `index`
    fn guards_forced_merge(&self, _index: usize) -> bool {
        true
    }

    /// Hook run before bracket bookkeeping; used for layout tokens
    fn layout(&self, _scratch: &mut Self::Scratch, _step: &mut MergeStep<'_, Self::Kind>) -> Result<Flow, Rejection> {
        Ok(Flow::Continue)
    }

    /// Hook run after bracket bookkeeping, before the affinity rule
    fn special(&self, _scratch: &mut Self::Scratch, _step: &mut MergeStep<'_, Self::Kind>) -> Result<Flow, Rejection> {
        Ok(Flow::Continue)
    }

    /// Pretty-print the tree under `root` into `out`, mapping the leaves
    /// printed near `region`
    ///
    /// On error `out` holds whatever was printed before the failure.
    fn prettify(
        &self,
        out: &mut dyn fmt::Write,
        style: &Self::Style,
        src: &str,
        region: Range<usize>,
        root: Node<'_>,
    ) -> RenderResult<Vec<OffsetMapping>>;
}

/// Built-in style of a language, tagged by language
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "language", rename_all = "lowercase")]
pub enum DialectStyle {
    Go(crate::config::GoStyle),
    JavaScript(crate::config::JavaScriptStyle),
    Python(crate::config::PythonStyle),
}

impl DialectStyle {
    pub fn language(&self) -> Language {
        match self {
            DialectStyle::Go(_) => Language::Go,
            DialectStyle::JavaScript(_) => Language::JavaScript,
            DialectStyle::Python(_) => Language::Python,
        }
    }
}
