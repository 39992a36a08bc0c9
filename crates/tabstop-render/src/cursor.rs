//! What the merger needs to know about the cursor

use crate::dialect::Dialect;
use crate::types::{MergeOptions, Token};

/// Tokens and typed text around the cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorContext<K> {
    /// Byte offset of the cursor in the buffer
    pub offset: usize,
    /// The character before the cursor is whitespace, or there is none
    pub preceded_by_space: bool,
    /// Part of the word under the cursor typed so far
    pub prefix: String,
    /// Tokens of the cursor line before the cursor, without the prefix
    pub line_context: Vec<Token<K>>,
}

pub(crate) fn is_word(literal: &str) -> bool {
    literal
        .chars()
        .next()
        .is_some_and(|c| c.is_alphanumeric() || c == '_')
}

impl<K: Clone> CursorContext<K> {
    /// Locate `cursor` among the `tokens` of `buffer`; only a partly typed
    /// word counts as a prefix
    pub fn find(buffer: &str, tokens: &[Token<K>], cursor: usize) -> Self {
        Self::locate(buffer, tokens, cursor, |t| is_word(&t.literal), |_| false)
    }

    /// Locate `cursor` with the prefix and free text rules of `dialect`
    pub fn for_dialect<D: Dialect<Kind = K>>(dialect: &D, buffer: &str, tokens: &[Token<K>], cursor: usize) -> Self
    where
        K: Copy,
    {
        Self::locate(
            buffer,
            tokens,
            cursor,
            |t| dialect.completes_token(t),
            |t| dialect.is_free_text(t.kind),
        )
    }

    fn locate(
        buffer: &str,
        tokens: &[Token<K>],
        cursor: usize,
        completes: impl Fn(&Token<K>) -> bool,
        free_text: impl Fn(&Token<K>) -> bool,
    ) -> Self {
        let mut cursor = cursor.min(buffer.len());
        while !buffer.is_char_boundary(cursor) {
            cursor -= 1;
        }
        let line_start = buffer[..cursor].rfind('\n').map_or(0, |i| i + 1);

        let inside = tokens
            .iter()
            .any(|t| t.start < cursor && cursor < t.end && !free_text(t));
        let preceded_by_space = cursor == 0
            || (!inside && buffer[..cursor].chars().next_back().is_some_and(char::is_whitespace));

        let partial = (!preceded_by_space)
            .then(|| {
                tokens
                    .iter()
                    .position(|t| t.start < cursor && cursor <= t.end && completes(t))
            })
            .flatten();
        let prefix = partial
            .and_then(|i| tokens[i].literal.get(..cursor - tokens[i].start))
            .unwrap_or_default()
            .to_string();

        let line_context = tokens
            .iter()
            .enumerate()
            .filter(|(i, t)| Some(*i) != partial && t.start >= line_start && t.end <= cursor)
            .map(|(_, t)| t.clone())
            .collect();

        Self {
            offset: cursor,
            preceded_by_space,
            prefix,
            line_context,
        }
    }

    pub fn merge_options(&self) -> MergeOptions {
        MergeOptions {
            has_prefix: !self.prefix.is_empty(),
            preceded_by_space: self.preceded_by_space,
        }
    }

    /// Start of the text a completion replaces
    pub fn replace_begin(&self) -> usize {
        self.offset.saturating_sub(self.prefix.len())
    }
}
