//! Core data types shared by the merger, printers and translator

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A lexical token of the buffer, produced by an external tokenizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<K> {
    pub kind: K,
    pub literal: String,
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset one past the last character
    pub end: usize,
}

impl<K> Token<K> {
    pub fn new(kind: K, literal: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            kind,
            literal: literal.into(),
            start,
            end,
        }
    }
}

/// A token predicted by the model, with its probability
#[derive(Debug, Clone, PartialEq)]
pub struct PredictedToken<K> {
    pub kind: K,
    pub literal: String,
    pub probability: f32,
}

impl<K> PredictedToken<K> {
    pub fn new(kind: K, literal: impl Into<String>, probability: f32) -> Self {
        Self {
            kind,
            literal: literal.into(),
            probability,
        }
    }
}

impl<K: Copy> PredictedToken<K> {
    /// View this prediction as a positionless token
    pub fn as_token(&self) -> Token<K> {
        Token::new(self.kind, self.literal.clone(), 0, 0)
    }
}

/// One candidate token sequence
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction<K> {
    pub tokens: Vec<PredictedToken<K>>,
    /// Text of the partially typed token the prediction must extend
    pub prefix: String,
    /// The last token was cut off by the model's length budget
    pub ends_incomplete: bool,
}

impl<K> Prediction<K> {
    pub fn new(tokens: Vec<PredictedToken<K>>, prefix: impl Into<String>) -> Self {
        Self {
            tokens,
            prefix: prefix.into(),
            ends_incomplete: false,
        }
    }

    /// Joint probability of the sequence
    pub fn probability(&self) -> f32 {
        self.tokens.iter().map(|t| t.probability).product()
    }
}

/// How eagerly a token attaches to a neighbour without whitespace
///
/// Ordered from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Affinity {
    Never,
    Reluctant,
    Willing,
    Must,
}

impl Affinity {
    /// Whether a token with left affinity `left` merges onto a token whose
    /// right affinity is `self`
    ///
    /// The left neighbour decides first; Must and Never are final. Otherwise
    /// the incoming token decides the same way, and two Willing sides merge.
    /// Reluctant never merges on its own.
    pub fn merges(self, left: Affinity) -> bool {
        match (self, left) {
            (Affinity::Must, _) => true,
            (Affinity::Never, _) => false,
            (_, Affinity::Must) => true,
            (_, Affinity::Never) => false,
            (Affinity::Willing, Affinity::Willing) => true,
            _ => false,
        }
    }
}

/// Left and right affinity of a token kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AffinityPair {
    pub left: Affinity,
    pub right: Affinity,
}

impl AffinityPair {
    pub const fn new(left: Affinity, right: Affinity) -> Self {
        Self { left, right }
    }
}

/// Completion text with tab-stop placeholder spans
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    pub text: String,
    /// Non-overlapping, strictly increasing byte spans into `text`
    pub placeholders: Vec<Range<usize>>,
}

impl Snippet {
    /// A snippet without placeholders
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            placeholders: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Text of each placeholder
    pub fn hole_texts(&self) -> Vec<&str> {
        self.placeholders
            .iter()
            .map(|r| self.text.get(r.clone()).unwrap_or(""))
            .collect()
    }

    /// Whether the placeholder spans are in bounds, ordered and disjoint
    pub fn is_well_formed(&self) -> bool {
        let mut prev_end = 0;
        for r in &self.placeholders {
            if r.start < prev_end || r.start > r.end || r.end > self.text.len() {
                return false;
            }
            if !self.text.is_char_boundary(r.start) || !self.text.is_char_boundary(r.end) {
                return false;
            }
            prev_end = r.end;
        }
        true
    }

    /// Render as an editor snippet string with numbered tab-stops,
    /// e.g. `foo(${1:x})`
    pub fn to_tabstop_string(&self) -> String {
        let mut out = String::with_capacity(self.text.len() + 8 * self.placeholders.len());
        let mut last = 0;
        for (i, r) in self.placeholders.iter().enumerate() {
            escape_into(&mut out, self.text.get(last..r.start).unwrap_or(""));
            out.push_str(&format!("${{{}:", i + 1));
            escape_into(&mut out, self.text.get(r.clone()).unwrap_or(""));
            out.push('}');
            last = r.end;
        }
        escape_into(&mut out, self.text.get(last..).unwrap_or(""));
        out
    }
}

fn escape_into(out: &mut String, s: &str) {
    for c in s.chars() {
        if matches!(c, '$' | '}' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
}

/// Incrementally assembles a [`Snippet`], tracking hole spans as they are
/// written
#[derive(Debug, Clone, Default)]
pub struct SnippetBuilder {
    text: String,
    placeholders: Vec<Range<usize>>,
}

impl SnippetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_str(&mut self, s: &str) {
        self.text.push_str(s);
    }

    /// Append `s` as a placeholder
    pub fn push_hole(&mut self, s: &str) {
        let start = self.text.len();
        self.text.push_str(s);
        self.placeholders.push(start..self.text.len());
    }

    /// Drop everything written so far
    pub fn clear(&mut self) {
        self.text.clear();
        self.placeholders.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.placeholders.is_empty()
    }

    pub fn build(self) -> Snippet {
        Snippet {
            text: self.text,
            placeholders: self.placeholders,
        }
    }
}

/// The span of the original buffer a completion replaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceRange {
    pub begin: usize,
    pub end: usize,
}

impl ReplaceRange {
    pub fn new(begin: usize, end: usize) -> Self {
        Self { begin, end }
    }

    /// An empty range at `pos`
    pub fn at(pos: usize) -> Self {
        Self::new(pos, pos)
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.begin)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The pre-format interval `[start_before, end_before)` was printed at
/// `[start_after, end_after)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetMapping {
    pub start_before: usize,
    pub start_after: usize,
    pub end_before: usize,
    pub end_after: usize,
}

impl OffsetMapping {
    pub fn new(start_before: usize, start_after: usize, end_before: usize, end_after: usize) -> Self {
        Self {
            start_before,
            start_after,
            end_before,
            end_after,
        }
    }
}

/// Which side of a token boundary a position sticks to during translation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOption {
    /// Prefer the start of the token beginning at the position
    MatchStart,
    /// Prefer the end of the token ending at the position
    MatchEnd,
}

/// A rendered completion ready for the editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub snippet: Snippet,
    pub replace: ReplaceRange,
}

/// Cursor facts the merger needs besides the tokens themselves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOptions {
    /// The user already typed part of the first predicted token
    pub has_prefix: bool,
    /// The character before the cursor is whitespace
    pub preceded_by_space: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affinity_precedence() {
        use Affinity::*;
        // the left neighbour decides first
        assert!(Must.merges(Never));
        assert!(!Never.merges(Must));
        // then the incoming token
        assert!(Willing.merges(Must));
        assert!(!Willing.merges(Never));
        assert!(Willing.merges(Willing));
        // reluctant never merges on its own
        assert!(!Reluctant.merges(Willing));
        assert!(!Willing.merges(Reluctant));
        assert!(!Reluctant.merges(Reluctant));
        assert!(Reluctant.merges(Must));
    }

    #[test]
    fn test_builder_tracks_holes() {
        let mut b = SnippetBuilder::new();
        b.push_str("foo(");
        b.push_hole("");
        b.push_str(", ");
        b.push_hole("_");
        b.push_str(")");
        let s = b.build();
        assert_eq!(s.text, "foo(, _)");
        assert_eq!(s.placeholders, vec![4..4, 6..7]);
        assert!(s.is_well_formed());
        assert_eq!(s.hole_texts(), vec!["", "_"]);
    }

    #[test]
    fn test_tabstop_string_escapes() {
        let s = Snippet {
            text: "a$b(x})".to_string(),
            placeholders: vec![4..5],
        };
        assert_eq!(s.to_tabstop_string(), "a\\$b(${1:x}\\})");
    }

    #[test]
    fn test_malformed_placeholders() {
        let s = Snippet {
            text: "abc".to_string(),
            placeholders: vec![1..2, 0..1],
        };
        assert!(!s.is_well_formed());
        let s = Snippet {
            text: "abc".to_string(),
            placeholders: vec![2..5],
        };
        assert!(!s.is_well_formed());
    }

    #[test]
    fn test_prediction_probability() {
        let p = Prediction::new(
            vec![PredictedToken::new(0u8, "a", 0.5), PredictedToken::new(0u8, "b", 0.5)],
            "",
        );
        assert!((p.probability() - 0.25).abs() < f32::EPSILON);
    }
}
