//! Python token tables and merge rules

use std::fmt;
use std::ops::Range;

use tabstop_parsers::{Language, Node};

use super::{Dialect, Flow, MergeStep};
use crate::config::PythonStyle;
use crate::error::{Rejection, RenderResult};
use crate::types::{Affinity, AffinityPair, OffsetMapping, SnippetBuilder, Token};

/// Python token kinds as produced by the Python tokenizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PyKind {
    Identifier,
    String,
    Integer,
    Float,
    True,
    False,
    None,

    Dot,
    Comma,
    Colon,
    LParen,
    RParen,
    LBrack,
    RBrack,
    LBrace,
    RBrace,

    Else,
    Try,
    Finally,
    Lambda,
    /// Any other keyword
    Keyword,
    /// Any other operator
    Operator,
    Comment,

    /// Layout tokens synthesized by the tokenizer; their literal is empty
    EndOfStatement,
    StartOfBlock,
    EndOfBlock,
}

const KEYWORDS: &[&str] = &[
    "and", "as", "assert", "async", "await", "break", "class", "continue", "def", "del", "elif", "except",
    "for", "from", "global", "if", "import", "in", "is", "nonlocal", "not", "or", "pass", "raise", "return",
    "while", "with", "yield",
];

impl PyKind {
    /// Kind of a token from its text, for adapters and tests
    ///
    /// Layout tokens have no text and are never produced here.
    pub fn classify(literal: &str) -> Self {
        use PyKind::*;
        match literal {
            "True" => True,
            "False" => False,
            "None" => None,
            "." => Dot,
            "," => Comma,
            ":" => Colon,
            "(" => LParen,
            ")" => RParen,
            "[" => LBrack,
            "]" => RBrack,
            "{" => LBrace,
            "}" => RBrace,
            "else" => Else,
            "try" => Try,
            "finally" => Finally,
            "lambda" => Lambda,
            _ if KEYWORDS.contains(&literal) => Keyword,
            _ if literal.starts_with('#') => Comment,
            _ if is_string_literal(literal) => String,
            _ => match literal.chars().next() {
                Some(c) if c.is_ascii_digit() => {
                    if literal.contains(['.', 'e', 'E', 'j']) && !literal.starts_with("0x") {
                        Float
                    } else {
                        Integer
                    }
                }
                Some(c) if c.is_alphabetic() || c == '_' => Identifier,
                _ => Operator,
            },
        }
    }
}

fn is_string_literal(literal: &str) -> bool {
    // optional prefix such as b, r, f, rb
    let body = literal.trim_start_matches(|c: char| "bBrRuUfF".contains(c));
    body.starts_with('"') || body.starts_with('\'')
}

/// The Python dialect
///
/// Carries the indentation of the cursor line, as reported by
/// [`inspect`](crate::indent::inspect).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Python {
    pub indent: String,
    pub line_depth: usize,
}

impl Python {
    pub fn new(indent: impl Into<String>, line_depth: usize) -> Self {
        Self {
            indent: indent.into(),
            line_depth,
        }
    }

    fn line_break(&self, depth: usize, out: &mut SnippetBuilder) {
        out.push_str("\n");
        out.push_str(&self.indent.repeat(depth));
    }
}

impl Default for Python {
    fn default() -> Self {
        Self::new("    ", 0)
    }
}

#[derive(Debug, Default)]
pub struct PyScratch {
    depth: Option<usize>,
}

impl Dialect for Python {
    type Kind = PyKind;
    type Style = PythonStyle;
    type Scratch = PyScratch;

    const LANGUAGE: Language = Language::Python;
    const INDENT_SENSITIVE: bool = true;

    fn at_cursor(&self, src: &str, root: Node<'_>, cursor: usize) -> RenderResult<Option<Self>> {
        let found = crate::indent::inspect(src, root, cursor)?;
        Ok(Some(Python::new(found.unit, found.depth)))
    }

    fn affinity(&self, kind: PyKind) -> AffinityPair {
        use Affinity::*;
        use PyKind::*;
        let (left, right) = match kind {
            Identifier | String | Integer | Float | True | False | None => (Willing, Willing),
            Dot => (Must, Must),
            RParen | RBrack | RBrace => (Must, Willing),
            Comma | Colon => (Must, Never),
            LParen | LBrack | LBrace => (Willing, Must),
            Else | Try | Finally => (Never, Reluctant),
            _ => (Never, Never),
        };
        AffinityPair::new(left, right)
    }

    fn closer_of(&self, kind: PyKind) -> Option<PyKind> {
        match kind {
            PyKind::LParen => Some(PyKind::RParen),
            PyKind::LBrack => Some(PyKind::RBrack),
            PyKind::LBrace => Some(PyKind::RBrace),
            _ => Option::None,
        }
    }

    fn is_closer(&self, kind: PyKind) -> bool {
        matches!(kind, PyKind::RParen | PyKind::RBrack | PyKind::RBrace)
    }

    fn closer_text(&self, opener: PyKind) -> &'static str {
        match opener {
            PyKind::LParen => ")",
            PyKind::LBrack => "]",
            _ => "}",
        }
    }

    fn is_literal(&self, kind: PyKind) -> bool {
        matches!(kind, PyKind::String | PyKind::Integer | PyKind::Float)
    }

    fn is_identifier(&self, kind: PyKind) -> bool {
        kind == PyKind::Identifier
    }

    fn hole_text(&self, token: &Token<PyKind>) -> Option<&'static str> {
        match token.kind {
            PyKind::String => Some("str"),
            PyKind::Integer => Some("int"),
            PyKind::Float => Some("float"),
            _ => Option::None,
        }
    }

    fn render_token(&self, token: &Token<PyKind>, out: &mut SnippetBuilder) {
        match token.kind {
            PyKind::True => out.push_str("True"),
            PyKind::False => out.push_str("False"),
            PyKind::None => out.push_str("None"),
            _ => match self.hole_text(token) {
                Some(hole) => out.push_hole(hole),
                Option::None => out.push_str(&token.literal),
            },
        }
    }

    fn layout(&self, scratch: &mut PyScratch, step: &mut MergeStep<'_, PyKind>) -> Result<Flow, Rejection> {
        let depth = scratch.depth.get_or_insert(self.line_depth);
        match step.current().kind {
            PyKind::EndOfStatement => {}
            // Only the prediction moves the depth; the line depth already
            // covers the context.
            PyKind::StartOfBlock => {
                if step.in_completion {
                    *depth += 1;
                }
            }
            PyKind::EndOfBlock => {
                if *depth == 0 {
                    return Err(Rejection::DedentUnderflow);
                }
                if step.in_completion {
                    *depth -= 1;
                }
            }
            _ => return Ok(Flow::Continue),
        }
        self.line_break(*depth, step.out);
        step.last_right = Affinity::Must;
        Ok(Flow::Handled)
    }

    fn special(&self, _scratch: &mut PyScratch, step: &mut MergeStep<'_, PyKind>) -> Result<Flow, Rejection> {
        // `lambda` always merges left so partial lambdas still render
        if step.index > 1 && step.current().kind == PyKind::Lambda {
            self.render_token(step.current(), step.out);
            return Ok(Flow::Handled);
        }
        Ok(Flow::Continue)
    }

    fn prettify(
        &self,
        out: &mut dyn fmt::Write,
        style: &PythonStyle,
        src: &str,
        region: Range<usize>,
        root: Node<'_>,
    ) -> RenderResult<Vec<OffsetMapping>> {
        crate::prettify::python::prettify(out, style, src, region, root)
    }
}
