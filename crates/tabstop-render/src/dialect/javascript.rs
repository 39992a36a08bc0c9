//! JavaScript (with JSX) token tables and merge rules

use std::fmt;
use std::ops::Range;

use tabstop_parsers::{Language, Node};

use super::{Dialect, Flow, MergeStep};
use crate::config::JavaScriptStyle;
use crate::error::{Rejection, RenderResult};
use crate::types::{Affinity, AffinityPair, OffsetMapping, Token};

/// JavaScript token kinds as produced by the JavaScript tokenizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsKind {
    Identifier,
    Number,
    StringFragment,
    JsxText,
    RegexPattern,
    RegexFlags,
    TemplateChars,

    This,
    Super,
    True,
    False,
    Null,
    Undefined,
    Target,

    Lt,
    Gt,
    Slash,
    DoubleQuote,
    SingleQuote,
    Backquote,
    Bang,
    Tilde,
    Dot,
    PlusPlus,
    MinusMinus,
    Comma,
    Colon,
    Semicolon,
    /// Statement end inserted by the tokenizer where a newline ends a statement
    AutomaticSemicolon,
    LParen,
    RParen,
    LBrack,
    RBrack,
    LBrace,
    RBrace,
    /// `${` inside a template string
    DollarBrace,
    Ellipsis,
    At,
    Case,
    /// Any other keyword
    Keyword,
    /// Any other operator
    Operator,
    Comment,
}

const KEYWORDS: &[&str] = &[
    "async", "await", "break", "catch", "class", "const", "continue", "debugger", "default", "delete", "do",
    "else", "export", "extends", "finally", "for", "from", "function", "get", "if", "import", "in",
    "instanceof", "let", "new", "of", "return", "set", "static", "switch", "throw", "try", "typeof", "var",
    "void", "while", "with", "yield",
];

impl JsKind {
    /// Kind of a token from its text, for adapters and tests
    pub fn classify(literal: &str) -> Self {
        use JsKind::*;
        match literal {
            "this" => This,
            "super" => Super,
            "true" => True,
            "false" => False,
            "null" => Null,
            "undefined" => Undefined,
            "target" => Target,
            "case" => Case,
            "<" => Lt,
            ">" => Gt,
            "/" => Slash,
            "\"" => DoubleQuote,
            "'" => SingleQuote,
            "`" => Backquote,
            "!" => Bang,
            "~" => Tilde,
            "." => Dot,
            "++" => PlusPlus,
            "--" => MinusMinus,
            "," => Comma,
            ":" => Colon,
            ";" => Semicolon,
            "(" => LParen,
            ")" => RParen,
            "[" => LBrack,
            "]" => RBrack,
            "{" => LBrace,
            "}" => RBrace,
            "${" => DollarBrace,
            "..." => Ellipsis,
            "@" => At,
            _ if KEYWORDS.contains(&literal) => Keyword,
            _ if literal.starts_with("//") || literal.starts_with("/*") => Comment,
            _ => match literal.chars().next() {
                Some(c) if c.is_ascii_digit() => Number,
                Some(c) if c.is_alphabetic() || c == '_' || c == '$' => Identifier,
                None => AutomaticSemicolon,
                _ => Operator,
            },
        }
    }
}

/// The JavaScript dialect
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaScript;

#[derive(Debug, Default)]
pub struct JsScratch {
    in_case: bool,
}

fn ends_with_jsx_closing_tag(tokens: &[&Token<JsKind>]) -> bool {
    matches!(
        tokens,
        [.., lt, slash, name, gt]
            if lt.literal == "<" && slash.literal == "/" && name.kind == JsKind::Identifier && gt.literal == ">"
    )
}

fn ends_with_self_closing_tag(tokens: &[&Token<JsKind>]) -> bool {
    matches!(tokens, [.., slash, gt] if slash.literal == "/" && gt.literal == ">")
}

impl Dialect for JavaScript {
    type Kind = JsKind;
    type Style = JavaScriptStyle;
    type Scratch = JsScratch;

    const LANGUAGE: Language = Language::JavaScript;

    fn affinity(&self, kind: JsKind) -> AffinityPair {
        use Affinity::*;
        use JsKind::*;
        let (left, right) = match kind {
            Identifier | Number | StringFragment | JsxText | RegexPattern | RegexFlags | TemplateChars => {
                (Willing, Willing)
            }
            This | Super | True | False | Null | Undefined | Target => (Willing, Willing),
            Lt | Gt | DoubleQuote | SingleQuote | Backquote | Bang | Tilde => (Willing, Willing),
            Dot => (Must, Must),
            PlusPlus | MinusMinus | RBrace | RBrack | RParen => (Must, Willing),
            Comma | Colon | Semicolon => (Must, Never),
            LBrace | LBrack | LParen | Ellipsis | DollarBrace => (Willing, Must),
            At => (Never, Must),
            _ => (Never, Never),
        };
        AffinityPair::new(left, right)
    }

    fn closer_of(&self, kind: JsKind) -> Option<JsKind> {
        match kind {
            JsKind::LParen => Some(JsKind::RParen),
            JsKind::LBrack => Some(JsKind::RBrack),
            JsKind::LBrace | JsKind::DollarBrace => Some(JsKind::RBrace),
            _ => None,
        }
    }

    fn is_closer(&self, kind: JsKind) -> bool {
        matches!(kind, JsKind::RParen | JsKind::RBrack | JsKind::RBrace)
    }

    fn closer_text(&self, opener: JsKind) -> &'static str {
        match opener {
            JsKind::LParen => ")",
            JsKind::LBrack => "]",
            _ => "}",
        }
    }

    fn is_literal(&self, kind: JsKind) -> bool {
        matches!(
            kind,
            JsKind::Number
                | JsKind::StringFragment
                | JsKind::JsxText
                | JsKind::RegexPattern
                | JsKind::RegexFlags
                | JsKind::TemplateChars
        )
    }

    fn is_identifier(&self, kind: JsKind) -> bool {
        kind == JsKind::Identifier
    }

    fn hole_text(&self, token: &Token<JsKind>) -> Option<&'static str> {
        self.is_literal(token.kind).then_some("_")
    }

    fn is_free_text(&self, kind: JsKind) -> bool {
        kind == JsKind::JsxText
    }

    fn screen(&self, context: &[Token<JsKind>], predicted: &[Token<JsKind>]) -> Result<(), Rejection> {
        for quote in [JsKind::SingleQuote, JsKind::DoubleQuote, JsKind::Backquote] {
            if predicted.iter().filter(|t| t.kind == quote).count() % 2 != 0 {
                return Err(Rejection::UnbalancedQuotes);
            }
        }

        if predicted.iter().any(|t| t.literal == ">") {
            let tokens: Vec<&Token<JsKind>> = context.iter().chain(predicted).collect();
            if !ends_with_self_closing_tag(&tokens) && !ends_with_jsx_closing_tag(&tokens) {
                return Err(Rejection::StrayAngleBracket);
            }
        }
        Ok(())
    }

    /// Only guarded when something precedes the prediction on the line
    fn guards_forced_merge(&self, index: usize) -> bool {
        index > 0
    }

    fn special(&self, scratch: &mut JsScratch, step: &mut MergeStep<'_, JsKind>) -> Result<Flow, Rejection> {
        use JsKind::*;
        let token = step.current();
        let kind = token.kind;

        if kind == Case {
            scratch.in_case = true;
        }
        if scratch.in_case && kind == Colon {
            self.render_token(token, step.out);
            step.newline = true;
            step.last_right = Affinity::Must;
            scratch.in_case = false;
            return Ok(Flow::Handled);
        }

        match kind {
            AutomaticSemicolon => {
                step.newline = true;
                step.last_right = Affinity::Must;
                return Ok(Flow::Handled);
            }
            Semicolon => {
                self.render_token(token, step.out);
                step.newline = true;
                step.last_right = Affinity::Must;
                return Ok(Flow::Handled);
            }
            _ => {}
        }

        // `<`/`>` between operands compare; anywhere else they delimit a tag.
        if matches!(kind, Lt | Gt) && step.index > 0 && !step.is_last() {
            let operand = |t: Option<&Token<JsKind>>| t.is_some_and(|t| matches!(t.kind, Identifier | Number));
            if operand(step.previous()) && operand(step.next()) {
                if !step.is_first_predicted() {
                    step.out.push_str(" ");
                }
                self.render_token(token, step.out);
                step.last_right = Affinity::Never;
                return Ok(Flow::Handled);
            }
        }

        if kind == Slash && step.previous().is_some_and(|t| t.kind == Lt) {
            self.render_token(token, step.out);
            step.last_right = Affinity::Must;
            return Ok(Flow::Handled);
        }

        if kind == Identifier && step.previous().is_some_and(|t| matches!(t.kind, Identifier | RParen)) {
            if !step.after_prefix_or_space() {
                step.out.push_str(" ");
            }
            self.render_token(token, step.out);
            step.last_right = Affinity::Willing;
            return Ok(Flow::Handled);
        }

        Ok(Flow::Continue)
    }

    fn prettify(
        &self,
        out: &mut dyn fmt::Write,
        style: &JavaScriptStyle,
        src: &str,
        region: Range<usize>,
        root: Node<'_>,
    ) -> RenderResult<Vec<OffsetMapping>> {
        crate::prettify::javascript::prettify(out, style, src, region, root)
    }
}
