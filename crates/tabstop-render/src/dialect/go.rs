//! Go token tables and merge rules

use std::fmt;
use std::ops::Range;

use tabstop_parsers::{Language, Node};

use super::{Dialect, Flow, MergeStep};
use crate::config::GoStyle;
use crate::cursor::is_word;
use crate::error::{Rejection, RenderResult};
use crate::types::{Affinity, AffinityPair, OffsetMapping, Token};

/// Operators that may be the start of a longer one, e.g. `+` of `++` and `+=`
const PREFIX_OPERATORS: [&str; 14] = ["+", "-", "*", "/", "%", "&", "|", "^", "<<", ">>", "&^", "=", "<", ">"];

/// Go token kinds as produced by the Go tokenizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GoKind {
    Ident,
    Int,
    Float,
    Imag,
    Char,
    String,
    Comment,

    Period,
    Comma,
    Colon,
    Semicolon,
    LParen,
    RParen,
    LBrack,
    RBrack,
    LBrace,
    RBrace,
    Ellipsis,
    Inc,
    Dec,
    Mul,
    And,
    /// Any other operator
    Operator,

    Break,
    Case,
    Chan,
    Const,
    Continue,
    Default,
    Defer,
    Else,
    Fallthrough,
    For,
    Func,
    Go,
    Goto,
    If,
    Import,
    Interface,
    Map,
    Package,
    Range,
    Return,
    Select,
    Struct,
    Switch,
    Type,
    Var,
}

impl GoKind {
    /// Kind of a token from its text, for adapters and tests
    pub fn classify(literal: &str) -> Self {
        use GoKind::*;
        match literal {
            "." => Period,
            "," => Comma,
            ":" => Colon,
            ";" => Semicolon,
            "(" => LParen,
            ")" => RParen,
            "[" => LBrack,
            "]" => RBrack,
            "{" => LBrace,
            "}" => RBrace,
            "..." => Ellipsis,
            "++" => Inc,
            "--" => Dec,
            "*" => Mul,
            "&" => And,
            "break" => Break,
            "case" => Case,
            "chan" => Chan,
            "const" => Const,
            "continue" => Continue,
            "default" => Default,
            "defer" => Defer,
            "else" => Else,
            "fallthrough" => Fallthrough,
            "for" => For,
            "func" => Func,
            "go" => Go,
            "goto" => Goto,
            "if" => If,
            "import" => Import,
            "interface" => Interface,
            "map" => Map,
            "package" => Package,
            "range" => Range,
            "return" => Return,
            "select" => Select,
            "struct" => Struct,
            "switch" => Switch,
            "type" => Type,
            "var" => Var,
            _ if literal.starts_with("//") || literal.starts_with("/*") => Comment,
            _ => classify_operand(literal),
        }
    }

    fn is_identifier_like(self) -> bool {
        matches!(
            self,
            GoKind::Ident | GoKind::Int | GoKind::Float | GoKind::Imag | GoKind::Char | GoKind::String
        )
    }
}

fn classify_operand(literal: &str) -> GoKind {
    let Some(first) = literal.chars().next() else {
        return GoKind::Operator;
    };
    match first {
        '"' | '`' => GoKind::String,
        '\'' => GoKind::Char,
        c if c.is_ascii_digit() => {
            let hex = literal.starts_with("0x") || literal.starts_with("0X");
            if literal.ends_with('i') {
                GoKind::Imag
            } else if literal.contains('.') || (!hex && literal.contains(['e', 'E'])) {
                GoKind::Float
            } else {
                GoKind::Int
            }
        }
        c if c.is_alphabetic() || c == '_' => GoKind::Ident,
        _ => GoKind::Operator,
    }
}

/// The Go dialect
#[derive(Debug, Clone, Copy, Default)]
pub struct Go;

/// Keyword brace tracking across one merge
#[derive(Debug, Default)]
pub struct GoScratch {
    braces: Vec<GoKind>,
    in_case: bool,
}

impl Dialect for Go {
    type Kind = GoKind;
    type Style = GoStyle;
    type Scratch = GoScratch;

    const LANGUAGE: Language = Language::Go;

    fn affinity(&self, kind: GoKind) -> AffinityPair {
        use Affinity::*;
        use GoKind::*;
        let (left, right) = match kind {
            Ident | Int | Float | Imag | Char | String => (Willing, Willing),
            Period | LParen => (Must, Must),
            Ellipsis | Inc | Dec | RBrace | RBrack | RParen => (Must, Willing),
            Comma | Colon | Semicolon => (Must, Never),
            LBrace | LBrack => (Willing, Must),
            Map | Mul | And => (Never, Must),
            Struct | Default => (Never, Willing),
            _ => (Never, Never),
        };
        AffinityPair::new(left, right)
    }

    fn closer_of(&self, kind: GoKind) -> Option<GoKind> {
        match kind {
            GoKind::LParen => Some(GoKind::RParen),
            GoKind::LBrack => Some(GoKind::RBrack),
            GoKind::LBrace => Some(GoKind::RBrace),
            _ => None,
        }
    }

    fn is_closer(&self, kind: GoKind) -> bool {
        matches!(kind, GoKind::RParen | GoKind::RBrack | GoKind::RBrace)
    }

    fn closer_text(&self, opener: GoKind) -> &'static str {
        match opener {
            GoKind::LParen => ")",
            GoKind::LBrack => "]",
            _ => "}",
        }
    }

    fn is_literal(&self, kind: GoKind) -> bool {
        matches!(
            kind,
            GoKind::Int | GoKind::Float | GoKind::Imag | GoKind::Char | GoKind::String
        )
    }

    fn is_identifier(&self, kind: GoKind) -> bool {
        kind == GoKind::Ident
    }

    fn hole_text(&self, token: &Token<GoKind>) -> Option<&'static str> {
        self.is_literal(token.kind).then_some("_")
    }

    fn completes_token(&self, token: &Token<GoKind>) -> bool {
        match token.kind {
            GoKind::Mul | GoKind::And | GoKind::Operator => PREFIX_OPERATORS.contains(&token.literal.as_str()),
            kind => !self.is_literal(kind) && is_word(&token.literal),
        }
    }

    fn special(&self, scratch: &mut GoScratch, step: &mut MergeStep<'_, GoKind>) -> Result<Flow, Rejection> {
        use GoKind::*;
        let token = step.current();
        let kind = token.kind;

        // A `{` that follows a keyword opens a statement body.
        if matches!(kind, For | If | Else | Func | Switch | Select | LBrace | LBrack | LParen) {
            scratch.braces.push(kind);
            if scratch.braces.len() == 2 && kind == LBrace {
                scratch.braces.clear();
                // later braces are spaced by the printer
                if step.is_first_predicted() && !step.after_prefix_or_space() {
                    step.out.push_str(" ");
                }
                step.out.push_str("{");
                step.newline = true;
                step.last_right = Affinity::Must;
                return Ok(Flow::Handled);
            }
        }
        if self.is_closer(kind) {
            scratch.braces.pop();
        }

        if matches!(kind, Case | Default) {
            scratch.in_case = true;
        }
        if scratch.in_case && kind == Colon {
            self.render_token(token, step.out);
            step.newline = true;
            step.last_right = Affinity::Must;
            scratch.in_case = false;
            return Ok(Flow::Handled);
        }

        if kind == Semicolon {
            if matches!(scratch.braces.last(), Some(For | If | Switch)) {
                self.render_token(token, step.out);
                step.last_right = Affinity::Never;
            } else {
                step.newline = true;
                step.last_right = Affinity::Must;
            }
            return Ok(Flow::Handled);
        }

        let follows_identifier = step.previous().is_some_and(|prev| prev.kind.is_identifier_like());
        if kind.is_identifier_like() && follows_identifier {
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
        style: &GoStyle,
        src: &str,
        region: Range<usize>,
        root: Node<'_>,
    ) -> RenderResult<Vec<OffsetMapping>> {
        crate::prettify::go::prettify(out, style, src, region, root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(GoKind::classify("func"), GoKind::Func);
        assert_eq!(GoKind::classify("nil"), GoKind::Ident);
        assert_eq!(GoKind::classify("iota"), GoKind::Ident);
        assert_eq!(GoKind::classify("0x1E"), GoKind::Int);
        assert_eq!(GoKind::classify("1e9"), GoKind::Float);
        assert_eq!(GoKind::classify("2i"), GoKind::Imag);
        assert_eq!(GoKind::classify("'a'"), GoKind::Char);
        assert_eq!(GoKind::classify("`raw`"), GoKind::String);
        assert_eq!(GoKind::classify(":="), GoKind::Operator);
        assert_eq!(GoKind::classify("// note"), GoKind::Comment);
    }

    #[test]
    fn test_affinity_table() {
        let go = Go;
        assert_eq!(go.affinity(GoKind::LParen), AffinityPair::new(Affinity::Must, Affinity::Must));
        assert_eq!(go.affinity(GoKind::Map), AffinityPair::new(Affinity::Never, Affinity::Must));
        assert_eq!(go.affinity(GoKind::Return), AffinityPair::new(Affinity::Never, Affinity::Never));
        assert_eq!(go.affinity(GoKind::Char), AffinityPair::new(Affinity::Willing, Affinity::Willing));
    }

    #[test]
    fn test_holes_only_for_literals() {
        let go = Go;
        assert_eq!(go.hole_text(&Token::new(GoKind::String, "\"x\"", 0, 3)), Some("_"));
        assert_eq!(go.hole_text(&Token::new(GoKind::Ident, "x", 0, 1)), None);
    }
}
