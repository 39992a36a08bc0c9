//! End-to-end completion scenarios
//!
//! Each test takes a buffer, a cursor and a prediction through the public
//! rendering pipeline: cursor context, indentation probe, token merge and
//! formatting in place.

use tabstop_parsers::{Language, ParserPool, ParserRegistry};
use tabstop_render::{
    format, inspect, merge, CursorContext, Go, GoKind, GoStyle, Indentation, JavaScript, JavaScriptStyle, JsKind,
    MatchOption, MergeOptions, PredictedToken, Prediction, PyKind, Python, PythonStyle, Rejection, Renderer,
    ReplaceRange, Snippet, Token,
};

const OPERATORS: &[&str] = &[":=", "!=", "==", "<=", ">=", "++", "--", "&&", "||", "..."];

/// Split `buffer` into words, quoted strings, known operators and single
/// characters
fn lex<K>(buffer: &str, classify: fn(&str) -> K) -> Vec<Token<K>> {
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < buffer.len() {
        let rest = &buffer[i..];
        let c = rest.chars().next().unwrap();
        let len = if c.is_whitespace() {
            i += c.len_utf8();
            continue;
        } else if c.is_alphanumeric() || c == '_' {
            rest.find(|c: char| !(c.is_alphanumeric() || c == '_')).unwrap_or(rest.len())
        } else if c == '"' || c == '\'' {
            rest[1..].find(c).map_or(rest.len(), |end| end + 2)
        } else if let Some(op) = OPERATORS.iter().find(|op| rest.starts_with(**op)) {
            op.len()
        } else {
            c.len_utf8()
        };
        let literal = &rest[..len];
        tokens.push(Token::new(classify(literal), literal, i, i + len));
        i += len;
    }
    tokens
}

fn prediction<K>(lits: &[&str], classify: fn(&str) -> K) -> Prediction<K> {
    let tokens = lits
        .iter()
        .map(|l| PredictedToken::new(classify(l), *l, 0.8))
        .collect();
    Prediction::new(tokens, "")
}

const GO_BUFFER: &str = "package main\n\nfunc main() {\n\tfoo := bar(butterfly, bee,)\n}\n";

#[test]
fn test_go_inherits_separator_space() {
    let cursor = GO_BUFFER.find(",)").unwrap() + 1;
    let context = CursorContext::find(GO_BUFFER, &lex(GO_BUFFER, GoKind::classify), cursor);
    assert!(!context.preceded_by_space);

    let renderer = Renderer::new(Go, GoStyle::default(), ParserRegistry::new());
    let completion = renderer
        .render(GO_BUFFER, &context, &prediction(&["ladybug", ",", "locust"], GoKind::classify))
        .unwrap()
        .unwrap();
    assert_eq!(completion.snippet.text, " ladybug, locust");
    assert_eq!(completion.replace, ReplaceRange::at(cursor));
}

#[test]
fn test_python_after_typed_space() {
    let buffer = "some_random_func(apple, banana, )\n";
    let cursor = buffer.find(", )").unwrap() + 2;
    let context = CursorContext::find(buffer, &lex(buffer, PyKind::classify), cursor);
    assert!(context.preceded_by_space);

    let renderer = Renderer::new(Python::default(), PythonStyle::default(), ParserRegistry::new());
    let completion = renderer
        .render(buffer, &context, &prediction(&["orange", ",", "pear"], PyKind::classify))
        .unwrap()
        .unwrap();
    assert_eq!(completion.snippet.text, "orange, pear");
}

#[test]
fn test_unmatched_quote_rejected() {
    let buffer = "let s = ";
    let context = CursorContext::find(buffer, &lex(buffer, JsKind::classify), buffer.len());
    let predicted = prediction(&["\"", "abc"], JsKind::classify);

    let tokens: Vec<_> = predicted.tokens.iter().map(|t| t.as_token()).collect();
    assert_eq!(
        merge(&JavaScript, &context.line_context, &tokens, context.merge_options()),
        Err(Rejection::UnbalancedQuotes)
    );

    let renderer = Renderer::new(JavaScript, JavaScriptStyle::default(), ParserRegistry::new());
    assert_eq!(renderer.render(buffer, &context, &predicted).unwrap(), None);
}

#[test]
fn test_indentation_probe_nested_block() {
    let src = "def f():\n    if x:\n        y = 1\n        ";
    let tree = ParserPool::new(Language::Python).parse(src).unwrap();
    let found = inspect(src, tree.root_node(), src.len()).unwrap();
    assert_eq!(
        found,
        Indentation {
            unit: "    ".to_string(),
            depth: 2
        }
    );
}

#[test]
fn test_lone_literal_rejected() {
    let buffer = "package main\n\nfunc main() {\n\tx := \n}\n";
    let cursor = buffer.find(":= ").unwrap() + 3;
    let context = CursorContext::find(buffer, &lex(buffer, GoKind::classify), cursor);

    let tokens = vec![Token::new(GoKind::Int, "42", 0, 0)];
    assert_eq!(
        merge(&Go, &context.line_context, &tokens, context.merge_options()),
        Err(Rejection::LoneLiteral)
    );

    let renderer = Renderer::new(Go, GoStyle::default(), ParserRegistry::new());
    assert_eq!(
        renderer
            .render(buffer, &context, &prediction(&["42"], GoKind::classify))
            .unwrap(),
        None
    );
}

#[test]
fn test_misordered_placeholders_keep_raw_snippet() {
    let buffer = "package main\n\nfunc main() {\n\tx := \n}\n";
    let cursor = buffer.find(":= ").unwrap() + 3;
    let snippet = Snippet {
        text: "f(a,b)".to_string(),
        placeholders: vec![4..5, 2..3],
    };
    let formatted = format(
        &Go,
        &GoStyle::default(),
        &ParserRegistry::new(),
        buffer,
        ReplaceRange::at(cursor),
        &snippet,
        MatchOption::MatchStart,
    )
    .unwrap();
    assert_eq!(formatted, snippet);
}

#[test]
fn test_open_call_closes_with_tabstop() {
    let buffer = "package main\n\nfunc main() {\n\tx :=\n}\n";
    let cursor = buffer.find(":=").unwrap() + 2;
    let context = CursorContext::find(buffer, &lex(buffer, GoKind::classify), cursor);
    assert_eq!(
        context.merge_options(),
        MergeOptions {
            has_prefix: false,
            preceded_by_space: false
        }
    );

    let renderer = Renderer::new(Go, GoStyle::default(), ParserRegistry::new());
    let completion = renderer
        .render(buffer, &context, &prediction(&["f", "("], GoKind::classify))
        .unwrap()
        .unwrap();
    assert_eq!(completion.snippet.text, " f()");
    assert_eq!(completion.snippet.placeholders, vec![3..3]);
    assert_eq!(completion.snippet.to_tabstop_string(), " f(${1:})");
}

#[test]
fn test_prefix_is_replaced() {
    let buffer = "package main\n\nfunc main() {\n\tfoo := bar(butterfly, be)\n}\n";
    let cursor = buffer.find("be)").unwrap() + 2;
    let context = CursorContext::find(buffer, &lex(buffer, GoKind::classify), cursor);
    assert_eq!(context.prefix, "be");

    let renderer = Renderer::new(Go, GoStyle::default(), ParserRegistry::new());
    let completion = renderer
        .render(buffer, &context, &prediction(&["bee", ",", "locust"], GoKind::classify))
        .unwrap()
        .unwrap();
    assert_eq!(completion.replace, ReplaceRange::new(cursor - 2, cursor));
    assert_eq!(completion.snippet.text, "bee, locust");

    // a prediction that does not extend the prefix is dropped
    let other = prediction(&["ant"], GoKind::classify);
    assert_eq!(renderer.render(buffer, &context, &other).unwrap(), None);
}
