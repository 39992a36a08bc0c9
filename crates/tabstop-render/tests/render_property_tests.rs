/// Property-based tests for merging, printing and translation
/// **Property: merged brackets balance, typed text is never re-merged,
/// mappings are monotonic, formatting never loses a completion, printing
/// keeps every non-whitespace character and printed programs parse cleanly**

use proptest::prelude::*;
use tabstop_parsers::{Language, ParserPool, ParserRegistry};
use tabstop_render::{
    format, merge, Dialect, Go, GoKind, GoStyle, JavaScript, JavaScriptStyle, MatchOption, MergeOptions, PyKind,
    Python, PythonStyle, Rejection, ReplaceRange, SnippetBuilder, Token,
};

fn go_tokens(lits: &[&str]) -> Vec<Token<GoKind>> {
    lits.iter().map(|l| Token::new(GoKind::classify(l), *l, 0, 0)).collect()
}

fn py_tokens(lits: &[&str]) -> Vec<Token<PyKind>> {
    lits.iter().map(|l| Token::new(PyKind::classify(l), *l, 0, 0)).collect()
}

fn balanced(text: &str) -> bool {
    let mut stack = Vec::new();
    for c in text.chars() {
        match c {
            '(' | '[' | '{' => stack.push(c),
            ')' | ']' | '}' => {
                let open = match c {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                if stack.pop() != Some(open) {
                    return false;
                }
            }
            _ => {}
        }
    }
    stack.is_empty()
}

fn non_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Strategy for predictions made of identifiers, separators and brackets
fn bracket_tokens_strategy() -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(
        prop_oneof![
            Just("a"),
            Just("b"),
            Just(","),
            Just("."),
            Just("("),
            Just(")"),
            Just("["),
            Just("]"),
            Just("{"),
            Just("}"),
        ],
        1..12,
    )
}

fn must_left_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just(","),
        Just("."),
        Just("("),
        Just(")"),
        Just("]"),
        Just("}"),
        Just(":"),
        Just("++"),
    ]
}

fn python_program_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("x = 1"),
            Just("y = foo(a, b)"),
            Just("z = [1, 2, 3]"),
            Just("d = {'k': 1}"),
            Just("def f(a, b=2):\n    return a + b"),
            Just("if x:\n    pass\nelse:\n    y = 2"),
            Just("class A:\n    def m(self):\n        return self"),
            Just("for i in range(3):\n    print(i)"),
        ],
        1..6,
    )
    .prop_map(|parts| parts.join("\n") + "\n")
}

fn go_program_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("x := 1"),
            Just("foo(a, b)"),
            Just("y := []int{1, 2}"),
            Just("if x {\n\t\ty()\n\t}"),
            Just("for i := 0; i < 3; i++ {\n\t\tz++\n\t}"),
            Just("return"),
            Just("a := 1; b := a"),
            Just("switch x {\n\tcase 1:\n\t\ty()\n\t\tz()\n\tdefault:\n\t}"),
        ],
        1..6,
    )
    .prop_map(|parts| format!("package main\n\nfunc main() {{\n\t{}\n}}\n", parts.join("\n\t")))
}

/// Whole Go files with several top-level declarations
fn go_file_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("var a = 1"),
            Just("var (\n\tb = 2\n\tc = 3\n)"),
            Just("const (\n\tk = 1\n\tl = 2\n)"),
            Just("type T struct {\n\tA int\n\tB string\n}"),
            Just("func f() {\n\tx := 1\n\ty := x\n}"),
            Just("func g(a int) int {\n\treturn a\n}"),
        ],
        1..6,
    )
    .prop_map(|parts| format!("package main\n\nimport \"fmt\"\n\n{}\n", parts.join("\n\n")))
}

fn js_program_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("const a = 1;"),
            Just("foo(a, b);"),
            Just("if (x) { y(); }"),
            Just("let o = {a: 1, b: 2};"),
            Just("function f(a) { return a * 2; }"),
            Just("for (let i = 0; i < 3; i++) { z(i); }"),
            Just("const el = <div className=\"a\"><span>hi</span> there</div>;"),
            Just("const t = <Foo a=\"1\" b={2} c={3} />;"),
        ],
        1..6,
    )
    .prop_map(|parts| parts.join("\n") + "\n")
}

/// Snippet pieces, each flagged as a placeholder or plain text
fn snippet_strategy() -> impl Strategy<Value = Vec<(&'static str, bool)>> {
    prop::collection::vec(
        (
            prop_oneof![
                Just("a"),
                Just("bee"),
                Just(","),
                Just(" "),
                Just("("),
                Just(")"),
                Just("1"),
                Just("c.d"),
                Just("{"),
                Just("}"),
                Just(""),
            ],
            any::<bool>(),
        ),
        1..10,
    )
}

fn check_monotonic<D: Dialect>(dialect: &D, style: &D::Style, src: &str) -> Result<(), TestCaseError> {
    let tree = ParserPool::new(D::LANGUAGE).parse(src).unwrap();
    let mut out = String::new();
    let Ok(mappings) = dialect.prettify(&mut out, style, src, 0..src.len(), tree.root_node()) else {
        return Ok(());
    };
    for pair in mappings.windows(2) {
        prop_assert!(pair[0].start_before <= pair[1].start_before, "{:?}", pair);
        prop_assert!(pair[0].start_after <= pair[1].start_after, "{:?}", pair);
    }
    Ok(())
}

fn print<D: Dialect>(dialect: &D, style: &D::Style, src: &str) -> Option<String> {
    let tree = ParserPool::new(D::LANGUAGE).parse(src).ok()?;
    let mut out = String::new();
    dialect
        .prettify(&mut out, style, src, 0..src.len(), tree.root_node())
        .ok()?;
    Some(out)
}

fn parses_cleanly(language: Language, src: &str) -> bool {
    ParserPool::new(language)
        .parse(src)
        .map(|tree| !tree.root_node().has_error())
        .unwrap_or(false)
}

/// Printed output parses without errors and printing it again keeps its
/// tokens
fn check_reprint<D: Dialect>(dialect: &D, style: &D::Style, src: &str) -> Result<(), TestCaseError> {
    prop_assume!(parses_cleanly(D::LANGUAGE, src));
    let Some(out) = print(dialect, style, src) else {
        return Ok(());
    };
    prop_assert!(parses_cleanly(D::LANGUAGE, &out), "{:?}", out);
    if let Some(again) = print(dialect, style, &out) {
        prop_assert_eq!(non_whitespace(&again), non_whitespace(&out));
        prop_assert!(parses_cleanly(D::LANGUAGE, &again), "{:?}", again);
    }
    Ok(())
}

proptest! {
    /// Accepted merges close every bracket they open, in order
    #[test]
    fn prop_merged_brackets_balance(lits in bracket_tokens_strategy(), space in any::<bool>()) {
        let options = MergeOptions { has_prefix: false, preceded_by_space: space };
        if let Ok(snippet) = merge(&Go, &[], &go_tokens(&lits), options) {
            prop_assert!(balanced(&snippet.text), "{:?}", snippet.text);
        }
        if let Ok(snippet) = merge(&Python::default(), &[], &py_tokens(&lits), options) {
            prop_assert!(balanced(&snippet.text), "{:?}", snippet.text);
        }
    }

    /// A first token that must attach to its left neighbour is refused after
    /// a typed space
    #[test]
    fn prop_no_forced_merge_after_space(first in must_left_strategy(), rest in bracket_tokens_strategy()) {
        let context = go_tokens(&["foo", ":=", "bar"]);
        let mut lits = vec![first];
        lits.extend(rest);
        let options = MergeOptions { has_prefix: false, preceded_by_space: true };
        prop_assert_eq!(merge(&Go, &context, &go_tokens(&lits), options), Err(Rejection::ForcedMerge));
    }

    /// Mappings advance with the source and the output
    #[test]
    fn prop_mappings_monotonic(
        py in python_program_strategy(),
        go in go_program_strategy(),
        js in js_program_strategy(),
    ) {
        check_monotonic(&Python::default(), &PythonStyle::default(), &py)?;
        check_monotonic(&Go, &GoStyle::default(), &go)?;
        check_monotonic(&JavaScript, &JavaScriptStyle::default(), &js)?;
    }

    /// Formatting yields a well-formed snippet with the same holes, and never
    /// an empty one for non-empty input
    #[test]
    fn prop_format_never_loses_completion(pieces in snippet_strategy(), start in any::<bool>()) {
        let mut builder = SnippetBuilder::new();
        for (piece, hole) in &pieces {
            if *hole {
                builder.push_hole(piece);
            } else {
                builder.push_str(piece);
            }
        }
        let snippet = builder.build();

        let buffer = "package main\n\nfunc main() {\n\tfoo := bar(butterfly, bee,)\n}\n";
        let cursor = buffer.find(",)").unwrap() + 1;
        let option = if start { MatchOption::MatchStart } else { MatchOption::MatchEnd };
        let registry = ParserRegistry::new();
        let got = format(&Go, &GoStyle::default(), &registry, buffer, ReplaceRange::at(cursor), &snippet, option)
            .unwrap();

        prop_assert!(got.is_well_formed());
        prop_assert_eq!(got.hole_texts(), snippet.hole_texts());
        if !snippet.text.is_empty() {
            prop_assert!(!got.text.is_empty());
        }
    }

    /// Printing well-formed programs only moves whitespace, and printing the
    /// output again keeps it that way
    #[test]
    fn prop_printing_keeps_non_whitespace(py in python_program_strategy(), go in go_program_strategy()) {
        if let Some(out) = print(&Python::default(), &PythonStyle::default(), &py) {
            prop_assert_eq!(non_whitespace(&out), non_whitespace(&py));
            if let Some(again) = print(&Python::default(), &PythonStyle::default(), &out) {
                prop_assert_eq!(non_whitespace(&again), non_whitespace(&out));
            }
        }
        if let Some(out) = print(&Go, &GoStyle::default(), &go) {
            prop_assert_eq!(non_whitespace(&out), non_whitespace(&go));
        }
    }

    /// Go statements and top-level declarations stay separated
    #[test]
    fn prop_printed_go_parses(go in go_program_strategy(), file in go_file_strategy()) {
        check_reprint(&Go, &GoStyle::default(), &go)?;
        check_reprint(&Go, &GoStyle::default(), &file)?;
        if let Some(out) = print(&Go, &GoStyle::default(), &file) {
            prop_assert_eq!(non_whitespace(&out), non_whitespace(&file));
        }
    }

    /// JavaScript and JSX layouts keep tokens apart
    #[test]
    fn prop_printed_javascript_parses(js in js_program_strategy()) {
        check_reprint(&JavaScript, &JavaScriptStyle::default(), &js)?;
    }

    #[test]
    fn prop_printed_python_parses(py in python_program_strategy()) {
        check_reprint(&Python::default(), &PythonStyle::default(), &py)?;
    }
}

#[test]
fn test_language_of_dialects() {
    assert_eq!(Go::LANGUAGE, Language::Go);
    assert_eq!(JavaScript::LANGUAGE, Language::JavaScript);
    assert_eq!(Python::LANGUAGE, Language::Python);
}
