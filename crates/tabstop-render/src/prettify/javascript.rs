//! JavaScript (with JSX) pretty printer

use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

use tabstop_parsers::{Language, Node};

use super::{children, parent_kind, same_node, Frame, OutputSink, Printer, Rules, SinkPolicy, Step, Walker};
use crate::config::{JavaScriptStyle, Layout};
use crate::error::RenderResult;
use crate::types::OffsetMapping;

/// Statements that end with an inserted semicolon
const REQUIRE_ASI: &[&str] = &[
    "empty_statement",
    "variable_declaration",
    "lexical_declaration",
    "return_statement",
    "debugger_statement",
    "expression_statement",
    "do_statement",
    "break_statement",
    "continue_statement",
    "throw_statement",
    "import_statement",
    "export_statement",
];

const UNARY_WORDS: &[&str] = &["delete", "new", "typeof", "void", "yield"];

/// Characters that would fuse into another operator if printed adjacently
const CONFLICTING: &[u8] = b".+-*/=><&|";

/// Print the JavaScript tree under `root`
pub fn prettify(
    out: &mut dyn fmt::Write,
    style: &JavaScriptStyle,
    src: &str,
    region: Range<usize>,
    root: Node<'_>,
) -> RenderResult<Vec<OffsetMapping>> {
    let policy = SinkPolicy {
        lock_after_dedent: true,
        single_step_indent: true,
        ..SinkPolicy::default()
    };
    let sink = OutputSink::new(out, style.indent.as_str(), policy);
    let printer = Printer::new(sink, src, region);
    let rules = JsRules {
        style,
        decl_end_row: None,
        added_semi: false,
        jsx_newline: HashMap::new(),
    };
    Walker::new(printer, rules, Language::JavaScript.root_kind()).run(root)
}

struct JsRules<'s> {
    style: &'s JavaScriptStyle,
    /// End row of a function or class declaration just left, for the
    /// semicolon rule that applies to the next node
    decl_end_row: Option<usize>,
    /// Whether the last thing printed was an inserted semicolon
    added_semi: bool,
    /// Layout decided for each JSX element, by start byte
    jsx_newline: HashMap<usize, bool>,
}

fn spacing(newline: bool) -> &'static str {
    if newline {
        "\n"
    } else {
        " "
    }
}

fn is_declaration(kind: &str) -> bool {
    matches!(
        kind,
        "function_declaration"
            | "generator_function_declaration"
            | "class_declaration"
            | "lexical_declaration"
            | "variable_declaration"
    )
}

fn is_statement(node: Node<'_>) -> bool {
    matches!(
        node.kind(),
        "export_statement"
            | "import_statement"
            | "debugger_statement"
            | "expression_statement"
            | "statement_block"
            | "if_statement"
            | "switch_statement"
            | "for_statement"
            | "for_in_statement"
            | "for_of_statement"
            | "while_statement"
            | "do_statement"
            | "try_statement"
            | "with_statement"
            | "break_statement"
            | "continue_statement"
            | "return_statement"
            | "throw_statement"
            | "empty_statement"
            | "labeled_statement"
            | "switch_case"
            | "switch_default"
    ) || is_declaration(node.kind())
}

/// A block that belongs to some enclosing construct
fn is_nested_block(node: Node<'_>) -> bool {
    node.kind() == "statement_block" && node.parent().is_some()
}

fn is_for_header(node: Node<'_>) -> bool {
    is_statement(node) && parent_kind(node) == "for_statement"
}

fn is_complex(node: Node<'_>) -> bool {
    matches!(
        node.kind(),
        "jsx_element"
            | "jsx_self_closing_element"
            | "call_expression"
            | "function"
            | "function_expression"
            | "array"
            | "object"
            | "arrow_function"
    )
}

fn is_keyword(node: Node<'_>, src: &str) -> bool {
    let kind = node.kind();
    kind.len() >= 2
        && !kind.contains("identifier")
        && kind.as_bytes()[0].is_ascii_lowercase()
        && tabstop_parsers::node_text(node, src) == kind
}

fn is_literal(node: Node<'_>) -> bool {
    matches!(
        node.kind(),
        "string" | "template_string" | "regex" | "number" | "\"" | "'" | "`"
    )
}

fn is_identifier_like(node: Node<'_>, src: &str) -> bool {
    matches!(
        node.kind(),
        "identifier"
            | "jsx_identifier"
            | "shorthand_property_identifier"
            | "property_identifier"
            | "statement_identifier"
            | "number"
            | "regex"
    ) || is_keyword(node, src)
}

fn operator_conflict(src: &str, left: Node<'_>, right: Node<'_>) -> bool {
    // methods on regex literals, e.g. /abc/.test(s)
    if left.kind() == "regex" && right.kind() == "." {
        return false;
    }
    let tag_parts = |n: Node<'_>| {
        matches!(
            parent_kind(n),
            "jsx_opening_element" | "jsx_closing_element" | "jsx_self_closing_element"
        )
    };
    if tag_parts(left) && tag_parts(right) {
        return false;
    }
    let (l, r) = (
        tabstop_parsers::node_text(left, src).as_bytes(),
        tabstop_parsers::node_text(right, src).as_bytes(),
    );
    match (l.last(), r.first()) {
        (Some(a), Some(b)) => CONFLICTING.contains(a) && CONFLICTING.contains(b),
        _ => false,
    }
}

/// Whether the field holds a statement that is not a block
fn non_block_field(node: Node<'_>, field: &str) -> bool {
    node.child_by_field_name(field)
        .is_some_and(|body| body.kind() != "statement_block")
}

/// `sep` after every comma that is followed by an element
fn after_commas<'t>(mut frame: Frame<'t>, kids: &[Node<'t>], sep: &str) -> Frame<'t> {
    let mut last_comma = 0;
    for (i, kid) in kids.iter().enumerate().take(kids.len().saturating_sub(1)).skip(1) {
        if kid.kind() == "," {
            last_comma = i;
            continue;
        }
        if last_comma > 0 {
            frame = frame.after(last_comma + 1, sep);
            last_comma = 0;
        }
    }
    frame
}

/// One element per line between the delimiters
fn one_per_line<'t>(frame: Frame<'t>, kids: &[Node<'t>]) -> Frame<'t> {
    let n = kids.len();
    after_commas(frame.after(1, "\n").after(n - 1, "\n"), kids, "\n")
}

/// Children between the delimiters
fn inner<'a, 't>(kids: &'a [Node<'t>]) -> &'a [Node<'t>] {
    match kids.len() {
        0..=2 => &[],
        n => &kids[1..n - 1],
    }
}

/// Attributes of an opening or self-closing tag, found by kind
fn jsx_attributes<'t>(mut frame: Frame<'t>, kids: &[Node<'t>], newline: bool) -> Frame<'t> {
    for (i, kid) in kids.iter().enumerate() {
        if matches!(kid.kind(), "jsx_attribute" | "jsx_expression") {
            frame = frame.after(i, spacing(newline)).depth(i, 1);
        }
    }
    frame
}

/// `<>...</>`: the opening tag has no name
fn is_fragment(element: Node<'_>) -> bool {
    element
        .child_by_field_name("open_tag")
        .is_some_and(|open| open.child_by_field_name("name").is_none())
}

fn framed(frame: Frame<'_>) -> Option<Frame<'_>> {
    (!frame.exactly_after.is_empty()).then_some(frame)
}

/// Every key of the separators also gets one level of depth
fn indented(mut frame: Frame<'_>) -> Frame<'_> {
    let keys: Vec<usize> = frame.exactly_after.keys().copied().collect();
    for k in keys {
        frame = frame.depth(k, 1);
    }
    frame
}

/// Layout decision shared by the list-like nodes
enum Decision {
    Fixed(bool),
    Heuristic,
}

fn decide(a: Layout, b: Layout) -> Decision {
    match (a, b) {
        (Layout::Always, Layout::Always) => Decision::Fixed(true),
        (Layout::Never, Layout::Never) => Decision::Fixed(false),
        _ => Decision::Heuristic,
    }
}

impl<'s> JsRules<'s> {
    /// The user's own layout when the cursor is inside the delimiters
    fn user_layout(&self, p: &Printer<'_, '_>, node: Node<'_>, kids: &[Node<'_>]) -> Option<bool> {
        let n = kids.len();
        if n >= 2 && p.cursor_inside(node) {
            if kids[0].start_position().row != kids[n - 1].start_position().row {
                return Some(true);
            }
            if n > 2 && p.region.start > kids[1].start_byte() {
                return Some(false);
            }
        }
        None
    }

    fn arguments_newline(&self, p: &Printer<'_, '_>, node: Node<'_>, kids: &[Node<'_>]) -> bool {
        if let Decision::Fixed(b) = decide(self.style.func_paren_newline, self.style.func_param_argument_newline) {
            return b;
        }
        if let Some(b) = self.user_layout(p, node, kids) {
            return b;
        }
        let n = kids.len();
        n >= 9
            || inner(kids)
                .iter()
                .any(|k| is_complex(*k) || (k.kind() == "object" && k.child_count() > 3))
    }

    fn object_newline(&self, p: &Printer<'_, '_>, node: Node<'_>, kids: &[Node<'_>]) -> bool {
        if let Decision::Fixed(b) = decide(self.style.object_property_newline, self.style.object_curly_newline) {
            return b;
        }
        // bodies follow the statement layout
        if matches!(parent_kind(node), "arrow_function" | "function_declaration" | "class") {
            return self.style.statement_newline;
        }
        if let Some(b) = self.user_layout(p, node, kids) {
            return b;
        }
        if matches!(node.kind(), "named_imports" | "export_clause") {
            return false;
        }
        let n = kids.len();
        n >= 7
            || inner(kids).iter().any(|k| {
                is_complex(*k)
                    || (k.kind() == "pair" && k.child_by_field_name("value").is_some_and(is_complex))
            })
    }

    fn array_newline(&self, p: &Printer<'_, '_>, node: Node<'_>, kids: &[Node<'_>]) -> bool {
        if let Decision::Fixed(b) = decide(self.style.array_bracket_newline, self.style.array_element_newline) {
            return b;
        }
        if let Some(b) = self.user_layout(p, node, kids) {
            return b;
        }
        let n = kids.len();
        n >= 7 || inner(kids).iter().any(|k| is_complex(*k))
    }

    fn jsx_element_newline(&self, p: &Printer<'_, '_>, node: Node<'_>, kids: &[Node<'_>]) -> bool {
        match self.style.jsx_element_children_newline {
            Layout::Always => return true,
            Layout::Never => return false,
            Layout::Auto => {}
        }
        if let Some(opening) = kids.first() {
            if self.jsx_attribute_newline(p, *opening, &children(*opening)) {
                return true;
            }
        }
        if let Some(b) = self.user_layout(p, node, kids) {
            return b;
        }
        let n = kids.len();
        let mut non_empty = 0;
        for kid in kids.iter().take(n.saturating_sub(1)).skip(1) {
            if is_complex(*kid) {
                return true;
            }
            if kid.kind() == "jsx_text" && p.text(*kid).trim().is_empty() {
                continue;
            }
            non_empty += 1;
        }
        non_empty >= 2
    }

    fn jsx_attribute_newline(&self, p: &Printer<'_, '_>, node: Node<'_>, kids: &[Node<'_>]) -> bool {
        match self.style.jsx_attribute_newline {
            Layout::Always => return true,
            Layout::Never => return false,
            Layout::Auto => {}
        }
        let n = kids.len();
        let sized = match node.kind() {
            "jsx_opening_element" => n >= 3,
            "jsx_self_closing_element" => n >= 4,
            _ => false,
        };
        if sized && p.cursor_inside(node) {
            if kids[0].start_position().row != kids[n - 1].start_position().row {
                return true;
            }
            if n > 3 && p.region.start > kids[2].start_byte() {
                return false;
            }
        }
        kids.iter().filter(|k| k.kind() == "jsx_attribute").count() >= 3
    }

    fn jsx_opening<'t>(&self, p: &Printer<'t, '_>, node: Node<'t>, kids: &[Node<'t>]) -> Option<Frame<'t>> {
        let newline = self.jsx_attribute_newline(p, node, kids);
        let mut frame = jsx_attributes(Frame::new(node), kids, newline);
        if newline {
            frame = frame.after(kids.len() - 1, "\n");
        }
        framed(frame)
    }

    fn frame<'t>(&mut self, p: &mut Printer<'t, '_>, node: Node<'t>, kids: &[Node<'t>]) -> Option<Frame<'t>> {
        let style = self.style;
        let n = kids.len();
        let body_break = spacing(style.non_block_statement_body_linebreak);

        match node.kind() {
            "ERROR" => {
                // a tag the parser gave up on
                if n > 2 && kids[2].kind() == "jsx_attribute" && p.text(node).starts_with('<') {
                    return self.jsx_opening(p, node, kids);
                }
                let mut frame = Frame::new(node);
                for i in 1..n {
                    if kids[i - 1].end_position() != kids[i].start_position() {
                        frame = frame.after(i, " ");
                    }
                }
                Some(frame)
            }

            "if_statement" => {
                non_block_field(node, "consequence").then(|| Frame::new(node).after(2, body_break).depth(2, 1))
            }

            "else_clause" if n == 2 => {
                let body = kids[1];
                if body.kind() == "statement_block" {
                    return None;
                }
                let frame = Frame::new(node).after(1, body_break);
                // else-if chains stay at the same depth
                Some(if body.kind() == "if_statement" { frame } else { frame.depth(1, 1) })
            }

            "while_statement" => non_block_field(node, "body").then(|| indented(Frame::new(node).after(2, body_break))),

            "do_statement" => non_block_field(node, "body").then(|| indented(Frame::new(node).after(1, body_break))),

            // `for (let i = 0; i < n; i++)` but `for (;;)`
            "for_statement" => {
                let mut frame = Frame::new(node);
                let close = kids.iter().rposition(|k| k.kind() == ")").unwrap_or(0);
                for i in 3..close {
                    let after_semi = p.text(kids[i - 1]).ends_with(';');
                    if after_semi && !matches!(kids[i].kind(), ";" | "empty_statement") {
                        frame = frame.after(i, " ");
                    }
                }
                if non_block_field(node, "body") {
                    frame = frame.after(n - 1, body_break).depth(n - 1, 1);
                }
                framed(frame)
            }

            "for_in_statement" | "for_of_statement" | "with_statement" => {
                non_block_field(node, "body").then(|| indented(Frame::new(node).after(n - 1, body_break)))
            }

            "arrow_function" if n >= 2 => {
                let mut frame = Frame::new(node).after(n - 1, spacing(style.implicit_arrow_linebreak));
                if style.arrow_spacing_before {
                    frame = frame.after(n - 2, " ");
                }
                if non_block_field(node, "body") {
                    return Some(indented(frame));
                }
                if style.arrow_spacing_after {
                    frame = frame.after(n - 1, " ");
                } else {
                    frame.exactly_after.remove(&(n - 1));
                }
                framed(frame)
            }

            "array" | "array_pattern" => {
                let mut frame = Frame::new(node);
                if style.array_bracket_spacing && n > 2 {
                    frame = frame.after(1, " ").after(n - 1, " ");
                }
                if n > 2 && self.array_newline(p, node, kids) {
                    frame = one_per_line(frame, kids);
                }
                framed(frame)
            }

            "object" | "object_pattern" | "named_imports" | "export_clause" => {
                let mut frame = Frame::new(node);
                if style.object_curly_spacing && n > 2 {
                    frame = frame.after(1, " ").after(n - 1, " ");
                }
                if n > 2 && self.object_newline(p, node, kids) {
                    frame = one_per_line(frame, kids);
                }
                framed(frame)
            }

            "pair" if style.key_spacing_before_colon || style.key_spacing_after_colon => {
                let mut frame = Frame::new(node);
                if style.key_spacing_before_colon {
                    frame = frame.after(1, " ");
                }
                if style.key_spacing_after_colon {
                    frame = frame.after(2, " ");
                }
                Some(frame)
            }

            "formal_parameters" => {
                if style.space_before_func_paren {
                    p.print(" ");
                }
                let mut frame = Frame::new(node);
                if style.func_paren_newline == Layout::Always && n > 2 {
                    frame = frame.after(1, "\n").after(n - 1, "\n");
                }
                if style.func_param_argument_newline == Layout::Always && n > 2 {
                    frame = after_commas(frame, kids, "\n");
                }
                framed(frame)
            }

            "arguments" => {
                let mut frame = Frame::new(node);
                if style.func_call_spacing {
                    p.print(" ");
                    if n > 2 {
                        frame = frame.after(1, " ").after(n - 1, " ");
                    }
                }
                if n > 2 && self.arguments_newline(p, node, kids) {
                    frame = one_per_line(frame, kids);
                }
                framed(frame)
            }

            "parenthesized_expression" if n > 2 => {
                let has_jsx = kids[1..n - 1].iter().any(|k| {
                    matches!(
                        k.kind(),
                        "jsx_element" | "jsx_self_closing_element" | "jsx_opening_element"
                    )
                });
                has_jsx.then(|| one_per_line(Frame::new(node), kids))
            }

            "class_body" => {
                if style.statement_newline {
                    return Some(Frame::new(node).every("\n"));
                }
                if style.block_spacing && n >= 2 {
                    return Some(Frame::new(node).after(1, " ").after(n - 1, " "));
                }
                // members get separated by semicolons as they are visited
                Some(Frame::new(node))
            }

            "statement_block" | "switch_body" if (style.block_spacing || style.statement_newline) && n >= 2 => {
                let sep = spacing(style.statement_newline);
                Some(Frame::new(node).after(1, sep).after(n - 1, sep))
            }

            "switch_case" | "switch_default" => {
                let colon = if node.kind() == "switch_case" { 2 } else { 1 };
                let mut frame = Frame::new(node);
                if n > colon && style.switch_colon_spacing_before {
                    frame = frame.after(colon, " ");
                }
                if n == colon + 2 && kids[colon + 1].kind() == "statement_block" && style.switch_colon_spacing_after {
                    frame = frame.after(colon + 1, " ");
                }
                if n >= colon + 2 && kids[colon + 1].kind() != "statement_block" {
                    if style.switch_colon_spacing_after || style.switch_colon_newline {
                        frame = frame
                            .after(colon + 1, spacing(style.switch_colon_newline))
                            .depth(colon + 1, 1);
                    }
                    for i in colon + 1..n {
                        frame = frame.after(i + 1, "\n").depth(i + 1, 1);
                    }
                }
                framed(frame)
            }

            "computed_property_name" if style.computed_property_spacing => Some(Frame::new(node).every(" ")),

            "call_expression"
                if style.template_tag_spacing && n == 2 && kids[1].kind() == "template_string" =>
            {
                Some(Frame::new(node).up_to(" ", 1))
            }

            "binary_expression"
            | "ternary_expression"
            | "assignment_expression"
            | "augmented_assignment_expression"
            | "assignment_pattern"
                if style.space_infix_ops =>
            {
                Some(Frame::new(node).every(" "))
            }

            "variable_declarator" if style.space_infix_ops => {
                if n == 3 {
                    return Some(Frame::new(node).every(" "));
                }
                let eq = kids.iter().skip(1).position(|k| k.kind() == "=").map(|i| i + 1)?;
                Some(Frame::new(node).after(eq, " ").after(eq + 1, " "))
            }

            "public_field_definition" | "field_definition" if style.space_infix_ops && n == 3 => {
                Some(Frame::new(node).every(" "))
            }

            "unary_expression" if n > 0 => {
                let word = UNARY_WORDS.contains(&kids[0].kind());
                let spaced = if word {
                    style.space_unary_ops_words
                } else {
                    style.space_unary_ops_non_words
                };
                spaced.then(|| Frame::new(node).up_to(" ", 1))
            }

            "update_expression" if style.space_unary_ops_non_words => Some(Frame::new(node).up_to(" ", 1)),

            "new_expression" | "yield_expression" if style.space_unary_ops_words => {
                Some(Frame::new(node).up_to(" ", 1))
            }

            // the source between children is the literal text itself
            "string" | "template_string" => Some(Frame::new(node).with_string_gaps()),

            "jsx_self_closing_element" if n >= 3 => {
                let newline = self.jsx_attribute_newline(p, node, kids);
                let mut frame = jsx_attributes(Frame::new(node), kids, newline);
                if newline {
                    frame = frame.after(n - 1, "\n");
                }
                framed(frame)
            }

            "jsx_element" => {
                let newline = if is_fragment(node) {
                    style.jsx_fragment_children_newline
                } else {
                    self.jsx_element_newline(p, node, kids)
                };
                self.jsx_newline.insert(node.start_byte(), newline);
                if !newline {
                    return None;
                }
                let mut frame = Frame::new(node);
                for i in 0..n.saturating_sub(1) {
                    frame = frame.after(i + 1, "\n");
                }
                framed(frame)
            }

            "jsx_opening_element" => self.jsx_opening(p, node, kids),

            _ => None,
        }
    }

    fn added_semi(&mut self, p: &mut Printer<'_, '_>) {
        if self.added_semi || p.last_printed.is_some_and(|n| n.kind() == ";") {
            return;
        }
        if self.style.semicolon {
            p.print(";");
            self.added_semi = true;
        } else {
            p.sink.semicolon_newline();
        }
    }

    /// JSX text loses the whitespace next to the tags that enclose it
    fn jsx_text<'t>(&self, node: Node<'t>, content: &'t str) -> &'t str {
        let Some(parent) = node.parent() else {
            return content;
        };
        if parent.kind() != "jsx_element" {
            return content;
        }
        let first = parent.child(1);
        let last = parent.child_count().checked_sub(2).and_then(|i| parent.child(i));
        if self.jsx_newline.get(&parent.start_byte()).copied().unwrap_or(false) {
            return content.trim();
        }
        let mut content = content;
        if same_node(first, node) {
            content = content.trim_start_matches(' ');
        }
        if same_node(last, node) {
            content = content.trim_end_matches(' ');
        }
        content
    }

    fn print_leaf<'t>(&mut self, p: &mut Printer<'t, '_>, node: Node<'t>) {
        let style = self.style;
        let src = p.src;
        let kind = node.kind();
        let pkind = parent_kind(node);
        let last = p.last_printed;
        let mut content = p.text(node);

        if (content == ")" && style.space_in_parens)
            || (content == "{"
                && style.space_before_blocks
                && pkind != "jsx_expression"
                && last.is_some_and(|l| p.text(l) != "("))
            || (content == "," && style.comma_spacing_before)
        {
            p.print(" ");
        }

        if let Some(last) = last {
            if is_identifier_like(last, src) && is_identifier_like(node, src) {
                p.print(" ");
            } else if operator_conflict(src, last, node) {
                p.print(" ");
            } else if style.keyword_spacing_before && is_keyword(node, src) {
                // `} else`, `"a" in b`, `import * as`
                if matches!(p.text(last), ")" | "}") || is_literal(last) || last.kind() == "*" {
                    p.print(" ");
                }
            } else if style.keyword_spacing_after && is_keyword(last, src) {
                // `while (x)` but not `super(x)`
                let paren = content == "(" && pkind != "call_expression";
                if paren || content == "{" || is_literal(node) || kind == "*" {
                    p.print(" ");
                }
            }
        }

        if matches!(content, "}" | "]" | ")") {
            p.sink.decrease(1);
        }
        if content == "</" && pkind == "jsx_closing_element" {
            p.sink.decrease(1);
        }

        let line_comment = kind == "comment" && content.starts_with("//");
        if line_comment {
            p.print(" ");
        }

        if kind == "jsx_text" {
            content = self.jsx_text(node, content);
        }

        p.print_node(node, content);
        self.added_semi = false;

        if line_comment || kind == "hash_bang_line" {
            p.print("\n");
        } else if kind == "comment" && content.starts_with("/*") {
            // block comments on their own line keep it
            if last.map_or(true, |l| l.end_position().row < node.start_position().row) {
                p.print("\n");
            }
        }

        if (content == "(" && style.space_in_parens) || (content == "," && style.comma_spacing_after) {
            p.print(" ");
        }

        if matches!(content, "{" | "[" | "(") {
            p.sink.increase(1);
        }
        if content == ">" && pkind == "jsx_opening_element" {
            p.sink.increase(1);
        }

        p.last_printed = Some(node);
    }
}

impl<'t> Rules<'t> for JsRules<'_> {
    fn enter(&mut self, p: &mut Printer<'t, '_>, node: Node<'t>) -> Step<'t> {
        if let Some(end_row) = self.decl_end_row.take() {
            // After a function or class declaration a newline ends the
            // statement unless the next node continues the expression.
            if self.style.semicolon && node.start_position().row > end_row {
                let continues = p.text(node).starts_with(['(', '[', ';']);
                if !p.text(node).is_empty() && !continues {
                    self.added_semi(p);
                }
            }
        }

        if node.kind() == "regex" {
            self.print_leaf(p, node);
            return Step::Skip;
        }

        let kids = children(node);
        if let Some(frame) = self.frame(p, node, &kids) {
            return Step::Layout(frame);
        }
        if kids.is_empty() {
            self.print_leaf(p, node);
            return Step::Skip;
        }
        if REQUIRE_ASI.contains(&node.kind()) || (is_statement(node) && !is_nested_block(node)) {
            return Step::Layout(Frame::new(node));
        }
        Step::Descend
    }

    fn before_child(&mut self, p: &mut Printer<'t, '_>, frame: &Frame<'t>) {
        // class members on one line need separating semicolons
        if !self.style.statement_newline && frame.node.kind() == "class_body" {
            let i = frame.seen();
            if i > 1 && i < frame.count {
                self.added_semi(p);
            }
        }
    }

    fn leave(&mut self, p: &mut Printer<'t, '_>, frame: &Frame<'t>) {
        let node = frame.node;
        if REQUIRE_ASI.contains(&node.kind()) {
            self.added_semi(p);
        }
        if self.style.statement_newline && is_statement(node) && !is_nested_block(node) && !is_for_header(node) {
            p.print("\n");
        }
        if matches!(
            node.kind(),
            "function_declaration" | "generator_function_declaration" | "class_declaration"
        ) {
            self.decl_end_row = Some(node.end_position().row);
        }
        if node.kind() == "ERROR" {
            p.print_error_tail(node, true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabstop_parsers::ParserPool;

    fn format_with(style: &JavaScriptStyle, src: &str) -> (String, Vec<OffsetMapping>) {
        let tree = ParserPool::new(Language::JavaScript).parse(src).unwrap();
        let mut out = String::new();
        let mappings = prettify(&mut out, style, src, 0..src.len(), tree.root_node()).unwrap();
        (out, mappings)
    }

    #[test]
    fn test_declaration_spacing() {
        let (out, mappings) = format_with(&JavaScriptStyle::default(), "const a=1\n");
        assert_eq!(out, "const a = 1");
        let one = mappings.iter().find(|m| m.start_before == 8).unwrap();
        assert_eq!(&out[one.start_after..one.end_after], "1");
    }

    #[test]
    fn test_block_statement_layout() {
        let (out, _) = format_with(&JavaScriptStyle::default(), "if(x){y()}");
        assert_eq!(out, "if (x) {\n  y()\n}");
    }

    #[test]
    fn test_semicolon_style() {
        let style = JavaScriptStyle {
            semicolon: true,
            ..JavaScriptStyle::default()
        };
        let (out, _) = format_with(&style, "const a=1\nlet b=2\n");
        assert_eq!(out, "const a = 1;\nlet b = 2;");
    }

    #[test]
    fn test_statements_on_separate_lines() {
        let (out, _) = format_with(&JavaScriptStyle::default(), "a();b()");
        assert_eq!(out, "a();\nb()");
    }

    #[test]
    fn test_jsx_attributes_one_per_line() {
        let (out, _) = format_with(&JavaScriptStyle::default(), "x = <Foo a=\"1\" b={2} c={3} />\n");
        assert!(out.contains("<Foo\n  a=\"1\"\n  b={2}\n  c={3}\n/>"), "got {:?}", out);
    }

    #[test]
    fn test_jsx_children_layout() {
        let src = "x = <div className=\"a\"><span>hi</span> there</div>\n";
        let (out, _) = format_with(&JavaScriptStyle::default(), src);
        assert!(
            out.contains("<div className=\"a\">\n  <span>hi</span>\n  there\n</div>"),
            "got {:?}",
            out
        );
    }

    #[test]
    fn test_jsx_fragment_children() {
        let (out, _) = format_with(&JavaScriptStyle::default(), "x = <><a/><b/></>\n");
        assert!(out.contains("<>\n  <a/>\n  <b/>\n</>"), "got {:?}", out);
    }

    #[test]
    fn test_for_header_spacing() {
        let (out, _) = format_with(&JavaScriptStyle::default(), "for(let i=0;i<3;i++){x()}");
        assert!(out.starts_with("for (let i = 0; i < 3; i++) {"), "got {:?}", out);
    }

    #[test]
    fn test_operator_conflicts() {
        let (out, _) = format_with(&JavaScriptStyle::default(), "x = a+ +b\n");
        assert!(out.contains("a + +b"), "got {:?}", out);
    }
}
