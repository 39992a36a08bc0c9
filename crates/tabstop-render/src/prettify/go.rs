//! Go pretty printer

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ops::Range;

use once_cell::sync::Lazy;
use tabstop_parsers::{Language, Node};

use super::{children, parent_kind, Frame, OutputSink, Printer, Rules, SinkPolicy, Step, Walker};
use crate::config::GoStyle;
use crate::error::RenderResult;
use crate::types::OffsetMapping;

static KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough", "for", "func", "go",
        "goto", "if", "import", "interface", "map", "package", "range", "return", "select", "struct", "switch",
        "type", "var",
    ]
    .into_iter()
    .collect()
});

/// Keywords always followed by a space
static SPACE_AFTER: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough", "for", "go", "goto",
        "if", "import", "package", "range", "return", "select", "switch", "var",
    ]
    .into_iter()
    .collect()
});

static IDENTIFIER_LIKE: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "float_literal",
        "int_literal",
        "raw_string_literal",
        "interpreted_string_literal",
        "identifier",
        "blank_identifier",
        "rune_literal",
        "imaginary_literal",
        "pointer_type",
        "type_identifier",
        "package_identifier",
        "field_identifier",
        "true",
        "false",
        "nil",
        "iota",
        "label_name",
    ]
    .into_iter()
    .collect()
});

const SWITCHES: [&str; 3] = ["expression_switch_statement", "select_statement", "type_switch_statement"];

fn is_identifier_like(node: Node<'_>) -> bool {
    IDENTIFIER_LIKE.contains(node.kind()) || KEYWORDS.contains(node.kind())
}

fn is_operator(node: Node<'_>) -> bool {
    matches!(node.kind(), "+" | "-" | "*" | "/" | "%" | "&" | "^" | "|" | "&^" | "<<" | ">>")
}

/// Print the Go tree under `root`
pub fn prettify(
    out: &mut dyn fmt::Write,
    style: &GoStyle,
    src: &str,
    region: Range<usize>,
    root: Node<'_>,
) -> RenderResult<Vec<OffsetMapping>> {
    let policy = SinkPolicy {
        reset_delta_inline: true,
        ..SinkPolicy::default()
    };
    let sink = OutputSink::new(out, style.indent.as_str(), policy);
    let printer = Printer::new(sink, src, region);
    Walker::new(printer, GoRules { style }, Language::Go.root_kind()).run(root)
}

struct GoRules<'s> {
    style: &'s GoStyle,
}

/// A frame separating the children picked by `pick` from their predecessor
/// with `sep`, or `None` if nothing was picked
fn separated<'t>(
    node: Node<'t>,
    kids: &[Node<'t>],
    sep: &str,
    pick: impl Fn(usize, Node<'t>) -> bool,
) -> Option<Frame<'t>> {
    let gaps: HashMap<usize, String> = kids
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(i, c)| pick(*i, **c))
        .map(|(i, _)| (i, sep.to_string()))
        .collect();
    (!gaps.is_empty()).then(|| Frame::new(node).with_gaps(gaps))
}

/// One named child per line between the children at `open` and `close`, and
/// the closer on its own line. A comment stays on the line it trails.
fn line_per_child<'t>(node: Node<'t>, kids: &[Node<'t>], open: usize, close: usize) -> Frame<'t> {
    let mut frame = Frame::new(node);
    for i in open + 1..close {
        if starts_line(kids, i) {
            frame = frame.after(i, "\n");
        }
    }
    frame.after(close, "\n")
}

/// Whether child `i` goes on a line of its own. Terminating `;` leaves stay
/// where they are.
fn starts_line(kids: &[Node<'_>], i: usize) -> bool {
    let kid = kids[i];
    if !kid.is_named() {
        return false;
    }
    let trailing = kid.kind() == "comment"
        && i > 0
        && kids[i - 1].end_position().row == kid.start_position().row;
    !trailing
}

/// One element per line: a newline after the opener, after each comma and
/// before the closer
fn one_per_line<'t>(node: Node<'t>, kids: &[Node<'t>]) -> Frame<'t> {
    let n = kids.len();
    let mut frame = Frame::new(node).after(1, "\n");
    for i in 1..n.saturating_sub(1) {
        if kids[i].kind() == "," {
            frame = frame.after(i + 1, "\n");
        }
    }
    frame.after(n - 1, "\n")
}

impl<'s> GoRules<'s> {
    fn frame<'t>(&self, p: &mut Printer<'t, '_>, node: Node<'t>, kids: &[Node<'t>]) -> Option<Frame<'t>> {
        let n = kids.len();
        match node.kind() {
            "ERROR" => Some(Frame::new(node).with_gaps(p.source_gaps(kids))),

            "assignment_statement" | "short_var_declaration" | "send_statement" | "field_declaration"
            | "type_alias" | "type_spec" | "range_clause" | "for_statement" => Some(Frame::new(node).every(" ")),

            "keyed_element" if n > 2 => Some(Frame::new(node).after(2, " ")),

            // Top-level declarations one per line, except those copied as-is
            // before the region
            "source_file" => {
                let mut frame = Frame::new(node);
                for (i, kid) in kids.iter().enumerate().skip(1) {
                    let printed = kid.end_byte() >= p.region.start && kid.start_byte() <= p.region.end;
                    if printed && starts_line(kids, i) {
                        frame = frame.after(i, "\n");
                    }
                }
                Some(frame)
            }

            "block" | "field_declaration_list" if n > 2 => {
                p.print(" ");
                Some(line_per_child(node, kids, 0, n - 1))
            }

            "import_spec_list" | "var_spec_list" if n > 2 => Some(line_per_child(node, kids, 0, n - 1)),

            "interface_type" if n > 3 => Some(line_per_child(node, kids, 1, n - 1).after(1, " ")),

            // `type foo struct {...}` and `foo{...}`, not `f(x interface{})`
            "interface_type" | "struct_type"
                if matches!(parent_kind(node), "type_spec" | "composite_literal") =>
            {
                Some(Frame::new(node).after(1, " "))
            }

            "parameter_declaration" if n > 1 => Some(Frame::new(node).after(n - 1, " ")),
            "variadic_parameter_declaration" => Some(Frame::new(node).after(1, " ")),

            "if_statement" => separated(node, kids, " ", |_, c| c.kind() != ";"),

            "binary_expression" => {
                let parent = node.parent();
                let siblings = parent.map(|p| p.child_count()).unwrap_or(0);
                let dense = match parent_kind(node) {
                    "expression_list" => siblings > 1,
                    "argument_list" => siblings > 3,
                    "slice_expression" | "index_expression" => true,
                    _ => false,
                };
                let compact = dense && n == 3 && is_operator(kids[1]);
                (!compact).then(|| Frame::new(node).every(" "))
            }

            "const_declaration" | "type_declaration" if n > 2 && kids[1].kind() == "(" => {
                Some(line_per_child(node, kids, 1, n - 1).after(1, " "))
            }

            "var_spec" | "const_spec" => separated(node, kids, " ", |_, c| c.kind() != ","),

            "function_declaration" | "method_declaration" => separated(node, kids, " ", |i, _| {
                !matches!(kids[i - 1].kind(), "field_identifier" | "identifier" | "block")
            }),

            "function_type" | "func_literal" | "method_elem" => {
                separated(node, kids, " ", |i, _| kids[i - 1].kind() == "parameter_list")
            }

            k if SWITCHES.contains(&k) => {
                let mut frame = Frame::new(node);
                let mut lbrace = 0;
                for (i, c) in kids.iter().enumerate() {
                    if c.kind() == ":=" {
                        frame = frame.after(i, " ").after(i + 1, " ");
                    }
                    if c.kind() == "{" {
                        lbrace = i;
                        break;
                    }
                }
                if lbrace > 0 && lbrace < n - 1 {
                    frame = frame.after(lbrace, " ");
                    for i in lbrace..n - 1 {
                        frame = frame.after(i + 1, "\n");
                    }
                }
                (!frame.exactly_after.is_empty()).then_some(frame)
            }

            // Statements after the colon are indented one level.
            "communication_case" | "expression_case" | "default_case" | "type_case" => {
                let colon = kids.iter().rposition(|c| c.kind() == ":").unwrap_or(0);
                if n < colon + 2 {
                    return None;
                }
                let mut frame = Frame::new(node).after(colon + 1, "\n");
                for i in colon + 1..n {
                    if starts_line(kids, i) {
                        frame = frame.after(i, "\n");
                    }
                    frame = frame.depth(i, 1);
                }
                Some(frame)
            }

            // Spaces around the colon when a bound is an expression
            "slice_expression" => {
                let simple = |c: Option<Node<'_>>| c.map(|c| matches!(c.kind(), "identifier" | "int_literal"));
                let start = simple(node.child_by_field_name("start"));
                let end = simple(node.child_by_field_name("end"));
                match (start, end) {
                    (Some(s), Some(e)) if !s || !e => {
                        let mut frame = Frame::new(node);
                        for (i, c) in kids.iter().enumerate() {
                            if c.kind() == ":" {
                                frame = frame.after(i, " ").after(i + 1, " ");
                            }
                        }
                        Some(frame)
                    }
                    _ => None,
                }
            }

            "for_clause" => separated(node, kids, " ", |i, _| kids[i - 1].kind() == ";"),

            // The label sits one level out, the body on its own line.
            "labeled_statement" if n > 2 => {
                Some(Frame::new(node).shift(0, -1).after(2, "\n").shift(2, 1))
            }

            "literal_value" if n > 2 && self.literal_value_newline(p, node, kids) => Some(one_per_line(node, kids)),

            "argument_list" if self.arguments_newline(p, node, kids) => Some(one_per_line(node, kids)),

            _ => None,
        }
    }

    /// Respect the user's layout when the cursor is inside, otherwise put
    /// slice literals on one line and everything else one element per line
    fn literal_value_newline(&self, p: &Printer<'_, '_>, node: Node<'_>, kids: &[Node<'_>]) -> bool {
        let begin = p.region.start;
        if p.cursor_inside(node) && begin > kids[1].start_byte() {
            let last = kids[kids.len() - 1];
            return kids[0].start_position().row != last.start_position().row;
        }
        node.prev_sibling().is_some_and(|prev| prev.kind() != "slice_type")
    }

    /// One argument per line only when the user already writes them so
    fn arguments_newline(&self, p: &Printer<'_, '_>, node: Node<'_>, kids: &[Node<'_>]) -> bool {
        if kids.len() <= 2 || !p.cursor_inside(node) {
            return false;
        }
        let last = kids[kids.len() - 1];
        if kids[0].start_position().row == last.start_position().row {
            return false;
        }
        let mut last_row = None;
        for c in kids.iter().take_while(|c| c.start_byte() < p.region.start) {
            if matches!(c.kind(), "," | "(") {
                let row = c.start_position().row;
                if last_row == Some(row) {
                    return false;
                }
                last_row = Some(row);
            }
        }
        true
    }

    fn print_leaf<'t>(&self, p: &mut Printer<'t, '_>, node: Node<'t>) {
        let content = p.text(node);
        let kind = node.kind();

        if let Some(last) = p.last_printed {
            if is_identifier_like(last) && is_identifier_like(node) {
                p.print(" ");
            }
            if SPACE_AFTER.contains(last.kind()) && kind != ":" {
                p.print(" ");
            }
        }

        // No indentation for the cases of a switch or select.
        let switch_brace = SWITCHES.contains(&parent_kind(node));
        if content == "]" || content == ")" || (content == "}" && !switch_brace) {
            p.sink.decrease(1);
        }

        let line_comment = kind == "comment" && content.starts_with("//");
        if line_comment {
            p.print(" ");
        }

        p.print_node(node, content);

        if kind == "," && self.style.space_after_comma {
            p.print(" ");
        }
        if content == "[" || content == "(" || (content == "{" && !switch_brace) {
            p.sink.increase(1);
        }
        if line_comment {
            p.print("\n");
        }
        p.last_printed = Some(node);
    }
}

impl<'t> Rules<'t> for GoRules<'_> {
    fn enter(&mut self, p: &mut Printer<'t, '_>, node: Node<'t>) -> Step<'t> {
        if matches!(node.kind(), "interpreted_string_literal" | "raw_string_literal") {
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
        Step::Descend
    }

    fn leave(&mut self, p: &mut Printer<'t, '_>, frame: &Frame<'t>) {
        if frame.node.kind() == "ERROR" {
            p.print_error_tail(frame.node, false);
        }
    }
}
