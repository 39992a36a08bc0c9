//! Python pretty printer

use std::fmt;
use std::ops::Range;

use tabstop_parsers::{Language, Node};

use super::{children, parent_kind, same_node, Frame, OutputSink, Printer, Rules, SinkPolicy, Step, Walker};
use crate::config::{Layout, PythonStyle};
use crate::error::RenderResult;
use crate::types::OffsetMapping;

const STATEMENTS: &[&str] = &[
    "import_statement",
    "import_from_statement",
    "future_import_statement",
    "assert_statement",
    "print_statement",
    "expression_statement",
    "return_statement",
    "delete_statement",
    "raise_statement",
    "pass_statement",
    "break_statement",
    "continue_statement",
    "if_statement",
    "while_statement",
    "for_statement",
    "try_statement",
    "with_statement",
    "match_statement",
    "global_statement",
    "nonlocal_statement",
    "exec_statement",
    "class_definition",
    "function_definition",
    "decorated_definition",
];

const CLAUSES: &[&str] = &[
    "if_clause",
    "elif_clause",
    "else_clause",
    "except_clause",
    "finally_clause",
    "case_clause",
];

const KEYWORDS: &[&str] = &[
    "and", "as", "assert", "async", "await", "break", "class", "continue", "def", "del", "elif", "else", "except",
    "exec", "finally", "for", "from", "global", "if", "import", "in", "is", "lambda", "nonlocal", "not", "or",
    "print", "raise", "return", "try", "while", "with", "yield",
];

/// Print the Python tree under `root`
pub fn prettify(
    out: &mut dyn fmt::Write,
    style: &PythonStyle,
    src: &str,
    region: Range<usize>,
    root: Node<'_>,
) -> RenderResult<Vec<OffsetMapping>> {
    let policy = SinkPolicy {
        keep_blank_lines: true,
        lock_after_dedent: true,
        ..SinkPolicy::default()
    };
    let sink = OutputSink::new(out, style.indent.as_str(), policy);
    let printer = Printer::new(sink, src, region);
    Walker::new(printer, PyRules { style }, Language::Python.root_kind()).run(root)
}

struct PyRules<'s> {
    style: &'s PythonStyle,
}

fn is_keyword(node: Node<'_>) -> bool {
    KEYWORDS.contains(&node.kind())
}

fn is_identifier_like(node: Node<'_>) -> bool {
    matches!(
        node.kind(),
        "identifier" | "integer" | "float" | "string" | "true" | "false" | "none"
    ) || is_keyword(node)
}

/// A statement with no nested block or statement
fn is_single_statement(node: Node<'_>) -> bool {
    STATEMENTS.contains(&node.kind())
        && children(node)
            .iter()
            .all(|c| c.kind() != "block" && !STATEMENTS.contains(&c.kind()))
}

/// Newline after the opener, after each comma and before the closer, with
/// the elements `depth` levels in
fn lines_in_parens<'t>(node: Node<'t>, kids: &[Node<'t>], depth: i32) -> Frame<'t> {
    let n = kids.len();
    let mut frame = Frame::new(node).after(1, "\n").depth(1, depth).after(n - 1, "\n");
    for i in 1..n - 1 {
        if kids[i].kind() == "," {
            frame = frame.after(i + 1, "\n").depth(i + 1, depth);
        }
    }
    frame
}

impl<'s> PyRules<'s> {
    /// Keep the user's layout when the region sits strictly inside the
    /// brackets, otherwise break long or crowded lists
    fn multi_line(&self, p: &Printer<'_, '_>, kids: &[Node<'_>], layout: Layout) -> bool {
        let n = kids.len();
        match layout {
            _ if n <= 2 => return false,
            Layout::Never => return false,
            Layout::Always => return true,
            Layout::Auto => {}
        }

        let (begin, end) = (p.region.start, p.region.end);
        let (open, close) = (kids[0], kids[n - 1]);
        let inside = (begin >= open.end_byte() && end < close.start_byte())
            || (begin > open.end_byte() && end <= close.start_byte());
        if inside {
            let mut last_row = None;
            for (i, kid) in kids.iter().enumerate() {
                // only the children outside of the region
                if begin <= kid.end_byte() && end >= kid.start_byte() {
                    continue;
                }
                if i == 0 || i == n - 1 || kid.kind() == "," {
                    let row = kid.start_position().row;
                    if last_row == Some(row) {
                        return false;
                    }
                    last_row = Some(row);
                }
            }
            return true;
        }

        n >= 11 || close.end_position().column >= 80
    }

    /// Blank lines required before class and function definitions
    fn blank_lines(&self, p: &mut Printer<'_, '_>, node: Node<'_>) {
        let kind = node.kind();
        let parent = node.parent();
        let pkind = parent_kind(node);

        let count = if kind == "class_definition" {
            self.style.blank_lines_before_class_def
        } else if kind == "decorated_definition" || (kind == "function_definition" && pkind != "decorated_definition") {
            let first = parent.is_some_and(|par| same_node(par.child(0), node));
            let method = pkind == "block" && parent.is_some_and(|par| parent_kind(par) == "class_definition");
            if method && !first {
                self.style.blank_lines_between_methods
            } else if pkind == "module" && !first {
                self.style.blank_lines_before_top_func_def
            } else {
                0
            }
        } else {
            0
        };
        for _ in 0..count {
            p.print("\n");
        }
    }

    fn frame<'t>(&self, p: &mut Printer<'t, '_>, node: Node<'t>, kids: &[Node<'t>]) -> Option<Frame<'t>> {
        let style = self.style;
        let kind = node.kind();
        match kind {
            "ERROR" => Some(Frame::new(node).with_gaps(p.source_gaps(kids))),

            "default_parameter" | "keyword_argument" | "typed_default_parameter" if style.space_in_keyword_arguments => {
                let eq = kids.iter().position(|c| c.kind() == "=")?;
                Some(Frame::new(node).after(eq, " ").after(eq + 1, " "))
            }

            "list" | "dictionary" | "parameters" | "argument_list" => {
                let (layout, depth) = match kind {
                    "list" => (style.list_items_newline, 1),
                    "dictionary" => (style.dictionary_items_newline, 1),
                    "argument_list" => (style.func_params_newline, 1),
                    // parameters sit two levels in to stand apart from the body
                    _ => (style.func_params_newline, 2),
                };
                self.multi_line(p, kids, layout)
                    .then(|| lines_in_parens(node, kids, depth))
            }

            "assignment" | "binary_operator" | "comparison_operator" | "conditional_expression"
            | "augmented_assignment"
                if style.space_infix_ops =>
            {
                Some(Frame::new(node).every(" "))
            }

            _ if STATEMENTS.contains(&kind) || CLAUSES.contains(&kind) => {
                self.blank_lines(p, node);
                let mut frame = Frame::new(node);
                for (i, c) in kids.iter().enumerate() {
                    match c.kind() {
                        "block" => frame = frame.after(i, "\n").depth(i, 1),
                        "decorator" => frame = frame.after(i + 1, "\n"),
                        _ => {}
                    }
                }
                Some(frame)
            }

            _ => None,
        }
    }

    fn print_leaf<'t>(&self, p: &mut Printer<'t, '_>, node: Node<'t>) {
        let style = self.style;
        let kind = node.kind();
        let mut content = p.text(node);
        // a closer the parser inserted
        if node.is_missing() && matches!(kind, "]" | "}" | ")") {
            content = kind;
        }

        if let Some(last) = p.last_printed {
            if is_identifier_like(last) && is_identifier_like(node) {
                p.print(" ");
            } else if is_keyword(last) && content != ":" {
                p.print(" ");
            }
            if kind == "as" {
                p.print(" ");
            }
        }
        if kind == "->" && style.space_around_arrow {
            p.print(" ");
        }

        p.print_node(node, content);

        if kind == "," && style.space_after_comma {
            p.print(" ");
        }
        if kind == ":" {
            let spaced = match parent_kind(node) {
                "pair" => style.space_after_colon_in_pair,
                "slice" => style.space_after_colon_in_slice,
                "typed_parameter" | "typed_default_parameter" => style.space_after_colon_in_typed_param,
                "lambda" => style.space_after_colon_in_lambda,
                _ => false,
            };
            if spaced {
                p.print(" ");
            }
        }
        if kind == "->" && style.space_around_arrow {
            p.print(" ");
        }

        p.last_printed = Some(node);
    }
}

impl<'t> Rules<'t> for PyRules<'_> {
    fn enter(&mut self, p: &mut Printer<'t, '_>, node: Node<'t>) -> Step<'t> {
        // printed whole, including prefix and quotes
        if node.kind() == "string" {
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
        let node = frame.node;
        if is_single_statement(node) && parent_kind(node) != "ERROR" {
            p.print("\n");
        }
        if node.kind() == "ERROR" {
            p.print_error_tail(node, false);
        }
    }
}
