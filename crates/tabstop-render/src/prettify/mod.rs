//! Syntax-tree pretty printers
//!
//! Each dialect re-emits a concrete syntax tree under its style rules while
//! recording where every printed leaf near the completion region ended up.
//! The machinery shared by all dialects lives here:
//!
//! - [`Printer`]: the output sink plus source, region and mapping bookkeeping
//! - [`Frame`]: per-node child spacing, the "spacer" of a formatted node
//! - [`Walker`]: drives a [`Rules`] implementation over the tree with
//!   explicit enter/exit calls and applies frames around each child

pub mod go;
pub mod javascript;
pub mod python;
pub mod sink;

use std::collections::HashMap;
use std::ops::Range;

use tabstop_parsers::{node_text, Node, NodeVisitor, TreeWalker, VisitAction};

use crate::error::RenderResult;
use crate::types::OffsetMapping;

pub use sink::{OutputSink, Pending, SinkPolicy};

/// Nodes ending this many bytes before the region, or starting this many
/// bytes after it, are still mapped
pub const MAPPING_MARGIN: usize = 10;

/// Printer state shared by every dialect
pub struct Printer<'t, 'w> {
    pub sink: OutputSink<'w>,
    pub src: &'t str,
    pub region: Range<usize>,
    pub mappings: Vec<OffsetMapping>,
    pub last_printed: Option<Node<'t>>,
    verbatim_until: usize,
}

impl<'t, 'w> Printer<'t, 'w> {
    pub fn new(sink: OutputSink<'w>, src: &'t str, region: Range<usize>) -> Self {
        Self {
            sink,
            src,
            region,
            mappings: Vec::new(),
            last_printed: None,
            verbatim_until: 0,
        }
    }

    pub fn text(&self, node: Node<'_>) -> &'t str {
        node_text(node, self.src)
    }

    pub fn print(&mut self, s: &str) {
        self.sink.print(s);
    }

    /// Whether the region start lies strictly inside `node`
    pub fn cursor_inside(&self, node: Node<'_>) -> bool {
        tabstop_parsers::cursor_inside(node, self.region.start)
    }

    /// Record that source bytes `[startb, endb)` were just written as the
    /// last `len` bytes of output
    pub fn record_mapping(&mut self, startb: usize, endb: usize, len: usize) {
        if endb + MAPPING_MARGIN >= self.region.start && startb <= self.region.end + MAPPING_MARGIN {
            let end_after = self.sink.pos();
            self.mappings.push(OffsetMapping::new(
                startb,
                end_after.saturating_sub(len),
                endb,
                end_after,
            ));
        }
    }

    /// Print `content` for the source span `[startb, endb)` and map it.
    /// Whitespace that stays pending is not mapped.
    pub fn print_span(&mut self, startb: usize, endb: usize, content: &str) {
        let before = self.sink.pos();
        self.sink.print(content);
        if self.sink.pos() > before {
            self.record_mapping(startb, endb, content.len());
        }
    }

    /// Print a leaf's (possibly adjusted) content and map it to the leaf
    pub fn print_node(&mut self, node: Node<'t>, content: &str) {
        self.print_span(node.start_byte(), node.end_byte(), content);
    }

    /// Copy source bytes `[start, end)` as-is in pieces split on spaces,
    /// slashes and newlines, mapping each piece
    pub fn print_split(&mut self, start: usize, end: usize) {
        let Some(content) = self.src.get(start..end) else {
            return;
        };
        let mut current = start;
        for part in split_string(content) {
            self.sink.verbatim(part);
            self.record_mapping(current, current + part.len(), part.len());
            current += part.len();
        }
    }

    /// Copy a top-level node that ends before the region, with the source
    /// gap preceding it
    pub fn print_verbatim(&mut self, node: Node<'t>) {
        let start = node.start_byte();
        let from = self.verbatim_until.min(start);
        if let Some(gap) = self.src.get(from..start) {
            self.sink.verbatim(gap);
        }
        let content = self.text(node);
        self.sink.verbatim(content);
        self.record_mapping(start, node.end_byte(), content.len());
        self.verbatim_until = node.end_byte();
    }

    /// After the children of an ERROR node, print the source they left
    /// uncovered
    pub fn print_error_tail(&mut self, node: Node<'t>, split_after_quote: bool) {
        let Some(last) = self.last_printed else {
            return;
        };
        let start = last.end_byte().max(node.start_byte());
        let end = node.end_byte();
        if start >= end {
            return;
        }
        if split_after_quote && matches!(last.kind(), "\"" | "'" | "`") {
            self.print_split(start, end);
        } else if let Some(content) = self.src.get(start..end) {
            self.print_span(start, end, content);
        }
    }

    /// Source gaps between consecutive children, for children that do not
    /// touch
    pub fn source_gaps(&self, children: &[Node<'t>]) -> HashMap<usize, String> {
        let mut gaps = HashMap::new();
        for (i, pair) in children.windows(2).enumerate() {
            let (prev, next) = (pair[0], pair[1]);
            if prev.end_position() != next.start_position() {
                if let Some(gap) = self.src.get(prev.end_byte()..next.start_byte()) {
                    gaps.insert(i + 1, gap.to_string());
                }
            }
        }
        gaps
    }

    pub fn finish(mut self) -> RenderResult<Vec<OffsetMapping>> {
        match self.sink.take_error() {
            Some(err) => Err(err),
            None => Ok(self.mappings),
        }
    }
}

/// Split on ` `, `/` and `\n`, keeping each separator as its own piece
pub fn split_string(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = s;
    while !rest.is_empty() {
        match rest.find([' ', '/', '\n']) {
            None => {
                parts.push(rest);
                break;
            }
            Some(0) => {
                parts.push(&rest[..1]);
                rest = &rest[1..];
            }
            Some(pos) => {
                parts.push(&rest[..pos]);
                rest = &rest[pos..];
            }
        }
    }
    parts
}

/// Spacing inserted between children when no exact separators are given
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Spacing {
    #[default]
    None,
    /// Between every pair of children
    Every(&'static str),
    /// Between the first `n + 1` children only
    UpTo(&'static str, usize),
}

/// How the children of one node are laid out
#[derive(Debug, Clone)]
pub struct Frame<'t> {
    pub node: Node<'t>,
    pub count: usize,
    seen: usize,
    pub spacing: Spacing,
    /// Printed right before child `i`
    pub exactly_after: HashMap<usize, String>,
    /// Depth increase for the duration of child `i`
    pub depth_after: HashMap<usize, i32>,
    /// Permanent depth change before child `i`
    pub shift_before: HashMap<usize, i32>,
    /// Copy source between children, split and mapped
    pub string_gaps: bool,
    last_child_end: Option<usize>,
}

impl<'t> Frame<'t> {
    pub fn new(node: Node<'t>) -> Self {
        Self {
            node,
            count: node.child_count(),
            seen: 0,
            spacing: Spacing::None,
            exactly_after: HashMap::new(),
            depth_after: HashMap::new(),
            shift_before: HashMap::new(),
            string_gaps: false,
            last_child_end: None,
        }
    }

    pub fn every(mut self, s: &'static str) -> Self {
        self.spacing = Spacing::Every(s);
        self
    }

    pub fn up_to(mut self, s: &'static str, n: usize) -> Self {
        self.spacing = Spacing::UpTo(s, n);
        self
    }

    pub fn after(mut self, index: usize, s: impl Into<String>) -> Self {
        self.exactly_after.insert(index, s.into());
        self
    }

    pub fn depth(mut self, index: usize, n: i32) -> Self {
        self.depth_after.insert(index, n);
        self
    }

    pub fn shift(mut self, index: usize, n: i32) -> Self {
        self.shift_before.insert(index, n);
        self
    }

    pub fn with_gaps(mut self, gaps: HashMap<usize, String>) -> Self {
        self.exactly_after = gaps;
        self
    }

    pub fn with_depths(mut self, depths: HashMap<usize, i32>) -> Self {
        self.depth_after = depths;
        self
    }

    pub fn with_string_gaps(mut self) -> Self {
        self.string_gaps = true;
        self
    }

    /// Index of the child about to be visited
    pub fn seen(&self) -> usize {
        self.seen
    }

    fn separator(&self) -> Option<&str> {
        if !self.exactly_after.is_empty() {
            return self.exactly_after.get(&self.seen).map(String::as_str);
        }
        let i = self.seen;
        match self.spacing {
            Spacing::Every(s) if i > 0 && i < self.count => Some(s),
            Spacing::UpTo(s, n) if i > 0 && i < self.count && i <= n => Some(s),
            _ => None,
        }
    }
}

/// What to do with a node after entering it
pub enum Step<'t> {
    /// Already handled; do not visit children
    Skip,
    /// Visit children with no extra layout
    Descend,
    /// Visit children under a frame
    Layout(Frame<'t>),
}

/// Dialect formatting rules, driven by [`Walker`]
pub trait Rules<'t> {
    /// Decide how to print `node`. Leaves are printed here.
    fn enter(&mut self, p: &mut Printer<'t, '_>, node: Node<'t>) -> Step<'t>;

    /// Called for each child of a framed node, after its separator is printed
    fn before_child(&mut self, _p: &mut Printer<'t, '_>, _frame: &Frame<'t>) {}

    /// Called once all children of a framed node have been visited
    fn leave(&mut self, _p: &mut Printer<'t, '_>, _frame: &Frame<'t>) {}
}

/// Walks a tree and applies frames around children
pub struct Walker<'t, 'w, R> {
    pub printer: Printer<'t, 'w>,
    pub rules: R,
    root_kind: &'static str,
    top: Option<usize>,
    open: Vec<(usize, Option<Frame<'t>>)>,
}

impl<'t, 'w, R: Rules<'t>> Walker<'t, 'w, R> {
    pub fn new(printer: Printer<'t, 'w>, rules: R, root_kind: &'static str) -> Self {
        Self {
            printer,
            rules,
            root_kind,
            top: None,
            open: Vec::new(),
        }
    }

    /// Print the tree under `root` and return the offset mappings
    pub fn run(mut self, root: Node<'t>) -> RenderResult<Vec<OffsetMapping>> {
        if root.kind() == self.root_kind {
            self.top = Some(root.id());
        }
        TreeWalker::walk(root, &mut self);
        self.printer.finish()
    }

    fn before_child(&mut self, node: Node<'t>) {
        let Some((_, Some(frame))) = self.open.last_mut() else {
            return;
        };
        let p = &mut self.printer;

        if frame.string_gaps {
            if let Some(prev) = frame.last_child_end {
                if node.start_byte() > prev {
                    p.print_split(prev, node.start_byte());
                }
            }
        }
        if let Some(sep) = frame.separator() {
            let sep = sep.to_string();
            p.print(&sep);
        }
        self.rules.before_child(p, frame);

        let index = frame.seen;
        if let Some(&n) = frame.shift_before.get(&index) {
            if n >= 0 {
                p.sink.increase(n);
            } else {
                p.sink.decrease(-n);
            }
        }
        if let Some(&n) = frame.depth_after.get(&index) {
            p.sink.increase(n);
        }
        frame.seen += 1;
    }

    fn is_top_level(&self) -> bool {
        match (self.top, self.open.last()) {
            (Some(top), Some((parent, _))) => top == *parent,
            _ => false,
        }
    }
}

impl<'t, 'w, R: Rules<'t>> NodeVisitor<'t> for Walker<'t, 'w, R> {
    fn enter(&mut self, node: Node<'t>) -> VisitAction {
        if self.printer.sink.failed() {
            return VisitAction::Stop;
        }
        self.before_child(node);

        if self.is_top_level() {
            if node.end_byte() < self.printer.region.start {
                self.printer.print_verbatim(node);
                return VisitAction::SkipChildren;
            }
            if node.start_byte() > self.printer.region.end {
                return VisitAction::SkipChildren;
            }
        }

        match self.rules.enter(&mut self.printer, node) {
            Step::Skip => VisitAction::SkipChildren,
            Step::Descend => {
                self.open.push((node.id(), None));
                VisitAction::Continue
            }
            Step::Layout(frame) => {
                self.open.push((node.id(), Some(frame)));
                VisitAction::Continue
            }
        }
    }

    fn exit(&mut self, node: Node<'t>) {
        if matches!(self.open.last(), Some((id, _)) if *id == node.id()) {
            if let Some((_, Some(frame))) = self.open.pop() {
                self.rules.leave(&mut self.printer, &frame);
            }
        }
        if let Some((_, Some(frame))) = self.open.last_mut() {
            let index = frame.seen.saturating_sub(1);
            if let Some(&n) = frame.depth_after.get(&index) {
                self.printer.sink.decrease(n);
            }
            frame.last_child_end = Some(node.end_byte());
        }
    }
}

/// Children of `node` in order
pub fn children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

/// Kind of the parent of `node`, or `""` at the root
pub fn parent_kind(node: Node<'_>) -> &'static str {
    node.parent().map(|p| p.kind()).unwrap_or("")
}

/// Whether two optional nodes are the same node
pub fn same_node(a: Option<Node<'_>>, b: Node<'_>) -> bool {
    a.map(|a| a.id() == b.id()).unwrap_or(false)
}
